use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct JavascriptEmitter;

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

fn string_literal(text: &str) -> String {
    literal::quoted(text, '"', literal::utf16_escape)
}

impl DriverEmitter for JavascriptEmitter {
    fn language(&self) -> Language {
        Language::Javascript
    }

    fn unsupported(&self, ty: &ValueType) -> Option<&'static str> {
        match ty {
            ValueType::Scalar(ScalarType::Decimal) => Some("no exact decimal type"),
            _ => None,
        }
    }

    fn type_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::String | ScalarType::Char => "string",
                ScalarType::Boolean => "boolean",
                _ => "number",
            }
            .to_string(),
            ValueType::Array(element) | ValueType::List(element) => {
                format!("Array<{}>", self.type_name(element))
            }
            ValueType::Set(element) => format!("Set<{}>", self.type_name(element)),
            ValueType::Map(key, value) => {
                format!("Map<{}, {}>", self.type_name(key), self.type_name(value))
            }
        }
    }

    fn scalar_literal(&self, scalar: ScalarType, text: &str) -> Result<String, String> {
        match scalar {
            ScalarType::String => Ok(string_literal(text)),
            ScalarType::Char => Ok(string_literal(&literal::single_char(text)?.to_string())),
            ScalarType::Boolean => Ok(literal::boolean(text)?.to_string()),
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64 => {
                let value = literal::integer(scalar, text)?;
                if value.abs() > MAX_SAFE_INTEGER {
                    return Err(format!("{value} is not exactly representable as a number"));
                }
                Ok(value.to_string())
            }
            ScalarType::Float32 => Ok(format!(
                "Math.fround({})",
                literal::exponent_form(literal::float32(text)?)
            )),
            ScalarType::Float64 => Ok(literal::exponent_form(literal::float64(text)?)),
            ScalarType::Decimal => Err("no exact decimal type".to_string()),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        match ty {
            ValueType::Set(_) => format!("new Set([{}])", elements.join(", ")),
            _ => format!("[{}]", elements.join(", ")),
        }
    }

    fn map_literal(&self, _ty: &ValueType, entries: Vec<(String, String)>) -> String {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("[{k}, {v}]"))
            .collect();
        format!("new Map([{}])", entries.join(", "))
    }

    fn exact_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("{a} === {b}")
    }

    fn tolerant_eq(&self, ty: &ValueType, a: &str, b: &str) -> String {
        match ty {
            ValueType::Scalar(ScalarType::Float32) => format!("hasMinimalDifference({a}, {b}, 32)"),
            _ => format!("hasMinimalDifference({a}, {b})"),
        }
    }

    fn length(&self, ty: &ValueType, operand: &str) -> String {
        match ty {
            ValueType::Set(_) | ValueType::Map(..) => format!("{operand}.size"),
            _ => format!("{operand}.length"),
        }
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        format!("canonical({operand})")
    }

    fn same_elements(&self, a: &str, b: &str, length: &str, eq: Option<&str>) -> String {
        match eq {
            Some(eq) => format!("hasSameElements({a}, {b}, {length}, {eq})"),
            None => format!("hasSameElements({a}, {b}, {length})"),
        }
    }

    fn same_entries(&self, a: &str, b: &str, eq: &str) -> String {
        format!("hasSameEntries({a}, {b}, {eq})")
    }

    fn lambda(&self, a: &str, b: &str, body: &str) -> String {
        format!("({a}, {b}) => {body}")
    }

    fn equal_lengths(&self, a: &str, b: &str) -> String {
        format!("{a} === {b}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        format!(
            "try {{\n\
             \tconst ret = {function}({args});\n\
             \tconst expected = {expected};\n\
             \tif ({comparison}) reportPass({i});\n\
             \telse reportFail({i}, printValue(ret), printValue(expected));\n\
             }} catch (ex) {{\n\
             \treportError({i}, ex);\n\
             }}",
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("reportSkip({index}, {});", string_literal(reason))
    }

    fn skeleton(&self, function: &FunctionSignature) -> String {
        let params: Vec<&str> = function.inputs.iter().map(|p| p.name.as_str()).collect();
        format!("function {}({}) {{\n\t\n}}\n", function.name, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{comparison, render_literal};
    use super::*;
    use harness_common::value::Value;
    use pretty_assertions::assert_eq;

    fn lit(ty_text: &str, value: &str) -> Result<String, String> {
        let ty = ty(ty_text);
        render_literal(&JavascriptEmitter, &ty, &Value::parse(&ty, value).unwrap())
            .map_err(|e| e.to_string())
    }

    #[test]
    fn test_literals() {
        assert_eq!(lit("float32", "0.1").unwrap(), "Math.fround(1e-1)");
        assert_eq!(lit("int64", "9007199254740991").unwrap(), "9007199254740991");
        assert_eq!(lit("set<string>", "{ b, a }").unwrap(), r#"new Set(["b", "a"])"#);
        assert_eq!(
            lit("map<int32, array<boolean>>", "{ 1: { true }, 2: {} }").unwrap(),
            "new Map([[1, [true]], [2, []]])"
        );
    }

    #[test]
    fn test_unsafe_int64_rejected() {
        let err = lit("int64", "9007199254740993").unwrap_err();
        assert!(err.contains("not exactly representable"), "{err}");
    }

    #[test]
    fn test_map_comparison() {
        assert_eq!(
            comparison(&JavascriptEmitter, &ty("map<string, float32>"), "ret", "expected").unwrap(),
            "hasSameEntries(ret, expected, (a1, b1) => hasMinimalDifference(a1, b1, 32))"
        );
    }

    #[test]
    fn test_skeleton() {
        let function = signature("reverse", &[("s", "string")], "string");
        assert_eq!(JavascriptEmitter.skeleton(&function), "function reverse(s) {\n\t\n}\n");
    }
}
