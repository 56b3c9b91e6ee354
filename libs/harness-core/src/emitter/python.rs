use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct PythonEmitter;

fn escape(c: char) -> String {
    match c as u32 {
        code @ 0..=0xffff => format!("\\u{code:04x}"),
        code => format!("\\U{code:08x}"),
    }
}

fn string_literal(text: &str) -> String {
    literal::quoted(text, '"', escape)
}

/// Statement lines at module level; the template places them at column zero.
fn indent(body: &str) -> String {
    body.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl DriverEmitter for PythonEmitter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn type_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::String | ScalarType::Char => "str",
                ScalarType::Boolean => "bool",
                ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64 => "int",
                ScalarType::Float32 | ScalarType::Float64 => "float",
                ScalarType::Decimal => "Decimal",
            }
            .to_string(),
            ValueType::Array(element) | ValueType::List(element) => {
                format!("list[{}]", self.type_name(element))
            }
            ValueType::Set(element) => format!("set[{}]", self.type_name(element)),
            ValueType::Map(key, value) => {
                format!("dict[{}, {}]", self.type_name(key), self.type_name(value))
            }
        }
    }

    fn scalar_literal(&self, scalar: ScalarType, text: &str) -> Result<String, String> {
        match scalar {
            ScalarType::String => Ok(string_literal(text)),
            ScalarType::Char => Ok(string_literal(&literal::single_char(text)?.to_string())),
            ScalarType::Boolean => Ok(if literal::boolean(text)? { "True" } else { "False" }.to_string()),
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64 => {
                Ok(literal::integer(scalar, text)?.to_string())
            }
            // Python floats are doubles; widen so the literal keeps the single-precision value.
            ScalarType::Float32 => Ok(literal::exponent_form(f64::from(literal::float32(text)?))),
            ScalarType::Float64 => Ok(literal::exponent_form(literal::float64(text)?)),
            ScalarType::Decimal => Ok(format!("Decimal(\"{}\")", literal::decimal(text)?)),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        match ty {
            ValueType::Set(_) if elements.is_empty() => "set()".to_string(),
            ValueType::Set(_) => format!("{{{}}}", elements.join(", ")),
            _ => format!("[{}]", elements.join(", ")),
        }
    }

    fn map_literal(&self, _ty: &ValueType, entries: Vec<(String, String)>) -> String {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }

    fn exact_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("{a} == {b}")
    }

    fn tolerant_eq(&self, ty: &ValueType, a: &str, b: &str) -> String {
        match ty {
            ValueType::Scalar(ScalarType::Float32) => format!("has_minimal_difference({a}, {b}, 32)"),
            _ => format!("has_minimal_difference({a}, {b})"),
        }
    }

    fn length(&self, _ty: &ValueType, operand: &str) -> String {
        format!("len({operand})")
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        format!("sorted({operand})")
    }

    fn same_elements(&self, a: &str, b: &str, length: &str, eq: Option<&str>) -> String {
        match eq {
            Some(eq) => format!("has_same_elements({a}, {b}, {length}, {eq})"),
            None => format!("has_same_elements({a}, {b}, {length})"),
        }
    }

    fn same_entries(&self, a: &str, b: &str, eq: &str) -> String {
        format!("has_same_entries({a}, {b}, {eq})")
    }

    fn lambda(&self, a: &str, b: &str, body: &str) -> String {
        format!("lambda {a}, {b}: {body}")
    }

    fn conjunction(&self, left: &str, right: &str) -> String {
        format!("{left} and {right}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        let body = format!(
            "ret = {function}({args})\n\
             expected = {expected}\n\
             if {comparison}:\n    report_pass({i})\n\
             else:\n    report_fail({i}, print_value(ret), print_value(expected))",
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        );
        format!(
            "try:\n{}\nexcept Exception as ex:\n    report_error({i}, ex)",
            indent(&body)
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("report_skip({index}, {})", string_literal(reason))
    }

    fn skeleton(&self, function: &FunctionSignature) -> String {
        let params: Vec<&str> = function.inputs.iter().map(|p| p.name.as_str()).collect();
        format!("def {}({}):\n    pass\n", function.name, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{comparison, emit_case, render_literal};
    use super::*;
    use harness_common::value::Value;
    use pretty_assertions::assert_eq;

    fn lit(ty_text: &str, value: &str) -> String {
        let ty = ty(ty_text);
        render_literal(&PythonEmitter, &ty, &Value::parse(&ty, value).unwrap()).unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(lit("boolean", "false"), "False");
        assert_eq!(lit("int64", "-9223372036854775808"), "-9223372036854775808");
        assert_eq!(lit("float64", "2.1"), "2.1e0");
        assert_eq!(lit("float32", "0.1"), "1.0000000149011612e-1");
        assert_eq!(lit("float32", "2.5"), "2.5e0");
        assert_eq!(lit("decimal", "1.50"), "Decimal(\"1.50\")");
        assert_eq!(lit("string", "😀"), r#""\U0001f600""#);
        assert_eq!(lit("set<int32>", "{}"), "set()");
        assert_eq!(lit("set<int32>", "{ 3, 1 }"), "{3, 1}");
        assert_eq!(lit("array<char>", "{ a, b }"), r#"["a", "b"]"#);
        assert_eq!(lit("map<string, boolean>", "{ x: true }"), r#"{"x": True}"#);
    }

    #[test]
    fn test_float32_comparison_narrows() {
        assert_eq!(
            comparison(&PythonEmitter, &ty("float32"), "ret", "expected").unwrap(),
            "has_minimal_difference(ret, expected, 32)"
        );
        assert_eq!(
            comparison(&PythonEmitter, &ty("set<string>"), "ret", "expected").unwrap(),
            "len(ret) == len(expected) and has_same_elements(sorted(ret), sorted(expected), len(ret))"
        );
    }

    #[test]
    fn test_statement_shape() {
        let functions = vec![signature("add", &[("x", "float64"), ("y", "float64")], "float64")];
        let case = make_test_case("add", &["2.1", "2.2"], "4.300000001");

        let code = emit_case(&PythonEmitter, &functions, 1, &case).unwrap();

        assert_eq!(
            code,
            "try:\n\
             \x20   ret = add(2.1e0, 2.2e0)\n\
             \x20   expected = 4.300000001e0\n\
             \x20   if has_minimal_difference(ret, expected):\n\
             \x20       report_pass(1)\n\
             \x20   else:\n\
             \x20       report_fail(1, print_value(ret), print_value(expected))\n\
             except Exception as ex:\n\
             \x20   report_error(1, ex)"
        );
    }

    #[test]
    fn test_skeleton() {
        let function = signature("add", &[("x", "int32"), ("y", "int32")], "int32");
        assert_eq!(PythonEmitter.skeleton(&function), "def add(x, y):\n    pass\n");
    }
}
