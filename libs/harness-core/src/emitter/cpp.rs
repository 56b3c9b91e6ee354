use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct CppEmitter;

fn string_literal(text: &str) -> String {
    // `s` suffix keeps embedded NULs
    format!("{}s", literal::quoted(text, '"', literal::octal_escape))
}

impl DriverEmitter for CppEmitter {
    fn language(&self) -> Language {
        Language::Cpp
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
                ScalarType::String => "std::string",
                ScalarType::Char => "char",
                ScalarType::Boolean => "bool",
                ScalarType::Int8 => "std::int8_t",
                ScalarType::Int16 => "std::int16_t",
                ScalarType::Int32 => "std::int32_t",
                ScalarType::Int64 => "std::int64_t",
                ScalarType::Float32 => "float",
                ScalarType::Float64 => "double",
                ScalarType::Decimal => "long double",
            }
            .to_string(),
            ValueType::Array(element) => format!("std::vector<{}>", self.type_name(element)),
            ValueType::List(element) => format!("std::list<{}>", self.type_name(element)),
            ValueType::Set(element) => format!("std::set<{}>", self.type_name(element)),
            ValueType::Map(key, value) => format!(
                "std::map<{}, {}>",
                self.type_name(key),
                self.type_name(value)
            ),
        }
    }

    fn scalar_literal(&self, scalar: ScalarType, text: &str) -> Result<String, String> {
        match scalar {
            ScalarType::String => Ok(string_literal(text)),
            ScalarType::Char => {
                let c = literal::single_char(text)?;
                if !c.is_ascii() {
                    return Err(format!("'{c}' does not fit in a char"));
                }
                Ok(literal::quoted(&c.to_string(), '\'', literal::octal_escape))
            }
            ScalarType::Boolean => Ok(literal::boolean(text)?.to_string()),
            ScalarType::Int64 => {
                let value = literal::integer(scalar, text)?;
                if value == i64::MIN as i128 {
                    Ok("(-9223372036854775807LL - 1)".to_string())
                } else {
                    Ok(format!("{value}LL"))
                }
            }
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 => {
                Ok(literal::integer(scalar, text)?.to_string())
            }
            ScalarType::Float32 => Ok(format!("{}f", literal::exponent_form(literal::float32(text)?))),
            ScalarType::Float64 => Ok(literal::exponent_form(literal::float64(text)?)),
            ScalarType::Decimal => Err("no exact decimal type".to_string()),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        format!("{}{{{}}}", self.type_name(ty), elements.join(", "))
    }

    fn map_literal(&self, ty: &ValueType, entries: Vec<(String, String)>) -> String {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("{{{k}, {v}}}"))
            .collect();
        format!("{}{{{}}}", self.type_name(ty), entries.join(", "))
    }

    fn exact_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("{a} == {b}")
    }

    fn tolerant_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("hasMinimalDifference({a}, {b})")
    }

    fn length(&self, _ty: &ValueType, operand: &str) -> String {
        format!("{operand}.size()")
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        // std::set iterates in key order
        operand.to_string()
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
        format!("[](const auto& {a}, const auto& {b}) {{ return {body}; }}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        format!(
            "\ttry {{\n\
             \t\t{ty} ret = {function}({args});\n\
             \t\t{ty} expected = {expected};\n\
             \t\tif ({comparison}) reportPass({i});\n\
             \t\telse reportFail({i}, printValue(ret), printValue(expected));\n\
             \t}} catch (const std::exception& ex) {{\n\
             \t\treportError({i}, ex.what());\n\
             \t}} catch (...) {{\n\
             \t\treportError({i}, \"unknown exception\");\n\
             \t}}",
            ty = call.result_type,
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("\treportSkip({index}, {});", string_literal(reason))
    }

    fn skeleton(&self, function: &FunctionSignature) -> String {
        let params: Vec<String> = function
            .inputs
            .iter()
            .map(|p| format!("{} {}", self.type_name(&p.ty), p.name))
            .collect();
        format!(
            "{} {}({}) {{\n\t\n}}\n",
            self.type_name(&function.output),
            function.name,
            params.join(", ")
        )
    }
}
