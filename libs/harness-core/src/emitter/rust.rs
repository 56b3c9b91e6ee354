use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct RustEmitter;

fn string_literal(text: &str) -> String {
    literal::quoted(text, '"', literal::braced_escape)
}

fn suffix(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int8 => "i8",
        ScalarType::Int16 => "i16",
        ScalarType::Int32 => "i32",
        ScalarType::Int64 => "i64",
        ScalarType::Float32 => "f32",
        _ => "f64",
    }
}

impl DriverEmitter for RustEmitter {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn unsupported(&self, ty: &ValueType) -> Option<&'static str> {
        match ty {
            ValueType::Scalar(ScalarType::Decimal) => Some("no exact decimal type"),
            ValueType::Set(element) if element.is_float() => {
                Some("floating-point values have no total order for a BTreeSet")
            }
            _ => None,
        }
    }

    fn type_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::String => "String",
                ScalarType::Char => "char",
                ScalarType::Boolean => "bool",
                ScalarType::Decimal => "f64",
                other => suffix(*other),
            }
            .to_string(),
            ValueType::Array(element) | ValueType::List(element) => {
                format!("Vec<{}>", self.type_name(element))
            }
            ValueType::Set(element) => {
                format!("std::collections::BTreeSet<{}>", self.type_name(element))
            }
            ValueType::Map(key, value) => format!(
                "std::collections::BTreeMap<{}, {}>",
                self.type_name(key),
                self.type_name(value)
            ),
        }
    }

    fn scalar_literal(&self, scalar: ScalarType, text: &str) -> Result<String, String> {
        match scalar {
            ScalarType::String => Ok(format!("String::from({})", string_literal(text))),
            ScalarType::Char => Ok(literal::quoted(
                &literal::single_char(text)?.to_string(),
                '\'',
                literal::braced_escape,
            )),
            ScalarType::Boolean => Ok(literal::boolean(text)?.to_string()),
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64 => {
                Ok(format!("{}{}", literal::integer(scalar, text)?, suffix(scalar)))
            }
            ScalarType::Float32 => Ok(format!("{}f32", literal::exponent_form(literal::float32(text)?))),
            ScalarType::Float64 => Ok(format!("{}f64", literal::exponent_form(literal::float64(text)?))),
            ScalarType::Decimal => Err("no exact decimal type".to_string()),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        format!("{}::from([{}])", turbofish(&self.type_name(ty)), elements.join(", "))
    }

    fn map_literal(&self, ty: &ValueType, entries: Vec<(String, String)>) -> String {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("({k}, {v})"))
            .collect();
        format!("{}::from([{}])", turbofish(&self.type_name(ty)), entries.join(", "))
    }

    fn operands(&self) -> (&'static str, &'static str) {
        ("a0", "b0")
    }

    fn exact_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("{a} == {b}")
    }

    fn tolerant_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("has_minimal_difference(*{a}, *{b})")
    }

    fn length(&self, _ty: &ValueType, operand: &str) -> String {
        format!("{operand}.len()")
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        // BTreeSet iterates in order
        format!("{operand}.iter().collect::<Vec<_>>()")
    }

    fn same_elements(&self, a: &str, b: &str, length: &str, eq: Option<&str>) -> String {
        match eq {
            Some(eq) => format!("has_same_elements_by({a}.as_slice(), {b}.as_slice(), {length}, {eq})"),
            None => format!("has_same_elements({a}.as_slice(), {b}.as_slice(), {length})"),
        }
    }

    fn same_entries(&self, a: &str, b: &str, eq: &str) -> String {
        format!("has_same_entries_by({a}, {b}, {eq})")
    }

    fn lambda(&self, a: &str, b: &str, body: &str) -> String {
        format!("|{a}, {b}| {body}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        format!(
            "    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {function}({args}))) {{\n\
             \x20       Ok(ret) => {{\n\
             \x20           let expected: {ty} = {expected};\n\
             \x20           let (a0, b0) = (&ret, &expected);\n\
             \x20           if {comparison} {{\n\
             \x20               report_pass({i});\n\
             \x20           }} else {{\n\
             \x20               report_fail({i}, &ret.render(), &expected.render());\n\
             \x20           }}\n\
             \x20       }}\n\
             \x20       Err(payload) => report_error({i}, &panic_message(payload.as_ref())),\n\
             \x20   }}",
            ty = call.result_type,
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("    report_skip({index}, {});", string_literal(reason))
    }

    fn skeleton(&self, function: &FunctionSignature) -> String {
        let params: Vec<String> = function
            .inputs
            .iter()
            .map(|p| format!("{}: {}", p.name, self.type_name(&p.ty)))
            .collect();
        format!(
            "fn {}({}) -> {} {{\n    todo!()\n}}\n",
            function.name,
            params.join(", "),
            self.type_name(&function.output)
        )
    }
}

/// `Vec<i32>` as an expression path: `Vec::<i32>`.
fn turbofish(type_name: &str) -> String {
    match type_name.find('<') {
        Some(at) => format!("{}::{}", &type_name[..at], &type_name[at..]),
        None => type_name.to_string(),
    }
}
