use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct CsharpEmitter;

/// Digits (and fractional digits) a `decimal` literal holds without rounding.
const DECIMAL_DIGITS: usize = 28;

fn string_literal(text: &str) -> String {
    literal::quoted(text, '"', literal::utf16_escape)
}

fn decimal_literal(text: &str) -> Result<String, String> {
    let text = literal::decimal(text)?;
    if text.contains(['e', 'E']) {
        return Err("decimal literals cannot carry an exponent".to_string());
    }
    let scale = text.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    if scale > DECIMAL_DIGITS {
        return Err(format!("{text} has more than {DECIMAL_DIGITS} fractional digits"));
    }
    let digits = text
        .trim_start_matches(['+', '-'])
        .trim_start_matches(['0', '.'])
        .chars()
        .filter(char::is_ascii_digit)
        .count();
    if digits > DECIMAL_DIGITS {
        return Err(format!("{text} has more than {DECIMAL_DIGITS} significant digits"));
    }
    Ok(format!("{text}m"))
}

impl DriverEmitter for CsharpEmitter {
    fn language(&self) -> Language {
        Language::Csharp
    }

    fn type_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::String => "string",
                ScalarType::Char => "char",
                ScalarType::Boolean => "bool",
                ScalarType::Int8 => "sbyte",
                ScalarType::Int16 => "short",
                ScalarType::Int32 => "int",
                ScalarType::Int64 => "long",
                ScalarType::Float32 => "float",
                ScalarType::Float64 => "double",
                ScalarType::Decimal => "decimal",
            }
            .to_string(),
            ValueType::Array(element) => format!("{}[]", self.type_name(element)),
            ValueType::List(element) => format!("List<{}>", self.type_name(element)),
            ValueType::Set(element) => format!("HashSet<{}>", self.type_name(element)),
            ValueType::Map(key, value) => format!(
                "Dictionary<{}, {}>",
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
                if c.len_utf16() != 1 {
                    return Err(format!("'{c}' does not fit in a char"));
                }
                Ok(literal::quoted(&c.to_string(), '\'', literal::utf16_escape))
            }
            ScalarType::Boolean => Ok(literal::boolean(text)?.to_string()),
            ScalarType::Int8 => Ok(format!("(sbyte)({})", literal::integer(scalar, text)?)),
            ScalarType::Int16 => Ok(format!("(short)({})", literal::integer(scalar, text)?)),
            ScalarType::Int32 => Ok(literal::integer(scalar, text)?.to_string()),
            ScalarType::Int64 => {
                let value = literal::integer(scalar, text)?;
                if value == i64::MIN as i128 {
                    Ok("long.MinValue".to_string())
                } else {
                    Ok(format!("{value}L"))
                }
            }
            ScalarType::Float32 => Ok(format!("{}f", literal::exponent_form(literal::float32(text)?))),
            ScalarType::Float64 => Ok(literal::exponent_form(literal::float64(text)?)),
            ScalarType::Decimal => decimal_literal(text),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        let initializer = if elements.is_empty() {
            "{ }".to_string()
        } else {
            format!("{{ {} }}", elements.join(", "))
        };
        match ty {
            ValueType::Array(element) => format!("new {}[] {initializer}", self.type_name(element)),
            _ => format!("new {}() {initializer}", self.type_name(ty)),
        }
    }

    fn map_literal(&self, ty: &ValueType, entries: Vec<(String, String)>) -> String {
        if entries.is_empty() {
            return format!("new {}()", self.type_name(ty));
        }
        let entries: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("{{ {k}, {v} }}"))
            .collect();
        format!("new {}() {{ {} }}", self.type_name(ty), entries.join(", "))
    }

    fn exact_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("{a} == {b}")
    }

    fn tolerant_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("HasMinimalDifference({a}, {b})")
    }

    fn length(&self, ty: &ValueType, operand: &str) -> String {
        match ty {
            ValueType::Array(_) => format!("{operand}.Length"),
            _ => format!("{operand}.Count"),
        }
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        format!("Sorted({operand})")
    }

    fn same_elements(&self, a: &str, b: &str, length: &str, eq: Option<&str>) -> String {
        match eq {
            Some(eq) => format!("HasSameElements({a}, {b}, {length}, {eq})"),
            None => format!("HasSameElements({a}, {b}, {length})"),
        }
    }

    fn same_entries(&self, a: &str, b: &str, eq: &str) -> String {
        format!("HasSameEntries({a}, {b}, {eq})")
    }

    fn lambda(&self, a: &str, b: &str, body: &str) -> String {
        format!("({a}, {b}) => {body}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        format!(
            "\t\ttry {{\n\
             \t\t\t{ty} ret = inst.{function}({args});\n\
             \t\t\t{ty} expected = {expected};\n\
             \t\t\tif ({comparison}) ReportPass({i});\n\
             \t\t\telse ReportFail({i}, PrintValue(ret), PrintValue(expected));\n\
             \t\t}} catch (Exception ex) {{\n\
             \t\t\tReportError({i}, ex);\n\
             \t\t}}",
            ty = call.result_type,
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("\t\tReportSkip({index}, {});", string_literal(reason))
    }

    fn skeleton(&self, function: &FunctionSignature) -> String {
        let params: Vec<String> = function
            .inputs
            .iter()
            .map(|p| format!("{} {}", self.type_name(&p.ty), p.name))
            .collect();
        format!(
            "public {} {}({}) {{\n\t\n}}\n",
            self.type_name(&function.output),
            function.name,
            params.join(", ")
        )
    }
}
