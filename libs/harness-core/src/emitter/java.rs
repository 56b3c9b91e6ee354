use super::literal;
use super::{CaseCall, DriverEmitter};
use harness_common::types::{FunctionSignature, Language, ScalarType, ValueType};

pub struct JavaEmitter;

/// Unicode escapes are translated before lexing, so control characters must
/// use octal escapes instead.
fn escape(c: char) -> String {
    if c.is_ascii() {
        format!("\\{:03o}", c as u32)
    } else {
        literal::utf16_escape(c)
    }
}

fn string_literal(text: &str) -> String {
    literal::quoted(text, '"', escape)
}

impl JavaEmitter {
    /// Reference type, used for container elements.
    fn class_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::String => "String",
                ScalarType::Char => "Character",
                ScalarType::Boolean => "Boolean",
                ScalarType::Int8 => "Byte",
                ScalarType::Int16 => "Short",
                ScalarType::Int32 => "Integer",
                ScalarType::Int64 => "Long",
                ScalarType::Float32 => "Float",
                ScalarType::Float64 => "Double",
                ScalarType::Decimal => "BigDecimal",
            }
            .to_string(),
            ValueType::Array(element) => format!("{}[]", self.class_name(element)),
            ValueType::List(element) => format!("List<{}>", self.class_name(element)),
            ValueType::Set(element) => format!("Set<{}>", self.class_name(element)),
            ValueType::Map(key, value) => {
                format!("Map<{}, {}>", self.class_name(key), self.class_name(value))
            }
        }
    }
}

impl DriverEmitter for JavaEmitter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn unsupported(&self, ty: &ValueType) -> Option<&'static str> {
        match ty {
            ValueType::Array(element)
                if matches!(**element, ValueType::List(_) | ValueType::Set(_) | ValueType::Map(..)) =>
            {
                Some("arrays of generic collections cannot be created")
            }
            _ => None,
        }
    }

    fn type_name(&self, ty: &ValueType) -> String {
        match ty {
            ValueType::Scalar(scalar) => match scalar {
                ScalarType::Char => "char".to_string(),
                ScalarType::Boolean => "boolean".to_string(),
                ScalarType::Int8 => "byte".to_string(),
                ScalarType::Int16 => "short".to_string(),
                ScalarType::Int32 => "int".to_string(),
                ScalarType::Int64 => "long".to_string(),
                ScalarType::Float32 => "float".to_string(),
                ScalarType::Float64 => "double".to_string(),
                ScalarType::String | ScalarType::Decimal => self.class_name(ty),
            },
            _ => self.class_name(ty),
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
                Ok(literal::quoted(&c.to_string(), '\'', escape))
            }
            ScalarType::Boolean => Ok(literal::boolean(text)?.to_string()),
            ScalarType::Int8 => Ok(format!("(byte) {}", literal::integer(scalar, text)?)),
            ScalarType::Int16 => Ok(format!("(short) {}", literal::integer(scalar, text)?)),
            ScalarType::Int32 => Ok(literal::integer(scalar, text)?.to_string()),
            ScalarType::Int64 => Ok(format!("{}L", literal::integer(scalar, text)?)),
            ScalarType::Float32 => Ok(format!("{}f", literal::exponent_form(literal::float32(text)?))),
            ScalarType::Float64 => Ok(literal::exponent_form(literal::float64(text)?)),
            ScalarType::Decimal => Ok(format!("new BigDecimal(\"{}\")", literal::decimal(text)?)),
        }
    }

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String {
        let elements = elements.join(", ");
        let class = match ty {
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element) => {
                self.class_name(element)
            }
            _ => String::from("Object"),
        };
        match ty {
            ValueType::Array(_) if elements.is_empty() => format!("new {class}[] {{}}"),
            ValueType::Array(_) => format!("new {class}[] {{ {elements} }}"),
            ValueType::Set(_) => format!("new HashSet<{class}>(Arrays.<{class}>asList({elements}))"),
            _ => format!("new ArrayList<{class}>(Arrays.<{class}>asList({elements}))"),
        }
    }

    fn map_literal(&self, ty: &ValueType, entries: Vec<(String, String)>) -> String {
        let (key, value) = match ty {
            ValueType::Map(key, value) => (self.class_name(key), self.class_name(value)),
            _ => (String::from("Object"), String::from("Object")),
        };
        if entries.is_empty() {
            return format!("new LinkedHashMap<{key}, {value}>()");
        }
        let puts: Vec<String> = entries
            .into_iter()
            .map(|(k, v)| format!("put({k}, {v}); "))
            .collect();
        format!("new LinkedHashMap<{key}, {value}>() {{{{ {}}}}}", puts.concat())
    }

    fn exact_eq(&self, ty: &ValueType, a: &str, b: &str) -> String {
        match ty {
            ValueType::Scalar(ScalarType::Decimal) => format!("{a}.compareTo({b}) == 0"),
            _ => format!("Objects.equals({a}, {b})"),
        }
    }

    // BigDecimal.equals is scale-sensitive
    fn exact_needs_predicate(&self, ty: &ValueType) -> bool {
        matches!(ty, ValueType::Scalar(ScalarType::Decimal))
    }

    fn tolerant_eq(&self, _ty: &ValueType, a: &str, b: &str) -> String {
        format!("hasMinimalDifference({a}, {b})")
    }

    fn length(&self, ty: &ValueType, operand: &str) -> String {
        match ty {
            ValueType::Array(_) => format!("{operand}.length"),
            _ => format!("{operand}.size()"),
        }
    }

    fn canonical(&self, _ty: &ValueType, operand: &str) -> String {
        format!("sorted({operand})")
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
        format!("({a}, {b}) -> {body}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String {
        let i = call.index;
        format!(
            "\t\ttry {{\n\
             \t\t\t{ty} ret = inst.{function}({args});\n\
             \t\t\t{ty} expected = {expected};\n\
             \t\t\tif ({comparison}) reportPass({i});\n\
             \t\t\telse reportFail({i}, printValue(ret), printValue(expected));\n\
             \t\t}} catch (Throwable ex) {{\n\
             \t\t\treportError({i}, ex);\n\
             \t\t}}",
            ty = call.result_type,
            function = call.function,
            args = call.arguments.join(", "),
            expected = call.expected,
            comparison = call.comparison,
        )
    }

    fn skipped_statement(&self, index: usize, reason: &str) -> String {
        format!("\t\treportSkip({index}, {});", string_literal(reason))
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
