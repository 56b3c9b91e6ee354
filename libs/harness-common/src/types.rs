use crate::error::{DescriptorError, TypeParseError, UnknownLanguage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Csharp,
    Java,
    Javascript,
    Python,
    Rust,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Cpp,
        Language::Csharp,
        Language::Java,
        Language::Javascript,
        Language::Python,
        Language::Rust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Java => "java",
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpp" | "c++" => Ok(Language::Cpp),
            "csharp" | "c#" => Ok(Language::Csharp),
            "java" => Ok(Language::Java),
            "javascript" | "js" => Ok(Language::Javascript),
            "python" => Ok(Language::Python),
            "rust" => Ok(Language::Rust),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Types without generic parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Char,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Char => "char",
            ScalarType::Boolean => "boolean",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Decimal => "decimal",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ScalarType::Float32 | ScalarType::Float64)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64
        )
    }

    /// Inclusive range of an integer type.
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            ScalarType::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            ScalarType::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            ScalarType::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            ScalarType::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }
}

/// Declared type of a parameter or result, e.g. `map<int32, list<string>>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueType {
    Scalar(ScalarType),
    Array(Box<ValueType>),
    List(Box<ValueType>),
    Set(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
}

/// Comparison strategy selected by a value's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Exact,
    Tolerant,
    UnorderedSequence {
        element: Box<TypeDescriptor>,
        /// The container has no positional order and is sorted before comparison.
        canonicalize: bool,
    },
    UnorderedMap { value: Box<TypeDescriptor> },
}

impl ValueType {
    pub fn parse(text: &str) -> Result<Self, TypeParseError> {
        let mut parser = TypeParser { text, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != text.len() {
            return Err(TypeParseError::TrailingInput {
                text: text.to_string(),
                offset: parser.pos,
            });
        }
        Ok(ty)
    }

    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            ValueType::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ValueType::Scalar(_))
    }

    pub fn is_float(&self) -> bool {
        self.scalar().is_some_and(|s| s.is_float())
    }

    /// Element type of one-dimensional containers.
    pub fn element(&self) -> Option<&ValueType> {
        match self {
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element) => {
                Some(element)
            }
            _ => None,
        }
    }

    pub fn descriptor(&self) -> Result<TypeDescriptor, DescriptorError> {
        match self {
            ValueType::Scalar(scalar) if scalar.is_float() => Ok(TypeDescriptor::Tolerant),
            ValueType::Scalar(_) => Ok(TypeDescriptor::Exact),
            ValueType::Array(element) | ValueType::List(element) => {
                Ok(TypeDescriptor::UnorderedSequence {
                    element: Box::new(element.descriptor()?),
                    canonicalize: false,
                })
            }
            ValueType::Set(element) => {
                if !element.is_scalar() {
                    return Err(DescriptorError::NestedSetElement {
                        element: element.to_string(),
                    });
                }
                Ok(TypeDescriptor::UnorderedSequence {
                    element: Box::new(element.descriptor()?),
                    canonicalize: true,
                })
            }
            ValueType::Map(key, value) => {
                if key.descriptor()? != TypeDescriptor::Exact {
                    return Err(DescriptorError::InexactMapKey {
                        key: key.to_string(),
                    });
                }
                Ok(TypeDescriptor::UnorderedMap {
                    value: Box::new(value.descriptor()?),
                })
            }
        }
    }

    /// Visits this type and every nested type, outermost first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ValueType)) {
        visit(self);
        match self {
            ValueType::Scalar(_) => {}
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element) => {
                element.walk(visit)
            }
            ValueType::Map(key, value) => {
                key.walk(visit);
                value.walk(visit);
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(scalar) => f.write_str(scalar.name()),
            ValueType::Array(element) => write!(f, "array<{}>", element),
            ValueType::List(element) => write!(f, "list<{}>", element),
            ValueType::Set(element) => write!(f, "set<{}>", element),
            ValueType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
        }
    }
}

impl FromStr for ValueType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueType::parse(s)
    }
}

impl TryFrom<String> for ValueType {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ValueType::parse(&value)
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

struct TypeParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn name(&mut self) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            self.pos += c.len_utf8();
        }
        &self.text[start..self.pos]
    }

    fn parse_type(&mut self) -> Result<ValueType, TypeParseError> {
        let name = self.name();
        if name.is_empty() {
            return Err(TypeParseError::MissingName {
                text: self.text.to_string(),
                offset: self.pos,
            });
        }

        let mut params = Vec::new();
        if self.eat('<') {
            loop {
                params.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(TypeParseError::Expected {
                    text: self.text.to_string(),
                    expected: "',' or '>'",
                    offset: self.pos,
                });
            }
        }

        build_type(self.text, name, params)
    }
}

fn build_type(
    text: &str,
    name: &str,
    mut params: Vec<ValueType>,
) -> Result<ValueType, TypeParseError> {
    let scalar = match name.to_lowercase().as_str() {
        "string" => Some(ScalarType::String),
        "char" | "character" => Some(ScalarType::Char),
        "boolean" | "bool" => Some(ScalarType::Boolean),
        "int8" => Some(ScalarType::Int8),
        "int16" => Some(ScalarType::Int16),
        "int32" => Some(ScalarType::Int32),
        "int64" => Some(ScalarType::Int64),
        "float32" => Some(ScalarType::Float32),
        "float64" => Some(ScalarType::Float64),
        "decimal" => Some(ScalarType::Decimal),
        _ => None,
    };
    if let Some(scalar) = scalar {
        expect_arity(scalar.name(), 0, &params)?;
        return Ok(ValueType::Scalar(scalar));
    }

    match name.to_lowercase().as_str() {
        "array" => {
            expect_arity("array", 1, &params)?;
            Ok(ValueType::Array(Box::new(params.remove(0))))
        }
        "list" => {
            expect_arity("list", 1, &params)?;
            Ok(ValueType::List(Box::new(params.remove(0))))
        }
        "set" => {
            expect_arity("set", 1, &params)?;
            Ok(ValueType::Set(Box::new(params.remove(0))))
        }
        "map" => {
            expect_arity("map", 2, &params)?;
            let value = params.remove(1);
            let key = params.remove(0);
            Ok(ValueType::Map(Box::new(key), Box::new(value)))
        }
        _ => Err(TypeParseError::UnknownType {
            text: text.to_string(),
            name: name.to_string(),
        }),
    }
}

fn expect_arity(
    name: &'static str,
    expected: usize,
    params: &[ValueType],
) -> Result<(), TypeParseError> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(TypeParseError::Arity {
            name,
            expected,
            actual: params.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// Entry point a submission must implement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub output: ValueType,
}

/// Inputs and the expected result are written in value notation (`{ 1, 2 }`, `{ a: 1 }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub function: String,
    pub inputs: Vec<String>,
    pub expected: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    10
}

/// On-disk form of a problem's functions and test cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub functions: Vec<FunctionSignature>,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub id: Uuid,
    pub language: Language,
    pub source_code: String,
    pub functions: Vec<FunctionSignature>,
    pub test_cases: Vec<TestCase>,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_timeout() -> u64 {
    5000
}

impl JobRequest {
    pub fn new(language: Language, source_code: impl Into<String>, suite: TestSuite) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            source_code: source_code.into(),
            functions: suite.functions,
            test_cases: suite.test_cases,
            timeout_ms: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    RuntimeError,
    TimeLimitExceeded,
    CompilationError,
    /// The case could not be judged, as opposed to judged wrong.
    NotEvaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: usize,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub job_id: Uuid,
    pub overall_status: JobStatus,
    pub score: u64,
    pub max_score: u64,
    pub results: Vec<TestResult>,
}
