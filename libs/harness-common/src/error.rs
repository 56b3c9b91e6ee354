use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    #[error("empty type in '{text}' at {offset}")]
    MissingName { text: String, offset: usize },

    #[error("unknown type '{name}' in '{text}'")]
    UnknownType { text: String, name: String },

    #[error("expected '{expected}' in '{text}' at {offset}")]
    Expected {
        text: String,
        expected: &'static str,
        offset: usize,
    },

    #[error("type '{name}' takes {expected} generic parameter(s), found {actual}")]
    Arity {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unexpected input after type '{text}' at {offset}")]
    TrailingInput { text: String, offset: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueParseError {
    #[error("missing opening curly bracket in '{text}' at {offset}")]
    MissingOpen { text: String, offset: usize },

    #[error("missing element separator in '{text}' at {offset}")]
    MissingSeparator { text: String, offset: usize },

    #[error("missing key/value separator in '{text}' at {offset}")]
    MissingKeySeparator { text: String, offset: usize },

    #[error("unterminated value '{text}'")]
    Unterminated { text: String },

    #[error("expected end of value '{text}' at {offset}")]
    TrailingInput { text: String, offset: usize },
}

/// A type that parses but has no comparison strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("map key type '{key}' is not compared exactly")]
    InexactMapKey { key: String },

    #[error("set element type '{element}' is not a scalar")]
    NestedSetElement { element: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown language '{0}'")]
pub struct UnknownLanguage(pub String);
