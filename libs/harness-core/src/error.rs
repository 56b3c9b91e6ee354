use harness_common::error::{DescriptorError, ValueParseError};
use harness_common::types::Language;
use thiserror::Error;

/// Faults in templates or their configuration. Reported to the operator and
/// fatal for the affected language.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("{language} template has {found} occurrence(s) of marker {marker}, expected exactly one")]
    MalformedMarker {
        language: Language,
        marker: &'static str,
        found: usize,
    },

    #[error("{language} template breaks line mapping for submitted code: {reason}")]
    MalformedLineAnchor {
        language: Language,
        reason: &'static str,
    },

    #[error("no template registered for {0}")]
    UnknownLanguage(Language),

    #[error("failed to read {language} template '{path}': {message}")]
    Read {
        language: Language,
        path: String,
        message: String,
    },

    #[error("submitted code is empty")]
    EmptySubmission,
}

/// Reasons a single test case cannot be turned into a driver statement.
/// Reported inline as "not evaluated"; the other cases still run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    #[error("{language} cannot compare values of type {ty}: {reason}")]
    TypeDescriptorUnsupported {
        language: Language,
        ty: String,
        reason: String,
    },

    #[error("value '{value}' of type {ty} has no exact {language} literal: {reason}")]
    LiteralRendering {
        language: Language,
        ty: String,
        value: String,
        reason: String,
    },

    #[error("test case calls unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{function}' takes {expected} argument(s), test case supplies {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("malformed test value: {0}")]
    ValueParse(#[from] ValueParseError),
}

impl CaseError {
    pub fn unsupported(language: Language, ty: impl ToString, reason: impl Into<String>) -> Self {
        Self::TypeDescriptorUnsupported {
            language,
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    pub fn descriptor(language: Language, ty: impl ToString, source: DescriptorError) -> Self {
        Self::unsupported(language, ty, source.to_string())
    }
}

/// The submission contains a keyword its language forbids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation against blacklist failed (illegal: {})", .illegal.join(", "))]
pub struct SubmissionRejected {
    pub illegal: Vec<String>,
}

/// Anything that stops a harness from being generated at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Rejected(#[from] SubmissionRejected),
}
