pub mod emitter;
pub mod error;
pub mod evaluator;
pub mod harness;
pub mod parser;
pub mod primitives;
pub mod template;
pub mod validate;

pub use error::{CaseError, HarnessError, SubmissionRejected, TemplateError};
pub use harness::{generate, GeneratedHarness};
