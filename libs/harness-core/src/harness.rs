//! Submission to compilable harness: validate, emit, assemble.

use crate::emitter::{emit_all, emitter_for, DriverStatement};
use crate::error::HarnessError;
use crate::template::{AssembledSource, TemplateRegistry};
use crate::validate::validate_submission;
use harness_common::types::JobRequest;
use tracing::{info, instrument};

/// Assembled program plus the statements it was built from. The statements
/// are needed again when the run output is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHarness {
    pub source: AssembledSource,
    pub statements: Vec<DriverStatement>,
}

impl GeneratedHarness {
    pub fn skipped_count(&self) -> usize {
        self.statements.iter().filter(|s| s.skipped.is_some()).count()
    }
}

#[instrument(
    skip_all,
    fields(job_id = %job.id, language = %job.language, test_count = job.test_cases.len())
)]
pub fn generate<S: AsRef<str>>(
    registry: &TemplateRegistry,
    job: &JobRequest,
    blacklist: &[S],
) -> Result<GeneratedHarness, HarnessError> {
    validate_submission(&job.source_code, blacklist)?;

    let template = registry.get(job.language)?;
    let statements = emit_all(emitter_for(job.language), &job.functions, &job.test_cases);
    let source = template.assemble(&job.source_code, &statements)?;

    let harness = GeneratedHarness { source, statements };
    info!(
        skipped = harness.skipped_count(),
        bytes = harness.source.text.len(),
        "Generated harness"
    );
    Ok(harness)
}
