/// Job Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Coordinate harness generation, execution engine and evaluator to produce
/// final results.
///
/// **Architecture:**
/// 1. Generate the harness (harness_core::harness)
/// 2. Use ProcessEngine to compile and run it once (engine.rs)
/// 3. Use the evaluator to score the printed records (harness_core::evaluator)
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (engine's job)
/// - How scoring works (evaluator's job)
/// - What the generated program looks like (emitter's job)

use crate::config::LanguageConfigManager;
use crate::engine::ProcessEngine;
use anyhow::Result;
use harness_common::types::{ExecutionResult, JobRequest};
use harness_core::evaluator;
use harness_core::harness::generate;
use harness_core::template::TemplateRegistry;
use harness_core::HarnessError;
use tracing::{info, warn};

/// Generate, compile, run and score a job on this machine.
///
/// A submission refused by the blacklist is not an error: every case is
/// reported as not evaluated. Template faults are errors.
pub async fn execute_local(
    job: &JobRequest,
    registry: &TemplateRegistry,
    config_manager: &LanguageConfigManager,
) -> Result<ExecutionResult> {
    info!(
        job_id = %job.id,
        language = %job.language,
        test_count = job.test_cases.len(),
        timeout_ms = job.timeout_ms,
        "Starting job execution"
    );

    let config = config_manager.get_config(job.language)?;

    let harness = match generate(registry, job, &config.blacklist) {
        Ok(harness) => harness,
        Err(HarnessError::Rejected(rejection)) => {
            warn!(job_id = %job.id, illegal = ?rejection.illegal, "Submission rejected");
            return Ok(evaluator::evaluate_rejected(job, &rejection));
        }
        Err(e) => return Err(e.into()),
    };

    let engine = ProcessEngine::new(config_manager);
    let run = engine.execute(&harness.source, job.timeout_ms).await?;

    // Cross-layer guard: log failed executions before evaluation
    if !run.compiled {
        warn!(job_id = %job.id, "Compilation failed; all tests marked as compilation errors");
    } else if run.timed_out {
        warn!(
            job_id = %job.id,
            execution_time_ms = run.execution_time_ms,
            "Execution timed out; tests without a record cannot pass"
        );
    } else if run.crashed() {
        warn!(
            job_id = %job.id,
            exit_code = ?run.exit_code,
            "Harness crashed; tests without a record cannot pass"
        );
    }

    Ok(evaluator::evaluate(job, &harness.statements, &run))
}
