/// Test Evaluator - Language-Agnostic Scoring Logic
///
/// **Core Responsibility:**
/// Turn the records a harness printed into per-test verdicts and a score.
///
/// **Critical Properties:**
/// - Knows nothing about compilers or processes
/// - Knows nothing about target-language syntax
/// - Pure function: (job, driver statements, run output) → scores
///
/// **Status Rules:**
/// - Compilation failed: every case is `CompilationError`
/// - A record was printed: its verdict decides (`OK`, `ER`, `EX`, `NA`)
/// - No record, case was never emitted: `NotEvaluated`
/// - No record, run timed out: `TimeLimitExceeded`
/// - No record, run crashed: `RuntimeError`
///
/// **Scoring Rules:**
/// - score = sum of weights for Passed tests
/// - max_score = sum of all test case weights
/// - overall_status: Completed if any points were earned, Failed otherwise

use crate::emitter::DriverStatement;
use crate::error::SubmissionRejected;
use crate::parser::{collect_outcomes, CaseOutcome};
use harness_common::types::{ExecutionResult, JobRequest, JobStatus, TestResult, TestStatus};
use tracing::{debug, info};

/// What the external compile-and-run step reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub compiled: bool,
    pub compiler_output: String,
    /// `None` when the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Wall time of the whole harness run.
    pub execution_time_ms: u64,
}

impl RunOutput {
    pub fn crashed(&self) -> bool {
        self.exit_code != Some(0)
    }
}

fn result(test_id: usize, status: TestStatus, execution_time_ms: u64) -> TestResult {
    TestResult {
        test_id,
        status,
        actual: None,
        expected: None,
        message: None,
        execution_time_ms,
    }
}

/// Last few lines of stderr, enough to identify a crash.
fn stderr_tail(stderr: &str) -> Option<String> {
    const LINES: usize = 5;
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    if lines.is_empty() {
        return None;
    }
    Some(lines[lines.len().saturating_sub(LINES)..].join("\n"))
}

/// Evaluate a single test case from its reported outcome.
pub fn evaluate_test(
    test_id: usize,
    outcome: CaseOutcome,
    statement: Option<&DriverStatement>,
    run: &RunOutput,
) -> TestResult {
    let time = run.execution_time_ms;

    if !run.compiled {
        return TestResult {
            message: Some(run.compiler_output.clone()),
            ..result(test_id, TestStatus::CompilationError, time)
        };
    }

    match outcome {
        CaseOutcome::Passed => result(test_id, TestStatus::Passed, time),
        CaseOutcome::Failed { actual, expected } => TestResult {
            actual: Some(actual),
            expected: Some(expected),
            ..result(test_id, TestStatus::Failed, time)
        },
        CaseOutcome::Raised { message } => TestResult {
            message: Some(message),
            ..result(test_id, TestStatus::RuntimeError, time)
        },
        CaseOutcome::NotEvaluated { reason } => TestResult {
            message: Some(reason),
            ..result(test_id, TestStatus::NotEvaluated, time)
        },
        CaseOutcome::Missing => {
            if let Some(error) = statement.and_then(|s| s.skipped.as_ref()) {
                TestResult {
                    message: Some(error.to_string()),
                    ..result(test_id, TestStatus::NotEvaluated, time)
                }
            } else if run.timed_out {
                result(test_id, TestStatus::TimeLimitExceeded, time)
            } else if run.crashed() {
                TestResult {
                    message: stderr_tail(&run.stderr),
                    ..result(test_id, TestStatus::RuntimeError, time)
                }
            } else {
                TestResult {
                    message: Some("harness printed no result for this test case".to_string()),
                    ..result(test_id, TestStatus::NotEvaluated, time)
                }
            }
        }
    }
}

/// Aggregate per-test results into the final execution result.
///
/// `results` is indexed like `job.test_cases`.
pub fn aggregate_results(job: &JobRequest, results: Vec<TestResult>) -> ExecutionResult {
    // Weights come from suite files; a u64 sum of u32 weights cannot overflow.
    let max_score: u64 = job.test_cases.iter().map(|tc| u64::from(tc.weight)).sum();
    let mut total_score = 0u64;

    for (test_case, test_result) in job.test_cases.iter().zip(&results) {
        if test_result.status == TestStatus::Passed {
            total_score += u64::from(test_case.weight);
        }
        debug!(
            job_id = %job.id,
            test_id = test_result.test_id,
            weight = test_case.weight,
            status = ?test_result.status,
            "Evaluated test case"
        );
    }

    let overall_status = if total_score > 0 {
        JobStatus::Completed
    } else {
        JobStatus::Failed
    };

    info!(
        job_id = %job.id,
        score = total_score,
        max_score,
        status = ?overall_status,
        "Evaluation complete"
    );

    ExecutionResult {
        job_id: job.id,
        overall_status,
        score: total_score,
        max_score,
        results,
    }
}

/// Evaluate all test cases of a run and produce the final execution result.
pub fn evaluate(job: &JobRequest, statements: &[DriverStatement], run: &RunOutput) -> ExecutionResult {
    let outcomes = collect_outcomes(&run.stdout, job.test_cases.len());
    let results = outcomes
        .into_iter()
        .enumerate()
        .map(|(test_id, outcome)| evaluate_test(test_id, outcome, statements.get(test_id), run))
        .collect();
    aggregate_results(job, results)
}

/// Every case of a submission refused before assembly is `NotEvaluated`.
pub fn evaluate_rejected(job: &JobRequest, rejection: &SubmissionRejected) -> ExecutionResult {
    let message = rejection.to_string();
    let results = (0..job.test_cases.len())
        .map(|test_id| TestResult {
            message: Some(message.clone()),
            ..result(test_id, TestStatus::NotEvaluated, 0)
        })
        .collect();
    aggregate_results(job, results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaseError;
    use harness_common::types::{Language, TestCase, TestSuite};

    /// Helper to create a test case
    fn make_test_case(weight: u32) -> TestCase {
        TestCase {
            function: "f".to_string(),
            inputs: vec![],
            expected: "0".to_string(),
            weight,
        }
    }

    fn make_job(weights: &[u32]) -> JobRequest {
        let suite = TestSuite {
            functions: vec![],
            test_cases: weights.iter().map(|w| make_test_case(*w)).collect(),
        };
        JobRequest::new(Language::Python, "def f(): return 0", suite)
    }

    /// Helper to create a run that exited normally
    fn make_run(stdout: &str) -> RunOutput {
        RunOutput {
            compiled: true,
            exit_code: Some(0),
            stdout: stdout.to_string(),
            execution_time_ms: 42,
            ..RunOutput::default()
        }
    }

    fn statements(count: usize) -> Vec<DriverStatement> {
        (0..count)
            .map(|index| DriverStatement {
                index,
                code: String::new(),
                skipped: None,
            })
            .collect()
    }

    #[test]
    fn test_all_pass() {
        let job = make_job(&[10, 15]);
        let run = make_run("@@ 0 OK\n@@ 1 OK\n");

        let result = evaluate(&job, &statements(2), &run);

        assert_eq!(result.overall_status, JobStatus::Completed);
        assert_eq!(result.score, 25);
        assert_eq!(result.max_score, 25);
        assert_eq!(result.job_id, job.id);
        assert!(result.results.iter().all(|r| r.status == TestStatus::Passed));
        assert_eq!(result.results[0].execution_time_ms, 42);
    }

    #[test]
    fn test_partial_pass_keeps_diagnostics() {
        let job = make_job(&[20, 30]);
        let run = make_run("@@ 0 OK\n@@ 1 ER\t{ 1, 2 }\t{ 2, 1 }\n");

        let result = evaluate(&job, &statements(2), &run);

        assert_eq!(result.overall_status, JobStatus::Completed);
        assert_eq!(result.score, 20);
        assert_eq!(result.max_score, 50);
        assert_eq!(result.results[1].status, TestStatus::Failed);
        assert_eq!(result.results[1].actual.as_deref(), Some("{ 1, 2 }"));
        assert_eq!(result.results[1].expected.as_deref(), Some("{ 2, 1 }"));
    }

    #[test]
    fn test_all_fail() {
        let job = make_job(&[10, 10]);
        let run = make_run("@@ 0 ER\ta\tb\n@@ 1 ER\tc\td\n");

        let result = evaluate(&job, &statements(2), &run);

        assert_eq!(result.overall_status, JobStatus::Failed);
        assert_eq!(result.score, 0);
        assert_eq!(result.max_score, 20);
    }

    #[test]
    fn test_compilation_error() {
        let job = make_job(&[10, 10]);
        let run = RunOutput {
            compiled: false,
            compiler_output: "main.cpp:3:1: error: expected ';'".to_string(),
            ..RunOutput::default()
        };

        let result = evaluate(&job, &statements(2), &run);

        assert_eq!(result.overall_status, JobStatus::Failed);
        for test_result in &result.results {
            assert_eq!(test_result.status, TestStatus::CompilationError);
            assert_eq!(test_result.message.as_deref(), Some("main.cpp:3:1: error: expected ';'"));
        }
    }

    #[test]
    fn test_crash_keeps_earlier_records() {
        let job = make_job(&[10, 10, 10]);
        let run = RunOutput {
            exit_code: None,
            stderr: "Segmentation fault".to_string(),
            ..make_run("@@ 0 OK\n")
        };

        let result = evaluate(&job, &statements(3), &run);

        assert_eq!(result.results[0].status, TestStatus::Passed);
        assert_eq!(result.results[1].status, TestStatus::RuntimeError);
        assert_eq!(result.results[1].message.as_deref(), Some("Segmentation fault"));
        assert_eq!(result.results[2].status, TestStatus::RuntimeError);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_timeout() {
        let job = make_job(&[5, 5]);
        let run = RunOutput {
            timed_out: true,
            exit_code: None,
            ..make_run("@@ 0 OK\n")
        };

        let result = evaluate(&job, &statements(2), &run);

        assert_eq!(result.results[0].status, TestStatus::Passed);
        assert_eq!(result.results[1].status, TestStatus::TimeLimitExceeded);
    }

    #[test]
    fn test_raised_exception_is_runtime_error() {
        let job = make_job(&[10]);
        let run = make_run("@@ 0 EX\tArithmeticException: / by zero\n");

        let result = evaluate(&job, &statements(1), &run);

        assert_eq!(result.results[0].status, TestStatus::RuntimeError);
        assert_eq!(
            result.results[0].message.as_deref(),
            Some("ArithmeticException: / by zero")
        );
    }

    #[test]
    fn test_skipped_statement_is_not_evaluated() {
        let job = make_job(&[10, 10]);
        let mut statements = statements(2);
        statements[1].skipped = Some(CaseError::UnknownFunction("g".to_string()));

        // The crash happened before the skip record for case 1 was printed.
        let run = RunOutput {
            exit_code: Some(139),
            ..make_run("@@ 0 OK\n")
        };

        let result = evaluate(&job, &statements, &run);

        assert_eq!(result.results[1].status, TestStatus::NotEvaluated);
        assert_eq!(
            result.results[1].message.as_deref(),
            Some("test case calls unknown function 'g'")
        );
    }

    #[test]
    fn test_na_record_is_not_evaluated() {
        let job = make_job(&[10]);
        let run = make_run("@@ 0 NA\tjavascript cannot compare values of type decimal\n");

        let result = evaluate(&job, &statements(1), &run);

        assert_eq!(result.results[0].status, TestStatus::NotEvaluated);
        assert_eq!(result.overall_status, JobStatus::Failed);
    }

    #[test]
    fn test_missing_record_after_clean_exit() {
        let job = make_job(&[10]);

        let result = evaluate(&job, &statements(1), &make_run(""));

        assert_eq!(result.results[0].status, TestStatus::NotEvaluated);
    }

    #[test]
    fn test_zero_weight_tests() {
        let job = make_job(&[0]);

        let result = evaluate(&job, &statements(1), &make_run("@@ 0 OK\n"));

        assert_eq!(result.results[0].status, TestStatus::Passed);
        assert_eq!(result.score, 0);
        assert_eq!(result.max_score, 0);
        assert_eq!(result.overall_status, JobStatus::Failed);
    }

    #[test]
    fn test_large_weights_do_not_overflow() {
        let job = make_job(&[u32::MAX, u32::MAX, 1]);

        let result = evaluate(&job, &statements(3), &make_run("@@ 0 OK\n@@ 1 OK\n@@ 2 OK\n"));

        assert_eq!(result.score, 2 * u64::from(u32::MAX) + 1);
        assert_eq!(result.max_score, result.score);
        assert_eq!(result.overall_status, JobStatus::Completed);
    }

    #[test]
    fn test_rejected_submission() {
        let job = make_job(&[10, 10]);
        let rejection = SubmissionRejected {
            illegal: vec!["System.exit".to_string()],
        };

        let result = evaluate_rejected(&job, &rejection);

        assert_eq!(result.overall_status, JobStatus::Failed);
        assert_eq!(result.results.len(), 2);
        for test_result in &result.results {
            assert_eq!(test_result.status, TestStatus::NotEvaluated);
            assert_eq!(
                test_result.message.as_deref(),
                Some("validation against blacklist failed (illegal: System.exit)")
            );
        }
    }
}
