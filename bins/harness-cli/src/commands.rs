// CLI commands for generating and running harnesses
use crate::config::LanguageConfigManager;
use crate::executor;
use anyhow::{bail, Context, Result};
use harness_common::types::{ExecutionResult, JobRequest, Language, TestStatus, TestSuite};
use harness_core::emitter::{emitter_for, skeletons};
use harness_core::harness::generate;
use harness_core::template::{HarnessTemplate, TemplateRegistry};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Load a test suite from its JSON file
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read test suite {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse test suite {}", path.display()))
}

fn read_code(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read submission {}", path.display()))
}

fn registry(config_manager: &LanguageConfigManager) -> Result<TemplateRegistry> {
    TemplateRegistry::with_overrides(config_manager.template_overrides())
        .context("Failed to load harness templates")
}

/// Print the configured languages
pub fn list_languages(config_manager: &LanguageConfigManager) -> Result<()> {
    println!("{:<12} {:<14} {:<40} {}", "LANGUAGE", "FILE", "COMPILE", "RUN");
    for language in config_manager.list_languages() {
        let config = config_manager.get_config(language)?;
        let compile = config
            .compile
            .as_ref()
            .map(|argv| argv.join(" "))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<14} {:<40} {}",
            language,
            config.file_name,
            compile,
            config.run.join(" ")
        );
    }
    Ok(())
}

/// Load every template, built-in or overridden, and report each one.
pub fn check_templates(config_manager: &LanguageConfigManager) -> Result<()> {
    let overrides = config_manager.template_overrides();
    let mut failures = 0;

    for language in Language::ALL {
        let source = overrides.iter().find(|(l, _)| *l == language).map(|(_, p)| p);
        let loaded = match source {
            Some(path) => HarnessTemplate::load(language, path),
            None => HarnessTemplate::builtin(language),
        };
        let origin = source
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string());

        match loaded {
            Ok(_) => println!("✓ {:<12} {}", language, origin),
            Err(e) => {
                failures += 1;
                println!("✗ {:<12} {}: {}", language, origin, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} template(s) malformed", failures);
    }
    Ok(())
}

/// Print empty function stubs for a suite
pub fn skeleton(language: Language, suite_path: &Path) -> Result<()> {
    let suite = load_suite(suite_path)?;
    let text = skeletons(emitter_for(language), &suite.functions)?;
    print!("{}", text);
    Ok(())
}

/// Assemble a harness and write it to `out` or stdout
pub fn assemble(
    config_manager: &LanguageConfigManager,
    language: Language,
    code_path: &Path,
    suite_path: &Path,
    out: Option<&Path>,
) -> Result<()> {
    let config = config_manager.get_config(language)?;
    let job = JobRequest::new(language, read_code(code_path)?, load_suite(suite_path)?);
    let harness = generate(&registry(config_manager)?, &job, &config.blacklist)?;

    for statement in &harness.statements {
        if let Some(error) = &statement.skipped {
            warn!(test_id = statement.index, error = %error, "Test case will not be evaluated");
        }
    }

    match out {
        Some(path) => fs::write(path, &harness.source.text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", harness.source.text),
    }
    Ok(())
}

/// Assemble, compile, run and score a submission
pub async fn run(
    config_manager: &LanguageConfigManager,
    language: Language,
    code_path: &Path,
    suite_path: &Path,
    timeout_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut job = JobRequest::new(language, read_code(code_path)?, load_suite(suite_path)?);
    if let Some(timeout_ms) = timeout_ms {
        job.timeout_ms = timeout_ms;
    }

    let result = executor::execute_local(&job, &registry(config_manager)?, config_manager).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_summary(&result));
    }
    Ok(())
}

fn status_label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "✓ passed",
        TestStatus::Failed => "✗ failed",
        TestStatus::RuntimeError => "✗ runtime error",
        TestStatus::TimeLimitExceeded => "✗ time limit exceeded",
        TestStatus::CompilationError => "✗ compilation error",
        TestStatus::NotEvaluated => "- not evaluated",
    }
}

/// Human-readable verdicts, one block per test case
pub fn format_summary(result: &ExecutionResult) -> String {
    let mut text = String::new();
    for test_result in &result.results {
        let _ = writeln!(text, "Test {}: {}", test_result.test_id, status_label(test_result.status));
        if let Some(actual) = &test_result.actual {
            let _ = writeln!(text, "    actual:   {}", actual);
        }
        if let Some(expected) = &test_result.expected {
            let _ = writeln!(text, "    expected: {}", expected);
        }
        if let Some(message) = &test_result.message {
            for line in message.lines() {
                let _ = writeln!(text, "    {}", line);
            }
        }
    }
    let _ = writeln!(
        text,
        "Score: {}/{} ({:?})",
        result.score, result.max_score, result.overall_status
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_common::types::{JobStatus, TestResult};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use uuid::Uuid;

    fn make_result(test_id: usize, status: TestStatus) -> TestResult {
        TestResult {
            test_id,
            status,
            actual: None,
            expected: None,
            message: None,
            execution_time_ms: 0,
        }
    }

    #[test]
    fn test_format_summary() {
        let result = ExecutionResult {
            job_id: Uuid::new_v4(),
            overall_status: JobStatus::Completed,
            score: 10,
            max_score: 30,
            results: vec![
                make_result(0, TestStatus::Passed),
                TestResult {
                    actual: Some("4.300000000000001".to_string()),
                    expected: Some("4.300000001".to_string()),
                    ..make_result(1, TestStatus::Failed)
                },
                TestResult {
                    message: Some("ZeroDivisionError: division by zero".to_string()),
                    ..make_result(2, TestStatus::RuntimeError)
                },
            ],
        };

        assert_eq!(
            format_summary(&result),
            "Test 0: ✓ passed\n\
             Test 1: ✗ failed\n\
             \x20   actual:   4.300000000000001\n\
             \x20   expected: 4.300000001\n\
             Test 2: ✗ runtime error\n\
             \x20   ZeroDivisionError: division by zero\n\
             Score: 10/30 (Completed)\n"
        );
    }

    #[test]
    fn test_load_suite() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"functions": [{{"name": "f", "inputs": [], "output": "set<int32>"}}],
                "test_cases": [{{"function": "f", "inputs": [], "expected": "{{ 1, 2 }}", "weight": 5}}]}}"#
        )
        .unwrap();

        let suite = load_suite(file.path()).unwrap();

        assert_eq!(suite.functions[0].name, "f");
        assert_eq!(suite.test_cases[0].expected, "{ 1, 2 }");
        assert_eq!(suite.test_cases[0].weight, 5);
    }

    #[test]
    fn test_load_suite_reports_path() {
        let err = load_suite(Path::new("/nonexistent/suite.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/suite.json"));
    }
}
