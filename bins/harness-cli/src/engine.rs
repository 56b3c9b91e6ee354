/// Execution Engine - Local Compile and Run
///
/// **Core Responsibility:**
/// Compile an assembled harness and run it once, capturing raw outputs.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (work directory, compiler, interpreter)
/// - Engine does NOT know scoring rules
/// - Engine does NOT read the harness records
/// - Engine returns a `RunOutput` for the evaluator to judge
///
/// **Execution Rules:**
/// 1. Fresh `harness-*` directory under the system temp dir per run
/// 2. Compile command (if any) under the compile timeout
/// 3. Run command under the job timeout; the child is killed on expiry
/// 4. Output written before a timeout or crash is kept
/// 5. Each pipe is capped at `MAX_OUTPUT_BYTES`; the child is killed when a cap is hit
/// 6. Directory removed when the run ends
///
/// No sandboxing: the harness runs with the caller's privileges.

use crate::config::{LanguageConfig, LanguageConfigManager};
use anyhow::{bail, Context, Result};
use harness_core::evaluator::RunOutput;
use harness_core::template::AssembledSource;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Safety limit to keep pathological submissions away from the compiler
const MAX_SOURCE_BYTES: usize = 1024 * 1024; // 1MB

/// Per-pipe limit on captured output
const MAX_OUTPUT_BYTES: u64 = 8 * 1024 * 1024; // 8MB

/// How long to keep draining pipes after the child has exited or been killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Raw result of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Killed because a pipe reached `MAX_OUTPUT_BYTES`.
    pub output_limited: bool,
    pub elapsed_ms: u64,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && !self.output_limited && self.exit_code == Some(0)
    }
}

/// Reads a pipe up to `MAX_OUTPUT_BYTES`, signalling `full` when the cap is reached.
fn capture<R>(pipe: Option<R>, full: Arc<Notify>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(pipe) = pipe {
            let mut limited = pipe.take(MAX_OUTPUT_BYTES);
            if let Err(e) = limited.read_to_end(&mut buffer).await {
                debug!(error = %e, "Pipe closed early");
            }
            if buffer.len() as u64 >= MAX_OUTPUT_BYTES {
                full.notify_one();
            }
        }
        buffer
    })
}

/// Why the wait for a child ended.
enum Finish {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    OutputLimited,
}

async fn collect(task: JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            warn!(error = %e, "Output capture task failed");
            String::new()
        }
        Err(_) => {
            warn!("Output pipe still open after process exit");
            String::new()
        }
    }
}

/// `./main` style programs are resolved against the work directory.
fn resolve_program(program: &str, dir: &Path) -> PathBuf {
    match program.strip_prefix("./") {
        Some(relative) => dir.join(relative),
        None => PathBuf::from(program),
    }
}

/// Run `argv` in `dir` with a hard timeout, killing the child on expiry.
#[instrument(skip(dir), fields(timeout_ms = limit.as_millis() as u64))]
pub async fn run_command(argv: &[String], dir: &Path, limit: Duration) -> Result<ProcessOutput> {
    let Some((program, args)) = argv.split_first() else {
        bail!("Empty command");
    };

    let start_time = Instant::now();
    let mut child = Command::new(resolve_program(program, dir))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn `{}`", program))?;

    let full = Arc::new(Notify::new());
    let stdout_task = capture(child.stdout.take(), full.clone());
    let stderr_task = capture(child.stderr.take(), full.clone());

    let finish = tokio::select! {
        status = child.wait() => Finish::Exited(status),
        _ = tokio::time::sleep(limit) => Finish::TimedOut,
        _ = full.notified() => Finish::OutputLimited,
    };

    let (exit_code, timed_out, output_limited) = match finish {
        Finish::Exited(status) => {
            let status = status.with_context(|| format!("Failed waiting for `{}`", program))?;
            (status.code(), false, false)
        }
        Finish::TimedOut => {
            warn!(program = %program, "Process timed out - killing");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out process");
            }
            (None, true, false)
        }
        Finish::OutputLimited => {
            warn!(program = %program, limit_bytes = MAX_OUTPUT_BYTES, "Output limit exceeded - killing");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill process over the output limit");
            }
            (None, false, true)
        }
    };

    let stdout = collect(stdout_task).await;
    let mut stderr = collect(stderr_task).await;
    if output_limited {
        stderr.push_str(&format!("\n[Output limit of {} bytes exceeded]", MAX_OUTPUT_BYTES));
    }
    let elapsed_ms = start_time.elapsed().as_millis() as u64;

    debug!(?exit_code, timed_out, output_limited, elapsed_ms, "Process finished");

    Ok(ProcessOutput {
        exit_code,
        stdout,
        stderr,
        timed_out,
        output_limited,
        elapsed_ms,
    })
}

fn compiler_output(output: &ProcessOutput) -> String {
    let mut text = output.stdout.clone();
    if !text.is_empty() && !output.stderr.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&output.stderr);
    if output.timed_out {
        text.push_str("\n[Compilation timed out]");
    }
    text
}

/// Process-based execution engine using the toolchains found on PATH.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    config_manager: LanguageConfigManager,
}

impl ProcessEngine {
    pub fn new(config_manager: &LanguageConfigManager) -> Self {
        Self {
            config_manager: config_manager.clone(),
        }
    }

    /// Compile and run one assembled harness.
    #[instrument(skip(self, source), fields(language = %source.language, bytes = source.text.len()))]
    pub async fn execute(&self, source: &AssembledSource, timeout_ms: u64) -> Result<RunOutput> {
        if source.text.len() > MAX_SOURCE_BYTES {
            bail!("Assembled source exceeds maximum size of {} bytes", MAX_SOURCE_BYTES);
        }

        let config = self.config_manager.get_config(source.language)?;
        let work_dir = tempfile::Builder::new()
            .prefix("harness-")
            .tempdir()
            .context("Failed to create work directory")?;

        tokio::fs::write(work_dir.path().join(&config.file_name), &source.text)
            .await
            .context("Failed to write assembled source")?;

        let result = self.compile_and_run(config, work_dir.path(), timeout_ms).await;

        if let Err(e) = work_dir.close() {
            warn!(error = %e, "Failed to remove work directory");
        }
        result
    }

    async fn compile_and_run(
        &self,
        config: &LanguageConfig,
        dir: &Path,
        timeout_ms: u64,
    ) -> Result<RunOutput> {
        if let Some(compile) = &config.compile {
            let output = run_command(compile, dir, Duration::from_millis(config.compile_timeout_ms)).await?;
            if !output.success() {
                info!(
                    exit_code = ?output.exit_code,
                    timed_out = output.timed_out,
                    compilation_time_ms = output.elapsed_ms,
                    "Compilation failed"
                );
                return Ok(RunOutput {
                    compiled: false,
                    compiler_output: compiler_output(&output),
                    exit_code: output.exit_code,
                    ..RunOutput::default()
                });
            }
            info!(compilation_time_ms = output.elapsed_ms, "Compilation successful");
        }

        let output = run_command(&config.run, dir, Duration::from_millis(timeout_ms)).await?;
        if output.timed_out {
            warn!(timeout_ms, "Execution timed out");
        } else if output.output_limited {
            warn!(limit_bytes = MAX_OUTPUT_BYTES, "Harness output exceeded the limit");
        } else if output.exit_code != Some(0) {
            warn!(exit_code = ?output.exit_code, "Harness exited abnormally");
        }

        Ok(RunOutput {
            compiled: true,
            compiler_output: String::new(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
            execution_time_ms: output.elapsed_ms,
        })
    }
}
