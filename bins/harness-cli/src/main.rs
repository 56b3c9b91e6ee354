mod commands;
mod config;
mod engine;
mod executor;


use anyhow::Result;
use clap::{Parser, Subcommand};
use config::LanguageConfigManager;
use harness_common::types::Language;
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "harness-cli")]
#[command(about = "Generate, run and judge multi-language test harnesses", long_about = None)]
struct Cli {
    /// Path to languages.json (defaults to $HARNESS_CONFIG or config/languages.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured languages and their toolchains
    ListLangs,

    /// Validate every harness template
    CheckTemplates,

    /// Print empty function stubs for a test suite
    Skeleton {
        /// Target language (cpp, csharp, java, javascript, python, rust)
        #[arg(short, long)]
        lang: Language,

        /// Test suite JSON file
        #[arg(short, long)]
        suite: PathBuf,
    },

    /// Assemble the harness for a submission without running it
    Assemble {
        #[arg(short, long)]
        lang: Language,

        /// Submitted source fragment
        #[arg(short, long)]
        code: PathBuf,

        #[arg(short, long)]
        suite: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Assemble, compile, run and score a submission
    Run {
        #[arg(short, long)]
        lang: Language,

        #[arg(short, long)]
        code: PathBuf,

        #[arg(short, long)]
        suite: PathBuf,

        /// Run timeout for the whole harness in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Print the execution result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<LanguageConfigManager> {
    let manager = match path {
        Some(path) => LanguageConfigManager::load(path),
        None => LanguageConfigManager::load_default(),
    }
    .map_err(|e| {
        error!("Failed to load language configurations: {:#}", e);
        error!("Make sure config/languages.json exists or set {}", config::CONFIG_ENV);
        e
    })?;
    debug!(languages = ?manager.list_languages(), "Loaded language configurations");
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::ListLangs => {
            commands::list_languages(&load_config(cli.config.as_ref())?)?;
        }
        Commands::CheckTemplates => {
            commands::check_templates(&load_config(cli.config.as_ref())?)?;
        }
        Commands::Skeleton { lang, suite } => {
            commands::skeleton(lang, &suite)?;
        }
        Commands::Assemble { lang, code, suite, out } => {
            let manager = load_config(cli.config.as_ref())?;
            commands::assemble(&manager, lang, &code, &suite, out.as_deref())?;
        }
        Commands::Run {
            lang,
            code,
            suite,
            timeout_ms,
            json,
        } => {
            let manager = load_config(cli.config.as_ref())?;
            commands::run(&manager, lang, &code, &suite, timeout_ms, json).await?;
        }
    }

    Ok(())
}
