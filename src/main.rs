use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use agentlint::engine::lint_directory;
use agentlint::reporter::{render, ReportFormat};
use agentlint::RuleConfig;

/// Default rc file looked up next to the working directory.
const DEFAULT_RC: &str = ".agentlintrc";

#[derive(Parser)]
#[command(
    name = "agentlint",
    version,
    about = "Lint an exported conversational-agent definition"
)]
struct Cli {
    /// Path to the unzipped agent export directory
    agent_dir: PathBuf,

    /// Path to the rc configuration file (defaults to ./.agentlintrc)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Include the offending response text in each finding
    #[arg(long)]
    verbose: bool,
}

/// Output format for lint results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// The full report as JSON
    Json,
}

impl From<Format> for ReportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => ReportFormat::Text,
            Format::Json => ReportFormat::Json,
        }
    }
}

fn load_config(cli: &Cli) -> agentlint::Result<RuleConfig> {
    if let Some(path) = &cli.config {
        return RuleConfig::load(path);
    }
    let default = PathBuf::from(DEFAULT_RC);
    if default.is_file() {
        return RuleConfig::load(&default);
    }
    Ok(RuleConfig::default())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("agentlint: {e}");
            return ExitCode::from(2);
        }
    };

    match lint_directory(&cli.agent_dir, &config, cli.verbose) {
        Ok(report) => {
            print!("{}", render(&report, cli.format.into()));
            if report.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("agentlint: {e}");
            ExitCode::from(2)
        }
    }
}
