//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use intake_domain::JobStatus;
use std::path::PathBuf;

/// Intake CLI - Extract applicant data from CV and application pairs.
#[derive(Debug, Parser)]
#[command(name = "intake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "INTAKE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Queue one CV and application pair
    Submit(SubmitArgs),

    /// Queue several pairs given as CV, application, CV, application, ...
    Bulk(BulkArgs),

    /// Show one job with its record and diagnostic
    Status(StatusArgs),

    /// List jobs, newest first
    List(ListArgs),

    /// Run the background extraction worker
    Worker(WorkerArgs),

    /// Replay a saved model reply through the parser and standardizer
    Parse(ParseArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the submit command.
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// CV document (pdf, docx or txt)
    #[arg(long)]
    pub cv: PathBuf,

    /// Application document (pdf, docx or txt)
    #[arg(long, conflicts_with = "application_text", required_unless_present = "application_text")]
    pub application: Option<PathBuf>,

    /// Application answers given inline instead of as a file
    #[arg(long)]
    pub application_text: Option<String>,
}

/// Arguments for the bulk command.
#[derive(Debug, Args)]
pub struct BulkArgs {
    /// Files in pairs: CV then application
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Job ID
    pub id: String,

    /// Also print the raw model reply
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only jobs with this status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the worker command.
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Process the current queue once and exit
    #[arg(long)]
    pub once: bool,

    /// Override the configured pool size
    #[arg(long)]
    pub pool_size: Option<usize>,
}

/// Arguments for the parse command.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// File holding a saved model reply
    #[arg(required_unless_present = "stdin")]
    pub file: Option<PathBuf>,

    /// Read the reply from stdin
    #[arg(long, conflicts_with = "file")]
    pub stdin: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Job status filter.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusArg {
    /// Waiting for the worker
    Pending,
    /// Claimed by the worker
    Processing,
    /// Finished with an export row
    Done,
    /// Finished with an error
    Failed,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<StatusArg> for JobStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => JobStatus::Pending,
            StatusArg::Processing => JobStatus::Processing,
            StatusArg::Done => JobStatus::Done,
            StatusArg::Failed => JobStatus::Failed,
        }
    }
}
