//! Configuration management for the CLI.
//!
//! `intake.toml` is read from `--config` or the user config directory. The
//! model host can be overridden from the environment (or a `.env` file) with
//! `OLLAMA_API_URL` and `OLLAMA_MODEL`.

use crate::error::{CliError, Result};
use intake_extractor::{ExtractorConfig, MobilityPolicy, DEFAULT_MANUAL_SENTINEL};
use intake_llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use intake_sheet::SheetLayout;
use intake_worker::WorkerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the model host URL
pub const ENV_ENDPOINT: &str = "OLLAMA_API_URL";

/// Environment variable overriding the model name
pub const ENV_MODEL: &str = "OLLAMA_MODEL";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model host
    pub llm: LlmSettings,

    /// Polling and retry policy
    pub worker: WorkerConfig,

    /// Template and export files
    pub sheet: SheetSettings,

    /// Job database
    pub store: StoreSettings,

    /// Detector policies
    pub inference: InferenceSettings,

    /// Terminal output
    pub output: Settings,
}

/// Model host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Ollama base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Template and export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSettings {
    /// CSV template with the header block
    pub template_path: PathBuf,

    /// CSV export, created from the template on first use
    pub output_path: PathBuf,

    /// 1-based rows joined into column headers
    pub header_rows: Vec<usize>,

    /// 1-based row of the first appended record
    pub first_data_row: usize,

    /// Cell value for facts a person must check by hand
    pub manual_sentinel: String,
}

/// Job database settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite file
    pub database_path: PathBuf,
}

/// Detector policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    /// How the mobility column is filled
    pub mobility: MobilityPolicy,
}

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmSettings {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SheetSettings {
    fn default() -> Self {
        let layout = SheetLayout::default();
        Self {
            template_path: PathBuf::from("template.csv"),
            output_path: PathBuf::from("export").join("applicants.csv"),
            header_rows: layout.header_rows,
            first_data_row: layout.first_data_row,
            manual_sentinel: DEFAULT_MANUAL_SENTINEL.to_string(),
        }
    }
}

impl SheetSettings {
    /// Header block and data row positions
    pub fn layout(&self) -> SheetLayout {
        SheetLayout {
            header_rows: self.header_rows.clone(),
            first_data_row: self.first_data_row,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("intake.db"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Could not find config directory".into()))?;
        Ok(dir.join("intake").join("intake.toml"))
    }

    /// Load configuration, then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse one TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "Config file {} does not exist",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Override the model host from environment lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        if self.llm.endpoint.trim().is_empty() {
            return Err(CliError::Config("llm.endpoint must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config("llm.timeout_secs must be at least 1".into()));
        }
        self.worker
            .validate()
            .map_err(|e| CliError::Config(format!("[worker] {}", e)))?;
        self.sheet
            .layout()
            .validate()
            .map_err(|e| CliError::Config(format!("[sheet] {}", e)))?;
        self.extractor()
            .validate()
            .map_err(|e| CliError::Config(format!("[sheet] {}", e)))?;
        Ok(())
    }

    /// Extractor settings gathered from `[sheet]` and `[inference]`.
    pub fn extractor(&self) -> ExtractorConfig {
        ExtractorConfig {
            manual_sentinel: self.sheet.manual_sentinel.clone(),
            mobility: self.inference.mobility,
        }
    }

    /// Write configuration to file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}
