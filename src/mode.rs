use serde::Deserialize;

use crate::error::SqlrefsError;

/// How extraction results are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing, one block per statement.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Result<Self, SqlrefsError> {
        match name.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(SqlrefsError::Config(format!("Unknown format: {}", name))),
        }
    }
}

/// Mode holds all run configuration for sqlrefs.
#[derive(Debug, Clone, Deserialize)]
pub struct Mode {
    #[serde(default)]
    pub format: OutputFormat,

    /// Exit with status 1 if any statement stopped early.
    #[serde(default)]
    pub strict: bool,

    /// Glob patterns to exclude when walking directories.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub verbose: bool,

    /// Do not echo each statement before its results.
    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub no_color: bool,

    #[serde(default)]
    pub force_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[serde(default)]
    pub threads: usize,

    #[serde(default)]
    pub single_process: bool,
}

impl Mode {
    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.force_color {
            return true;
        }
        if self.no_color {
            return false;
        }
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        true
    }

    /// SQL file extensions to pick up when walking directories.
    pub fn sql_extensions(&self) -> &[&str] {
        &["sql", "ddl", "dml"]
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            strict: false,
            exclude: Vec::new(),
            verbose: false,
            quiet: false,
            no_color: false,
            force_color: false,
            threads: 0,
            single_process: false,
        }
    }
}
