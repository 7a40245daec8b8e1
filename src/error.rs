use thiserror::Error;

/// User-facing errors from the ambient layers (config, input, output).
#[derive(Error, Debug)]
pub enum SqlrefsError {
    #[error("sqlrefs config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a statement scan stopped early.
///
/// These never escape as hard failures: the extractor keeps whatever it
/// collected before the abort and reports the reason next to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("expected a valid alias name after AS near byte {position}")]
    MalformedAlias { position: usize },

    #[error("expected a valid column name after '.' near byte {position}")]
    MalformedComposite { position: usize },

    #[error("expected '{expected}' in MAX(...) near byte {position}")]
    MalformedFunctionWrapper { position: usize, expected: char },
}

impl ExtractError {
    /// Byte offset into the statement where the scan stopped.
    pub fn position(&self) -> usize {
        match self {
            Self::MalformedAlias { position }
            | Self::MalformedComposite { position }
            | Self::MalformedFunctionWrapper { position, .. } => *position,
        }
    }

    /// Short stable name for the abort reason, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedAlias { .. } => "malformed_alias",
            Self::MalformedComposite { .. } => "malformed_composite",
            Self::MalformedFunctionWrapper { .. } => "malformed_function_wrapper",
        }
    }
}

pub type Result<T> = std::result::Result<T, SqlrefsError>;
