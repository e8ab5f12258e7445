//! Domain error types.

/// Top-level error type for bondblotter.
#[derive(Debug, thiserror::Error)]
pub enum BlotterError {
    #[error("reference file not found: {path}")]
    ReferenceNotFound { path: String },

    #[error("failed to decode {path} (tried {})", .tried.join(", "))]
    ReferenceUndecodable { path: String, tried: Vec<String> },

    #[error("failed to read reference file {path}: {reason}")]
    ReferenceRead { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no issue selected")]
    NoIssueSelected,

    #[error("unknown issue: {ticker}")]
    UnknownIssue { ticker: String },

    #[error("no trade with id {id}")]
    UnknownTrade { id: u64 },

    #[error("invalid command `{line}`: {reason}")]
    InvalidCommand { line: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BlotterError> for std::process::ExitCode {
    fn from(err: &BlotterError) -> Self {
        let code: u8 = match err {
            BlotterError::Io(_) => 1,
            BlotterError::ConfigParse { .. } | BlotterError::ConfigInvalid { .. } => 2,
            BlotterError::ReferenceNotFound { .. }
            | BlotterError::ReferenceUndecodable { .. }
            | BlotterError::ReferenceRead { .. } => 3,
            BlotterError::NoIssueSelected
            | BlotterError::UnknownIssue { .. }
            | BlotterError::UnknownTrade { .. }
            | BlotterError::InvalidCommand { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
