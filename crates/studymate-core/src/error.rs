//! Error types for studymate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StudyMateError>;

/// Process exit codes used by the CLI
pub mod exit_codes {
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

#[derive(Debug, Error)]
pub enum StudyMateError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A question was asked before any document was indexed under this id
    #[error("No document indexed for '{0}'. Upload a document first.")]
    NotIndexed(String),

    #[error("Corpus not found: {0}")]
    CorpusNotFound(String),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    /// An external search or generation call failed; the turn is aborted
    #[error("{service} service error: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StudyMateError {
    /// Missing corpora map to 2, bad uploads or settings to 3, the rest to 1
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotIndexed(_) | Self::CorpusNotFound(_) => exit_codes::NOT_FOUND,
            Self::UploadRejected(_) | Self::Config(_) | Self::InvalidInput(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether this error came from an external service call
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Self::Service { .. } | Self::Http(_) | Self::Llm(_) | Self::ExternalError(_)
        )
    }

    /// Wrap a failure of an external call as a `Service` error.
    ///
    /// `NotIndexed` and `Config` pass through untouched: the user has to
    /// upload or re-index, and retrying the call would not help.
    pub fn into_service(self, service: &'static str) -> Self {
        match self {
            e @ (Self::NotIndexed(_) | Self::Config(_)) => e,
            e @ Self::Service { .. } => e,
            other => Self::Service {
                service,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            StudyMateError::NotIndexed("x".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            StudyMateError::UploadRejected("too big".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            StudyMateError::Llm("boom".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_into_service_keeps_user_actionable_errors() {
        let err = StudyMateError::NotIndexed("notes_index".into()).into_service("search");
        assert!(matches!(err, StudyMateError::NotIndexed(_)));

        let err = StudyMateError::Config("re-index notes_index".into()).into_service("search");
        assert!(matches!(err, StudyMateError::Config(_)));
        assert!(!err.is_service_error());
        assert_eq!(err.exit_code(), exit_codes::INVALID_INPUT);

        let err = StudyMateError::Llm("timeout".into()).into_service("generation");
        match err {
            StudyMateError::Service { service, message } => {
                assert_eq!(service, "generation");
                assert!(message.contains("timeout"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
