use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomergeError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Repository unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Filesystem operation failed on {path}: {source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    Git(String),

    #[error("Nothing to commit: {0} already matches the bundled workflow")]
    NothingToCommit(String),

    #[error("Authentication rejected: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl AutomergeError {
    pub fn filesystem(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AutomergeError::Filesystem {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Short label of the failure class, as shown to the operator.
    pub fn kind(&self) -> &'static str {
        match self {
            AutomergeError::Configuration(_) => "configuration",
            AutomergeError::SourceUnavailable(_) => "source",
            AutomergeError::Filesystem { .. } => "filesystem",
            AutomergeError::Git(_) | AutomergeError::NothingToCommit(_) => "git",
            AutomergeError::Authentication(_) => "authentication",
            AutomergeError::Network(_) => "network",
            AutomergeError::Api { .. } => "api",
        }
    }
}

pub type Result<T> = std::result::Result<T, AutomergeError>;
