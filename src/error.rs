use std::fmt;
use std::path::PathBuf;

/// Error types for placeholder resolution
#[derive(Debug)]
pub enum ReplaceError {
    /// A required environment variable is absent or empty
    ConfigurationMissing(String),

    /// The local key-value file cannot be used
    SourceUnreadable { path: PathBuf, reason: String },

    /// Secret path, nested data or field key absent in the store
    NotFound(String),

    /// Network, authentication or response failure talking to the secret store
    Transport(String),

    /// The YAML descriptor could not be read or parsed
    DescriptorInvalid(String),

    /// Input text that cannot be scanned for placeholders
    InvalidInput(String),

    /// General I/O error
    Io(std::io::Error),
}

impl ReplaceError {
    /// Whether this error is the recoverable "not found" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReplaceError::NotFound(_))
    }

    /// Whether this error must abort the whole run
    #[allow(dead_code)]
    pub fn is_fatal(&self) -> bool {
        !self.is_not_found()
    }
}

impl fmt::Display for ReplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplaceError::ConfigurationMissing(var) => {
                write!(f, "{} environment variable not found", var)
            }
            ReplaceError::SourceUnreadable { path, reason } => {
                write!(f, "Cannot read key-value file {:?}: {}", path, reason)
            }
            ReplaceError::NotFound(msg) => write!(f, "{}", msg),
            ReplaceError::Transport(msg) => {
                write!(f, "Secret store request failed: {}", msg)
            }
            ReplaceError::DescriptorInvalid(msg) => {
                write!(f, "Invalid configuration file: {}", msg)
            }
            ReplaceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ReplaceError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ReplaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplaceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReplaceError {
    fn from(err: std::io::Error) -> Self {
        ReplaceError::Io(err)
    }
}

impl From<serde_yaml::Error> for ReplaceError {
    fn from(err: serde_yaml::Error) -> Self {
        ReplaceError::DescriptorInvalid(err.to_string())
    }
}

impl From<reqwest::Error> for ReplaceError {
    fn from(err: reqwest::Error) -> Self {
        ReplaceError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ReplaceError {
    fn from(err: serde_json::Error) -> Self {
        ReplaceError::Transport(format!("malformed response: {}", err))
    }
}

/// Result type for resolution operations
pub type ReplaceResult<T> = Result<T, ReplaceError>;
