use std::io;

// Represents errors raised while rendering to or reading from the console shell.
#[derive(Debug)]
pub enum PlatformError {
    /// Writing to the output stream or reading user input failed.
    Io(io::Error),
    /// The batch summary could not be rendered as JSON.
    Serialization(serde_json::Error),
}

impl From<io::Error> for PlatformError {
    fn from(err: io::Error) -> Self {
        PlatformError::Io(err)
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Serialization(err)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Io(e) => write!(f, "Console I/O error: {e}"),
            PlatformError::Serialization(e) => write!(f, "Summary serialization error: {e}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Io(e) => Some(e),
            PlatformError::Serialization(e) => Some(e),
        }
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
