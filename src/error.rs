use std::fmt;
use std::io;
use std::path::PathBuf;

/// Unified error type for repool operations
#[derive(Debug)]
pub enum Error {
    /// I/O failure reading or writing a config file
    ConfigIo {
        path: PathBuf,
        source: io::Error,
    },

    /// Malformed JSON in a config file
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// HOME is not set, so no default config path can be derived
    HomeNotFound,

    /// Rejected pool configuration value
    InvalidPoolConfig(String),

    /// The obfuscation multiplier has no modular inverse
    NotInvertible(i64),
}

impl Error {
    pub(crate) fn config_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::ConfigIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::ConfigParse {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigIo { path, source } => {
                write!(f, "config I/O error at {}: {}", path.display(), source)
            }
            Error::ConfigParse { path, source } => {
                write!(f, "invalid JSON in {}: {}", path.display(), source)
            }
            Error::HomeNotFound => {
                write!(f, "cannot determine default config path: HOME is not set")
            }
            Error::InvalidPoolConfig(msg) => write!(f, "invalid pool configuration: {}", msg),
            Error::NotInvertible(m) => write!(f, "no modular inverse for multiplier {}", m),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigIo { source, .. } => Some(source),
            Error::ConfigParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for repool operations
pub type Result<T> = std::result::Result<T, Error>;
