//! Error types for the health warehouse
//!
//! Every fatal condition of an ingestion run maps to one variant here.
//! Malformed cell values are not errors: the transform stage degrades them
//! to null instead of raising.

use thiserror::Error;

/// The main error type for the health warehouse
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Extract Errors
    // ============================================================================
    #[error("Unable to decode '{source_name}' as UTF-8 or windows-1252")]
    Encoding { source_name: String },

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    // ============================================================================
    // Transform Errors
    // ============================================================================
    #[error("Schema error: {message}")]
    Schema { message: String },

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Load error: {message}")]
    Load { message: String },

    #[error("Query error: {message}")]
    Query { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an encoding error for the named source
    pub fn encoding(source_name: impl Into<String>) -> Self {
        Self::Encoding {
            source_name: source_name.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(message: impl Into<String>) -> Self {
        Self::CsvParse {
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Name of the pipeline stage this error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Config { .. } | Error::YamlParse(_) => "config",
            Error::Encoding { .. }
            | Error::CsvParse { .. }
            | Error::Io(_)
            | Error::FileNotFound { .. } => "extract",
            Error::Schema { .. } => "transform",
            Error::Load { .. } => "load",
            Error::Query { .. } | Error::JsonParse(_) => "query",
            Error::Other(_) => "run",
        }
    }

    /// True when an ingestion run was rejected before the store was touched
    pub fn is_pre_load(&self) -> bool {
        matches!(
            self,
            Error::Encoding { .. }
                | Error::CsvParse { .. }
                | Error::Schema { .. }
                | Error::FileNotFound { .. }
        )
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::csv(e.to_string())
    }
}

/// Result type alias for the health warehouse
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
