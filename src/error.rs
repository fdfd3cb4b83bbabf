//! Error types for repodeps
//!
//! One error enum covers the three user-facing conversion failures (malformed
//! manifest XML, an undecodable records blob, unfilled remote/branch fields)
//! as well as the ambient failures of the CLI and web server.

use thiserror::Error;

/// Result type alias for repodeps operations
pub type Result<T> = std::result::Result<T, RepoDepsError>;

/// Message shown when a repository is left without a remote or branch
pub const MISSING_FIELDS_MESSAGE: &str = "All Remote and Branch fields must be filled out.";

/// Error type for repodeps operations
#[derive(Error, Debug)]
pub enum RepoDepsError {
    /// The manifest is not well-formed XML
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// The round-tripped repositories blob is missing or not valid JSON
    #[error("Error decoding JSON: {0}")]
    Decode(String),

    /// At least one repository resolved to a blank remote or branch
    #[error("All Remote and Branch fields must be filled out.")]
    MissingFields {
        /// Repositories that failed validation, in input order
        repositories: Vec<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Template loading or rendering errors
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Web server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RepoDepsError {
    /// Whether the error was caused by what the user submitted rather than
    /// by the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RepoDepsError::MalformedXml(_)
                | RepoDepsError::Decode(_)
                | RepoDepsError::MissingFields { .. }
        )
    }
}
