//! Error types for the superbed uploader
//!
//! Provider failures, credential problems and the ambient I/O, parsing and
//! transport errors all flow through one enum so the upload entry point can
//! turn any of them into a single notification.

use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// Transport errors from the HTTP layer, passed through unchanged
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML configuration serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 image payload could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Neither a paid token nor a username/password pair is configured
    #[error("Insufficient credentials: a token or a username and password is required")]
    InsufficientCredentials,

    /// Free-tier login rejected by the provider
    #[error("Login failed: {message}")]
    LoginFailed {
        /// Provider message (`msg` field)
        message: String,
    },

    /// Upload or URL resolution rejected by the provider
    #[error("Image upload failed: {message}")]
    UploadFailed {
        /// Provider message (`msg` field)
        message: String,
        /// Pipeline stage that failed (`upload`, `resolve`)
        stage: Option<String>,
    },

    /// Provider answered with a shape we cannot use
    #[error("Malformed provider response: {details}")]
    MalformedResponse {
        /// What was missing or inconsistent
        details: String,
    },

    /// Host supplied an image we cannot turn into bytes
    #[error("Invalid image '{file_name}': {reason}")]
    InvalidImage {
        /// File name of the offending item
        file_name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
        /// Additional context about where the error occurred
        context: Option<String>,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a login failure carrying the provider message
    pub fn login_failed<S: Into<String>>(message: S) -> Self {
        Self::LoginFailed {
            message: message.into(),
        }
    }

    /// Create an upload failure carrying the provider message
    pub fn upload_failed<S: Into<String>>(message: S) -> Self {
        Self::UploadFailed {
            message: message.into(),
            stage: None,
        }
    }

    /// Create an upload failure with stage info
    pub fn upload_failed_at_stage<S: Into<String>>(message: S, stage: S) -> Self {
        Self::UploadFailed {
            message: message.into(),
            stage: Some(stage.into()),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response<S: Into<String>>(details: S) -> Self {
        Self::MalformedResponse {
            details: details.into(),
        }
    }

    /// Create an invalid image error
    pub fn invalid_image<S: Into<String>>(file_name: S, reason: S) -> Self {
        Self::InvalidImage {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Whether the error came from the provider rejecting the request,
    /// as opposed to transport or local failures
    pub fn is_provider_rejection(&self) -> bool {
        matches!(
            self,
            Error::LoginFailed { .. } | Error::UploadFailed { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "transport",
            Error::Json(..) => "json",
            Error::Toml(..) | Error::TomlSerialize(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::Base64(..) => "base64",
            Error::InsufficientCredentials => "credentials",
            Error::LoginFailed { .. } => "login",
            Error::UploadFailed { .. } => "upload",
            Error::MalformedResponse { .. } => "response",
            Error::InvalidImage { .. } => "image",
            Error::Config { .. } => "config",
            Error::Internal { .. } => "internal",
        }
    }
}
