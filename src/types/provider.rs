//! Provider wire types
//!
//! Every provider reply carries an `err` code (0 means success) and an
//! optional `msg`; the remaining fields depend on the endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status fields shared by every provider reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Error code, 0 on success
    #[serde(default)]
    pub err: Option<i64>,
    /// Human readable message
    #[serde(default)]
    pub msg: Option<String>,
}

impl ProviderStatus {
    /// Whether the provider reported success
    pub fn is_ok(&self) -> bool {
        self.err == Some(0)
    }

    /// Provider message, or a placeholder naming the error code
    pub fn message(&self) -> String {
        match (&self.msg, self.err) {
            (Some(msg), _) if !msg.is_empty() => msg.clone(),
            (_, Some(code)) => format!("error code {}", code),
            (_, None) => "response carried no error code".to_string(),
        }
    }
}

/// Reply to `POST /signin`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub status: ProviderStatus,
    /// Signed-in user, present on success
    #[serde(default)]
    pub user: Option<LoginUser>,
}

/// User section of the login reply
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    /// Session token used as the `token` cookie
    pub token: String,
}

/// Ticket timestamp exactly as the provider sent it
///
/// Integral values print without a fraction and fractional values keep
/// their digits, so the signature sees the same text the provider issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(serde_json::Number);

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_i64() || self.0.is_u64() {
            return write!(f, "{}", self.0);
        }
        match self.0.as_f64() {
            Some(value) if value.fract() == 0.0 && value.abs() < 1e21 => write!(f, "{:.0}", value),
            Some(value) => write!(f, "{}", value),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Short-lived upload destination, fetched once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTicket {
    /// Upload endpoint for this session
    pub url: String,
    /// Session timestamp, part of the request signature
    pub ts: Timestamp,
    /// Ticket token
    #[serde(default)]
    pub token: String,
    /// Whether the provider considers the ticket usable (not checked locally)
    #[serde(default)]
    pub active: bool,
}

/// Opaque image identifier; the provider may send strings or numbers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderId {
    Text(String),
    Number(i64),
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Text(s) => f.write_str(s),
            ProviderId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Reply to a free-tier batch upload
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUploadResponse {
    #[serde(flatten)]
    pub status: ProviderStatus,
    /// Value required to resolve `ids` into URLs
    #[serde(default)]
    pub forward: Option<String>,
    /// One id per uploaded file, parallel to the submitted files
    #[serde(default)]
    pub ids: Vec<ProviderId>,
}

/// One entry of the resolution reply
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResolvedEntry {
    /// `{"url": "...", ...}`
    Object { url: String },
    /// `[index, "url"]`
    Pair(serde_json::Value, String),
}

impl ResolvedEntry {
    /// The public URL of the image
    pub fn url(&self) -> &str {
        match self {
            ResolvedEntry::Object { url } => url,
            ResolvedEntry::Pair(_, url) => url,
        }
    }
}

/// Reply to the `?forward=..&ids=..` resolution query
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveResponse {
    #[serde(flatten)]
    pub status: ProviderStatus,
    /// Resolved entries keyed by id
    #[serde(default)]
    pub results: HashMap<String, ResolvedEntry>,
}

/// Reply to the paid `POST /upload?token=..`
#[derive(Debug, Clone, Deserialize)]
pub struct PaidUploadResponse {
    #[serde(flatten)]
    pub status: ProviderStatus,
    /// Position to URL mapping, in document order
    #[serde(default)]
    pub urls: serde_json::Map<String, serde_json::Value>,
}
