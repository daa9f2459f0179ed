//! Stored uploader configuration and the settings form schema

use serde::{Deserialize, Serialize};

/// Credentials as stored by the host under `picBed.superbed`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Paid account API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Free account username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Free account password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UploaderConfig {
    /// The empty default written when the host has nothing stored yet
    pub fn empty() -> Self {
        Self {
            token: Some(String::new()),
            username: Some(String::new()),
            password: Some(String::new()),
        }
    }

    /// Paid token, if set and non-empty
    pub fn token(&self) -> Option<&str> {
        non_empty(&self.token)
    }

    /// Username, if set and non-empty
    pub fn username(&self) -> Option<&str> {
        non_empty(&self.username)
    }

    /// Password, if set and non-empty
    pub fn password(&self) -> Option<&str> {
        non_empty(&self.password)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Input widget kind of a settings form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFieldKind {
    Input,
    Password,
}

/// One field of the settings form shown by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConfigFieldKind,
    pub required: bool,
    /// Prompt shown next to the field
    pub message: String,
    /// Currently stored value
    pub default: String,
}
