//! Configuration management for the uploader
//!
//! This module handles loading and managing application settings
//! (endpoints, headers, logging and the diagnostic channel).

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{DebugSettings, LoggingSettings, NetworkSettings, Settings, UPLOADER_CONFIG_KEY};
