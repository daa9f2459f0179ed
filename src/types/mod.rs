//! Type definitions for the uploader
//!
//! This module contains the host-facing image types, the stored uploader
//! configuration and the provider wire formats.

pub mod image;
pub mod provider;
pub mod uploader_config;

pub use image::{Image, OutputItem, UploadContext};
pub use provider::{
    BatchUploadResponse, LoginResponse, PaidUploadResponse, ProviderId, ProviderStatus,
    ResolveResponse, ResolvedEntry, Timestamp, UploadTicket,
};
pub use uploader_config::{ConfigField, ConfigFieldKind, UploaderConfig};
