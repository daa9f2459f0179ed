//! Superbed uploader
//!
//! Uploads images to the superbed image host on behalf of an image-uploading
//! host application. Two account kinds are supported:
//!
//! - **Paid**: a single multipart upload authenticated by an API token
//! - **Free**: login, upload ticket, then signed multipart uploads in
//!   batches of five, each followed by an id-to-URL resolution query
//!
//! # Architecture
//!
//! The host's HTTP client, configuration store and notification surface are
//! modelled as traits in [`host`] and handed to the uploader through one
//! [`host::Capabilities`] value. [`plugin::SuperbedPlugin`] is the entry
//! point the host calls; it turns every failure into a single notification.
//!
//! An optional diagnostic channel ([`debug`]) forwards every pipeline step
//! to a receiver such as the one in [`server`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use superbed_uploader::{
//!     Settings,
//!     host::{LogNotifier, MemoryConfigStore},
//!     plugin::SuperbedPlugin,
//!     types::{OutputItem, UploadContext},
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let plugin = SuperbedPlugin::from_settings(
//!     &Settings::default(),
//!     Arc::new(MemoryConfigStore::new()),
//!     Arc::new(LogNotifier),
//! )?;
//!
//! let mut ctx = UploadContext::new(vec![OutputItem::from_buffer(vec![0u8; 16], "cat.png")]);
//! plugin.handle(&mut ctx).await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod debug;
pub mod error;
pub mod host;
pub mod plugin;
pub mod server;
pub mod types;
pub mod uploader;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use plugin::{HandleOutcome, SuperbedPlugin};
pub use types::{Image, OutputItem, UploadContext};
