//! Upload mode CLI logic

use super::{config_file_path, init_logging, load_settings};
use crate::{
    host::{FileConfigStore, LogNotifier},
    plugin::{HandleOutcome, SuperbedPlugin},
    types::{OutputItem, UploadContext},
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Arguments for upload mode
#[derive(Debug)]
pub struct UploadArgs {
    pub files: Vec<PathBuf>,
    pub config: Option<String>,
    pub verbose: bool,
}

/// Read one file into a host output item named after the file
pub async fn read_item(path: &Path) -> Result<OutputItem> {
    let buffer = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Read {} ({} bytes)", file_name, buffer.len());
    Ok(OutputItem::from_buffer(buffer, file_name))
}

/// Upload the given files and print one URL per line
pub async fn run_upload_mode(args: UploadArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref());
    init_logging(&settings, args.verbose);

    let store_path = config_file_path(args.config.as_deref())
        .context("Could not determine a configuration file location")?;

    let mut items = Vec::with_capacity(args.files.len());
    for path in &args.files {
        items.push(read_item(path).await?);
    }

    let plugin = SuperbedPlugin::from_settings(
        &settings,
        Arc::new(FileConfigStore::new(store_path)),
        Arc::new(LogNotifier),
    )?;

    let mut ctx = UploadContext::new(items);
    match plugin.handle(&mut ctx).await {
        HandleOutcome::Uploaded { .. } => {
            for url in ctx.urls().into_iter().flatten() {
                println!("{}", url);
            }
            Ok(())
        }
        HandleOutcome::Failed => anyhow::bail!("Upload failed"),
    }
}
