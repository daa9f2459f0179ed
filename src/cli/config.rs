//! Config subcommands: show the settings form, store credentials

use super::{config_file_path, load_settings};
use crate::{
    host::{FileConfigStore, LogNotifier},
    plugin::SuperbedPlugin,
    types::UploaderConfig,
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Arguments for `config set`
#[derive(Debug, Default)]
pub struct ConfigSetArgs {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub config: Option<String>,
}

fn plugin_for(config: Option<&str>) -> Result<SuperbedPlugin> {
    let settings = load_settings(config);
    let store_path = config_file_path(config)
        .context("Could not determine a configuration file location")?;

    Ok(SuperbedPlugin::from_settings(
        &settings,
        Arc::new(FileConfigStore::new(store_path)),
        Arc::new(LogNotifier),
    )?)
}

/// Print the settings form schema as JSON
pub fn run_config_show(config: Option<String>) -> Result<()> {
    let schema = plugin_for(config.as_deref())?.config_schema()?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Store the given credentials, keeping fields that were not passed
pub fn run_config_set(args: ConfigSetArgs) -> Result<()> {
    if args.token.is_none() && args.username.is_none() && args.password.is_none() {
        anyhow::bail!("Nothing to set: pass --token, --username or --password");
    }

    let plugin = plugin_for(args.config.as_deref())?;
    let saved = plugin.update_config(UploaderConfig {
        token: args.token,
        username: args.username,
        password: args.password,
    })?;

    let mode = match (saved.token(), saved.username(), saved.password()) {
        (Some(_), _, _) => "paid (token)",
        (None, Some(_), Some(_)) => "free (username and password)",
        _ => "incomplete",
    };
    println!("Configuration saved, upload mode: {}", mode);
    Ok(())
}
