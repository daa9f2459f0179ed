//! Host-facing uploader entry point
//!
//! [`SuperbedPlugin::handle`] is what the host calls for each upload. It
//! never returns an error: every failure is turned into exactly one
//! notification and the items are left without URLs.

use crate::{
    Result,
    config::{NetworkSettings, Settings, UPLOADER_CONFIG_KEY},
    debug::sink_from_settings,
    error::format_error,
    host::{Capabilities, ConfigStore, HttpTransport, Notifier, ReqwestTransport},
    types::{ConfigField, ConfigFieldKind, UploadContext, UploaderConfig},
    uploader::{
        Credentials, FreeTierUploader, PaidUploader, load_uploader_config, resolve_credentials,
    },
};
use std::sync::Arc;
use tracing::{error, info};

/// Uploader id used when registering with the host
pub const PLUGIN_ID: &str = "superbed";

/// Name shown in the host's uploader list
pub const DISPLAY_NAME: &str = "Superbed";

pub const FAILURE_TITLE: &str = "Superbed upload failed";
pub const CREDENTIALS_TITLE: &str = "Superbed upload failed: insufficient credentials";
pub const CREDENTIALS_BODY: &str = "Set a token to use a paid account, or a username and password to use a free account.";

/// Result of one `handle` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Every item received a URL
    Uploaded { count: usize },
    /// A notification was raised and no item was modified
    Failed,
}

/// The superbed uploader bound to host capabilities
#[derive(Debug, Clone)]
pub struct SuperbedPlugin {
    caps: Capabilities,
    network: NetworkSettings,
}

impl SuperbedPlugin {
    pub fn new(caps: Capabilities, network: NetworkSettings) -> Self {
        Self { caps, network }
    }

    /// Wire up the reqwest transport and the diagnostic channel from settings
    ///
    /// Provider traffic honours the proxy settings; traces go out directly.
    pub fn from_settings(
        settings: &Settings,
        config: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(settings)?);
        let debug = sink_from_settings(settings, Arc::new(ReqwestTransport::direct(settings)?));
        let caps = Capabilities::new(transport, config, notifier).with_debug_sink(debug);
        Ok(Self::new(caps, settings.network.clone()))
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Upload every item of the context and assign the returned URLs
    pub async fn handle(&self, ctx: &mut UploadContext) -> HandleOutcome {
        let credentials = match load_uploader_config(self.caps.config.as_ref())
            .and_then(|config| resolve_credentials(&config))
        {
            Ok(credentials) => credentials,
            Err(crate::Error::InsufficientCredentials) => {
                error!("No usable credentials configured");
                self.caps.notify(CREDENTIALS_TITLE, CREDENTIALS_BODY);
                return HandleOutcome::Failed;
            }
            Err(e) => return self.fail(&e, format_error(&e)),
        };

        info!(
            tier = credentials.tier(),
            "Uploading {} images",
            ctx.output.len()
        );

        let images = match ctx.images() {
            Ok(images) => images,
            Err(e) => return self.fail(&e, format_error(&e)),
        };

        let uploaded = match &credentials {
            Credentials::Free { username, password } => {
                FreeTierUploader::new(&self.caps, &self.network)
                    .upload(username, password, &images)
                    .await
                    .map_err(|e| {
                        let body = format_error(&e);
                        (e, body)
                    })
            }
            Credentials::Paid { token } => PaidUploader::new(&self.caps, &self.network)
                .upload(token, &images)
                .await
                .map_err(|e| {
                    let body = e.to_string();
                    (e, body)
                }),
        };

        match uploaded.and_then(|urls| {
            let count = urls.len();
            ctx.assign_urls(urls).map(|()| count).map_err(|e| {
                let body = format_error(&e);
                (e, body)
            })
        }) {
            Ok(count) => {
                self.caps.trace(format!("assigned {} urls", count)).await;
                HandleOutcome::Uploaded { count }
            }
            Err((e, body)) => self.fail(&e, body),
        }
    }

    fn fail(&self, e: &crate::Error, body: String) -> HandleOutcome {
        error!(
            "Upload failed: {}",
            crate::error::format_error_for_logging(e)
        );
        self.caps.notify(FAILURE_TITLE, &body);
        HandleOutcome::Failed
    }

    /// Settings form fields, each defaulting to the stored value
    pub fn config_schema(&self) -> Result<Vec<ConfigField>> {
        let stored = load_uploader_config(self.caps.config.as_ref())?;
        let field = |name: &str, kind, message: &str, value: &Option<String>| ConfigField {
            name: name.to_string(),
            kind,
            required: false,
            message: message.to_string(),
            default: value.clone().unwrap_or_default(),
        };

        Ok(vec![
            field(
                "token",
                ConfigFieldKind::Input,
                "Paid account API token; takes precedence over username and password",
                &stored.token,
            ),
            field(
                "username",
                ConfigFieldKind::Input,
                "Free account username",
                &stored.username,
            ),
            field(
                "password",
                ConfigFieldKind::Password,
                "Free account password",
                &stored.password,
            ),
        ])
    }

    /// Merge the given values into the stored configuration
    ///
    /// Fields left as `None` keep their stored value.
    pub fn update_config(&self, changes: UploaderConfig) -> Result<UploaderConfig> {
        let mut config = load_uploader_config(self.caps.config.as_ref())?;
        if changes.token.is_some() {
            config.token = changes.token;
        }
        if changes.username.is_some() {
            config.username = changes.username;
        }
        if changes.password.is_some() {
            config.password = changes.password;
        }

        self.caps
            .config
            .save_config(UPLOADER_CONFIG_KEY, serde_json::to_value(&config)?)?;
        Ok(config)
    }
}
