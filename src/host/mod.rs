//! Host application interfaces
//!
//! The uploader runs inside a host that owns HTTP execution, configuration
//! storage and user notifications. Each of those is a trait here, and the
//! per-invocation [`Capabilities`] bundle carries them into the pipeline
//! explicitly instead of through shared module state.

pub mod config_store;
pub mod notifier;
pub mod transport;

pub use config_store::{ConfigStore, FileConfigStore, MemoryConfigStore};
pub use notifier::{LogNotifier, MemoryNotifier, Notification, Notifier};
pub use transport::{
    FormField, HttpRequest, HttpTransport, Method, REDACTED, RequestBody, ReqwestTransport,
    redact_reply,
};

use crate::{
    Result,
    debug::{DebugSink, NoopDebugSink},
};
use std::sync::Arc;

/// Everything the upload pipeline may reach outside itself
#[derive(Clone)]
pub struct Capabilities {
    pub transport: Arc<dyn HttpTransport>,
    pub config: Arc<dyn ConfigStore>,
    pub notifier: Arc<dyn Notifier>,
    pub debug: Arc<dyn DebugSink>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

impl Capabilities {
    /// Bundle host capabilities with the diagnostic channel disabled
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            config,
            notifier,
            debug: Arc::new(NoopDebugSink),
        }
    }

    /// Route traces to a diagnostic sink
    pub fn with_debug_sink(mut self, debug: Arc<dyn DebugSink>) -> Self {
        self.debug = debug;
        self
    }

    /// Emit a trace line to the log and the diagnostic channel
    pub async fn trace(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}", message);
        self.debug.emit(&message).await;
    }

    /// Send a request, tracing both sides of the exchange
    pub async fn send(&self, request: HttpRequest) -> Result<String> {
        self.trace(format!("request: {}", request.describe())).await;

        match self.transport.request(request).await {
            Ok(body) => {
                self.trace(format!("response: {}", redact_reply(&body))).await;
                Ok(body)
            }
            Err(e) => {
                self.trace(format!("transport error: {}", e)).await;
                Err(e)
            }
        }
    }

    /// Raise a user notification
    pub fn notify(&self, title: &str, body: &str) {
        self.notifier.notify(title, body);
    }
}
