//! Diagnostic channel
//!
//! When enabled, every pipeline step and request/response pair is forwarded
//! as plain text to a receiver (see [`crate::server`]). Disabled by default.

use crate::{
    config::Settings,
    host::{HttpRequest, HttpTransport, RequestBody},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Destination for diagnostic trace lines
#[async_trait]
pub trait DebugSink: Send + Sync {
    /// Deliver one trace line; failures are the sink's own business
    async fn emit(&self, message: &str);
}

/// Drops every trace
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugSink;

#[async_trait]
impl DebugSink for NoopDebugSink {
    async fn emit(&self, _message: &str) {}
}

/// POSTs each trace as `text/plain` to a receiver
pub struct HttpDebugSink {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl HttpDebugSink {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl DebugSink for HttpDebugSink {
    async fn emit(&self, message: &str) {
        let request = HttpRequest::post(&self.endpoint)
            .with_header("User-Agent", crate::utils::version::user_agent())
            .with_body(RequestBody::Text {
                content_type: "text/plain".to_string(),
                content: message.to_string(),
            });

        if let Err(e) = self.transport.request(request).await {
            tracing::warn!("Failed to deliver debug trace to {}: {}", self.endpoint, e);
        }
    }
}

/// Collects traces in memory
#[derive(Debug, Default)]
pub struct MemoryDebugSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryDebugSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DebugSink for MemoryDebugSink {
    async fn emit(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

/// Build the sink selected by settings
pub fn sink_from_settings(
    settings: &Settings,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn DebugSink> {
    if settings.debug.enabled {
        tracing::info!("Diagnostic traces forwarded to {}", settings.debug.endpoint);
        Arc::new(HttpDebugSink::new(transport, settings.debug.endpoint.clone()))
    } else {
        Arc::new(NoopDebugSink)
    }
}
