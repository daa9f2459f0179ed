//! Common test utilities and helpers
//!
//! A fake superbed provider built on wiremock plus factories for plugins
//! wired against it.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use superbed_uploader::{
    config::{Settings, UPLOADER_CONFIG_KEY},
    host::{MemoryConfigStore, MemoryNotifier},
    plugin::SuperbedPlugin,
    types::{OutputItem, UploadContext},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Path of the upload endpoint handed out in tickets
pub const UPLOAD_PATH: &str = "/ticket-upload";

/// Settings pointing both provider hosts at the mock server
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.network.site_url = server.uri();
    settings.network.api_url = server.uri();
    settings.network.connect_timeout = 5;
    settings.network.request_timeout = 10;
    settings
}

/// A plugin with in-memory config and notifications
pub struct TestPlugin {
    pub plugin: SuperbedPlugin,
    pub store: Arc<MemoryConfigStore>,
    pub notifier: Arc<MemoryNotifier>,
}

impl TestPlugin {
    pub fn new(settings: &Settings, config: Option<Value>) -> Self {
        let store = Arc::new(match config {
            Some(value) => MemoryConfigStore::with_entry(UPLOADER_CONFIG_KEY, value),
            None => MemoryConfigStore::new(),
        });
        let notifier = Arc::new(MemoryNotifier::new());
        let plugin = SuperbedPlugin::from_settings(settings, store.clone(), notifier.clone())
            .expect("plugin from settings");
        Self {
            plugin,
            store,
            notifier,
        }
    }

    pub fn free(settings: &Settings) -> Self {
        Self::new(settings, Some(json!({"username": "bob", "password": "pw"})))
    }

    pub fn paid(settings: &Settings) -> Self {
        Self::new(settings, Some(json!({"token": "tok"})))
    }
}

/// An upload context of `n` one-byte images named `img{i}.png`
pub fn context(n: usize) -> UploadContext {
    UploadContext::new(
        (0..n)
            .map(|i| OutputItem::from_buffer(vec![i as u8], format!("img{}.png", i)))
            .collect(),
    )
}

/// URL the fake provider resolves an id to
pub fn cdn_url(id: &str) -> String {
    format!("https://cdn.example/{}.png", id)
}

/// Answers batch uploads with one id per submitted file
///
/// Ids are `b{batch}i{index}`, so every batch gets distinct ids.
#[derive(Default)]
pub struct BatchResponder {
    batches: AtomicUsize,
}

impl Respond for BatchResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let batch = self.batches.fetch_add(1, Ordering::SeqCst);
        let body = String::from_utf8_lossy(&request.body);
        let files = body.matches("name=\"file").count();
        let ids: Vec<String> = (0..files).map(|i| format!("b{}i{}", batch, i)).collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "err": 0,
            "forward": format!("fw-{}", batch),
            "ids": ids,
        }))
    }
}

/// Resolves every id of the `ids` query parameter with [`cdn_url`]
pub struct ResolveResponder;

impl Respond for ResolveResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ids = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "ids")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        let results: serde_json::Map<String, Value> = ids
            .split(',')
            .filter(|id| !id.is_empty())
            .enumerate()
            .map(|(i, id)| (id.to_string(), json!([i, cdn_url(id)])))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({"err": 0, "results": results}))
    }
}

/// Mount a successful login returning session token `sess`
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/signin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"err": 0, "user": {"token": "sess"}})),
        )
        .mount(server)
        .await;
}

/// Mount the ticket endpoint pointing uploads at [`UPLOAD_PATH`]
pub async fn mount_ticket(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("code", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "err": 0,
            "url": format!("{}{}", server.uri(), UPLOAD_PATH),
            "ts": 1700000000,
            "token": "ticket-token",
            "active": true,
        })))
        .mount(server)
        .await;
}

/// Mount the resolution endpoint; register after [`mount_ticket`]
pub async fn mount_resolve(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResolveResponder)
        .mount(server)
        .await;
}

/// Mount login, ticket and resolution; uploads are left to the test
pub async fn mount_free_session(server: &MockServer) {
    mount_login(server).await;
    mount_ticket(server).await;
    mount_resolve(server).await;
}

/// Requests received at a path
pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .collect()
}
