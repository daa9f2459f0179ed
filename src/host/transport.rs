//! HTTP transport
//!
//! The uploader never talks to reqwest directly; it builds [`HttpRequest`]
//! values and hands them to an [`HttpTransport`]. [`ReqwestTransport`] is the
//! production implementation.

use crate::{Result, config::Settings};
use async_trait::async_trait;
use reqwest::{Client, Proxy, header::CONTENT_TYPE, multipart};
use std::borrow::Cow;

/// Placeholder written over secrets in traces
pub const REDACTED: &str = "<redacted>";

/// Form fields and query parameters carrying credentials or the session token
const SECRET_FIELDS: [&str; 2] = ["password", "token"];

/// Headers carrying the session token
const SECRET_HEADERS: [&str; 1] = ["cookie"];

fn is_secret_field(name: &str) -> bool {
    SECRET_FIELDS.contains(&name)
}

/// Mask secret query parameters; unparseable URLs are kept as they are
fn redact_url(raw: &str) -> String {
    let Ok(mut url) = url::Url::parse(raw) else {
        return raw.to_string();
    };
    if !url.query_pairs().any(|(k, _)| is_secret_field(&k)) {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if is_secret_field(&k) { Cow::Borrowed(REDACTED) } else { v };
            (k.into_owned(), value.into_owned())
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

/// Mask the session token a login reply hands out; other bodies pass through
pub fn redact_reply(body: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    match value.pointer_mut("/user/token") {
        Some(token) if token.is_string() => {
            *token = serde_json::Value::String(REDACTED.to_string());
            value.to_string()
        }
        _ => body.to_string(),
    }
}

/// HTTP method subset used by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// Plain text field
    Text { name: String, value: String },
    /// File field with its original file name
    File {
        name: String,
        file_name: String,
        data: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::File {
            name: name.into(),
            file_name: file_name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Request body variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in order
    Form(Vec<(String, String)>),
    /// Raw text body with an explicit content type
    Text {
        content_type: String,
        content: String,
    },
    /// `multipart/form-data` fields, in order
    Multipart(Vec<FormField>),
}

/// A transport-agnostic HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Headers in insertion order
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    /// Add header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add several headers
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set request body
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a multipart text field or form pair by name
    pub fn field(&self, name: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            RequestBody::Multipart(fields) => fields.iter().find_map(|field| match field {
                FormField::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Names of the multipart file fields, in order
    pub fn file_field_names(&self) -> Vec<&str> {
        match &self.body {
            RequestBody::Multipart(fields) => fields
                .iter()
                .filter(|f| matches!(f, FormField::File { .. }))
                .map(FormField::name)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// JSON summary for traces: file payloads become a size placeholder,
    /// and the password, the session token and the cookie are masked
    pub fn describe(&self) -> String {
        let text = |name: &str, value: &str| {
            let value = if is_secret_field(name) { REDACTED } else { value };
            serde_json::Value::String(value.to_string())
        };

        let body = match &self.body {
            RequestBody::Empty => serde_json::Value::Null,
            RequestBody::Form(pairs) => serde_json::Value::Object(
                pairs.iter().map(|(k, v)| (k.clone(), text(k, v))).collect(),
            ),
            RequestBody::Text { content, .. } => serde_json::Value::String(content.clone()),
            RequestBody::Multipart(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|field| match field {
                        FormField::Text { name, value } => (name.clone(), text(name, value)),
                        FormField::File {
                            name,
                            file_name,
                            data,
                        } => (
                            name.clone(),
                            serde_json::Value::String(format!(
                                "<binary {} bytes: {}>",
                                data.len(),
                                file_name
                            )),
                        ),
                    })
                    .collect(),
            ),
        };

        serde_json::json!({
            "method": self.method.as_str(),
            "url": redact_url(&self.url),
            "headers": self
                .headers
                .iter()
                .map(|(k, v)| {
                    let secret = SECRET_HEADERS.iter().any(|h| k.eq_ignore_ascii_case(h));
                    let value = if secret { REDACTED } else { v.as_str() };
                    (k.clone(), serde_json::Value::String(value.to_string()))
                })
                .collect::<serde_json::Map<_, _>>(),
            "body": body,
        })
        .to_string()
    }
}

/// Executes HTTP requests and returns the raw response body
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request; transport failures and non-success statuses
    /// surface as [`crate::Error::Http`]
    async fn request(&self, request: HttpRequest) -> Result<String>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    fn client_builder(settings: &Settings) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(settings.network.request_timeout())
            .connect_timeout(settings.network.connect_timeout())
    }

    /// Create a transport with timeouts and proxy taken from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut client_builder = Self::client_builder(settings);

        if let Some(proxy_url) = settings.get_proxy_url() {
            let proxy = Proxy::all(&proxy_url).map_err(|e| {
                crate::Error::config("proxy", format!("Invalid proxy URL {}: {}", proxy_url, e).as_str())
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build()?;

        Ok(Self { client })
    }

    /// Create a transport that ignores both configured and system proxies
    ///
    /// Used for the diagnostic channel, whose receiver is usually local.
    pub fn direct(settings: &Settings) -> Result<Self> {
        let client = Self::client_builder(settings).no_proxy().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build_multipart(fields: Vec<FormField>) -> multipart::Form {
        fields
            .into_iter()
            .fold(multipart::Form::new(), |form, field| match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File {
                    name,
                    file_name,
                    data,
                } => form.part(name, multipart::Part::bytes(data).file_name(file_name)),
            })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<String> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Text {
                content_type,
                content,
            } => builder.header(CONTENT_TYPE, content_type).body(content),
            RequestBody::Multipart(fields) => builder.multipart(Self::build_multipart(fields)),
        };

        let response = builder.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
