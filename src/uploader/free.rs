//! Free-tier upload pipeline
//!
//! Free accounts go through the provider's web endpoints:
//!
//! 1. `POST /signin` with username and password yields a session token
//! 2. `GET /?code=1` with the session cookie yields an [`UploadTicket`]
//! 3. images are split into batches of at most [`FREE_TIER_BATCH_LIMIT`]
//! 4. each batch is posted as a signed multipart form to the ticket URL,
//!    returning a `forward` value and one opaque id per file
//! 5. `GET /?forward=..&ids=..` resolves the ids into public URLs
//!
//! Batches run strictly one after another because they share one signed
//! session. A failing batch aborts the run; batches already accepted by the
//! provider stay uploaded there but their URLs are never handed back.

use super::{form::SignedForm, parse_reply};
use crate::{
    Result,
    config::NetworkSettings,
    host::{Capabilities, HttpRequest, RequestBody},
    types::{BatchUploadResponse, Image, LoginResponse, ResolveResponse, UploadTicket},
};
use tracing::info;

/// Maximum number of files the provider accepts per free-tier request
pub const FREE_TIER_BATCH_LIMIT: usize = 5;

/// Split images into consecutive batches, preserving order
pub fn batches(images: &[Image]) -> std::slice::Chunks<'_, Image> {
    images.chunks(FREE_TIER_BATCH_LIMIT)
}

/// Provider acknowledgement of one uploaded batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedBatch {
    pub forward: String,
    /// One id per file, in submission order
    pub ids: Vec<String>,
}

/// Resolved `(id, url)` pairs of one batch, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBatch {
    pub entries: Vec<(String, String)>,
}

impl ResolvedBatch {
    pub fn into_urls(self) -> impl Iterator<Item = String> {
        self.entries.into_iter().map(|(_, url)| url)
    }
}

/// Runs the free-tier pipeline for one invocation
pub struct FreeTierUploader<'a> {
    caps: &'a Capabilities,
    network: &'a NetworkSettings,
}

impl<'a> FreeTierUploader<'a> {
    pub fn new(caps: &'a Capabilities, network: &'a NetworkSettings) -> Self {
        Self { caps, network }
    }

    fn common_headers(&self) -> [(&'static str, String); 2] {
        [
            ("User-Agent", self.network.user_agent.clone()),
            ("Referrer", self.network.referrer.clone()),
        ]
    }

    /// Sign in and return the session token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        self.caps.trace("signing in").await;

        let request = HttpRequest::post(format!("{}/signin", self.network.site_base()))
            .with_headers(self.common_headers())
            .with_body(RequestBody::Form(vec![
                ("username".to_string(), username.to_string()),
                ("password".to_string(), password.to_string()),
                ("remember".to_string(), "on".to_string()),
            ]));

        let body = self.caps.send(request).await?;
        let reply: LoginResponse = parse_reply(&body)?;

        if !reply.status.is_ok() {
            return Err(crate::Error::login_failed(reply.status.message()));
        }

        reply
            .user
            .map(|user| user.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| crate::Error::malformed_response("login reply carried no user token"))
    }

    /// Fetch the upload ticket for a session
    ///
    /// The ticket's `active` flag is left for the provider to enforce.
    pub async fn fetch_ticket(&self, session_token: &str) -> Result<UploadTicket> {
        self.caps.trace("fetching upload ticket").await;

        let request = HttpRequest::get(format!("{}/?code=1", self.network.site_base()))
            .with_header("Cookie", format!("token={}", session_token))
            .with_headers(self.common_headers());

        let body = self.caps.send(request).await?;
        parse_reply(&body)
    }

    /// Post one signed batch to the ticket URL
    pub async fn upload_batch(
        &self,
        ticket: &UploadTicket,
        session_token: &str,
        form: &SignedForm,
        batch: &[Image],
    ) -> Result<UploadedBatch> {
        let request = HttpRequest::post(&ticket.url)
            .with_header("Cookie", format!("token={}", session_token))
            .with_headers(self.common_headers())
            .with_body(RequestBody::Multipart(form.batch_fields(batch)));

        let body = self.caps.send(request).await?;
        let reply: BatchUploadResponse = parse_reply(&body)?;

        if !reply.status.is_ok() {
            return Err(crate::Error::upload_failed_at_stage(
                reply.status.message().as_str(),
                "upload",
            ));
        }

        let forward = reply
            .forward
            .ok_or_else(|| crate::Error::malformed_response("upload reply carried no forward"))?;

        if reply.ids.len() != batch.len() {
            return Err(crate::Error::malformed_response(format!(
                "upload reply carried {} ids for {} files",
                reply.ids.len(),
                batch.len()
            )));
        }

        Ok(UploadedBatch {
            forward,
            ids: reply.ids.iter().map(ToString::to_string).collect(),
        })
    }

    /// Resolve a batch's ids into public URLs, keeping submission order
    pub async fn resolve_batch(&self, uploaded: &UploadedBatch) -> Result<ResolvedBatch> {
        let forward: String =
            url::form_urlencoded::byte_serialize(uploaded.forward.as_bytes()).collect();
        let url = format!(
            "{}/?forward={}&ids={}",
            self.network.site_base(),
            forward,
            uploaded.ids.join(",")
        );

        let request = HttpRequest::get(url).with_headers(self.common_headers());

        let body = self.caps.send(request).await?;
        let reply: ResolveResponse = parse_reply(&body)?;

        if !reply.status.is_ok() {
            return Err(crate::Error::upload_failed_at_stage(
                reply.status.message().as_str(),
                "resolve",
            ));
        }

        // an id may repeat within a batch when the provider deduplicates files
        let entries = uploaded
            .ids
            .iter()
            .map(|id| {
                reply
                    .results
                    .get(id)
                    .map(|entry| (id.clone(), entry.url().to_string()))
                    .ok_or_else(|| {
                        crate::Error::malformed_response(format!("no URL resolved for id {}", id))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedBatch { entries })
    }

    /// Run the whole pipeline, returning one URL per image in input order
    pub async fn upload(
        &self,
        username: &str,
        password: &str,
        images: &[Image],
    ) -> Result<Vec<String>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let session_token = self.login(username, password).await?;
        let ticket = self.fetch_ticket(&session_token).await?;
        let form = SignedForm::new(session_token.as_str(), &ticket.ts);

        let total = images.len().div_ceil(FREE_TIER_BATCH_LIMIT);
        let mut urls = Vec::with_capacity(images.len());

        for (index, batch) in batches(images).enumerate() {
            self.caps
                .trace(format!(
                    "uploading batch {}/{} ({} files)",
                    index + 1,
                    total,
                    batch.len()
                ))
                .await;

            let uploaded = self
                .upload_batch(&ticket, &session_token, &form, batch)
                .await?;
            let resolved = self.resolve_batch(&uploaded).await?;
            urls.extend(resolved.into_urls());
        }

        info!("Uploaded {} images in {} batches", urls.len(), total);
        Ok(urls)
    }
}
