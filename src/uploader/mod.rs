//! Upload flows for the superbed provider
//!
//! [`auth`] picks a flow from the stored credentials, [`free`] and [`paid`]
//! implement the two flows and [`form`] holds the signing and multipart
//! assembly they share.

pub mod auth;
pub mod form;
pub mod free;
pub mod paid;

pub use auth::{Credentials, load_uploader_config, resolve_credentials};
pub use form::{NONCE, SignedForm, sign};
pub use free::{FREE_TIER_BATCH_LIMIT, FreeTierUploader, ResolvedBatch, UploadedBatch};
pub use paid::{PaidUploader, order_paid_urls};

use crate::Result;
use serde::de::DeserializeOwned;

/// Parse a provider reply body
///
/// Replies that are not JSON at all are reported as malformed rather than as
/// a raw parser error, since they usually mean an HTML error page.
pub(crate) fn parse_reply<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        crate::Error::malformed_response(format!("reply is not JSON ({}): {}", e, preview(body)))
    })?;
    Ok(serde_json::from_value(value)?)
}

fn preview(body: &str) -> String {
    const LIMIT: usize = 120;
    match body.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
