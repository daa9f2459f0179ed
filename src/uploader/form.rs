//! Multipart form assembly and request signing

use crate::{host::FormField, types::Image};
use md5::{Digest, Md5};
use std::fmt;

/// Fixed nonce the provider expects in every signed upload
pub const NONCE: u64 = 646703147;

/// Lowercase-hex MD5 of `{token}_{ts}_{nonce}`
pub fn sign(token: &str, ts: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{}_{}_{}", token, ts, NONCE).as_bytes());
    hex::encode(hasher.finalize())
}

/// Session values every free-tier batch is signed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedForm {
    token: String,
    ts: String,
}

impl SignedForm {
    pub fn new(token: impl Into<String>, ts: impl fmt::Display) -> Self {
        Self {
            token: token.into(),
            ts: ts.to_string(),
        }
    }

    /// Signature over the session values; independent of file content
    pub fn signature(&self) -> String {
        sign(&self.token, &self.ts)
    }

    /// Base fields in wire order
    pub fn base_fields(&self) -> Vec<FormField> {
        vec![
            FormField::text("nonce", NONCE.to_string()),
            FormField::text("ts", self.ts.clone()),
            FormField::text("token", self.token.clone()),
            FormField::text("sign", self.signature()),
            FormField::text("_xsrf", ""),
            FormField::text("endpoints", "superbed"),
            FormField::text("categories", ""),
        ]
    }

    /// Base fields followed by one file field per image of the batch
    pub fn batch_fields(&self, batch: &[Image]) -> Vec<FormField> {
        let mut fields = self.base_fields();
        fields.extend(file_fields(batch));
        fields
    }
}

/// `file0..fileN`, keyed by position within `images`
pub fn file_fields(images: &[Image]) -> Vec<FormField> {
    images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            FormField::file(
                format!("file{}", i),
                image.file_name(),
                image.buffer().to_vec(),
            )
        })
        .collect()
}
