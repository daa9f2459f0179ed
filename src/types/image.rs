//! Image and upload context types
//!
//! `OutputItem` is what the host hands over; `Image` is the immutable
//! byte buffer the pipeline actually uploads.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// One image ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    buffer: Vec<u8>,
    file_name: String,
}

impl Image {
    /// Create a new image from raw bytes
    pub fn new(buffer: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            buffer: buffer.into(),
            file_name: file_name.into(),
        }
    }

    /// Raw image bytes
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// File name sent with the multipart part
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// A host output entry
///
/// On success the uploader fills in `img_url`; on failure the entry is left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputItem {
    /// Raw image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<Vec<u8>>,

    /// Base64 image payload, used when `buffer` is absent
    #[serde(
        rename = "base64Image",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base64_image: Option<String>,

    /// File name of the image
    #[serde(rename = "fileName")]
    pub file_name: String,

    /// Public URL assigned after a successful upload
    #[serde(rename = "imgUrl", default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl OutputItem {
    /// Create an item from raw bytes
    pub fn from_buffer(buffer: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            buffer: Some(buffer.into()),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Create an item from a base64 payload
    pub fn from_base64(data: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            base64_image: Some(data.into()),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// Produce the uploadable image, decoding base64 when there is no buffer
    pub fn to_image(&self) -> crate::Result<Image> {
        if let Some(buffer) = &self.buffer {
            return Ok(Image::new(buffer.clone(), self.file_name.clone()));
        }

        match &self.base64_image {
            Some(data) => {
                let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
                Ok(Image::new(bytes, self.file_name.clone()))
            }
            None => Err(crate::Error::invalid_image(
                self.file_name.as_str(),
                "neither buffer nor base64 data present",
            )),
        }
    }
}

/// Per-invocation upload context handed over by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadContext {
    /// Ordered list of items to upload
    pub output: Vec<OutputItem>,
}

impl UploadContext {
    /// Create a context from output items
    pub fn new(output: Vec<OutputItem>) -> Self {
        Self { output }
    }

    /// Convert every item into an uploadable image, preserving order
    pub fn images(&self) -> crate::Result<Vec<Image>> {
        self.output.iter().map(OutputItem::to_image).collect()
    }

    /// Assign URLs positionally
    ///
    /// Callers must pass exactly one URL per item.
    pub fn assign_urls(&mut self, urls: Vec<String>) -> crate::Result<()> {
        if urls.len() != self.output.len() {
            return Err(crate::Error::malformed_response(format!(
                "got {} urls for {} images",
                urls.len(),
                self.output.len()
            )));
        }

        for (item, url) in self.output.iter_mut().zip(urls) {
            item.img_url = Some(url);
        }
        Ok(())
    }

    /// URLs assigned so far, in item order
    pub fn urls(&self) -> Vec<Option<&str>> {
        self.output.iter().map(|item| item.img_url.as_deref()).collect()
    }
}
