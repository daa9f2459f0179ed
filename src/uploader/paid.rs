//! Paid-tier upload path
//!
//! Paid accounts skip login entirely: every image goes into one multipart
//! form posted to `{api_url}/upload?token=..`.

use super::{form::file_fields, parse_reply};
use crate::{
    Result,
    config::NetworkSettings,
    host::{Capabilities, HttpRequest, RequestBody},
    types::{Image, PaidUploadResponse},
};
use serde_json::{Map, Value};
use tracing::info;

/// Runs the paid upload for one invocation
pub struct PaidUploader<'a> {
    caps: &'a Capabilities,
    network: &'a NetworkSettings,
}

impl<'a> PaidUploader<'a> {
    pub fn new(caps: &'a Capabilities, network: &'a NetworkSettings) -> Self {
        Self { caps, network }
    }

    /// Upload all images at once, returning one URL per image in input order
    pub async fn upload(&self, token: &str, images: &[Image]) -> Result<Vec<String>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
        let url = format!("{}/upload?token={}", self.network.api_base(), token);

        self.caps
            .trace(format!("uploading {} files with token", images.len()))
            .await;

        let request =
            HttpRequest::post(url).with_body(RequestBody::Multipart(file_fields(images)));

        let body = self.caps.send(request).await?;
        let reply: PaidUploadResponse = parse_reply(&body)?;

        if !reply.status.is_ok() {
            return Err(crate::Error::upload_failed(reply.status.message()));
        }

        let urls = order_paid_urls(&reply.urls, images.len())?;
        info!("Uploaded {} images with paid token", urls.len());
        Ok(urls)
    }
}

/// Position named by a `urls` key: `"3"` or `"file3"`
fn key_index(key: &str) -> Option<usize> {
    key.strip_prefix("file").unwrap_or(key).parse().ok()
}

/// Canonical array-index key (`"0"`, `"17"`, never `"07"`), which object
/// property order lists first, in ascending numeric order
fn array_index(key: &str) -> Option<u32> {
    key.parse::<u32>()
        .ok()
        .filter(|n| *n != u32::MAX && n.to_string() == key)
}

/// Turn the reply's `urls` map into a list parallel to the submitted images
///
/// Keys that name every position `0..count` exactly once are honoured.
/// Otherwise values follow property order: array-index keys ascending, then
/// the remaining keys in document order.
pub fn order_paid_urls(urls: &Map<String, Value>, count: usize) -> Result<Vec<String>> {
    if urls.len() != count {
        return Err(crate::Error::malformed_response(format!(
            "paid reply carried {} urls for {} files",
            urls.len(),
            count
        )));
    }

    let values = urls
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(url) => Ok((key_index(key), url.to_string())),
            None => Err(crate::Error::malformed_response(format!(
                "url for '{}' is not a string",
                key
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut slots: Vec<Option<String>> = vec![None; count];
    let indexed = values.iter().all(|(index, url)| match index {
        Some(i) if *i < count && slots[*i].is_none() => {
            slots[*i] = Some(url.clone());
            true
        }
        _ => false,
    });

    if indexed {
        // count keys, each a distinct slot below count, so every slot is filled
        return Ok(slots.into_iter().flatten().collect());
    }

    let mut ordered: Vec<(Option<u32>, String)> = urls
        .keys()
        .map(|key| array_index(key))
        .zip(values.into_iter().map(|(_, url)| url))
        .collect();
    // stable, so non-index keys keep document order behind the index keys
    ordered.sort_by_key(|(index, _)| index.map_or((1, 0), |n| (0, n)));

    Ok(ordered.into_iter().map(|(_, url)| url).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HttpTransport, MemoryConfigStore, MemoryNotifier, Method};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct OneShotTransport {
        reply: String,
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl HttpTransport for OneShotTransport {
        async fn request(&self, request: HttpRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    fn transport(reply: Value) -> Arc<OneShotTransport> {
        Arc::new(OneShotTransport {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn caps(transport: Arc<OneShotTransport>) -> Capabilities {
        Capabilities::new(
            transport,
            Arc::new(MemoryConfigStore::new()),
            Arc::new(MemoryNotifier::new()),
        )
    }

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    #[case(json!({"0": "a", "1": "b", "2": "c"}), vec!["a", "b", "c"])]
    #[case(json!({"2": "c", "0": "a", "1": "b"}), vec!["a", "b", "c"])]
    #[case(json!({"file1": "b", "file0": "a"}), vec!["a", "b"])]
    #[case(json!({"x": "first", "y": "second"}), vec!["first", "second"])]
    #[case(json!({"0": "a", "0x": "b"}), vec!["a", "b"])]
    #[case(json!({"5": "a", "6": "b"}), vec!["a", "b"])]
    #[case(json!({"6": "b", "5": "a"}), vec!["a", "b"])]
    #[case(json!({"x": "c", "9": "b", "07": "d", "3": "a"}), vec!["a", "b", "c", "d"])]
    #[case(json!({"file9": "b", "file4": "a"}), vec!["b", "a"])]
    fn test_order_paid_urls(#[case] urls: Value, #[case] expected: Vec<&str>) {
        let ordered = order_paid_urls(&map(urls), expected.len()).unwrap();
        assert_eq!(ordered, expected);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let err = order_paid_urls(&map(json!({"0": "a"})), 2).unwrap_err();
        assert!(matches!(err, crate::Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_non_string_url_is_malformed() {
        let err = order_paid_urls(&map(json!({"0": 7})), 1).unwrap_err();
        assert!(matches!(err, crate::Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_single_request_with_all_files() {
        let transport = transport(json!({"err": 0, "urls": {"0": "u0", "1": "u1"}}));
        let caps = caps(transport.clone());
        let network = NetworkSettings::default();
        let images = vec![Image::new(vec![1], "a.png"), Image::new(vec![2], "b.png")];

        let urls = PaidUploader::new(&caps, &network)
            .upload("tok", &images)
            .await
            .unwrap();
        assert_eq!(urls, vec!["u0", "u1"]);

        let seen = transport.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].url, "https://api.superbed.cn/upload?token=tok");
        assert!(seen[0].headers.is_empty());
        assert_eq!(seen[0].file_field_names(), vec!["file0", "file1"]);
    }

    #[tokio::test]
    async fn test_provider_error_is_upload_failure() {
        let transport = transport(json!({"err": 1, "msg": "invalid token"}));
        let caps = caps(transport);
        let network = NetworkSettings::default();

        let err = PaidUploader::new(&caps, &network)
            .upload("bad", &[Image::new(vec![1], "a.png")])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image upload failed: invalid token");
    }
}
