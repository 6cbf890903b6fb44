//! High-level generation: submit, wait, extract image URLs

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::transport::JimengClient;

use super::types::GenerationRequest;

/// URL of one result item: the first large image, else the cover image
pub fn extract_image_url(item: &Value) -> Option<String> {
    let large = item
        .get("image")
        .and_then(|image| image.get("large_images"))
        .and_then(|images| images.get(0))
        .and_then(|first| first.get("image_url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty());

    let cover = || {
        item.get("common_attr")
            .and_then(|attr| attr.get("cover_url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    };

    large.or_else(cover).map(str::to_string)
}

/// URLs of every item that has one, in item order
pub fn extract_image_urls(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(extract_image_url).collect()
}

/// Check the arguments every generation needs before any network call
pub fn validate_request(request: &GenerationRequest, token: &str) -> Result<()> {
    // Whitespace-only prompts count as empty too
    if request.prompt.trim().is_empty() {
        return Err(Error::invalid_params("prompt must be a non-empty string"));
    }
    if token.trim().is_empty() {
        return Err(Error::invalid_params("session token is required"));
    }
    Ok(())
}

impl JimengClient {
    /// Generate images and return their URLs.
    ///
    /// Runs the whole job once: no retry happens at this level.
    pub async fn generate_images(&self, request: &GenerationRequest, token: &str) -> Result<Vec<String>> {
        validate_request(request, token)?;

        let job = self.submit(request, token).await?;
        let items = self.poll(&job.history_id, token).await?;
        let urls = extract_image_urls(&items);

        info!(history_id = %job.history_id, count = urls.len(), "Generated images");
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_prefers_large_image() {
        let item = json!({
            "image": {"large_images": [{"image_url": "https://img/large.webp"}, {"image_url": "https://img/second.webp"}]},
            "common_attr": {"cover_url": "https://img/cover.webp"}
        });
        assert_eq!(extract_image_url(&item).as_deref(), Some("https://img/large.webp"));
    }

    #[test]
    fn test_falls_back_to_cover() {
        let item = json!({
            "image": {"large_images": []},
            "common_attr": {"cover_url": "https://img/cover.webp"}
        });
        assert_eq!(extract_image_url(&item).as_deref(), Some("https://img/cover.webp"));

        let no_image = json!({"common_attr": {"cover_url": "https://img/c2.webp"}});
        assert_eq!(extract_image_url(&no_image).as_deref(), Some("https://img/c2.webp"));
    }

    #[test]
    fn test_items_without_urls_are_dropped() {
        let items = vec![
            json!({"image": {"large_images": [{"image_url": "https://img/1.webp"}]}}),
            Value::Null,
            json!({"image": {}, "common_attr": {}}),
            json!({"common_attr": {"cover_url": "https://img/2.webp"}}),
        ];
        assert_eq!(
            extract_image_urls(&items),
            vec!["https://img/1.webp", "https://img/2.webp"]
        );
    }

    #[test]
    fn test_validation() {
        let empty = GenerationRequest::new("   ");
        assert_eq!(validate_request(&empty, "tok").unwrap_err().kind(), ErrorKind::InvalidParams);

        let ok = GenerationRequest::new("a cat");
        assert_eq!(validate_request(&ok, "").unwrap_err().kind(), ErrorKind::InvalidParams);
        assert!(validate_request(&ok, "tok").is_ok());
    }
}
