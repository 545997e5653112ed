// OpenAI images/generations wire type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed output size requested from OpenAI-compatible backends.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

/// images/generations request body.
#[derive(Debug, Clone, Serialize)]
pub struct ImagesRequest {
    pub prompt: String,
    pub model: String,
    pub n: u32,
    pub size: String,
}

impl ImagesRequest {
    /// Build a request for exactly one image at the default size.
    pub fn single(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            n: 1,
            size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }
}

/// images/generations response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

/// One generated image. Backends return base64 bytes, a URL, or both;
/// some also echo the prompt they actually used.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    pub b64_json: Option<String>,
    pub url: Option<String>,
    pub revised_prompt: Option<String>,
    /// Fields outside the known schema, kept so format errors can name
    /// what the backend actually sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_wire_shape() {
        let request = ImagesRequest::single("a red fox", "dall-e-3");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "prompt": "a red fox",
                "model": "dall-e-3",
                "n": 1,
                "size": "1024x1024"
            })
        );
    }

    #[test]
    fn response_parses_b64_variant() {
        let response: ImagesResponse =
            serde_json::from_value(json!({"data": [{"b64_json": "QUJD"}]})).unwrap();
        assert_eq!(response.data[0].b64_json.as_deref(), Some("QUJD"));
        assert!(response.data[0].url.is_none());
    }

    #[test]
    fn response_parses_url_variant() {
        let response: ImagesResponse = serde_json::from_value(
            json!({"data": [{"url": "https://img.example/x.png", "revised_prompt": "a fox"}]}),
        )
        .unwrap();
        assert_eq!(response.data[0].url.as_deref(), Some("https://img.example/x.png"));
        assert_eq!(response.data[0].revised_prompt.as_deref(), Some("a fox"));
    }

    #[test]
    fn missing_data_parses_to_empty() {
        let response: ImagesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn unknown_fields_are_retained() {
        let response: ImagesResponse =
            serde_json::from_value(json!({"data": [{"seed": 42, "index": 0}]})).unwrap();
        let entry = &response.data[0];
        assert!(entry.b64_json.is_none());
        assert!(entry.url.is_none());
        assert_eq!(entry.extra.len(), 2);
        assert!(entry.extra.contains_key("seed"));
        assert!(entry.extra.contains_key("index"));
    }
}
