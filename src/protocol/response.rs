// Response parsing and image payload resolution

use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{truncate_chars, Error, Result};
use crate::models::gemini::GenerateContentResponse;
use crate::models::openai::ImagesResponse;
use crate::protocol::Protocol;
use crate::transport::Transport;

/// Characters of model text kept when the backend answers with prose
/// instead of an image.
const TEXT_EXCERPT_CHARS: usize = 100;

/// Image bytes as they appear in a response, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Base64 bytes carried inline in the response body
    Inline(String),
    /// Bytes live behind a URL and need a second fetch
    Url(String),
}

/// Pull the image payload out of a raw response body.
pub fn extract(protocol: Protocol, body: &str) -> Result<ImagePayload> {
    match protocol {
        Protocol::GeminiInline => extract_gemini(body),
        Protocol::OpenAiCompatible => extract_openai(body),
    }
}

fn extract_gemini(body: &str) -> Result<ImagePayload> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::ResponseFormat("response carries no candidates".to_string()))?;
    let parts = candidate
        .content
        .and_then(|content| content.parts)
        .ok_or_else(|| {
            Error::ResponseFormat("candidate is missing content or parts".to_string())
        })?;
    let part = parts
        .first()
        .ok_or_else(|| Error::ResponseFormat("candidate parts array is empty".to_string()))?;

    // Both spellings of the inline field have been seen in the wild.
    if let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) {
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                Error::ResponseFormat("image part carries no data field".to_string())
            })?;
        return Ok(ImagePayload::Inline(data.to_string()));
    }

    if let Some(text) = part.get("text").and_then(Value::as_str) {
        return Err(Error::TextInsteadOfImage(truncate_chars(
            text,
            TEXT_EXCERPT_CHARS,
        )));
    }

    let keys: Vec<&str> = match part.as_object() {
        Some(map) => map.keys().map(String::as_str).collect(),
        None => Vec::new(),
    };
    Err(Error::ResponseFormat(format!(
        "no image data field in first part, available keys: {:?}",
        keys
    )))
}

fn extract_openai(body: &str) -> Result<ImagePayload> {
    let response: ImagesResponse = serde_json::from_str(body)?;
    let image = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::ResponseFormat("response carries no data entries".to_string()))?;

    if let Some(revised) = &image.revised_prompt {
        debug!("backend revised the prompt: {}", revised);
    }

    if let Some(b64) = image.b64_json {
        return Ok(ImagePayload::Inline(b64));
    }
    if let Some(url) = image.url {
        return Ok(ImagePayload::Url(url));
    }

    let mut keys: Vec<&str> = Vec::new();
    if image.revised_prompt.is_some() {
        keys.push("revised_prompt");
    }
    keys.extend(image.extra.keys().map(String::as_str));
    Err(Error::ResponseFormat(format!(
        "data entry has neither b64_json nor url, available keys: {:?}",
        keys
    )))
}

/// Resolve a payload to raw bytes: decode inline base64, or download
/// URL-based results through the transport.
pub async fn resolve(payload: ImagePayload, transport: &Transport) -> Result<Vec<u8>> {
    let bytes = match payload {
        ImagePayload::Inline(b64) => {
            debug!("decoding {} characters of inline image data", b64.len());
            decode(&b64)?
        }
        ImagePayload::Url(url) => {
            info!("result is URL-based, downloading image");
            transport.download(&url).await?
        }
    };
    if bytes.is_empty() {
        return Err(Error::ResponseFormat(
            "image payload decoded to zero bytes".to_string(),
        ));
    }
    Ok(bytes)
}

/// Decode base64 image bytes.
pub fn decode(b64: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(b64)?)
}
