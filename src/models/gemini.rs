// Gemini generateContent wire type definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mime type requested for and attached to every image part.
pub const PNG_MIME_TYPE: &str = "image/png";

/// generateContent request body.
///
/// The endpoint accepts a full conversation, but image generation only
/// ever sends a single user content with text and inline image parts.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,

    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Build a request asking for one PNG image from the given parts.
    pub fn png(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: PNG_MIME_TYPE.to_string(),
            },
        }
    }
}

/// Content in a single turn.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// Individual part of a request body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content part.
    Text { text: String },

    /// Inline image part, base64 encoded.
    InlineData { inline_data: InlineData },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Wrap already-encoded base64 PNG bytes as an inline image part.
    pub fn png_image(base64_data: String) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: PNG_MIME_TYPE.to_string(),
                data: base64_data,
            },
        }
    }
}

/// Inline image data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

/// Generation parameters. Only the output mime type is ever set.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

/// generateContent response body.
///
/// Shaped leniently on purpose: every level is optional so a malformed
/// response still parses and the extractor can report precisely which
/// level was absent instead of failing with a generic serde error.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Response candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

/// Candidate content. Parts stay untyped because servers have shipped
/// both `inlineData` and `inline_data` spellings and the extractor
/// needs the raw keys for its diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<Value>>,
}
