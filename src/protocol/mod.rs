// Wire protocol selection and request/response shapes

pub mod request;
pub mod response;

pub use request::{ApiRequest, BuiltRequest};
pub use response::ImagePayload;

/// The two wire dialects the client can speak.
///
/// Which one applies is decided purely from the model name, so the same
/// credential struct works against Google-style and OpenAI-style backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Google generateContent with inline base64 image parts
    GeminiInline,
    /// OpenAI images/generations with b64_json or url results
    OpenAiCompatible,
}

/// Model-name substrings that mark an OpenAI-compatible backend.
const OPENAI_MODEL_MARKERS: &[&str] = &["nano-banana", "dall-e", "dalle"];

impl Protocol {
    /// Pick the protocol for a model name.
    ///
    /// Matching is case-insensitive on the marker substrings; anything
    /// unrecognized falls back to the Gemini dialect.
    pub fn for_model(model: &str) -> Self {
        let lowered = model.to_lowercase();
        if OPENAI_MODEL_MARKERS.iter().any(|m| lowered.contains(m)) {
            Protocol::OpenAiCompatible
        } else {
            Protocol::GeminiInline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::GeminiInline => "gemini-inline",
            Protocol::OpenAiCompatible => "openai-compatible",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of a reference image the model should borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceMode {
    /// Colors, aesthetics and visual style only
    Style,
    /// Layout and arrangement only
    Composition,
    /// Specific visual elements only
    Elements,
    /// Style, composition and elements together
    #[default]
    Full,
}

impl ReferenceMode {
    /// Parse a mode name. Unknown names fall back to `Full` rather than
    /// failing, so stale or hand-typed values still produce an image.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "style" => ReferenceMode::Style,
            "composition" => ReferenceMode::Composition,
            "elements" => ReferenceMode::Elements,
            _ => ReferenceMode::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceMode::Style => "style",
            ReferenceMode::Composition => "composition",
            ReferenceMode::Elements => "elements",
            ReferenceMode::Full => "full",
        }
    }
}

impl std::fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
