// Error types for the prompt2png image client

use thiserror::Error;

/// Maximum number of characters of an upstream error body kept in an
/// [`Error::Api`] value. Upstream services occasionally return multi-kilobyte
/// HTML error pages; everything past this bound is noise.
pub const API_BODY_EXCERPT_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A network-level failure that survived the retry budget.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network failure after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status. Never retried; the body is
    /// pre-truncated to [`API_BODY_EXCERPT_CHARS`].
    #[error("API request failed: HTTP {status} - {body}")]
    Api { status: u16, body: String },

    /// The response parsed as JSON but did not have the expected shape.
    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    /// The model answered with prose where an image was requested. Kept
    /// separate from [`Error::ResponseFormat`] so callers can surface an
    /// actionable message (the request succeeded; the model just declined).
    #[error("model returned text instead of an image: {0}")]
    TextInsteadOfImage(String),

    #[error("image data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::Api`] from a status code and a raw body, applying
    /// the excerpt bound.
    pub fn api(status: u16, body: &str) -> Self {
        Error::Api {
            status,
            body: truncate_chars(body, API_BODY_EXCERPT_CHARS),
        }
    }
}

/// Truncate on a char boundary; upstream bodies are frequently non-ASCII.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_body_is_truncated() {
        let body = "x".repeat(500);
        let err = Error::api(502, &body);
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), API_BODY_EXCERPT_CHARS);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "图".repeat(300);
        let out = truncate_chars(&s, 200);
        assert_eq!(out.chars().count(), 200);
    }

    #[test]
    fn short_bodies_pass_through() {
        let err = Error::api(404, "not found");
        assert!(format!("{err}").contains("HTTP 404"));
        assert!(format!("{err}").contains("not found"));
    }
}
