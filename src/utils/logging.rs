//! Structured logging setup and credential redaction.
//!
//! Configures the `tracing` ecosystem with either human-readable or
//! JSON output, and provides `redact_key` so API keys echoed back in
//! provider error bodies never reach a log sink.

use crate::config::LoggingConfig;
use crate::error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Supports two output formats:
/// - `json`: structured logs for ingestion.
/// - `pretty` (default): human-readable output for the terminal.
///
/// Log levels come from the `RUST_LOG` environment variable when set,
/// otherwise from the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Key prefixes providers are known to echo back in error bodies.
const KEY_PREFIXES: &[&str] = &["AIza", "sk-"];

/// Replaces anything that looks like an API key with a placeholder.
///
/// Provider error responses sometimes quote the credential that failed
/// validation; those bodies end up in logs and in `Api` error text, so
/// they are scrubbed first.
pub fn redact_key(input: &str) -> String {
    const PLACEHOLDER: &str = "[REDACTED_API_KEY]";
    let mut result = input.to_string();
    for prefix in KEY_PREFIXES {
        let mut search_from = 0;
        while let Some(pos) = result[search_from..].find(prefix) {
            let start = search_from + pos;
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
                .map(|i| start + i)
                .unwrap_or(result.len());
            // A bare prefix with nothing after it is not a key.
            if end - start <= prefix.len() {
                search_from = end;
                continue;
            }
            result.replace_range(start..end, PLACEHOLDER);
            search_from = start + PLACEHOLDER.len();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_google_style_keys() {
        let input = r#"{"error": "API key not valid: AIzaSyB12345abcdef"}"#;
        let output = redact_key(input);
        assert!(output.contains("[REDACTED_API_KEY]"));
        assert!(!output.contains("AIzaSyB12345abcdef"));
    }

    #[test]
    fn redacts_openai_style_keys() {
        let input = "Incorrect API key provided: sk-proj-abc123xyz.";
        let output = redact_key(input);
        assert!(output.contains("[REDACTED_API_KEY]"));
        assert!(!output.contains("sk-proj-abc123xyz"));
    }

    #[test]
    fn redacts_every_occurrence() {
        let input = "first sk-aaa111 then sk-bbb222";
        let output = redact_key(input);
        assert_eq!(output.matches("[REDACTED_API_KEY]").count(), 2);
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let input = "HTTP 400: prompt was rejected";
        assert_eq!(redact_key(input), input);
    }

    #[test]
    fn bare_prefix_is_not_a_key() {
        let input = "the sk- prefix marks OpenAI keys";
        assert_eq!(redact_key(input), input);
    }

    #[test]
    fn keys_after_a_bare_prefix_are_still_redacted() {
        let input = "sk- is the prefix, the key was sk-deadbeef99";
        let output = redact_key(input);
        assert!(output.starts_with("sk- is the prefix"));
        assert!(output.ends_with("[REDACTED_API_KEY]"));
    }
}
