//! Cross-cutting helpers.
//!
//! - `logging`: tracing initialization and key redaction for log-bound
//!   text.

pub mod logging;
