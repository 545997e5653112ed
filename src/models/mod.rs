//! Data models for the two provider wire formats.
//!
//! This module contains the type definitions for request/response bodies used by:
//! - Google-style generateContent with inline image parts (`gemini`)
//! - OpenAI-style images/generations (`openai`)

pub mod gemini;
pub mod openai;

pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
pub use openai::{ImageData, ImagesRequest, ImagesResponse};
