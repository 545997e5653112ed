// Request construction for both wire protocols

use base64::Engine;
use serde_json::Value;

use crate::config::Credential;
use crate::error::{Error, Result};
use crate::models::gemini::{GenerateContentRequest, Part};
use crate::models::openai::ImagesRequest;
use crate::protocol::{Protocol, ReferenceMode};

/// Header carrying the API key on Gemini-style requests.
pub const GOOG_API_KEY_HEADER: &str = "x-goog-api-key";

/// How the API key travels with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// `x-goog-api-key: <key>`
    GoogApiKey(String),
    /// `Authorization: Bearer <key>`
    Bearer(String),
}

/// A fully assembled request, ready for the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: String,
    pub auth: Auth,
    pub body: Value,
}

/// Outcome of building a request that the selected protocol may not be
/// able to express.
#[derive(Debug, Clone)]
pub enum BuiltRequest {
    Ready(ApiRequest),
    /// The protocol cannot carry input images. The caller is expected
    /// to run plain text-to-image generation instead; this is degraded
    /// service, not an error.
    FallbackToTextOnly,
}

/// Assembles protocol-specific request bodies for one credential.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    credential: &'a Credential,
    protocol: Protocol,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(credential: &'a Credential) -> Self {
        Self {
            credential,
            protocol: Protocol::for_model(&credential.model),
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Build a plain text-to-image request.
    pub fn text_to_image(&self, instruction: &str) -> Result<ApiRequest> {
        match self.protocol {
            Protocol::GeminiInline => {
                let body = GenerateContentRequest::png(vec![Part::text(instruction)]);
                self.gemini_request(serde_json::to_value(body)?)
            }
            Protocol::OpenAiCompatible => {
                let body = ImagesRequest::single(instruction, &self.credential.model);
                Ok(ApiRequest {
                    endpoint: format!("{}/v1/images/generations", self.credential.base_url),
                    auth: Auth::Bearer(self.credential.api_key.clone()),
                    body: serde_json::to_value(body)?,
                })
            }
        }
    }

    /// Build a reference-guided generation request: the instruction is
    /// wrapped in a framing prompt that tells the model how to use the
    /// reference images, which follow as inline parts.
    pub fn reference_guided(
        &self,
        instruction: &str,
        images: &[Vec<u8>],
        mode: ReferenceMode,
    ) -> Result<BuiltRequest> {
        if images.is_empty() {
            return Err(Error::InvalidRequest(
                "reference-guided generation requires at least one image".to_string(),
            ));
        }
        if self.protocol == Protocol::OpenAiCompatible {
            return Ok(BuiltRequest::FallbackToTextOnly);
        }

        let framed = frame_reference_prompt(instruction, mode, images.len());
        let mut parts = vec![Part::text(framed)];
        for image in images {
            parts.push(Part::png_image(encode_png(image)));
        }

        let body = GenerateContentRequest::png(parts);
        Ok(BuiltRequest::Ready(
            self.gemini_request(serde_json::to_value(body)?)?,
        ))
    }

    /// Build an image-edit request: the instruction text plus exactly
    /// one inline input image, no framing prompt.
    pub fn image_edit(&self, instruction: &str, image: &[u8]) -> Result<BuiltRequest> {
        if self.protocol == Protocol::OpenAiCompatible {
            return Ok(BuiltRequest::FallbackToTextOnly);
        }

        let parts = vec![Part::text(instruction), Part::png_image(encode_png(image))];
        let body = GenerateContentRequest::png(parts);
        Ok(BuiltRequest::Ready(
            self.gemini_request(serde_json::to_value(body)?)?,
        ))
    }

    fn gemini_request(&self, body: Value) -> Result<ApiRequest> {
        Ok(ApiRequest {
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                self.credential.base_url, self.credential.model
            ),
            auth: Auth::GoogApiKey(self.credential.api_key.clone()),
            body,
        })
    }
}

fn encode_png(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Instructional preamble telling the model what to borrow from the
/// reference images. Texts are fixed per mode.
fn mode_preamble(mode: ReferenceMode) -> &'static str {
    match mode {
        ReferenceMode::Style => {
            "Use the reference image(s) as STYLE inspiration. Analyze the artistic style, \
             color palette, texture, and visual treatment, then create a new image with the \
             same style but following the user's requirements."
        }
        ReferenceMode::Composition => {
            "Use the reference image(s) as COMPOSITION reference. Analyze the layout, \
             spatial arrangement, balance, and structure, then create a new image with \
             similar composition but following the user's requirements."
        }
        ReferenceMode::Elements => {
            "Use the reference image(s) as ELEMENTS reference. Identify key visual \
             elements, objects, or motifs, then incorporate similar elements into a new \
             image following the user's requirements."
        }
        ReferenceMode::Full => {
            "Use the reference image(s) as COMPREHENSIVE reference. Analyze and draw \
             inspiration from style, composition, elements, and overall aesthetic, then \
             create a new image following the user's requirements."
        }
    }
}

/// Wrap the user's instruction with the reference-mode framing the
/// model responds to. A note is added when several images are attached
/// so the model treats them as one pool rather than picking the first.
fn frame_reference_prompt(instruction: &str, mode: ReferenceMode, image_count: usize) -> String {
    let multi_image_note = if image_count > 1 {
        format!(
            "\n\nNOTE: You are provided with {image_count} reference images. Analyze all \
             of them and synthesize their common features or combine their best aspects \
             according to the reference mode."
        )
    } else {
        String::new()
    };

    format!(
        "Please analyze the provided reference image(s) and create a new image based on them.\n\
         \n\
         REFERENCE MODE: {mode_instruction}{multi_image_note}\n\
         \n\
         USER REQUIREMENTS:\n\
         {instruction}\n\
         \n\
         Important:\n\
         - Generate a NEW creative work (not an edit of the reference)\n\
         - Follow the reference mode instructions carefully\n\
         - Maintain high quality and artistic coherence\n\
         - Output as PNG image",
        mode_instruction = mode_preamble(mode),
    )
}
