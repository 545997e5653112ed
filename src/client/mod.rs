// Image generation client: orchestrates request building, transport,
// extraction and saving for the three operations

use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, Credential};
use crate::error::{truncate_chars, Error, Result};
use crate::protocol::request::RequestBuilder;
use crate::protocol::{response, BuiltRequest, Protocol, ReferenceMode};
use crate::transport::{OperationKind, Transport};

/// Endpoint paths users paste into the base URL by mistake.
const ENDPOINT_SUFFIXES: &[&str] = &[
    "/v1/images/generations",
    "/v1beta/models",
    "/v1/chat/completions",
];

/// Outcome of one successful generation or edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Where the decoded PNG was written
    pub saved_path: PathBuf,
    /// Decoded image size
    pub byte_length: usize,
}

/// Client for text-to-image, reference-guided and edit calls.
///
/// One client speaks exactly one protocol, decided from the configured
/// model name. Every successful call writes one PNG into the output
/// directory and returns its path.
#[derive(Debug)]
pub struct ImageClient {
    credential: Credential,
    transport: Transport,
    output_dir: PathBuf,
}

impl ImageClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut credential = config.api.credential();
        if credential.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is not configured (set api.api_key in the config file or the \
                 PROMPT2PNG_API__API_KEY environment variable)"
                    .to_string(),
            ));
        }
        credential.base_url = normalize_base_url(&credential.base_url);

        info!(
            "API base URL: {}, model: {}, protocol: {}",
            credential.base_url,
            credential.model,
            Protocol::for_model(&credential.model)
        );

        Ok(Self {
            credential,
            transport: Transport::new(config.transport.clone())?,
            output_dir: config.output.save_dir.clone(),
        })
    }

    /// Generate an image from text alone.
    pub async fn generate(
        &self,
        instruction: &str,
        filename: Option<String>,
    ) -> Result<GenerationResult> {
        info!("generating image");
        debug!("instruction: {}", truncate_chars(instruction, 100));

        let builder = RequestBuilder::new(&self.credential);
        let request = builder.text_to_image(instruction)?;
        let body = self.transport.send(&request, OperationKind::Generate).await?;
        let payload = response::extract(builder.protocol(), &body)?;
        let bytes = response::resolve(payload, &self.transport).await?;
        self.save(bytes, filename, "infographic")
    }

    /// Generate a new image guided by one or more reference images.
    ///
    /// Backends without image input support are served a plain
    /// text-to-image call instead; the references are dropped, not an
    /// error.
    pub async fn generate_with_references(
        &self,
        instruction: &str,
        images: &[Vec<u8>],
        mode: ReferenceMode,
        filename: Option<String>,
    ) -> Result<GenerationResult> {
        info!(
            "generating with {} reference image(s), mode: {}",
            images.len(),
            mode
        );

        let builder = RequestBuilder::new(&self.credential);
        let request = match builder.reference_guided(instruction, images, mode)? {
            BuiltRequest::Ready(request) => request,
            BuiltRequest::FallbackToTextOnly => {
                warn!("model does not support reference images, generating from text only");
                return self.generate(instruction, filename).await;
            }
        };

        let body = self
            .transport
            .send(&request, OperationKind::ReferenceGuided)
            .await?;
        let payload = response::extract(builder.protocol(), &body)?;
        let bytes = response::resolve(payload, &self.transport).await?;
        self.save(bytes, filename, "reference")
    }

    /// Edit an existing image according to an instruction.
    pub async fn edit_with_image(
        &self,
        instruction: &str,
        image: &[u8],
        filename: Option<String>,
    ) -> Result<GenerationResult> {
        info!("editing image ({} input bytes)", image.len());
        debug!("edit instruction: {}", truncate_chars(instruction, 100));

        let builder = RequestBuilder::new(&self.credential);
        let request = match builder.image_edit(instruction, image)? {
            BuiltRequest::Ready(request) => request,
            BuiltRequest::FallbackToTextOnly => {
                warn!("model does not support image editing, generating from text only");
                return self.generate(instruction, filename).await;
            }
        };

        let body = self.transport.send(&request, OperationKind::Generate).await?;
        let payload = response::extract(builder.protocol(), &body)?;
        let bytes = response::resolve(payload, &self.transport).await?;
        self.save(bytes, filename, "edited")
    }

    /// Write fully decoded bytes to the output directory. Nothing is
    /// written until the whole image is in memory, so failed calls
    /// leave no partial files behind.
    fn save(
        &self,
        bytes: Vec<u8>,
        filename: Option<String>,
        prefix: &str,
    ) -> Result<GenerationResult> {
        let filename = filename.unwrap_or_else(|| timestamped_filename(prefix));
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(filename);
        std::fs::write(&path, &bytes)?;
        info!("image saved: {} ({} bytes)", path.display(), bytes.len());
        Ok(GenerationResult {
            saved_path: path,
            byte_length: bytes.len(),
        })
    }
}

fn timestamped_filename(prefix: &str) -> String {
    format!("{}_{}.png", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Strip trailing slashes and any known endpoint path the user pasted
/// into the base URL along with the host.
fn normalize_base_url(url: &str) -> String {
    let mut base = url.trim_end_matches('/').to_string();
    for suffix in ENDPOINT_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix) {
            warn!("removed endpoint path {} from base URL", suffix);
            base = stripped.to_string();
            break;
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, AppConfig};

    fn config_with_key(api_key: &str) -> AppConfig {
        AppConfig {
            api: ApiConfig {
                api_key: api_key.to_string(),
                ..ApiConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn construction_requires_an_api_key() {
        let err = ImageClient::new(&config_with_key("")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ImageClient::new(&config_with_key("   ")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn construction_normalizes_the_base_url() {
        let mut config = config_with_key("k");
        config.api.base_url = "https://api.example.com/v1beta/models/".to_string();
        let client = ImageClient::new(&config).unwrap();
        assert_eq!(client.credential.base_url, "https://api.example.com");
    }

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://api.example.com///"),
            "https://api.example.com"
        );
    }

    #[test]
    fn normalize_strips_each_known_endpoint_suffix() {
        assert_eq!(
            normalize_base_url("https://x.example/v1/images/generations"),
            "https://x.example"
        );
        assert_eq!(
            normalize_base_url("https://x.example/v1beta/models"),
            "https://x.example"
        );
        assert_eq!(
            normalize_base_url("https://x.example/v1/chat/completions"),
            "https://x.example"
        );
    }

    #[test]
    fn normalize_leaves_clean_urls_alone() {
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com"),
            "https://generativelanguage.googleapis.com"
        );
    }

    #[test]
    fn normalize_ignores_suffixes_in_the_middle() {
        assert_eq!(
            normalize_base_url("https://x.example/v1beta/models/proxy"),
            "https://x.example/v1beta/models/proxy"
        );
    }

    #[test]
    fn timestamped_filenames_carry_prefix_and_extension() {
        let name = timestamped_filename("edited");
        assert!(name.starts_with("edited_"));
        assert!(name.ends_with(".png"));
        // edited_YYYYMMDD_HHMMSS.png
        assert_eq!(name.len(), "edited_".len() + 15 + ".png".len());
    }

    #[test]
    fn save_writes_bytes_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_key("k");
        config.output.save_dir = dir.path().join("nested").join("out");

        let client = ImageClient::new(&config).unwrap();
        let result = client
            .save(vec![1, 2, 3], Some("pic.png".to_string()), "infographic")
            .unwrap();

        assert_eq!(result.byte_length, 3);
        assert_eq!(result.saved_path, dir.path().join("nested").join("out").join("pic.png"));
        assert_eq!(std::fs::read(&result.saved_path).unwrap(), vec![1, 2, 3]);
    }
}
