// HTTP transport with bounded retries for slow image backends

use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::protocol::request::{ApiRequest, Auth, GOOG_API_KEY_HEADER};
use crate::utils::logging::redact_key;

/// Which timeout and backoff profile a call uses.
///
/// Reference-guided calls upload multiple inline images and the backend
/// takes longer to answer, so they get a larger read timeout and a
/// slower backoff ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Text-to-image and single-image edit calls
    Generate,
    /// Reference-guided generation calls
    ReferenceGuided,
}

/// HTTP executor for assembled API requests.
///
/// Retries transient network failures (timeouts, refused or reset
/// connections) with linear backoff. HTTP error statuses are never
/// retried; the server already answered.
#[derive(Debug)]
pub struct Transport {
    client: Client,
    config: TransportConfig,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// POST the request, returning the raw body of a successful response.
    pub async fn send(&self, request: &ApiRequest, kind: OperationKind) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let wait = self.backoff_delay(kind, attempt);
                warn!(
                    "retry {} of {} in {:.1}s",
                    attempt,
                    self.config.max_retries,
                    wait.as_secs_f64()
                );
                sleep(wait).await;
            }

            let outcome = self
                .authorized(self.client.post(&request.endpoint), &request.auth)
                .json(&request.body)
                .timeout(self.read_timeout(kind))
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    debug!("API response status: {}", status);
                    if !status.is_success() {
                        let error_text = redact_key(&response.text().await.unwrap_or_default());
                        error!("API error: HTTP {} - {}", status, error_text);
                        return Err(Error::api(status.as_u16(), &error_text));
                    }
                    return Ok(response.text().await?);
                }
                Err(source) if is_transient(&source) && attempt < self.config.max_retries => {
                    warn!("transient network failure: {}", source);
                    attempt += 1;
                }
                Err(source) => {
                    return Err(Error::Transport {
                        attempts: attempt + 1,
                        source,
                    });
                }
            }
        }
    }

    /// GET raw bytes from a result URL. Single attempt; by the time a
    /// backend hands out a URL the expensive work is already done.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.download_timeout_secs))
            .send()
            .await
            .map_err(|source| Error::Transport { attempts: 1, source })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = redact_key(&response.text().await.unwrap_or_default());
            error!("image download failed: HTTP {} - {}", status, error_text);
            return Err(Error::api(status.as_u16(), &error_text));
        }
        Ok(response.bytes().await?.to_vec())
    }

    fn authorized(&self, builder: reqwest::RequestBuilder, auth: &Auth) -> reqwest::RequestBuilder {
        match auth {
            Auth::GoogApiKey(key) => builder.header(GOOG_API_KEY_HEADER, key),
            Auth::Bearer(key) => builder.header("Authorization", format!("Bearer {}", key)),
        }
    }

    fn read_timeout(&self, kind: OperationKind) -> Duration {
        let secs = match kind {
            OperationKind::Generate => self.config.read_timeout_secs,
            OperationKind::ReferenceGuided => self.config.reference_read_timeout_secs,
        };
        Duration::from_secs(secs)
    }

    fn backoff_delay(&self, kind: OperationKind, attempt: u32) -> Duration {
        let per_attempt = match kind {
            OperationKind::Generate => self.config.retry_backoff_secs,
            OperationKind::ReferenceGuided => self.config.reference_retry_backoff_secs,
        };
        Duration::from_secs_f64(per_attempt * attempt as f64)
    }
}

/// Transient failures worth retrying: timeouts and connection-level
/// errors. Anything the server actually answered is not transient.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}
