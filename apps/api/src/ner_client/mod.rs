/// NER Client: token-classification calls against the Hugging Face Inference API.
///
/// This is the only module that talks to the model host. The pipeline sees it
/// through the `EntityTagger` trait.
///
/// Uses the blocking reqwest client: the pipeline is synchronous and runs on
/// tokio's blocking pool, so the client must also be built off the async runtime.
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extraction::recognizer::{EntityTagger, TaggedSpan, TaggerError};

pub const DEFAULT_MODEL: &str = "dslim/bert-base-NER";
pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    aggregation_strategy: &'a str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HfTaggerConfig {
    pub api_url: String,
    pub model: String,
    pub api_token: String,
    pub timeout: Duration,
}

/// Hosted `dslim/bert-base-NER` (or any token-classification model) tagger.
pub struct HfInferenceTagger {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl HfInferenceTagger {
    /// Must not be called from inside an async context.
    pub fn new(config: HfTaggerConfig) -> Result<Self, TaggerError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/{}", config.api_url.trim_end_matches('/'), config.model),
            api_token: config.api_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Retries 429 (rate limit) and 5xx (including 503 "model loading")
    /// with exponential backoff.
    fn call(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        let request_body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                aggregation_strategy: "simple",
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let mut last_error: Option<TaggerError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "NER call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                std::thread::sleep(delay);
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_token)
                .json(&request_body)
                .send();

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(TaggerError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().unwrap_or_default();
                warn!("NER API returned {}: {}", status, body);
                last_error = Some(TaggerError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(TaggerError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
            }

            let body = response.text()?;
            let spans: Vec<TaggedSpan> = serde_json::from_str(&body)?;
            debug!("NER call succeeded: {} spans", spans.len());
            return Ok(spans);
        }

        Err(last_error.unwrap_or_else(|| {
            TaggerError::Unavailable(format!("no response after {MAX_RETRIES} attempts"))
        }))
    }
}

impl EntityTagger for HfInferenceTagger {
    fn backend(&self) -> &str {
        "huggingface"
    }

    fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        self.call(text)
    }
}

/// Pulls `error` out of an inference error body, or returns the body as-is.
fn error_message(body: String) -> String {
    serde_json::from_str::<InferenceError>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}
