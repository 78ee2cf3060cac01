//! Azure OpenAI text-to-speech implementation

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use super::provider::TextToSpeech;
use super::retry_after::RetryAfter;
use super::types::{AudioData, SynthesisRequest, Voice};
use crate::credentials::ApiKey;
use crate::error::{Result, TtsError};
use crate::settings::EndpointConfig;

pub struct AzureOpenAiTts {
    endpoint: EndpointConfig,
    api_key: ApiKey,
    client: Client,
}

impl AzureOpenAiTts {
    pub fn new(endpoint: EndpointConfig, api_key: ApiKey) -> Self {
        Self {
            endpoint,
            api_key,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: Voice,
}

#[async_trait]
impl TextToSpeech for AzureOpenAiTts {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData> {
        let url = self.endpoint.speech_url();

        let request_body = SpeechRequest {
            model: &self.endpoint.deployment_name,
            input: request.text(),
            voice: request.voice(),
        };

        debug!(
            "POST {url} (voice={}, {} chars)",
            request.voice(),
            request.text().chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &headers, body));
        }

        let bytes = response.bytes().await?.to_vec();
        debug!("Received {} bytes of audio", bytes.len());

        Ok(AudioData { bytes })
    }
}

/// Turn a non-2xx response into the matching error. 429 keeps the parsed
/// `Retry-After` so the caller can tell the user how long to wait.
fn classify_failure(status: StatusCode, headers: &HeaderMap, body: String) -> TtsError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| RetryAfter::parse(value, Utc::now()));
        warn!("Rate limited by Azure, retry_after={retry_after:?}");
        return TtsError::RateLimited { retry_after };
    }

    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    };
    warn!("Azure API error {status}: {message}");
    TtsError::HttpStatus { status, message }
}
