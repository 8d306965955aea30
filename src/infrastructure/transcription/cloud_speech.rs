//! Cloud speech recognition adapter
//!
//! Talks to the Speech-to-Text v1 recognize endpoint with base64 audio
//! in the request body and a bearer token for auth. The response may
//! carry several result chunks; their first alternatives are joined
//! with single spaces into one transcript.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::domain::audio::AudioData;

/// Default recognize endpoint
pub const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";

// Request types

#[derive(Debug, Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: String,
    sample_rate_hertz: u32,
    language_code: String,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

// Response types

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    results: Option<Vec<RecognitionResult>>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    alternatives: Option<Vec<RecognitionAlternative>>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    transcript: Option<String>,
}

/// Cloud speech recognizer
pub struct CloudSpeechTranscriber {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl CloudSpeechTranscriber {
    /// Create a transcriber against the default endpoint
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoint(token, DEFAULT_ENDPOINT)
    }

    /// Create a transcriber against a custom endpoint
    pub fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the request body
    fn build_request(audio: &AudioData, language: &str) -> RecognizeRequest {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: audio.codec().api_encoding().to_string(),
                sample_rate_hertz: audio.sample_rate_hz(),
                language_code: language.to_string(),
            },
            audio: RecognitionAudio {
                content: audio.to_base64(),
            },
        }
    }

    /// Join every result's first alternative into one transcript.
    ///
    /// Missing results or alternatives are not errors; they mean the
    /// service recognized no speech.
    fn join_transcripts(response: &RecognizeResponse) -> String {
        response
            .results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.alternatives.as_ref()?.first()?.transcript.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl SpeechTranscriber for CloudSpeechTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioData,
        language: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let body = Self::build_request(audio, language);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TranscriptionError::Auth);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranscriptionError::Api(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let response: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Malformed(e.to_string()))?;

        Ok(Transcript::new(Self::join_transcripts(&response)))
    }
}
