//! Reqwest-backed implementation of [`BackendApi`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use crate::api::types::{
    AudioTurnResponse, KeywordsResponse, OpeningQuestion, TurnRequest, TurnResponse,
};
use crate::api::BackendApi;
use crate::capture::AudioClip;
use crate::config::ClientConfig;
use crate::conversation::StepToken;
use crate::error::{ApiError, ConfigError};
use crate::recommendations::CompanyRecord;

/// HTTP client for the assistant backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            message: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "request_timeout".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn decode(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn advance_turn(&self, request: &TurnRequest) -> Result<TurnResponse, ApiError> {
        let url = self.endpoint("api/voice_interaction")?;
        tracing::debug!(step = %request.step, "POST {url}");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        // Turn failures arrive as JSON bodies with a non-2xx status and an
        // `error` field; decode regardless of status so they surface as a
        // failed turn rather than a transport error.
        response.json().await.map_err(decode)
    }

    async fn transcribe_audio(
        &self,
        clip: &AudioClip,
        step: &StepToken,
    ) -> Result<AudioTurnResponse, ApiError> {
        let url = self.endpoint("api/process_audio")?;
        tracing::debug!(step = %step, bytes = clip.data.len(), "POST {url}");
        let part = Part::bytes(clip.data.clone())
            .file_name("capture.webm")
            .mime_str(&clip.mime_type)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let form = Form::new()
            .part("audio", part)
            .text("step", step.as_str().to_string());
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(decode)
    }

    async fn opening_question(&self, step: &StepToken) -> Result<OpeningQuestion, ApiError> {
        let mut url = self.endpoint("api/get_question")?;
        url.query_pairs_mut().append_pair("step", step.as_str());
        let response = self.client.get(url).send().await.map_err(transport)?;
        response.json().await.map_err(decode)
    }

    async fn recommendations(&self, regenerate: bool) -> Result<Vec<CompanyRecord>, ApiError> {
        let mut url = self.endpoint("api/recommendations")?;
        if regenerate {
            url.query_pairs_mut().append_pair("regenerate", "true");
        }
        tracing::debug!(regenerate, "GET {url}");
        let response = self.client.get(url).send().await.map_err(transport)?;
        response.json().await.map_err(decode)
    }

    async fn extracted_keywords(&self) -> Result<KeywordsResponse, ApiError> {
        let url = self.endpoint("api/keywords")?;
        let response = self.client.get(url).send().await.map_err(transport)?;
        response.json().await.map_err(decode)
    }
}
