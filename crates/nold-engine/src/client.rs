use nold_contracts::request::ChatCompletionRequest;
use nold_contracts::response::ApiResponse;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CategorizerConfig;
use crate::error::ApiError;

const BODY_EXCERPT_MAX_CHARS: usize = 512;

pub trait ChatCompletionClient {
    fn complete(
        &self,
        credential: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ApiResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: String,
    http: HttpClient,
}

impl OpenAiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_http(endpoint, HttpClient::new())
    }

    pub fn with_http(endpoint: impl Into<String>, http: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn from_config(config: &CategorizerConfig) -> Self {
        Self::new(config.chat_completions_endpoint())
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        ApiError::Transport {
            endpoint: self.endpoint.clone(),
            error,
        }
    }
}

impl ChatCompletionClient for OpenAiClient {
    // Non-2xx bodies are decoded like any other response.
    fn complete(
        &self,
        credential: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ApiResponse, ApiError> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            max_tokens = request.max_tokens,
            images = request.image_count(),
            "posting chat completion"
        );
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| self.transport_error(error))?;
        if !status.is_success() {
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "chat completion returned a non-success status"
            );
        }

        let raw: Value = serde_json::from_str(&body).map_err(|error| ApiError::Decode {
            endpoint: self.endpoint.clone(),
            status: status.as_u16(),
            excerpt: truncate_text(&body, BODY_EXCERPT_MAX_CHARS),
            error,
        })?;
        Ok(ApiResponse::new(raw))
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
