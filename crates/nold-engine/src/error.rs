use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Credential,
    Images,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Credential => f.write_str("API key"),
            MissingField::Images => f.write_str("images"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {error}")]
    Transport {
        endpoint: String,
        error: reqwest::Error,
    },
    #[error("response from {endpoint} (HTTP {status}) is not valid JSON: {error}; body: {excerpt}")]
    Decode {
        endpoint: String,
        status: u16,
        excerpt: String,
        error: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CategorizeError {
    #[error("please provide: {}", join_fields(.missing))]
    Validation { missing: Vec<MissingField> },
    // Messages embed the inner error, so nothing is chained as a source.
    #[error("could not reach the model API: {0}")]
    Transport(ApiError),
    #[error("the model API returned an unreadable response: {0}")]
    Decode(ApiError),
}

impl CategorizeError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CategorizeError::Validation { .. })
    }
}

impl From<ApiError> for CategorizeError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport { .. } => CategorizeError::Transport(err),
            ApiError::Decode { .. } => CategorizeError::Decode(err),
        }
    }
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(" and ")
}
