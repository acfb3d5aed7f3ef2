mod client;
mod config;
mod encode;
mod error;

use std::path::PathBuf;

use image::ImageFormat;
use nold_contracts::listing::{parse_listing, ParsedListing};
use nold_contracts::pricing::format_cost;
use nold_contracts::request::build_request;
use nold_contracts::response_log::write_response_log;
use tracing::{debug, info, warn};

pub use client::{ChatCompletionClient, OpenAiClient};
pub use config::{normalize_api_base, CategorizerConfig, DEFAULT_API_BASE};
pub use encode::{
    encode_image, encode_images, is_supported_image, load_image, UploadedImage,
    SUPPORTED_IMAGE_EXTENSIONS,
};
pub use error::{ApiError, CategorizeError, MissingField};

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub credential: String,
    pub prompt: String,
    pub images: Vec<UploadedImage>,
}

impl Submission {
    pub fn missing_fields(&self) -> Vec<MissingField> {
        missing_fields(&self.credential, self.images.len())
    }
}

/// A whitespace-only credential counts as missing.
pub fn missing_fields(credential: &str, image_count: usize) -> Vec<MissingField> {
    let mut missing = Vec::new();
    if credential.trim().is_empty() {
        missing.push(MissingField::Credential);
    }
    if image_count == 0 {
        missing.push(MissingField::Images);
    }
    missing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub listing: ParsedListing,
    pub response_log: Option<PathBuf>,
}

impl SubmissionReport {
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = self.listing.render_lines();
        lines.push(format!("**Cost**: {}", format_cost(self.cost_usd)));
        lines
    }
}

pub struct Categorizer<C> {
    config: CategorizerConfig,
    client: C,
    state: SubmissionState,
}

impl Categorizer<OpenAiClient> {
    pub fn from_config(config: CategorizerConfig) -> Self {
        let client = OpenAiClient::from_config(&config);
        Self::new(config, client)
    }
}

impl<C: ChatCompletionClient> Categorizer<C> {
    pub fn new(config: CategorizerConfig, client: C) -> Self {
        Self {
            config,
            client,
            state: SubmissionState::Idle,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Validation failures return before any network call. An unparseable
    /// listing is not an error.
    pub fn submit(
        &mut self,
        submission: &Submission,
    ) -> Result<SubmissionReport, CategorizeError> {
        let missing = submission.missing_fields();
        if !missing.is_empty() {
            warn!(?missing, "submission rejected");
            return Err(CategorizeError::Validation { missing });
        }

        self.state = SubmissionState::Submitting;
        let outcome = self.run(submission);
        self.state = SubmissionState::Idle;
        outcome
    }

    fn run(&self, submission: &Submission) -> Result<SubmissionReport, CategorizeError> {
        info!(
            images = submission.images.len(),
            model = %self.config.model,
            "submitting listing photos"
        );
        for image in &submission.images {
            let detected = image.detected_format();
            if detected != Some(ImageFormat::Jpeg) {
                debug!(
                    image = %image.name,
                    detected = ?detected,
                    "image is sent with an image/jpeg label"
                );
            }
        }

        let encoded = encode_images(&submission.images);
        let request = build_request(
            &self.config.model,
            self.config.max_tokens,
            &submission.prompt,
            &encoded,
        );
        let response = self
            .client
            .complete(&submission.credential, &request)
            .map_err(CategorizeError::from)?;

        let response_log = match write_response_log(&self.config.responses_dir, &response) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to write response log");
                None
            }
        };

        let total_tokens = response.total_tokens();
        let cost_usd = self.config.pricing.estimate_cost(total_tokens);
        let listing = parse_listing(response.message_content());
        match &listing {
            ParsedListing::Parsed(record) => {
                let extra = record.unrecognized_keys();
                if !extra.is_empty() {
                    debug!(keys = ?extra, "listing has fields outside the known set");
                }
            }
            ParsedListing::Unparsed { reason } => {
                warn!(%reason, "response content is not a listing object");
            }
        }

        info!(
            total_tokens,
            cost_usd,
            response_log = ?response_log,
            "submission finished"
        );
        Ok(SubmissionReport {
            total_tokens,
            cost_usd,
            listing,
            response_log,
        })
    }
}
