use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use nold_contracts::pricing::TokenPricing;
use nold_contracts::request::{DEFAULT_MAX_TOKENS, DEFAULT_VISION_MODEL};
use nold_contracts::response_log::DEFAULT_RESPONSES_DIR;
use tracing::warn;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizerConfig {
    pub api_base: String,
    pub model: String,
    pub max_tokens: u64,
    pub pricing: TokenPricing,
    pub responses_dir: PathBuf,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            pricing: TokenPricing::default(),
            responses_dir: PathBuf::from(DEFAULT_RESPONSES_DIR),
        }
    }
}

impl CategorizerConfig {
    /// Defaults overlaid with `OPENAI_API_BASE`/`OPENAI_BASE_URL`,
    /// `NOLD_VISION_MODEL`, `NOLD_MAX_TOKENS`, `NOLD_USD_PER_1K_TOKENS` and
    /// `NOLD_RESPONSES_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first_non_empty = |keys: &[&str]| {
            keys.iter().find_map(|key| {
                lookup(*key)
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
            })
        };

        let mut config = Self::default();
        if let Some(base) = first_non_empty(&["OPENAI_API_BASE", "OPENAI_BASE_URL"]) {
            config.api_base = normalize_api_base(&base);
        }
        if let Some(model) = first_non_empty(&["NOLD_VISION_MODEL"]) {
            config.model = model;
        }
        if let Some(max_tokens) = first_non_empty(&["NOLD_MAX_TOKENS"])
            .and_then(|raw| parse_override::<u64>("NOLD_MAX_TOKENS", &raw))
        {
            config.max_tokens = max_tokens;
        }
        if let Some(rate) = first_non_empty(&["NOLD_USD_PER_1K_TOKENS"])
            .and_then(|raw| parse_override::<f64>("NOLD_USD_PER_1K_TOKENS", &raw))
        {
            if rate.is_finite() && rate >= 0.0 {
                config.pricing = TokenPricing::new(rate);
            } else {
                warn!(
                    key = "NOLD_USD_PER_1K_TOKENS",
                    value = rate,
                    "ignoring negative or non-finite rate"
                );
            }
        }
        if let Some(dir) = first_non_empty(&["NOLD_RESPONSES_DIR"]) {
            config.responses_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// Trims trailing slashes and appends `/v1` when the URL has no path.
pub fn normalize_api_base(raw: &str) -> String {
    let mut base = raw.trim().trim_end_matches('/').to_string();
    if let Ok(parsed) = reqwest::Url::parse(&base) {
        if parsed.path().trim().is_empty() || parsed.path() == "/" {
            base = format!("{base}/v1");
        }
    }
    base.trim_end_matches('/').to_string()
}

fn parse_override<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw, "ignoring unparseable override");
            None
        }
    }
}
