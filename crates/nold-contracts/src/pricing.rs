use serde::{Deserialize, Serialize};

pub const DEFAULT_USD_PER_1K_TOKENS: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    pub usd_per_1k_tokens: f64,
}

impl Default for TokenPricing {
    fn default() -> Self {
        Self {
            usd_per_1k_tokens: DEFAULT_USD_PER_1K_TOKENS,
        }
    }
}

impl TokenPricing {
    pub fn new(usd_per_1k_tokens: f64) -> Self {
        Self { usd_per_1k_tokens }
    }

    pub fn estimate_cost(&self, total_tokens: u64) -> f64 {
        let rate = if self.usd_per_1k_tokens.is_finite() {
            self.usd_per_1k_tokens.max(0.0)
        } else {
            0.0
        };
        (total_tokens as f64 / 1000.0) * rate
    }
}

pub fn estimate_cost(total_tokens: u64) -> f64 {
    TokenPricing::default().estimate_cost(total_tokens)
}

pub fn format_cost(cost_usd: f64) -> String {
    format!("{cost_usd:.2} $")
}
