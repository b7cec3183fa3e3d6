use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tokens::approx_token_count;
use crate::compute::EstimateResult;

/// UTF-16 code units of the user message that identify an exchange
pub const KEY_UNITS: usize = 100;

/// One observed chat turn as delivered by the message source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    pub user_message: String,
    pub assistant_response: String,
    pub conversation_id: Option<String>,
    pub url: String,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, assistant_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            assistant_response: assistant_response.into(),
            ..Default::default()
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn user_token_count(&self) -> u32 {
        approx_token_count(&self.user_message)
    }

    pub fn assistant_token_count(&self) -> u32 {
        approx_token_count(&self.assistant_response)
    }
}

/// Persisted record of one exchange and its estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// First time the exchange was seen, ms since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
    /// Last time the estimate was refreshed, ms since the Unix epoch
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub assistant_response: String,
    #[serde(default)]
    pub user_token_count: u32,
    #[serde(default)]
    pub assistant_token_count: u32,
    #[serde(flatten)]
    pub estimate: EstimateResult,
}

impl LogEntry {
    pub fn new(exchange: &Exchange, now_ms: i64, estimate: EstimateResult) -> Self {
        Self {
            timestamp: now_ms,
            last_updated: now_ms,
            url: exchange.url.clone(),
            conversation_id: exchange.conversation_id.clone(),
            user_message: exchange.user_message.clone(),
            assistant_response: exchange.assistant_response.clone(),
            user_token_count: exchange.user_token_count(),
            assistant_token_count: exchange.assistant_token_count(),
            estimate,
        }
    }

    /// Prefix of the user message used to match re-observed exchanges
    pub fn key(&self) -> &str {
        message_key(&self.user_message)
    }

    pub fn energy_wh(&self) -> f64 {
        self.estimate.total_energy_wh
    }

    pub fn co2_kg(&self) -> f64 {
        self.estimate.co2_emissions_kg
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Prefix of `message` spanning at most `KEY_UNITS` UTF-16 code units
///
/// A character whose surrogate pair would straddle the limit is left out.
pub fn message_key(message: &str) -> &str {
    let mut units = 0;
    for (idx, ch) in message.char_indices() {
        units += ch.len_utf16();
        if units > KEY_UNITS {
            return &message[..idx];
        }
    }
    message
}
