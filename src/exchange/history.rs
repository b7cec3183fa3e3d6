use super::entry::{message_key, Exchange, LogEntry};
use crate::compute::CostModel;

/// What `ExchangeLog::record` did with an observed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First sighting; a new entry was appended
    Inserted,
    /// Same prompt seen with a longer (or first non-empty) response; entry replaced
    Updated,
    /// Same prompt, response not longer; nothing changed
    Unchanged,
}

impl RecordOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, RecordOutcome::Unchanged)
    }
}

/// Ordered log of observed exchanges
///
/// Responses stream in, so the same exchange is observed many times with a
/// growing response. Entries are keyed by the first 100 characters of the
/// user message and refreshed only when the response grows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeLog {
    entries: Vec<LogEntry>,
}

impl ExchangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record an observation of `exchange` at `now_ms`
    pub fn record(&mut self, exchange: &Exchange, now_ms: i64, model: &dyn CostModel) -> RecordOutcome {
        let key = message_key(&exchange.user_message);

        let Some(idx) = self.entries.iter().position(|e| e.key() == key) else {
            let estimate = model.estimate(
                exchange.user_token_count() as i64,
                exchange.assistant_token_count() as i64,
            );
            self.entries.push(LogEntry::new(exchange, now_ms, estimate));
            log::debug!("Logged new exchange ({} entries)", self.entries.len());
            return RecordOutcome::Inserted;
        };

        let existing = &mut self.entries[idx];
        let new_len = exchange.assistant_response.encode_utf16().count();
        let old_len = existing.assistant_response.encode_utf16().count();
        let grew = new_len > old_len || (new_len > 0 && old_len == 0);
        if !grew {
            return RecordOutcome::Unchanged;
        }

        let assistant_token_count = exchange.assistant_token_count();
        existing.assistant_response = exchange.assistant_response.clone();
        existing.assistant_token_count = assistant_token_count;
        existing.estimate = model.estimate(
            existing.user_token_count as i64,
            assistant_token_count as i64,
        );
        existing.last_updated = now_ms;
        log::debug!(
            "Updated exchange: response now {} tokens, {:.4} Wh",
            assistant_token_count,
            existing.estimate.total_energy_wh
        );
        RecordOutcome::Updated
    }

    /// Total energy over all entries, in Wh
    pub fn total_energy_wh(&self) -> f64 {
        self.entries.iter().map(LogEntry::energy_wh).sum()
    }
}
