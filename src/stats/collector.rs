use chrono::{DateTime, Duration, Local, TimeZone};

use super::summary::{PeriodStats, UsageSummary};
use crate::exchange::LogEntry;

/// Accumulates log entries into today/lifetime totals
pub struct UsageCollector {
    start_of_day_ms: i64,

    today_messages: u64,
    today_energy_wh: f64,
    today_co2_kg: f64,

    lifetime_messages: u64,
    lifetime_energy_wh: f64,
    lifetime_co2_kg: f64,

    entries_missing_energy: u64,
}

impl UsageCollector {
    /// `start_of_day_ms`: entries at or after this instant count as today
    pub fn new(start_of_day_ms: i64) -> Self {
        Self {
            start_of_day_ms,
            today_messages: 0,
            today_energy_wh: 0.0,
            today_co2_kg: 0.0,
            lifetime_messages: 0,
            lifetime_energy_wh: 0.0,
            lifetime_co2_kg: 0.0,
            entries_missing_energy: 0,
        }
    }

    /// Collector whose "today" starts at local midnight of `now`
    pub fn for_local_day(now: DateTime<Local>) -> Self {
        Self::new(start_of_local_day_ms(now))
    }

    pub fn record(&mut self, entry: &LogEntry) {
        let energy = finite_or_zero(entry.energy_wh());
        let co2 = finite_or_zero(entry.co2_kg());
        if energy == 0.0 {
            self.entries_missing_energy += 1;
        }

        self.lifetime_messages += 1;
        self.lifetime_energy_wh += energy;
        self.lifetime_co2_kg += co2;

        if entry.timestamp >= self.start_of_day_ms {
            self.today_messages += 1;
            self.today_energy_wh += energy;
            self.today_co2_kg += co2;
        }
    }

    pub fn record_all<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        for entry in entries {
            self.record(entry);
        }
    }

    pub fn compute_summary(&self) -> UsageSummary {
        UsageSummary {
            today: PeriodStats::new(self.today_messages, self.today_energy_wh, self.today_co2_kg),
            lifetime: PeriodStats::new(
                self.lifetime_messages,
                self.lifetime_energy_wh,
                self.lifetime_co2_kg,
            ),
            entries_missing_energy: self.entries_missing_energy,
        }
    }
}

/// Milliseconds since the epoch of local midnight on the day of `now`
pub fn start_of_local_day_ms(now: DateTime<Local>) -> i64 {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump
        .or_else(|| Local.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| now.timestamp_millis())
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::EstimateResult;
    use crate::exchange::Exchange;

    fn entry_at(timestamp: i64, energy_wh: f64) -> LogEntry {
        LogEntry::new(&Exchange::new("q", "a"), timestamp, EstimateResult {
            total_energy_wh: energy_wh,
            co2_emissions_kg: energy_wh / 1000.0 * 0.418,
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_summary() {
        let summary = UsageCollector::new(0).compute_summary();
        assert_eq!(summary.today.messages, 0);
        assert_eq!(summary.lifetime.energy_wh, 0.0);
        assert_eq!(summary.lifetime.energy_per_message_wh(), 0.0);
    }

    #[test]
    fn test_today_and_lifetime_split() {
        let mut collector = UsageCollector::new(1_000);
        collector.record_all(&[entry_at(500, 1.0), entry_at(1_000, 2.0), entry_at(1_500, 4.0)]);
        let summary = collector.compute_summary();

        assert_eq!(summary.lifetime.messages, 3);
        assert!((summary.lifetime.energy_wh - 7.0).abs() < 1e-12);
        assert_eq!(summary.today.messages, 2);
        assert!((summary.today.energy_wh - 6.0).abs() < 1e-12);
        assert!((summary.today.co2_kg - 6.0 / 1000.0 * 0.418).abs() < 1e-15);
        assert!((summary.today.comparisons.water_liters - 6.0 / 1000.0 * 2.2).abs() < 1e-15);
    }

    #[test]
    fn test_missing_energy_counts_as_zero() {
        let mut collector = UsageCollector::new(0);
        collector.record(&entry_at(10, 0.0));
        collector.record(&entry_at(10, f64::NAN));
        let summary = collector.compute_summary();
        assert_eq!(summary.entries_missing_energy, 2);
        assert_eq!(summary.lifetime.messages, 2);
        assert_eq!(summary.lifetime.energy_wh, 0.0);
    }

    #[test]
    fn test_start_of_local_day_is_not_after_now() {
        let now = Local::now();
        let start = start_of_local_day_ms(now);
        assert!(start <= now.timestamp_millis());
        assert!(now.timestamp_millis() - start < 26 * 3600 * 1000);
    }
}
