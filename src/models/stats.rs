//! Run summary written after each stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters and failures for one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Stage name ("resolve" or "rate")
    pub stage: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Entries processed (roster rows or unique URLs)
    pub total: usize,
    /// Entries that produced a result
    pub succeeded: usize,
    /// Entries recovered by the second pass
    pub recovered: usize,
    /// Entries still failing after all passes
    pub failed: Vec<String>,
}

impl RunStats {
    /// Start a new stage record.
    pub fn begin(stage: &str) -> Self {
        let now = Utc::now();
        Self {
            stage: stage.to_string(),
            start_time: now,
            end_time: now,
            total: 0,
            succeeded: 0,
            recovered: 0,
            failed: Vec::new(),
        }
    }

    /// Stamp the end time.
    pub fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }

    /// Share of entries that succeeded, 1.0 when nothing was processed.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.succeeded as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_empty_stage() {
        assert_eq!(RunStats::begin("rate").success_rate(), 1.0);
    }

    #[test]
    fn finish_moves_end_time_forward() {
        let mut stats = RunStats::begin("resolve");
        stats.total = 4;
        stats.succeeded = 3;
        let stats = stats.finish();
        assert!(stats.end_time >= stats.start_time);
        assert_eq!(stats.success_rate(), 0.75);
    }
}
