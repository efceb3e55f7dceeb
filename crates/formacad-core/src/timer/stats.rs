//! Per-day completion tallies.
//!
//! Days are passed in explicitly; nothing here reads the wall clock.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Minutes from completed focus sessions.
    pub total_minutes: u64,
    /// Completed focus sessions.
    pub session_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsLedger {
    days: BTreeMap<NaiveDate, DailyStats>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_focus(&mut self, day: NaiveDate, minutes: u32) {
        let entry = self.days.entry(day).or_default();
        entry.total_minutes = entry.total_minutes.saturating_add(u64::from(minutes));
        entry.session_count = entry.session_count.saturating_add(1);
    }

    pub fn for_day(&self, day: NaiveDate) -> DailyStats {
        self.days.get(&day).copied().unwrap_or_default()
    }

    /// Drop every day strictly before `day`.
    pub fn prune_before(&mut self, day: NaiveDate) {
        self.days = self.days.split_off(&day);
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &DailyStats)> {
        self.days.iter()
    }
}
