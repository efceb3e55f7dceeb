use chrono::NaiveDate;
use clap::Subcommand;
use formacad_core::Database;
use serde::Serialize;

use super::{print_json, today};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus totals
    Today {
        /// Include the individual sessions
        #[arg(long)]
        sessions: bool,
    },
    /// Focus totals for a given day (YYYY-MM-DD)
    Day {
        date: NaiveDate,
        #[arg(long)]
        sessions: bool,
    },
}

#[derive(Serialize)]
struct DayReport {
    day: NaiveDate,
    total_minutes: u64,
    session_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sessions: Option<Vec<formacad_core::SessionRecord>>,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (day, with_sessions) = match action {
        StatsAction::Today { sessions } => (today(), sessions),
        StatsAction::Day { date, sessions } => (date, sessions),
    };

    let stats = db.stats_for_day(day)?;
    let sessions = if with_sessions {
        Some(db.sessions_for_day(day)?)
    } else {
        None
    };
    print_json(&DayReport {
        day,
        total_minutes: stats.total_minutes,
        session_count: stats.session_count,
        sessions,
    })
}
