pub mod activity;
pub mod commands;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::db::models::SessionRecord;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub liters: f64,
    pub hours: f64,
    pub session_count: usize,
}

/// Totals for sessions brewed since the first instant of `now`'s calendar
/// month, in `now`'s timezone.
pub fn monthly_stats<Tz: TimeZone>(sessions: &[SessionRecord], now: &DateTime<Tz>) -> MonthlyStats {
    let month_start = now
        .timezone()
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .earliest()
        .map(|start| start.with_timezone(&Utc));

    let mut milliliters = 0u64;
    let mut seconds = 0u64;
    let mut session_count = 0usize;

    for session in sessions {
        if month_start.is_some_and(|start| session.brewed_at < start) {
            continue;
        }
        milliliters += u64::from(session.steeps) * u64::from(session.volume_ml);
        seconds += session.duration_secs;
        session_count += 1;
    }

    MonthlyStats {
        liters: milliliters as f64 / 1000.0,
        hours: seconds as f64 / 3600.0,
        session_count,
    }
}

/// One decimal place, the way the totals are displayed.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
