use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

const WEEKS_SHOWN: i64 = 52;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Intensity::None,
            1 => Intensity::Low,
            2..=3 => Intensity::Medium,
            _ => Intensity::High,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Intensity::None => '.',
            Intensity::Low => '-',
            Intensity::Medium => 'o',
            Intensity::High => '#',
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
    pub intensity: Intensity,
}

/// A year of brewing, one column per Monday-first week. `total_sessions`
/// counts only the sessions that land on a cell of the grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityGraph {
    pub weeks: Vec<[ActivityDay; 7]>,
    pub total_sessions: usize,
}

impl ActivityGraph {
    /// The grid starts 52 weeks before `today`, snapped back to Monday, and
    /// runs in whole weeks through the week containing `today`.
    pub fn build(session_dates: &[NaiveDate], today: NaiveDate) -> Self {
        let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
        for date in session_dates {
            *counts.entry(*date).or_default() += 1;
        }

        let back = today - Duration::days(WEEKS_SHOWN * 7);
        let mut cursor = back - Duration::days(i64::from(back.weekday().num_days_from_monday()));

        let mut weeks = Vec::new();
        while cursor <= today {
            let week: [ActivityDay; 7] = std::array::from_fn(|offset| {
                let date = cursor + Duration::days(offset as i64);
                let count = counts.get(&date).copied().unwrap_or(0);
                ActivityDay {
                    date,
                    count,
                    intensity: Intensity::from_count(count),
                }
            });
            weeks.push(week);
            cursor = cursor + Duration::days(7);
        }

        let total_sessions = weeks
            .iter()
            .flatten()
            .map(|day| day.count as usize)
            .sum();
        Self {
            weeks,
            total_sessions,
        }
    }

    /// Seven text rows, Monday first.
    pub fn render_rows(&self) -> Vec<String> {
        (0..7)
            .map(|weekday| {
                self.weeks
                    .iter()
                    .map(|week| week[weekday].intensity.glyph())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn intensity_buckets() {
        assert_eq!(Intensity::from_count(0), Intensity::None);
        assert_eq!(Intensity::from_count(1), Intensity::Low);
        assert_eq!(Intensity::from_count(2), Intensity::Medium);
        assert_eq!(Intensity::from_count(3), Intensity::Medium);
        assert_eq!(Intensity::from_count(4), Intensity::High);
        assert_eq!(Intensity::from_count(40), Intensity::High);
    }

    #[test]
    fn grid_starts_on_monday_and_covers_today() {
        let today = date(2025, 6, 18); // Wednesday
        let graph = ActivityGraph::build(&[], today);

        let first = graph.weeks.first().unwrap()[0].date;
        assert_eq!(first.weekday(), Weekday::Mon);
        assert!(first <= today - Duration::days(364));

        let last_week = graph.weeks.last().unwrap();
        assert!(last_week.iter().any(|day| day.date == today));
        assert_eq!(graph.weeks.len(), 53);
    }

    #[test]
    fn counts_sessions_per_day() {
        let today = date(2025, 6, 18);
        let dates = vec![today, today, today, date(2025, 6, 16), date(2020, 1, 1)];
        let graph = ActivityGraph::build(&dates, today);

        let last_week = graph.weeks.last().unwrap();
        assert_eq!(last_week[0].count, 1);
        assert_eq!(last_week[2].count, 3);
        assert_eq!(last_week[2].intensity, Intensity::Medium);
        // The 2020 session has no cell, so it is left out of the total.
        assert_eq!(graph.total_sessions, 4);
    }

    #[test]
    fn renders_seven_rows_one_glyph_per_week() {
        let today = date(2025, 6, 16); // Monday
        let graph = ActivityGraph::build(&[today], today);
        let rows = graph.render_rows();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|row| row.chars().count() == graph.weeks.len()));
        assert!(rows[0].ends_with('-'));
    }
}
