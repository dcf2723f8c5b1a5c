use serde::{Deserialize, Serialize};

use crate::db::models::TeaItem;

pub const DEFAULT_WATER_TEMP_C: u32 = 95;
pub const DEFAULT_LEAF_GRAMS: u32 = 7;
pub const DEFAULT_VESSEL_ML: u32 = 120;
pub const DEFAULT_RATING: u8 = 5;
pub const DEFAULT_TARGET_MINUTES: u32 = 3;

/// Upper bound for each of the minutes/seconds fields of a countdown target.
pub const MAX_TARGET_FIELD: u32 = 99;
/// Seconds added by "+1 min" once a countdown has expired.
pub const EXTEND_SECS: u64 = 60;
/// One-tap countdown targets, in whole minutes.
pub const COUNTDOWN_PRESETS: [u32; 4] = [1, 2, 3, 5];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Stopwatch,
    Countdown,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Stopwatch
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Brewing,
    Summary,
    Closed,
}

/// One of the three independent one-second clocks that drive a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TickSource {
    SessionClock,
    Stopwatch,
    Countdown,
}

impl TickSource {
    pub const ALL: [TickSource; 3] = [
        TickSource::SessionClock,
        TickSource::Stopwatch,
        TickSource::Countdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TickSource::SessionClock => "session-clock",
            TickSource::Stopwatch => "stopwatch",
            TickSource::Countdown => "countdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The source was active and its counter moved.
    Advanced,
    /// The source is not active in the current state; its clock should stop.
    Idle,
    /// The countdown just reached zero on this tick.
    CountdownExpired,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StopwatchState {
    pub running: bool,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    pub target_minutes: u32,
    pub target_seconds: u32,
    /// `None` while the user is still entering a target.
    pub remaining_secs: Option<u64>,
    pub expired: bool,
}

impl Default for CountdownState {
    fn default() -> Self {
        Self {
            target_minutes: DEFAULT_TARGET_MINUTES,
            target_seconds: 0,
            remaining_secs: None,
            expired: false,
        }
    }
}

impl CountdownState {
    pub fn target_secs(&self) -> u64 {
        u64::from(self.target_minutes) * 60 + u64::from(self.target_seconds)
    }

    pub fn is_running(&self) -> bool {
        !self.expired && matches!(self.remaining_secs, Some(remaining) if remaining > 0)
    }

    /// Fraction of the target already elapsed, in `[0, 1]`. A zero target yields 0.
    pub fn progress_ratio(&self) -> f64 {
        let target = self.target_secs();
        match self.remaining_secs {
            Some(remaining) if target > 0 => {
                (1.0 - remaining as f64 / target as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn clear(&mut self) {
        self.remaining_secs = None;
        self.expired = false;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrewParameters {
    pub water_temp_c: u32,
    pub leaf_grams: u32,
    pub vessel_ml: u32,
}

impl Default for BrewParameters {
    fn default() -> Self {
        Self {
            water_temp_c: DEFAULT_WATER_TEMP_C,
            leaf_grams: DEFAULT_LEAF_GRAMS,
            vessel_ml: DEFAULT_VESSEL_ML,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BrewField {
    WaterTemp,
    Leaf,
    Vessel,
}

/// What gets handed to the session gateway once the user saves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub tea_id: String,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub steeps: u32,
    pub grams: u32,
    #[serde(rename = "volume")]
    pub volume_ml: u32,
    pub rating: u8,
}

/// Read-only view shown between `finish` and `save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub tea_id: String,
    pub tea_name: String,
    pub tea_year: i32,
    pub session_duration_secs: u64,
    pub steep_count: u32,
    pub params: BrewParameters,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewSession {
    pub tea: TeaItem,
    pub phase: SessionPhase,
    pub mode: TimerMode,
    pub session_duration_secs: u64,
    pub steep_count: u32,
    pub params: BrewParameters,
    pub rating: u8,
    pub stopwatch: StopwatchState,
    pub countdown: CountdownState,
}

impl BrewSession {
    pub fn open(tea: TeaItem) -> Self {
        Self {
            tea,
            phase: SessionPhase::Brewing,
            mode: TimerMode::Stopwatch,
            session_duration_secs: 0,
            steep_count: 1,
            params: BrewParameters::default(),
            rating: DEFAULT_RATING,
            stopwatch: StopwatchState::default(),
            countdown: CountdownState::default(),
        }
    }

    pub fn is_brewing(&self) -> bool {
        self.phase == SessionPhase::Brewing
    }

    /// Whether the given clock should currently be ticking.
    pub fn is_ticking(&self, source: TickSource) -> bool {
        if !self.is_brewing() {
            return false;
        }
        match source {
            TickSource::SessionClock => true,
            TickSource::Stopwatch => self.mode == TimerMode::Stopwatch && self.stopwatch.running,
            TickSource::Countdown => self.mode == TimerMode::Countdown && self.countdown.is_running(),
        }
    }

    pub fn tick(&mut self, source: TickSource) -> TickOutcome {
        if !self.is_ticking(source) {
            return TickOutcome::Idle;
        }
        match source {
            TickSource::SessionClock => {
                self.session_duration_secs += 1;
                TickOutcome::Advanced
            }
            TickSource::Stopwatch => {
                self.stopwatch.elapsed_secs += 1;
                TickOutcome::Advanced
            }
            TickSource::Countdown => match self.countdown.remaining_secs {
                Some(remaining) if remaining > 1 => {
                    self.countdown.remaining_secs = Some(remaining - 1);
                    TickOutcome::Advanced
                }
                _ => {
                    self.countdown.remaining_secs = Some(0);
                    self.countdown.expired = true;
                    TickOutcome::CountdownExpired
                }
            },
        }
    }

    /// Switches the active sub-timer. Both sub-timers are reset even when the
    /// mode does not change. Ignored while a countdown is mid-run.
    pub fn set_mode(&mut self, mode: TimerMode) {
        if !self.is_brewing() || self.countdown.is_running() {
            return;
        }
        self.mode = mode;
        self.stopwatch = StopwatchState::default();
        self.countdown.clear();
    }

    pub fn toggle_stopwatch(&mut self) {
        if self.is_brewing() && self.mode == TimerMode::Stopwatch {
            self.stopwatch.running = !self.stopwatch.running;
        }
    }

    pub fn reset_stopwatch(&mut self) {
        if self.is_brewing() && self.mode == TimerMode::Stopwatch {
            self.stopwatch = StopwatchState::default();
        }
    }

    pub fn next_steep_from_stopwatch(&mut self) {
        if self.is_brewing() && self.mode == TimerMode::Stopwatch {
            self.stopwatch = StopwatchState::default();
            self.steep_count += 1;
        }
    }

    /// Only editable while no countdown has been started.
    pub fn set_countdown_target(&mut self, minutes: u32, seconds: u32) {
        if !self.is_brewing() || self.countdown.remaining_secs.is_some() {
            return;
        }
        self.countdown.target_minutes = minutes.min(MAX_TARGET_FIELD);
        self.countdown.target_seconds = seconds.min(MAX_TARGET_FIELD);
    }

    /// Sets the target to `minutes`:00. Returns false for anything other
    /// than a known preset, or once a countdown has been started.
    pub fn apply_preset(&mut self, minutes: u32) -> bool {
        if !COUNTDOWN_PRESETS.contains(&minutes)
            || !self.is_brewing()
            || self.countdown.remaining_secs.is_some()
        {
            return false;
        }
        self.set_countdown_target(minutes, 0);
        true
    }

    pub fn start_countdown(&mut self) {
        if !self.is_brewing() || self.mode != TimerMode::Countdown {
            return;
        }
        let target = self.countdown.target_secs();
        if target == 0 {
            return;
        }
        self.countdown.remaining_secs = Some(target);
        self.countdown.expired = false;
    }

    pub fn extend_countdown(&mut self) {
        if !self.is_brewing() || !self.countdown.expired {
            return;
        }
        let remaining = self.countdown.remaining_secs.unwrap_or(0);
        self.countdown.remaining_secs = Some(remaining + EXTEND_SECS);
        self.countdown.expired = false;
    }

    pub fn reset_countdown(&mut self) {
        if self.is_brewing() {
            self.countdown.clear();
        }
    }

    pub fn next_steep_from_countdown(&mut self) {
        if self.is_brewing() && self.mode == TimerMode::Countdown {
            self.countdown.clear();
            self.steep_count += 1;
        }
    }

    pub fn set_brew_parameters(
        &mut self,
        water_temp_c: Option<u32>,
        leaf_grams: Option<u32>,
        vessel_ml: Option<u32>,
    ) {
        if !self.is_brewing() {
            return;
        }
        if let Some(value) = water_temp_c {
            self.params.water_temp_c = value;
        }
        if let Some(value) = leaf_grams {
            self.params.leaf_grams = value;
        }
        if let Some(value) = vessel_ml {
            self.params.vessel_ml = value;
        }
    }

    /// Applies raw text typed into one of the brew parameter fields.
    pub fn set_brew_field_input(&mut self, field: BrewField, raw: &str) {
        let prior = match field {
            BrewField::WaterTemp => self.params.water_temp_c,
            BrewField::Leaf => self.params.leaf_grams,
            BrewField::Vessel => self.params.vessel_ml,
        };
        let value = Some(coerce_numeric_input(raw, prior));
        match field {
            BrewField::WaterTemp => self.set_brew_parameters(value, None, None),
            BrewField::Leaf => self.set_brew_parameters(None, value, None),
            BrewField::Vessel => self.set_brew_parameters(None, None, value),
        }
    }

    pub fn set_rating(&mut self, rating: u8) {
        if self.phase == SessionPhase::Summary && (1..=5).contains(&rating) {
            self.rating = rating;
        }
    }

    /// Moves to the summary phase. All clocks stop; the session duration is kept.
    pub fn finish(&mut self) -> Option<SummaryView> {
        if !self.is_brewing() {
            return None;
        }
        self.stopwatch.running = false;
        self.phase = SessionPhase::Summary;
        Some(self.summary())
    }

    pub fn summary(&self) -> SummaryView {
        SummaryView {
            tea_id: self.tea.id.clone(),
            tea_name: self.tea.name.clone(),
            tea_year: self.tea.year,
            session_duration_secs: self.session_duration_secs,
            steep_count: self.steep_count,
            params: self.params,
            rating: self.rating,
        }
    }

    /// The record to persist, available only from the summary phase.
    pub fn save_request(&self) -> Option<SessionRequest> {
        if self.phase != SessionPhase::Summary {
            return None;
        }
        Some(SessionRequest {
            tea_id: self.tea.id.clone(),
            duration_secs: self.session_duration_secs,
            steeps: self.steep_count,
            grams: self.params.leaf_grams,
            volume_ml: self.params.vessel_ml,
            rating: self.rating,
        })
    }

    pub fn close(&mut self) {
        self.stopwatch.running = false;
        self.phase = SessionPhase::Closed;
    }

    pub fn progress_ratio(&self) -> f64 {
        self.countdown.progress_ratio()
    }
}

/// `M:SS` with zero-padded seconds and unbounded minutes.
pub fn format_time(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Inverse of [`format_time`]; also accepts a bare number of seconds.
pub fn parse_time(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: u64 = seconds.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => value.parse().ok(),
    }
}

/// Keeps only the digits of `raw`. No digits means 0; a value too large to
/// represent keeps `prior`.
pub fn coerce_numeric_input(raw: &str, prior: u32) -> u32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(prior)
}

/// Minutes/seconds entry fields accept at most two digits.
pub fn coerce_target_field(raw: &str) -> u32 {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(2)
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn sample_tea() -> TeaItem {
        let now = Utc::now();
        TeaItem {
            id: "tea-1".into(),
            name: "Lao Ban Zhang".into(),
            tea_type: "Sheng".into(),
            color: None,
            year: 2015,
            origin: "Menghai".into(),
            total_grams: 357,
            remaining_grams: 45,
            created_at: now,
            updated_at: now,
        }
    }

    fn ticks(session: &mut BrewSession, source: TickSource, count: usize) -> Vec<TickOutcome> {
        (0..count).map(|_| session.tick(source)).collect()
    }

    #[test]
    fn open_uses_defaults() {
        let session = BrewSession::open(sample_tea());
        assert_eq!(session.phase, SessionPhase::Brewing);
        assert_eq!(session.mode, TimerMode::Stopwatch);
        assert_eq!(session.steep_count, 1);
        assert_eq!(session.rating, 5);
        assert_eq!(session.params, BrewParameters { water_temp_c: 95, leaf_grams: 7, vessel_ml: 120 });
        assert_eq!(session.stopwatch, StopwatchState::default());
        assert_eq!(session.countdown.remaining_secs, None);
        assert!(session.is_ticking(TickSource::SessionClock));
        assert!(!session.is_ticking(TickSource::Stopwatch));
    }

    #[test]
    fn countdown_expires_after_target_ticks() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(3, 0);
        session.start_countdown();
        assert_eq!(session.countdown.remaining_secs, Some(180));

        let outcomes = ticks(&mut session, TickSource::Countdown, 180);
        let expirations = outcomes
            .iter()
            .filter(|o| **o == TickOutcome::CountdownExpired)
            .count();
        assert_eq!(expirations, 1);
        assert_eq!(outcomes.last(), Some(&TickOutcome::CountdownExpired));
        assert!(session.countdown.expired);
        assert_eq!(session.countdown.remaining_secs, Some(0));

        // No auto-repeat.
        assert_eq!(session.tick(TickSource::Countdown), TickOutcome::Idle);
        assert!(!session.is_ticking(TickSource::Countdown));
    }

    #[test]
    fn extend_adds_a_minute_and_expires_again() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(3, 0);
        session.start_countdown();
        ticks(&mut session, TickSource::Countdown, 180);

        session.extend_countdown();
        assert_eq!(session.countdown.remaining_secs, Some(60));
        assert!(!session.countdown.expired);

        let outcomes = ticks(&mut session, TickSource::Countdown, 60);
        assert_eq!(outcomes[..59].iter().filter(|o| **o == TickOutcome::Advanced).count(), 59);
        assert_eq!(outcomes[59], TickOutcome::CountdownExpired);
    }

    #[test]
    fn extend_is_ignored_unless_expired() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(1, 0);
        session.start_countdown();
        session.extend_countdown();
        assert_eq!(session.countdown.remaining_secs, Some(60));
    }

    #[test]
    fn stopwatch_next_steep_resets_and_counts() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::Stopwatch, 45);
        assert_eq!(session.stopwatch.elapsed_secs, 45);

        session.next_steep_from_stopwatch();
        assert_eq!(session.stopwatch, StopwatchState { running: false, elapsed_secs: 0 });
        assert_eq!(session.steep_count, 2);
    }

    #[test]
    fn reset_stopwatch_keeps_steep_count() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::Stopwatch, 5);
        session.reset_stopwatch();
        assert_eq!(session.stopwatch, StopwatchState::default());
        assert_eq!(session.steep_count, 1);
    }

    #[test]
    fn paused_stopwatch_does_not_advance() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::Stopwatch, 3);
        session.toggle_stopwatch();
        assert_eq!(session.tick(TickSource::Stopwatch), TickOutcome::Idle);
        assert_eq!(session.stopwatch.elapsed_secs, 3);
    }

    #[test]
    fn switching_modes_resets_both_sub_timers() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::Stopwatch, 12);

        session.set_mode(TimerMode::Countdown);
        assert_eq!(session.stopwatch, StopwatchState::default());
        assert_eq!(session.countdown.remaining_secs, None);

        session.set_mode(TimerMode::Stopwatch);
        assert_eq!(session.stopwatch.elapsed_secs, 0);
        assert!(!session.stopwatch.running);
    }

    #[test]
    fn same_mode_click_still_resets() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::Stopwatch, 7);
        session.set_mode(TimerMode::Stopwatch);
        assert_eq!(session.stopwatch, StopwatchState::default());
    }

    #[test]
    fn mode_switch_is_ignored_mid_countdown() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.start_countdown();
        session.set_mode(TimerMode::Stopwatch);
        assert_eq!(session.mode, TimerMode::Countdown);
        assert_eq!(session.countdown.remaining_secs, Some(180));
    }

    #[test]
    fn stopwatch_controls_do_nothing_in_countdown_mode() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.toggle_stopwatch();
        session.next_steep_from_stopwatch();
        assert!(!session.stopwatch.running);
        assert_eq!(session.stopwatch.elapsed_secs, 0);
        assert_eq!(session.steep_count, 1);
    }

    #[test]
    fn countdown_with_zero_target_does_not_start() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(0, 0);
        session.start_countdown();
        assert_eq!(session.countdown.remaining_secs, None);
        assert_eq!(session.progress_ratio(), 0.0);
    }

    #[test]
    fn countdown_target_is_clamped() {
        let mut session = BrewSession::open(sample_tea());
        session.set_countdown_target(250, 120);
        assert_eq!(session.countdown.target_minutes, 99);
        assert_eq!(session.countdown.target_seconds, 99);
        assert_eq!(session.countdown.target_secs(), 99 * 60 + 99);
    }

    #[test]
    fn preset_sets_whole_minutes_until_started() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(2, 30);

        assert!(session.apply_preset(5));
        assert_eq!(session.countdown.target_minutes, 5);
        assert_eq!(session.countdown.target_seconds, 0);

        session.start_countdown();
        ticks(&mut session, TickSource::Countdown, 10);
        assert!(!session.apply_preset(1));
        assert_eq!(session.countdown.target_minutes, 5);
        assert_eq!(session.countdown.remaining_secs, Some(290));

        session.reset_countdown();
        assert!(!session.apply_preset(4));
        assert!(session.apply_preset(1));
        assert_eq!(session.countdown.target_secs(), 60);
    }

    #[test]
    fn reset_countdown_is_idempotent() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.start_countdown();
        ticks(&mut session, TickSource::Countdown, 10);

        session.reset_countdown();
        let once = session.countdown;
        session.reset_countdown();
        assert_eq!(session.countdown, once);
        assert_eq!(once.remaining_secs, None);
        assert!(!once.expired);
    }

    #[test]
    fn next_steep_from_countdown_clears_and_counts() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.start_countdown();
        session.next_steep_from_countdown();
        assert_eq!(session.countdown.remaining_secs, None);
        assert_eq!(session.steep_count, 2);
    }

    #[test]
    fn progress_ratio_tracks_remaining() {
        let mut session = BrewSession::open(sample_tea());
        session.set_mode(TimerMode::Countdown);
        session.set_countdown_target(1, 40);
        session.start_countdown();
        assert_eq!(session.progress_ratio(), 0.0);
        ticks(&mut session, TickSource::Countdown, 25);
        assert!((session.progress_ratio() - 0.25).abs() < f64::EPSILON);
        ticks(&mut session, TickSource::Countdown, 75);
        assert_eq!(session.progress_ratio(), 1.0);
    }

    #[test]
    fn rating_only_changes_in_summary() {
        let mut session = BrewSession::open(sample_tea());
        session.set_rating(2);
        assert_eq!(session.rating, 5);

        session.finish();
        session.set_rating(0);
        session.set_rating(6);
        assert_eq!(session.rating, 5);
        session.set_rating(4);
        assert_eq!(session.rating, 4);
    }

    #[test]
    fn finish_freezes_clocks_and_builds_request() {
        let mut session = BrewSession::open(sample_tea());
        session.toggle_stopwatch();
        ticks(&mut session, TickSource::SessionClock, 10);
        ticks(&mut session, TickSource::Stopwatch, 4);

        let summary = session.finish().expect("brewing session should finish");
        assert_eq!(summary.session_duration_secs, 10);
        assert_eq!(session.phase, SessionPhase::Summary);
        assert!(!session.stopwatch.running);
        for source in TickSource::ALL {
            assert_eq!(session.tick(source), TickOutcome::Idle);
        }
        assert!(session.finish().is_none());

        session.set_rating(4);
        let request = session.save_request().expect("summary should produce a request");
        assert_eq!(
            request,
            SessionRequest {
                tea_id: "tea-1".into(),
                duration_secs: 10,
                steeps: 1,
                grams: 7,
                volume_ml: 120,
                rating: 4,
            }
        );
    }

    #[test]
    fn save_request_requires_summary() {
        let session = BrewSession::open(sample_tea());
        assert!(session.save_request().is_none());
    }

    #[test]
    fn session_request_serializes_gateway_field_names() {
        let request = SessionRequest {
            tea_id: "t".into(),
            duration_secs: 10,
            steeps: 2,
            grams: 7,
            volume_ml: 120,
            rating: 4,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["teaId"], "t");
        assert_eq!(json["duration"], 10);
        assert_eq!(json["volume"], 120);
    }

    #[test]
    fn brew_field_input_is_coerced() {
        let mut session = BrewSession::open(sample_tea());
        session.set_brew_field_input(BrewField::WaterTemp, "8a5");
        session.set_brew_field_input(BrewField::Leaf, "abc");
        session.set_brew_field_input(BrewField::Vessel, "99999999999999");
        assert_eq!(session.params.water_temp_c, 85);
        assert_eq!(session.params.leaf_grams, 0);
        assert_eq!(session.params.vessel_ml, 120);
    }

    #[test]
    fn target_field_keeps_two_digits() {
        assert_eq!(coerce_target_field("345"), 34);
        assert_eq!(coerce_target_field("x"), 0);
        assert_eq!(coerce_target_field("07"), 7);
    }

    #[test]
    fn steep_count_never_decreases() {
        let mut session = BrewSession::open(sample_tea());
        let mut last = session.steep_count;
        session.next_steep_from_stopwatch();
        session.set_mode(TimerMode::Countdown);
        session.next_steep_from_countdown();
        session.reset_countdown();
        session.set_mode(TimerMode::Stopwatch);
        session.reset_stopwatch();
        assert!(session.steep_count >= last);
        last = session.steep_count;
        assert_eq!(last, 3);
    }

    #[test]
    fn closed_session_ignores_everything() {
        let mut session = BrewSession::open(sample_tea());
        session.close();
        session.toggle_stopwatch();
        session.next_steep_from_stopwatch();
        assert_eq!(session.tick(TickSource::SessionClock), TickOutcome::Idle);
        assert!(session.finish().is_none());
        assert_eq!(session.steep_count, 1);
    }

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn parse_time_rejects_bad_input() {
        assert_eq!(parse_time("3:00"), Some(180));
        assert_eq!(parse_time("45"), Some(45));
        assert_eq!(parse_time("1:75"), None);
        assert_eq!(parse_time("a:00"), None);
    }

    proptest! {
        #[test]
        fn format_then_parse_round_trips(secs in 0u64..10_000_000) {
            prop_assert_eq!(parse_time(&format_time(secs)), Some(secs));
        }
    }
}
