use std::{ops::ControlFlow, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use log::{error, info};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::{
    audio::{ChimeSink, SilentChime},
    db::models::{SessionRecord, TeaItem},
    gateway::SessionGateway,
    haptics::{HapticCue, Haptics},
};

use super::state::{
    BrewField, BrewSession, SessionPhase, SummaryView, TickOutcome, TickSource, TimerMode,
};
use super::ticker::Tickers;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const EVENT_BUFFER: usize = 64;

/// Haptic and audible feedback for a session.
#[derive(Clone)]
pub struct Cues {
    haptics: Haptics,
    chime: Arc<dyn ChimeSink>,
}

impl Cues {
    pub fn new(haptics: Haptics, chime: Arc<dyn ChimeSink>) -> Self {
        Self { haptics, chime }
    }

    pub fn silent() -> Self {
        Self::new(Haptics::disabled(), Arc::new(SilentChime))
    }

    fn haptic(&self, cue: HapticCue) {
        self.haptics.cue(cue);
    }

    fn countdown_expired(&self) {
        self.chime.play_chime();
        self.haptics.cue(HapticCue::Alarm);
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum BrewEvent {
    StateChanged(BrewSession),
    Heartbeat(BrewSession),
    CountdownExpired(BrewSession),
    SessionSaved(SessionRecord),
    SessionDiscarded,
}

/// State shared with the tick tasks.
#[derive(Clone)]
struct TickContext {
    state: Arc<Mutex<BrewSession>>,
    cues: Cues,
    events: broadcast::Sender<BrewEvent>,
    heartbeat_every_ticks: u64,
}

impl TickContext {
    async fn on_tick(self, source: TickSource) -> ControlFlow<()> {
        let (outcome, snapshot) = {
            let mut guard = self.state.lock().await;
            let outcome = guard.tick(source);
            (outcome, guard.clone())
        };

        match outcome {
            TickOutcome::Idle => ControlFlow::Break(()),
            TickOutcome::Advanced => {
                if source == TickSource::SessionClock
                    && snapshot.session_duration_secs % self.heartbeat_every_ticks == 0
                {
                    let _ = self.events.send(BrewEvent::Heartbeat(snapshot));
                }
                ControlFlow::Continue(())
            }
            TickOutcome::CountdownExpired => {
                info!(
                    "Countdown expired for {} on steep #{}",
                    snapshot.tea.name, snapshot.steep_count
                );
                self.cues.countdown_expired();
                let _ = self.events.send(BrewEvent::CountdownExpired(snapshot));
                ControlFlow::Break(())
            }
        }
    }
}

/// Drives one brewing session: owns its state, keeps exactly the right tick
/// sources alive, fires cues, and hands the finished session to the gateway.
pub struct BrewController<G: SessionGateway> {
    state: Arc<Mutex<BrewSession>>,
    gateway: Arc<G>,
    cues: Cues,
    tickers: Arc<Mutex<Tickers>>,
    events: broadcast::Sender<BrewEvent>,
    heartbeat_every_ticks: u64,
}

impl<G: SessionGateway> Clone for BrewController<G> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            gateway: self.gateway.clone(),
            cues: self.cues.clone(),
            tickers: self.tickers.clone(),
            events: self.events.clone(),
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        }
    }
}

impl<G: SessionGateway> BrewController<G> {
    /// Starts a session for `tea`; the session clock begins immediately.
    pub async fn open(tea: TeaItem, gateway: Arc<G>, cues: Cues) -> Self {
        let debug_mode = std::env::var("TEADIARY_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        info!("Opening brewing session for {} ({})", tea.name, tea.id);

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let controller = Self {
            state: Arc::new(Mutex::new(BrewSession::open(tea))),
            gateway,
            cues,
            tickers: Arc::new(Mutex::new(Tickers::new(TICK_INTERVAL))),
            events,
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        };

        {
            let state = controller.state.lock().await;
            controller.reconcile_tickers(&state, None).await;
        }

        controller
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrewEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> BrewSession {
        self.state.lock().await.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.phase == SessionPhase::Closed
    }

    pub async fn set_mode(&self, mode: TimerMode) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, move |s| s.set_mode(mode))
            .await
    }

    pub async fn toggle_stopwatch(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Press), Some(TickSource::Stopwatch), |s| {
            s.toggle_stopwatch()
        })
        .await
    }

    pub async fn reset_stopwatch(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, |s| s.reset_stopwatch())
            .await
    }

    pub async fn next_steep_from_stopwatch(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, |s| s.next_steep_from_stopwatch())
            .await
    }

    pub async fn set_countdown_target(&self, minutes: u32, seconds: u32) -> Result<BrewSession> {
        self.apply(None, None, move |s| s.set_countdown_target(minutes, seconds))
            .await
    }

    /// Unknown presets and presets sent mid-countdown change nothing and
    /// stay silent.
    pub async fn apply_preset(&self, minutes: u32) -> Result<BrewSession> {
        let (accepted, snapshot) = {
            let mut state = self.state.lock().await;
            if state.phase == SessionPhase::Closed {
                bail!("brewing session is closed");
            }
            let accepted = state.apply_preset(minutes);
            (accepted, state.clone())
        };

        if accepted {
            self.cues.haptic(HapticCue::Tap);
            let _ = self.events.send(BrewEvent::StateChanged(snapshot.clone()));
        }
        Ok(snapshot)
    }

    pub async fn start_countdown(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Press), Some(TickSource::Countdown), |s| {
            s.start_countdown()
        })
        .await
    }

    pub async fn extend_countdown(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), Some(TickSource::Countdown), |s| {
            s.extend_countdown()
        })
        .await
    }

    pub async fn reset_countdown(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, |s| s.reset_countdown())
            .await
    }

    pub async fn next_steep_from_countdown(&self) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, |s| s.next_steep_from_countdown())
            .await
    }

    pub async fn set_brew_parameters(
        &self,
        water_temp_c: Option<u32>,
        leaf_grams: Option<u32>,
        vessel_ml: Option<u32>,
    ) -> Result<BrewSession> {
        self.apply(None, None, move |s| {
            s.set_brew_parameters(water_temp_c, leaf_grams, vessel_ml)
        })
        .await
    }

    pub async fn set_brew_field_input(&self, field: BrewField, raw: String) -> Result<BrewSession> {
        self.apply(None, None, move |s| s.set_brew_field_input(field, &raw))
            .await
    }

    pub async fn set_rating(&self, rating: u8) -> Result<BrewSession> {
        self.apply(Some(HapticCue::Tap), None, move |s| s.set_rating(rating))
            .await
    }

    pub async fn finish(&self) -> Result<SummaryView> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state
                .finish()
                .ok_or_else(|| anyhow!("session is not brewing"))?;
            self.reconcile_tickers(&state, None).await;
            state.clone()
        };

        self.cues.haptic(HapticCue::Press);
        info!(
            "Brewing session for {} finished after {}s and {} steep(s)",
            snapshot.tea.name, snapshot.session_duration_secs, snapshot.steep_count
        );
        let summary = snapshot.summary();
        let _ = self.events.send(BrewEvent::StateChanged(snapshot));
        Ok(summary)
    }

    /// Persists the session and closes it. On failure the session stays in
    /// the summary phase so the caller can retry or discard.
    pub async fn save(&self) -> Result<SessionRecord> {
        let request = {
            let state = self.state.lock().await;
            state
                .save_request()
                .ok_or_else(|| anyhow!("session is not awaiting save"))?
        };

        let tea_id = request.tea_id.clone();
        let record = match self.gateway.record_session(request).await {
            Ok(record) => record,
            Err(err) => {
                error!("Failed to save brewing session for tea {tea_id}: {err:#}");
                return Err(err.context("failed to save brewing session"));
            }
        };

        self.close().await;
        self.cues.haptic(HapticCue::Success);
        info!("Saved brewing session {} for tea {}", record.id, tea_id);
        let _ = self.events.send(BrewEvent::SessionSaved(record.clone()));
        Ok(record)
    }

    /// Abandons the session without persisting anything.
    pub async fn discard(&self) -> Result<()> {
        if self.is_closed().await {
            return Ok(());
        }
        self.close().await;
        self.cues.haptic(HapticCue::Tap);
        info!("Brewing session discarded");
        let _ = self.events.send(BrewEvent::SessionDiscarded);
        Ok(())
    }

    async fn close(&self) {
        let mut state = self.state.lock().await;
        state.close();
        self.tickers.lock().await.stop_all();
    }

    async fn apply<F>(
        &self,
        cue: Option<HapticCue>,
        restart: Option<TickSource>,
        action: F,
    ) -> Result<BrewSession>
    where
        F: FnOnce(&mut BrewSession) + Send,
    {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.phase == SessionPhase::Closed {
                bail!("brewing session is closed");
            }
            action(&mut state);
            self.reconcile_tickers(&state, restart).await;
            state.clone()
        };

        if let Some(cue) = cue {
            self.cues.haptic(cue);
        }
        let _ = self.events.send(BrewEvent::StateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    /// Makes the set of live tick tasks match what `state` says should tick.
    /// `restart` forces a fresh one-second phase for that source.
    async fn reconcile_tickers(&self, state: &BrewSession, restart: Option<TickSource>) {
        let mut tickers = self.tickers.lock().await;
        for source in TickSource::ALL {
            let should_tick = state.is_ticking(source);
            let running = tickers.is_running(source);

            if should_tick && (!running || restart == Some(source)) {
                let context = self.tick_context();
                tickers.start(source, move || context.clone().on_tick(source));
            } else if !should_tick && running {
                tickers.stop(source);
            }
        }
    }

    fn tick_context(&self) -> TickContext {
        TickContext {
            state: self.state.clone(),
            cues: self.cues.clone(),
            events: self.events.clone(),
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        }
    }
}
