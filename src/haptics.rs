//! Haptic feedback presets and the sink they are delivered to.
//!
//! Every sink fails closed: a device without vibration support simply
//! ignores the pattern.

use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HapticCue {
    /// Mode switches, resets, steep advances.
    Tap,
    /// Start/pause and finish.
    Press,
    /// Session saved.
    Success,
    /// Removing a tea from the stash.
    Heavy,
    /// Countdown expiry.
    Alarm,
}

impl HapticCue {
    /// Vibration pattern in milliseconds, alternating on/off.
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            HapticCue::Tap => &[8],
            HapticCue::Press => &[15],
            HapticCue::Success => &[10, 50, 10],
            HapticCue::Heavy => &[25],
            HapticCue::Alarm => &[30, 100, 30, 100, 50],
        }
    }
}

pub trait HapticSink: Send + Sync {
    fn vibrate(&self, pattern: &[u32]);
}

/// For hosts with no vibration motor.
pub struct NoopHaptics;

impl HapticSink for NoopHaptics {
    fn vibrate(&self, _pattern: &[u32]) {}
}

/// Rings the terminal bell once per "on" pulse of the pattern.
pub struct TerminalHaptics;

impl HapticSink for TerminalHaptics {
    fn vibrate(&self, pattern: &[u32]) {
        let pulses = pattern.iter().step_by(2).count();
        let mut stderr = std::io::stderr();
        let bells = "\x07".repeat(pulses);
        if let Err(err) = stderr.write_all(bells.as_bytes()).and_then(|_| stderr.flush()) {
            warn!("Terminal haptics unavailable: {err}");
        }
    }
}

/// User-facing haptics switch in front of a sink.
#[derive(Clone)]
pub struct Haptics {
    sink: Arc<dyn HapticSink>,
    enabled: Arc<AtomicBool>,
}

impl Haptics {
    pub fn new(sink: Arc<dyn HapticSink>, enabled: bool) -> Self {
        Self {
            sink,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopHaptics), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turning haptics on confirms with a short press pulse.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if enabled {
            self.sink.vibrate(HapticCue::Press.pattern());
        }
    }

    pub fn cue(&self, cue: HapticCue) {
        if self.is_enabled() {
            self.sink.vibrate(cue.pattern());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<u32>>>);

    impl HapticSink for Recorder {
        fn vibrate(&self, pattern: &[u32]) {
            self.0.lock().unwrap().push(pattern.to_vec());
        }
    }

    #[test]
    fn presets_match_device_patterns() {
        assert_eq!(HapticCue::Tap.pattern(), &[8]);
        assert_eq!(HapticCue::Press.pattern(), &[15]);
        assert_eq!(HapticCue::Success.pattern(), &[10, 50, 10]);
    }

    #[test]
    fn disabled_haptics_swallow_cues() {
        let recorder = Arc::new(Recorder::default());
        let haptics = Haptics::new(recorder.clone(), false);
        haptics.cue(HapticCue::Tap);
        assert!(recorder.0.lock().unwrap().is_empty());

        haptics.set_enabled(true);
        haptics.cue(HapticCue::Success);
        assert_eq!(*recorder.0.lock().unwrap(), vec![vec![15], vec![10, 50, 10]]);
    }
}
