use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const ATTACK_SECS: f32 = 0.01;
const DECAY_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy)]
struct Tone {
    freq: f32,
    start: f32,
    duration: f32,
    gain: f32,
}

/// Three ascending tones: 880, 1046 and 1318 Hz, staggered by 0.3 s.
const TONES: [Tone; 3] = [
    Tone { freq: 880.0, start: 0.0, duration: 1.2, gain: 0.3 },
    Tone { freq: 1046.0, start: 0.3, duration: 1.0, gain: 0.2 },
    Tone { freq: 1318.0, start: 0.6, duration: 1.5, gain: 0.25 },
];

impl Tone {
    fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Linear ramp up over the attack, then exponential decay down to the
    /// floor at the end of the tone.
    fn envelope(&self, t: f32) -> f32 {
        if t < self.start || t >= self.end() {
            return 0.0;
        }
        let local = t - self.start;
        if local < ATTACK_SECS {
            return self.gain * local / ATTACK_SECS;
        }
        let span = self.duration - ATTACK_SECS;
        let progress = (local - ATTACK_SECS) / span;
        self.gain * (DECAY_FLOOR / self.gain).powf(progress)
    }

    fn sample(&self, t: f32) -> f32 {
        self.envelope(t) * (TAU * self.freq * (t - self.start)).sin()
    }
}

/// Countdown-expiry bell.
#[derive(Debug, Clone)]
pub struct Chime {
    sample_rate: u32,
    index: u64,
    total_samples: u64,
}

impl Chime {
    pub fn new() -> Self {
        let length = TONES.iter().map(Tone::end).fold(0.0_f32, f32::max);
        Self {
            sample_rate: SAMPLE_RATE,
            index: 0,
            total_samples: (length * SAMPLE_RATE as f32).ceil() as u64,
        }
    }

    pub fn length() -> Duration {
        Duration::from_secs_f32(TONES.iter().map(Tone::end).fold(0.0_f32, f32::max))
    }
}

impl Default for Chime {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total_samples {
            return None;
        }
        let t = self.index as f32 / self.sample_rate as f32;
        self.index += 1;
        let mixed: f32 = TONES.iter().map(|tone| tone.sample(t)).sum();
        Some(mixed.clamp(-1.0, 1.0))
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total_samples - self.index.min(self.total_samples)) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Self::length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chime_lasts_until_last_tone_decays() {
        let samples = Chime::new().count() as i64;
        assert!((samples - 92_610).abs() <= 1);
        assert!((Chime::length().as_secs_f32() - 2.1).abs() < 1e-3);
        assert_eq!(Chime::default().count() as i64, samples);
    }

    #[test]
    fn tones_enter_in_ascending_order() {
        assert_eq!(TONES[1].envelope(0.2), 0.0);
        assert!(TONES[1].envelope(0.35) > 0.0);
        assert_eq!(TONES[2].envelope(0.5), 0.0);
        assert!(TONES[0].freq < TONES[1].freq && TONES[1].freq < TONES[2].freq);
    }

    #[test]
    fn envelope_peaks_after_attack_and_decays() {
        let tone = TONES[0];
        assert!((tone.envelope(ATTACK_SECS) - tone.gain).abs() < 1e-4);
        let tail = tone.envelope(tone.end() - 1e-4);
        assert!(tail < 0.002);
    }

    #[test]
    fn samples_stay_in_range() {
        assert!(Chime::new().all(|s| (-1.0..=1.0).contains(&s)));
    }
}
