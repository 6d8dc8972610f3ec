//! One-shot sound effects
//!
//! Each effect is a short list of oscillator tones with a pitch sweep and a
//! decaying gain envelope. Backends turn tones into real nodes.

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A single enveloped oscillator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    /// Frequency at onset (Hz)
    pub start_hz: f32,
    /// Frequency at the end of the sweep (Hz); equal to `start_hz` for a flat tone
    pub end_hz: f32,
    /// Seconds after the effect is triggered
    pub delay: f64,
    /// Seconds until the gain has decayed
    pub duration: f64,
    /// Peak gain before volume scaling
    pub peak: f32,
}

impl Tone {
    const fn flat(waveform: Waveform, hz: f32, delay: f64, duration: f64, peak: f32) -> Self {
        Self {
            waveform,
            start_hz: hz,
            end_hz: hz,
            delay,
            duration,
            peak,
        }
    }

    const fn sweep(waveform: Waveform, from: f32, to: f32, duration: f64, peak: f32) -> Self {
        Self {
            waveform,
            start_hz: from,
            end_hz: to,
            delay: 0.0,
            duration,
            peak,
        }
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Set sail
    Start,
    /// Coin picked up
    CoinChime,
    /// Home with the coin
    WinFanfare,
    /// Reached the island empty-handed
    Failure,
    /// Something was clicked
    SelectTick,
    /// Lightning strike
    ThunderRumble,
}

impl SoundEffect {
    /// Tones making up this effect
    pub fn tones(&self) -> Vec<Tone> {
        use Waveform::*;
        match self {
            // Rising whoosh
            SoundEffect::Start => vec![Tone::sweep(Triangle, 200.0, 600.0, 0.25, 0.3)],
            // Three bright notes
            SoundEffect::CoinChime => [900.0, 1200.0, 1600.0]
                .iter()
                .enumerate()
                .map(|(i, &hz)| Tone::flat(Sine, hz, i as f64 * 0.08, 0.2, 0.25))
                .collect(),
            SoundEffect::WinFanfare => [400.0, 500.0, 600.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &hz)| Tone::flat(Triangle, hz, i as f64 * 0.1, 0.4, 0.3))
                .collect(),
            // Sad descending steps
            SoundEffect::Failure => [400.0, 350.0, 300.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, &hz)| Tone::flat(Sine, hz, i as f64 * 0.2, 0.3, 0.3))
                .collect(),
            SoundEffect::SelectTick => vec![Tone::flat(Sine, 700.0, 0.0, 0.06, 0.15)],
            SoundEffect::ThunderRumble => vec![
                Tone::sweep(Sawtooth, 70.0, 25.0, 1.6, 0.35),
                Tone::sweep(Sine, 45.0, 20.0, 2.0, 0.45),
                Tone::sweep(Square, 900.0, 120.0, 0.15, 0.08),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SoundEffect; 6] = [
        SoundEffect::Start,
        SoundEffect::CoinChime,
        SoundEffect::WinFanfare,
        SoundEffect::Failure,
        SoundEffect::SelectTick,
        SoundEffect::ThunderRumble,
    ];

    #[test]
    fn test_every_effect_is_audible_and_bounded() {
        for effect in ALL {
            let tones = effect.tones();
            assert!(!tones.is_empty(), "{effect:?}");
            for tone in tones {
                // Exponential ramps cannot reach or start from zero
                assert!(tone.start_hz > 0.0 && tone.end_hz > 0.0);
                assert!(tone.peak > 0.0 && tone.peak <= 1.0);
                assert!(tone.duration > 0.0);
            }
        }
    }

    #[test]
    fn test_failure_descends() {
        let tones = SoundEffect::Failure.tones();
        assert!(tones.windows(2).all(|w| w[1].start_hz < w[0].start_hz));
        assert!(tones.windows(2).all(|w| w[1].delay > w[0].delay));
    }
}
