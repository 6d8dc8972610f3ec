//! Procedural audio
//!
//! Fire crackle and water splash are synthesized from a short white-noise
//! buffer pushed through a filter. The storm ambience is a looped track picked
//! from a list of candidates. Everything plays through an [`AudioBackend`] so
//! the logic runs (silently) off the web too.

pub mod effects;
pub mod track;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::sync::mpsc::Sender;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub use effects::{SoundEffect, Tone, Waveform};
pub use track::{TrackEvent, TrackLoader, TrackStatus};

use crate::error::AudioError;
use crate::settings::Settings;

/// Length of the noise buffer behind both loops (seconds)
pub const NOISE_SECONDS: f32 = 2.0;
/// Fire crackle: low-pass cutoff and fixed gain
pub const FIRE_CUTOFF_HZ: f32 = 800.0;
pub const FIRE_GAIN: f32 = 0.25;
/// Water splash: band-pass center and gain while a helm key is held
pub const SPLASH_CENTER_HZ: f32 = 1_200.0;
pub const WATER_SPLASH_GAIN: f32 = 0.35;

/// Filter applied to a noise loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    BandPass,
}

/// A looping filtered-noise source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLoop {
    pub filter: FilterKind,
    pub frequency: f32,
    pub gain: f32,
}

/// Minimal audio graph the game needs
pub trait AudioBackend {
    /// Handle to a running noise loop
    type Loop;

    fn sample_rate(&self) -> f32;

    /// Wake a suspended context (needs a user gesture on the web)
    fn resume(&mut self) {}

    /// Start `samples` looping through `sound`'s filter and gain
    fn start_noise_loop(&mut self, samples: &[f32], sound: &NoiseLoop)
    -> Result<Self::Loop, AudioError>;

    fn set_loop_gain(&mut self, handle: &Self::Loop, gain: f32);

    /// Fire-and-forget oscillator tones
    fn play_tones(&mut self, tones: &[Tone], volume: f32);

    /// Begin loading `name`; the outcome must be sent on `reply` tagged with
    /// `attempt`
    fn load_track(&mut self, name: &str, attempt: u32, reply: Sender<TrackEvent>);

    /// Loop the most recently loaded track
    fn play_track(&mut self, volume: f32) -> Result<(), AudioError>;

    fn set_track_volume(&mut self, _volume: f32) {}
}

/// White noise in [-1, 1)
pub fn white_noise(rng: &mut Pcg32, sample_rate: f32, seconds: f32) -> Result<Vec<f32>, AudioError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0 && seconds > 0.0) {
        return Err(AudioError::BufferSynthesis(format!(
            "bad buffer shape: {sample_rate} Hz x {seconds} s"
        )));
    }
    let len = (sample_rate * seconds) as usize;
    Ok((0..len).map(|_| rng.random_range(-1.0..1.0)).collect())
}

/// Audio state driven by the game
pub struct AudioSystem<B: AudioBackend> {
    backend: B,
    /// Both loops are running
    initialized: bool,
    tracks_started: bool,
    fire: Option<B::Loop>,
    splash: Option<B::Loop>,
    splash_active: bool,
    tracks: TrackLoader,
    rng: Pcg32,
    sfx_volume: f32,
    ambient_volume: f32,
}

impl<B: AudioBackend> AudioSystem<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        Self {
            backend,
            initialized: false,
            tracks_started: false,
            fire: None,
            splash: None,
            splash_active: false,
            tracks: TrackLoader::new(settings.ambient_tracks.clone()),
            rng: Pcg32::seed_from_u64(0x00a0_d10),
            sfx_volume: settings.effective_sfx_volume(),
            ambient_volume: settings.effective_ambient_volume(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Wake the backend from inside a user gesture handler
    pub fn resume(&mut self) {
        self.backend.resume();
    }

    /// Start the ambient track and build the noise loops. Returns whether this
    /// call completed the setup; after that every call is a no-op. A failed
    /// call keeps whatever was built and retries only the missing loops.
    pub fn initialize(&mut self) -> Result<bool, AudioError> {
        if self.initialized {
            return Ok(false);
        }
        self.backend.resume();

        if !self.tracks_started {
            self.tracks_started = true;
            self.tracks.start(&mut self.backend);
        }
        self.start_loops()?;

        self.initialized = true;
        log::info!("Audio initialized");
        Ok(true)
    }

    fn start_loops(&mut self) -> Result<(), AudioError> {
        if self.fire.is_some() && self.splash.is_some() {
            return Ok(());
        }
        let samples = white_noise(&mut self.rng, self.backend.sample_rate(), NOISE_SECONDS)?;

        if self.fire.is_none() {
            let fire = self.backend.start_noise_loop(
                &samples,
                &NoiseLoop {
                    filter: FilterKind::LowPass,
                    frequency: FIRE_CUTOFF_HZ,
                    gain: FIRE_GAIN * self.sfx_volume,
                },
            )?;
            self.fire = Some(fire);
        }

        if self.splash.is_none() {
            let splash = self.backend.start_noise_loop(
                &samples,
                &NoiseLoop {
                    filter: FilterKind::BandPass,
                    frequency: SPLASH_CENTER_HZ,
                    gain: self.splash_gain(),
                },
            )?;
            self.splash = Some(splash);
        }
        Ok(())
    }

    fn splash_gain(&self) -> f32 {
        if self.splash_active {
            WATER_SPLASH_GAIN * self.sfx_volume
        } else {
            0.0
        }
    }

    /// Switch the splash loop on or off, with no ramp
    pub fn set_splash_active(&mut self, active: bool) {
        if active == self.splash_active {
            return;
        }
        self.splash_active = active;
        let gain = self.splash_gain();
        if let Some(splash) = &self.splash {
            self.backend.set_loop_gain(splash, gain);
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        if !self.initialized || self.sfx_volume <= 0.0 {
            return;
        }
        log::debug!("Playing {:?}", effect);
        self.backend.play_tones(&effect.tones(), self.sfx_volume);
    }

    /// Drain track loads; call once per frame
    pub fn poll(&mut self) -> bool {
        self.tracks.poll(&mut self.backend, self.ambient_volume)
    }

    pub fn track_status(&self) -> TrackStatus {
        self.tracks.status()
    }

    /// Re-apply volumes after a settings change
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.ambient_volume = settings.effective_ambient_volume();
        let splash_gain = self.splash_gain();
        if let Some(fire) = &self.fire {
            self.backend.set_loop_gain(fire, FIRE_GAIN * self.sfx_volume);
        }
        if let Some(splash) = &self.splash {
            self.backend.set_loop_gain(splash, splash_gain);
        }
        self.backend.set_track_volume(self.ambient_volume);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Backend with no output. Every track load fails so the loader settles on
/// `NotFound`.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    type Loop = ();

    fn sample_rate(&self) -> f32 {
        8_000.0
    }

    fn start_noise_loop(&mut self, _samples: &[f32], _sound: &NoiseLoop) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_loop_gain(&mut self, _handle: &(), _gain: f32) {}

    fn play_tones(&mut self, _tones: &[Tone], _volume: f32) {}

    fn load_track(&mut self, _name: &str, attempt: u32, reply: Sender<TrackEvent>) {
        let _ = reply.send(TrackEvent {
            attempt,
            result: Err("no audio output".into()),
        });
    }

    fn play_track(&mut self, _volume: f32) -> Result<(), AudioError> {
        Err(AudioError::ContextUnavailable)
    }
}
