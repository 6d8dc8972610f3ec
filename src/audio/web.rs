//! Web Audio backend

use std::sync::mpsc::Sender;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioContextState, BiquadFilterType, GainNode,
    HtmlAudioElement, OscillatorNode, OscillatorType,
};

use super::{AudioBackend, FilterKind, NoiseLoop, Tone, TrackEvent, Waveform};
use crate::error::AudioError;

/// A running noise chain: buffer source -> filter -> gain -> destination
pub struct NoiseChain {
    _source: AudioBufferSourceNode,
    gain: GainNode,
}

pub struct WebAudio {
    ctx: AudioContext,
    track: Option<HtmlAudioElement>,
}

impl WebAudio {
    pub fn new() -> Result<Self, AudioError> {
        let ctx = AudioContext::new().map_err(|_| AudioError::ContextUnavailable)?;
        Ok(Self { ctx, track: None })
    }

    /// Create an oscillator with gain envelope
    fn create_osc(&self, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = self.ctx.create_oscillator().ok()?;
        let gain = self.ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(&self, tone: &Tone, vol: f32) {
        let osc_type = match tone.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        };
        let Some((osc, gain)) = self.create_osc(tone.start_hz, osc_type) else {
            return;
        };
        let t = self.ctx.current_time() + tone.delay;

        gain.gain().set_value_at_time(vol * tone.peak, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
            .ok();
        if tone.end_hz != tone.start_hz {
            osc.frequency().set_value_at_time(tone.start_hz, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(tone.end_hz, t + tone.duration)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + tone.duration + 0.05).ok();
    }
}

impl AudioBackend for WebAudio {
    type Loop = NoiseChain;

    fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate()
    }

    /// Resume audio context (required after user gesture)
    fn resume(&mut self) {
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn start_noise_loop(&mut self, samples: &[f32], sound: &NoiseLoop) -> Result<NoiseChain, AudioError> {
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, self.ctx.sample_rate())
            .map_err(|_| AudioError::NodeCreation("buffer"))?;
        buffer
            .copy_to_channel(samples, 0)
            .map_err(|e| AudioError::BufferSynthesis(format!("{e:?}")))?;

        let source = self
            .ctx
            .create_buffer_source()
            .map_err(|_| AudioError::NodeCreation("buffer source"))?;
        source.set_buffer(Some(&buffer));
        source.set_loop(true);

        let filter = self
            .ctx
            .create_biquad_filter()
            .map_err(|_| AudioError::NodeCreation("biquad filter"))?;
        filter.set_type(match sound.filter {
            FilterKind::LowPass => BiquadFilterType::Lowpass,
            FilterKind::BandPass => BiquadFilterType::Bandpass,
        });
        filter.frequency().set_value(sound.frequency);

        let gain = self
            .ctx
            .create_gain()
            .map_err(|_| AudioError::NodeCreation("gain"))?;
        gain.gain().set_value(sound.gain);

        source
            .connect_with_audio_node(&filter)
            .and_then(|_| filter.connect_with_audio_node(&gain))
            .and_then(|_| gain.connect_with_audio_node(&self.ctx.destination()))
            .map_err(|_| AudioError::Connect)?;
        source
            .start()
            .map_err(|e| AudioError::Playback(format!("{e:?}")))?;

        Ok(NoiseChain {
            _source: source,
            gain,
        })
    }

    fn set_loop_gain(&mut self, handle: &NoiseChain, gain: f32) {
        handle.gain.gain().set_value(gain);
    }

    fn play_tones(&mut self, tones: &[Tone], volume: f32) {
        self.resume();
        for tone in tones {
            self.play_tone(tone, volume);
        }
    }

    fn load_track(&mut self, name: &str, attempt: u32, reply: Sender<TrackEvent>) {
        let element = match HtmlAudioElement::new_with_src(name) {
            Ok(element) => element,
            Err(e) => {
                let _ = reply.send(TrackEvent {
                    attempt,
                    result: Err(format!("{e:?}")),
                });
                return;
            }
        };
        element.set_loop(true);

        // Either may fire more than once; the loader ignores repeats
        let ready = {
            let reply = reply.clone();
            Closure::<dyn FnMut()>::new(move || {
                let _ = reply.send(TrackEvent {
                    attempt,
                    result: Ok(()),
                });
            })
        };
        let failed = {
            let name = name.to_string();
            Closure::<dyn FnMut()>::new(move || {
                let _ = reply.send(TrackEvent {
                    attempt,
                    result: Err(format!("{name} could not be loaded")),
                });
            })
        };
        let _ = element
            .add_event_listener_with_callback("canplaythrough", ready.as_ref().unchecked_ref());
        let _ = element.add_event_listener_with_callback("error", failed.as_ref().unchecked_ref());
        ready.forget();
        failed.forget();
        element.load();

        // A newer load supersedes the old element
        if let Some(old) = self.track.replace(element) {
            let _ = old.pause();
        }
    }

    fn play_track(&mut self, volume: f32) -> Result<(), AudioError> {
        let track = self
            .track
            .as_ref()
            .ok_or_else(|| AudioError::Playback("no track loaded".into()))?;
        track.set_volume(volume as f64);
        track
            .play()
            .map(|_| ())
            .map_err(|e| AudioError::Playback(format!("{e:?}")))
    }

    fn set_track_volume(&mut self, volume: f32) {
        if let Some(track) = &self.track {
            track.set_volume(volume as f64);
        }
    }
}
