//! Ambient track loader
//!
//! Tries an ordered list of candidate files until one loads. Loads complete
//! asynchronously; the backend reports each outcome through a channel that
//! the frame loop drains with [`TrackLoader::poll`].

use std::sync::mpsc::{Receiver, Sender, channel};

use super::AudioBackend;

/// Where the ambient track stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// Audio not initialized yet
    Idle,
    /// Waiting on the candidate at this index
    Loading(usize),
    /// Candidate at this index is looping
    Playing(usize),
    /// Every candidate failed
    NotFound,
}

impl TrackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrackStatus::Idle => "Audio: click Start to enable",
            TrackStatus::Loading(_) => "Audio: loading ambience...",
            TrackStatus::Playing(_) => "Audio: storm ambience playing",
            TrackStatus::NotFound => "Audio: ambience not found",
        }
    }
}

/// Outcome of one load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    /// Attempt number handed to the backend
    pub attempt: u32,
    pub result: Result<(), String>,
}

pub struct TrackLoader {
    candidates: Vec<String>,
    status: TrackStatus,
    attempt: u32,
    tx: Sender<TrackEvent>,
    rx: Receiver<TrackEvent>,
}

impl TrackLoader {
    pub fn new(candidates: Vec<String>) -> Self {
        let (tx, rx) = channel();
        Self {
            candidates,
            status: TrackStatus::Idle,
            attempt: 0,
            tx,
            rx,
        }
    }

    pub fn status(&self) -> TrackStatus {
        self.status
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Begin with the first candidate. Does nothing once started.
    pub fn start<B: AudioBackend>(&mut self, backend: &mut B) {
        if self.status != TrackStatus::Idle {
            return;
        }
        self.request(0, backend);
    }

    fn request<B: AudioBackend>(&mut self, index: usize, backend: &mut B) {
        let Some(name) = self.candidates.get(index) else {
            log::warn!(
                "No ambient track could be loaded ({} candidates tried)",
                self.candidates.len()
            );
            self.status = TrackStatus::NotFound;
            return;
        };
        self.attempt += 1;
        self.status = TrackStatus::Loading(index);
        log::debug!("Loading ambient track {name} (attempt {})", self.attempt);
        backend.load_track(name, self.attempt, self.tx.clone());
    }

    /// Drain finished loads. Returns true if the status changed.
    pub fn poll<B: AudioBackend>(&mut self, backend: &mut B, volume: f32) -> bool {
        let before = self.status;
        while let Ok(event) = self.rx.try_recv() {
            let TrackStatus::Loading(index) = self.status else {
                continue;
            };
            if event.attempt != self.attempt {
                log::debug!("Ignoring stale track event for attempt {}", event.attempt);
                continue;
            }

            let outcome = event
                .result
                .and_then(|()| backend.play_track(volume).map_err(|e| e.to_string()));
            match outcome {
                Ok(()) => {
                    log::info!("Ambient track playing: {}", self.candidates[index]);
                    self.status = TrackStatus::Playing(index);
                }
                Err(reason) => {
                    log::warn!("Ambient track {} failed: {reason}", self.candidates[index]);
                    self.request(index + 1, backend);
                }
            }
        }
        self.status != before
    }
}
