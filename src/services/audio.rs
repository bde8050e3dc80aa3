//! Audio service — best-effort delivery of cues and music requests.
//!
//! DESIGN
//! ======
//! The core never plays sound. It hands [`AudioRequest`]s to an
//! [`AudioSink`]; the host's player does the rest. Submission must never
//! block a cycle and must never fail one: a full queue, a closed player, or
//! no player at all is logged and otherwise ignored.

#[cfg(test)]
#[path = "audio_test.rs"]
mod audio_test;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::canvas::SoundCue;
use crate::notice::{E_AUDIO_UNAVAILABLE, ErrorCode};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio backend unavailable")]
    Unavailable,
    #[error("audio queue is full")]
    Saturated,
}

impl ErrorCode for AudioError {
    fn error_code(&self) -> &'static str {
        E_AUDIO_UNAVAILABLE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioRequest {
    Cue(SoundCue),
    PlayTrack { track: String, file_path: String, volume: f32 },
    StopTrack,
}

/// Anything that can accept audio requests without blocking.
pub trait AudioSink: Send + Sync {
    /// Queue a request for playback.
    ///
    /// # Errors
    ///
    /// Returns an [`AudioError`] when the backend cannot take the request.
    fn submit(&self, request: &AudioRequest) -> Result<(), AudioError>;
}

/// Submit and swallow failures. Returns whether the request was accepted.
pub fn submit_best_effort(sink: &dyn AudioSink, request: &AudioRequest) -> bool {
    match sink.submit(request) {
        Ok(()) => true,
        Err(AudioError::Unavailable) => {
            debug!(?request, "audio backend unavailable; request dropped");
            false
        }
        Err(e) => {
            warn!(error = %e, ?request, "audio request dropped");
            false
        }
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// No backend at all. Every request is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn submit(&self, _request: &AudioRequest) -> Result<(), AudioError> {
        Err(AudioError::Unavailable)
    }
}

/// Forwards requests over a bounded channel to a player task.
#[derive(Debug, Clone)]
pub struct ChannelAudioSink {
    tx: mpsc::Sender<AudioRequest>,
}

impl ChannelAudioSink {
    #[must_use]
    pub fn new(tx: mpsc::Sender<AudioRequest>) -> Self {
        Self { tx }
    }
}

impl AudioSink for ChannelAudioSink {
    fn submit(&self, request: &AudioRequest) -> Result<(), AudioError> {
        self.tx.try_send(request.clone()).map_err(|e| match e {
            TrySendError::Full(_) => AudioError::Saturated,
            TrySendError::Closed(_) => AudioError::Unavailable,
        })
    }
}

/// Spawn a player that only logs what it would play. Used by the driver
/// binary when no real backend is attached.
pub fn spawn_logging_player(mut rx: mpsc::Receiver<AudioRequest>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                AudioRequest::Cue(cue) => {
                    info!(frequency_hz = cue.frequency_hz, duration_ms = cue.duration_ms, "cue");
                }
                AudioRequest::PlayTrack { track, file_path, volume } => {
                    info!(%track, %file_path, volume, "music play");
                }
                AudioRequest::StopTrack => info!("music stop"),
            }
        }
    })
}
