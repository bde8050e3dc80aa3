//! Music service — mood-based background tracks.
//!
//! The library is static configuration. The player only remembers what is
//! playing and turns play/stop actions into [`AudioRequest`]s.

#[cfg(test)]
#[path = "music_test.rs"]
mod music_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MUSIC_VOLUME;
use crate::notice::{E_NOT_FOUND, E_REJECTED, ErrorCode};
use crate::services::audio::AudioRequest;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MusicError {
    #[error("unknown mood: {0}")]
    UnknownMood(String),
    #[error("unknown track '{track}' for mood {mood}")]
    UnknownTrack { mood: String, track: String },
    #[error("nothing is playing")]
    NotPlaying,
}

impl ErrorCode for MusicError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownMood(_) | Self::UnknownTrack { .. } => E_NOT_FOUND,
            Self::NotPlaying => E_REJECTED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub name: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MusicLibrary {
    moods: Vec<Mood>,
}

impl Default for MusicLibrary {
    fn default() -> Self {
        let track = |name: &str, file: &str| Track { name: name.to_string(), file_path: format!("audio/{file}") };
        Self {
            moods: vec![
                Mood {
                    name: "Calm".into(),
                    tracks: vec![track("Peaceful Piano", "peaceful_piano.mp3"), track("Ocean Waves", "ocean_waves.mp3")],
                },
                Mood {
                    name: "Energetic".into(),
                    tracks: vec![track("Upbeat Rhythm", "upbeat.mp3"), track("Dance Beats", "dance.mp3")],
                },
                Mood {
                    name: "Focus".into(),
                    tracks: vec![track("Deep Focus", "deep_focus.mp3"), track("Study Time", "study.mp3")],
                },
            ],
        }
    }
}

impl MusicLibrary {
    #[must_use]
    pub fn new(moods: Vec<Mood>) -> Self {
        Self { moods }
    }

    #[must_use]
    pub fn mood_names(&self) -> Vec<&str> {
        self.moods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Look up a track by mood and track name.
    ///
    /// # Errors
    ///
    /// Returns [`MusicError`] when either name is unknown.
    pub fn find(&self, mood: &str, track: &str) -> Result<&Track, MusicError> {
        let entry = self
            .moods
            .iter()
            .find(|m| m.name == mood)
            .ok_or_else(|| MusicError::UnknownMood(mood.to_string()))?;
        entry
            .tracks
            .iter()
            .find(|t| t.name == track)
            .ok_or_else(|| MusicError::UnknownTrack { mood: mood.to_string(), track: track.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub mood: String,
    pub track: String,
    pub volume: f32,
}

#[derive(Debug, Clone, Default)]
pub struct MusicPlayer {
    now_playing: Option<NowPlaying>,
}

impl MusicPlayer {
    #[must_use]
    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    /// Switch to a track. Volume is clamped to `0.0..=1.0`; `None` or NaN
    /// uses the default.
    ///
    /// # Errors
    ///
    /// Returns [`MusicError`] for an unknown mood or track.
    pub fn play(
        &mut self,
        library: &MusicLibrary,
        mood: &str,
        track: &str,
        volume: Option<f32>,
    ) -> Result<AudioRequest, MusicError> {
        let found = library.find(mood, track)?;
        let volume = volume.filter(|v| !v.is_nan()).unwrap_or(DEFAULT_MUSIC_VOLUME).clamp(0.0, 1.0);
        self.now_playing = Some(NowPlaying { mood: mood.to_string(), track: found.name.clone(), volume });
        Ok(AudioRequest::PlayTrack { track: found.name.clone(), file_path: found.file_path.clone(), volume })
    }

    /// Stop the current track.
    ///
    /// # Errors
    ///
    /// Returns [`MusicError::NotPlaying`] when nothing is playing.
    pub fn stop(&mut self) -> Result<AudioRequest, MusicError> {
        self.now_playing.take().map(|_| AudioRequest::StopTrack).ok_or(MusicError::NotPlaying)
    }
}
