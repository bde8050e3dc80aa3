//! Session state.
//!
//! DESIGN
//! ======
//! `SessionState` is everything one user's session owns in memory: canvas,
//! gallery, challenge engine, music player and the static tables they read.
//! The orchestrator holds it by value and lends each service only the field
//! it needs, so nothing is shared-mutable between services. The chat log is
//! the exception that lives in SQLite; `messages` caches its last successful
//! listing for when the store is unreachable.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use crate::canvas::{CanvasState, ResizeBounds};
use crate::config::SessionConfig;
use crate::palette::PaletteBook;
use crate::services::challenge::ChallengeEngine;
use crate::services::chat::ChatMessage;
use crate::services::gallery::GalleryStore;
use crate::services::music::{MusicLibrary, MusicPlayer};

pub struct SessionState {
    pub canvas: CanvasState,
    pub bounds: ResizeBounds,
    pub palettes: PaletteBook,
    pub gallery: GalleryStore,
    pub challenge: ChallengeEngine,
    pub music_library: MusicLibrary,
    pub music: MusicPlayer,
    /// Last successful chat listing, most recent first.
    pub messages: Vec<ChatMessage>,
}

impl SessionState {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            canvas: CanvasState::new(config.initial_width, config.initial_height),
            bounds: config.bounds,
            palettes: config.palettes.clone(),
            gallery: GalleryStore::new(),
            challenge: ChallengeEngine::new(config.catalog.clone()),
            music_library: config.music.clone(),
            music: MusicPlayer::default(),
            messages: Vec::new(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}
