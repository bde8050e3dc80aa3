//! Challenge service — timed drawing prompts.
//!
//! DESIGN
//! ======
//! The engine is a three-state machine (`Idle`, `Active`, `Completed`) whose
//! only stored data is the optional active session. `Active` vs `Completed`
//! is never stored: [`ChallengeEngine::tick`] derives it from
//! `(now, started_at, duration)` on every call, so there is no timer to
//! schedule or cancel.
//!
//! ```text
//! Idle --start--> Active --(remaining == 0)--> Completed --acknowledge--> Idle
//!                   |
//!                   +--abandon--> Idle
//! ```

#[cfg(test)]
#[path = "challenge_test.rs"]
mod challenge_test;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::notice::{E_NOT_FOUND, E_REJECTED, ErrorCode};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("a challenge is already running")]
    AlreadyRunning,
    #[error("challenge still has {remaining_secs}s remaining")]
    NotComplete { remaining_secs: u32 },
    #[error("challenge time is up; acknowledge it instead")]
    AlreadyComplete,
    #[error("no active challenge")]
    NotActive,
    #[error("unknown challenge: {0}")]
    UnknownChallenge(usize),
    #[error("challenge catalog is empty")]
    EmptyCatalog,
}

impl ErrorCode for ChallengeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownChallenge(_) | Self::EmptyCatalog => E_NOT_FOUND,
            _ => E_REJECTED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        };
        f.write_str(name)
    }
}

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub prompt: String,
    pub duration_secs: u32,
    /// Elements the drawing should contain; unique, in display order.
    pub required_elements: Vec<String>,
    pub difficulty: Difficulty,
}

impl Challenge {
    #[must_use]
    pub fn new(prompt: &str, duration_secs: u32, required: &[&str], difficulty: Difficulty) -> Self {
        let mut required_elements: Vec<String> = Vec::with_capacity(required.len());
        for element in required {
            if !required_elements.iter().any(|e| e == element) {
                required_elements.push((*element).to_string());
            }
        }
        Self { prompt: prompt.to_string(), duration_secs, required_elements, difficulty }
    }

    /// `prompt (Difficulty)`, as shown in the picker.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.prompt, self.difficulty)
    }
}

/// The three built-in challenges.
#[must_use]
pub fn default_catalog() -> Vec<Challenge> {
    vec![
        Challenge::new(
            "Draw a magical forest",
            300,
            &["trees", "magical elements", "creatures"],
            Difficulty::Medium,
        ),
        Challenge::new("Create an underwater scene", 240, &["fish", "coral", "bubbles"], Difficulty::Easy),
        Challenge::new(
            "Design a futuristic city",
            360,
            &["buildings", "vehicles", "technology"],
            Difficulty::Hard,
        ),
    ]
}

/// A running (or finished, not yet acknowledged) challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveChallenge {
    pub challenge: Challenge,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
}

impl ActiveChallenge {
    /// `max(0, duration - whole seconds elapsed)`. A clock that moved
    /// backwards counts as no time elapsed.
    #[must_use]
    pub fn remaining_secs(&self, now: OffsetDateTime) -> u32 {
        let elapsed = (now - self.started_at).whole_seconds().max(0);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        self.challenge.duration_secs.saturating_sub(elapsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ChallengeStatus {
    Idle,
    Active { remaining_secs: u32 },
    Completed,
}

impl ChallengeStatus {
    /// Seconds left; zero unless active.
    #[must_use]
    pub fn remaining_secs(self) -> u32 {
        match self {
            Self::Active { remaining_secs } => remaining_secs,
            Self::Idle | Self::Completed => 0,
        }
    }
}

/// What the challenge panel shows for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeView {
    pub status: ChallengeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_elements: Option<String>,
    /// Picker labels, offered only while idle.
    pub options: Vec<String>,
}

// =============================================================================
// ENGINE
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChallengeEngine {
    catalog: Vec<Challenge>,
    active: Option<ActiveChallenge>,
}

impl Default for ChallengeEngine {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl ChallengeEngine {
    #[must_use]
    pub fn new(catalog: Vec<Challenge>) -> Self {
        Self { catalog, active: None }
    }

    #[must_use]
    pub fn catalog(&self) -> &[Challenge] {
        &self.catalog
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveChallenge> {
        self.active.as_ref()
    }

    /// Current state at `now`.
    #[must_use]
    pub fn tick(&self, now: OffsetDateTime) -> ChallengeStatus {
        match &self.active {
            None => ChallengeStatus::Idle,
            Some(active) => match active.remaining_secs(now) {
                0 => ChallengeStatus::Completed,
                remaining_secs => ChallengeStatus::Active { remaining_secs },
            },
        }
    }

    /// Start the catalog entry at `index`.
    ///
    /// # Errors
    ///
    /// Fails unless the engine is idle, or if `index` is out of range.
    pub fn start(&mut self, index: usize, now: OffsetDateTime) -> Result<&ActiveChallenge, ChallengeError> {
        if self.active.is_some() {
            return Err(ChallengeError::AlreadyRunning);
        }
        let challenge = self.catalog.get(index).ok_or(ChallengeError::UnknownChallenge(index))?.clone();
        info!(prompt = %challenge.prompt, duration_secs = challenge.duration_secs, "challenge started");
        Ok(&*self.active.insert(ActiveChallenge { challenge, started_at: now }))
    }

    /// Start a uniformly random catalog entry.
    ///
    /// # Errors
    ///
    /// Fails unless the engine is idle, or if the catalog is empty.
    pub fn start_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: OffsetDateTime,
    ) -> Result<&ActiveChallenge, ChallengeError> {
        if self.catalog.is_empty() {
            return Err(ChallengeError::EmptyCatalog);
        }
        let index = rng.random_range(0..self.catalog.len());
        self.start(index, now)
    }

    /// Clear a completed challenge.
    ///
    /// # Errors
    ///
    /// Fails if nothing is active or time remains.
    pub fn acknowledge(&mut self, now: OffsetDateTime) -> Result<Challenge, ChallengeError> {
        match self.tick(now) {
            ChallengeStatus::Idle => Err(ChallengeError::NotActive),
            ChallengeStatus::Active { remaining_secs } => Err(ChallengeError::NotComplete { remaining_secs }),
            ChallengeStatus::Completed => self.take_active(),
        }
    }

    /// Give up on a running challenge.
    ///
    /// # Errors
    ///
    /// Fails if nothing is active or time is already up.
    pub fn abandon(&mut self, now: OffsetDateTime) -> Result<Challenge, ChallengeError> {
        match self.tick(now) {
            ChallengeStatus::Idle => Err(ChallengeError::NotActive),
            ChallengeStatus::Completed => Err(ChallengeError::AlreadyComplete),
            ChallengeStatus::Active { .. } => self.take_active(),
        }
    }

    #[must_use]
    pub fn view(&self, now: OffsetDateTime) -> ChallengeView {
        let status = self.tick(now);
        match &self.active {
            None => ChallengeView {
                status,
                prompt: None,
                time_remaining: None,
                required_elements: None,
                options: self.catalog.iter().map(Challenge::label).collect(),
            },
            Some(active) => ChallengeView {
                status,
                prompt: Some(active.challenge.prompt.clone()),
                time_remaining: Some(format_remaining(status.remaining_secs())),
                required_elements: Some(active.challenge.required_elements.join(", ")),
                options: Vec::new(),
            },
        }
    }

    fn take_active(&mut self) -> Result<Challenge, ChallengeError> {
        let active = self.active.take().ok_or(ChallengeError::NotActive)?;
        info!(prompt = %active.challenge.prompt, "challenge cleared");
        Ok(active.challenge)
    }
}

/// `m:ss`, seconds zero-padded.
#[must_use]
pub fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
