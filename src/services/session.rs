//! Session orchestrator — one full re-evaluation per interaction cycle.
//!
//! ARCHITECTURE
//! ============
//! The host gathers the current widget values and any button presses into a
//! [`CycleInput`]. [`Session::run_cycle`] applies them in a fixed order:
//!
//! 1. resize
//! 2. tool, stroke settings, surface output, and the resulting sound cue
//!    (only when the cycle set the tool or carried a surface report)
//! 3. chat send, then the chat read-back
//! 4. gallery save / like / comment
//! 5. challenge start / acknowledge / abandon, recomputed against `now`
//! 6. music play / stop
//!
//! The order never depends on how actions arrive in the input. Later steps
//! see earlier mutations: a save in step 4 stores the scene committed in
//! step 2 of the same cycle.
//!
//! ERROR HANDLING
//! ==============
//! A cycle always completes and always returns a report. Every service error
//! becomes a [`Notice`]; audio failures are only logged. A chat store outage
//! leaves the previous listing in place.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::canvas::{CanvasView, StrokeEvent, SurfaceOutput, Tool, classify_interaction};
use crate::config::SessionConfig;
use crate::notice::Notice;
use crate::services::audio::{AudioRequest, AudioSink, submit_best_effort};
use crate::services::challenge::{ChallengeStatus, ChallengeView};
use crate::services::chat::{ChatMessage, MessageLog};
use crate::services::gallery::{DrawingId, DrawingRecord, GalleryError};
use crate::services::music::NowPlaying;
use crate::state::SessionState;

pub const SAVED_NOTICE: &str = "Drawing saved!";
pub const SAVE_FAILED_NOTICE: &str = "Unable to save drawing. Make sure you've drawn something!";
pub const CHALLENGE_COMPLETE_NOTICE: &str = "Challenge Complete!";

// =============================================================================
// INPUT
// =============================================================================

/// A discrete user action consumed once by the cycle it arrives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Resize { width: u32, height: u32 },
    PickColor { palette: String, index: usize },
    SendMessage { author: String, body: String },
    SaveDrawing { author: String },
    Like { drawing_id: DrawingId },
    Comment { drawing_id: DrawingId, author: String, text: String },
    /// Start the catalog entry at `index`, or a random one.
    StartChallenge {
        #[serde(default)]
        index: Option<usize>,
    },
    Acknowledge,
    Abandon,
    PlayMusic {
        mood: String,
        track: String,
        #[serde(default)]
        volume: Option<f32>,
    },
    StopMusic,
}

/// Position of an action in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Resize,
    Canvas,
    Chat,
    Gallery,
    Challenge,
    Music,
}

impl Action {
    #[must_use]
    pub fn step(&self) -> Step {
        match self {
            Self::Resize { .. } => Step::Resize,
            Self::PickColor { .. } => Step::Canvas,
            Self::SendMessage { .. } => Step::Chat,
            Self::SaveDrawing { .. } | Self::Like { .. } | Self::Comment { .. } => Step::Gallery,
            Self::StartChallenge { .. } | Self::Acknowledge | Self::Abandon => Step::Challenge,
            Self::PlayMusic { .. } | Self::StopMusic => Step::Music,
        }
    }
}

/// Everything the host observed since the previous cycle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CycleInput {
    /// Current tool; `None` keeps the previous one.
    #[serde(default)]
    pub tool: Option<Tool>,
    #[serde(default)]
    pub stroke_width: Option<u32>,
    /// Custom `#RRGGBB` color from the color picker.
    #[serde(default)]
    pub stroke_color: Option<String>,
    /// What the drawing surface returned, if it reported anything.
    #[serde(default)]
    pub surface: Option<SurfaceOutput>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

// =============================================================================
// OUTPUT
// =============================================================================

/// What the host should render after a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub canvas: CanvasView,
    /// Most recent first.
    pub messages: Vec<ChatMessage>,
    pub gallery: Vec<DrawingRecord>,
    pub challenge: ChallengeView,
    pub now_playing: Option<NowPlaying>,
    /// Audio requests issued this cycle, in order.
    pub effects: Vec<AudioRequest>,
    pub notices: Vec<Notice>,
}

#[derive(Default)]
struct CycleOutput {
    effects: Vec<AudioRequest>,
    notices: Vec<Notice>,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    id: Uuid,
    state: SessionState,
    chat: MessageLog,
    audio: Arc<dyn AudioSink>,
    cycles: u64,
}

impl Session {
    #[must_use]
    pub fn new(config: &SessionConfig, chat: MessageLog, audio: Arc<dyn AudioSink>) -> Self {
        Self { id: Uuid::new_v4(), state: SessionState::new(config), chat, audio, cycles: 0 }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run one interaction cycle at wall-clock time `now`.
    pub async fn run_cycle(&mut self, input: CycleInput, now: OffsetDateTime) -> CycleReport {
        self.cycles += 1;
        debug!(session_id = %self.id, cycle = self.cycles, actions = input.actions.len(), "cycle start");

        let mut out = CycleOutput::default();
        let CycleInput { tool, stroke_width, stroke_color, surface, actions } = input;
        let in_step = |step: Step| actions.iter().filter(move |a| a.step() == step);

        for action in in_step(Step::Resize) {
            self.apply_resize(action, &mut out);
        }

        let interacted = tool.is_some() || surface.is_some();
        self.apply_canvas_settings(tool, stroke_width, stroke_color.as_deref(), &mut out);
        for action in in_step(Step::Canvas) {
            self.apply_canvas_action(action, &mut out);
        }
        let has_stroke = self.apply_surface(surface, &mut out);
        if let Some(cue) = classify_interaction(self.state.canvas.tool, has_stroke).filter(|_| interacted) {
            self.emit(AudioRequest::Cue(cue), &mut out);
        }

        for action in in_step(Step::Chat) {
            self.apply_chat(action, now, &mut out).await;
        }
        self.refresh_messages(&mut out).await;

        for action in in_step(Step::Gallery) {
            self.apply_gallery(action, now, &mut out);
        }

        for action in in_step(Step::Challenge) {
            self.apply_challenge(action, now, &mut out);
        }
        if self.state.challenge.tick(now) == ChallengeStatus::Completed {
            out.notices.push(Notice::success(CHALLENGE_COMPLETE_NOTICE));
        }

        for action in in_step(Step::Music) {
            self.apply_music(action, &mut out);
        }

        CycleReport {
            cycle: self.cycles,
            canvas: self.state.canvas.view(),
            messages: self.state.messages.clone(),
            gallery: self.state.gallery.list().to_vec(),
            challenge: self.state.challenge.view(now),
            now_playing: self.state.music.now_playing().cloned(),
            effects: out.effects,
            notices: out.notices,
        }
    }

    // --- Step 1: resize ---

    fn apply_resize(&mut self, action: &Action, out: &mut CycleOutput) {
        let Action::Resize { width, height } = *action else {
            return;
        };
        let applied = self.state.canvas.resize(width, height, self.state.bounds);
        if applied != (width, height) {
            out.notices.push(Notice::info(format!("Canvas size limited to {}x{}", applied.0, applied.1)));
        }
    }

    // --- Step 2: canvas ---

    fn apply_canvas_settings(
        &mut self,
        tool: Option<Tool>,
        stroke_width: Option<u32>,
        stroke_color: Option<&str>,
        out: &mut CycleOutput,
    ) {
        let canvas = &mut self.state.canvas;
        if let Some(tool) = tool {
            canvas.set_tool(tool);
        }
        if let Some(width) = stroke_width {
            canvas.set_stroke_width(width);
        }
        if let Some(color) = stroke_color {
            if let Err(e) = canvas.set_stroke_color(color) {
                out.notices.push(Notice::error_from(&e));
            }
        }
    }

    fn apply_canvas_action(&mut self, action: &Action, out: &mut CycleOutput) {
        let Action::PickColor { palette, index } = action else {
            return;
        };
        let Some(color) = self.state.palettes.color(palette, *index) else {
            out.notices.push(Notice::info(format!("No color {index} in palette {palette}")));
            return;
        };
        if let Err(e) = self.state.canvas.set_stroke_color(color) {
            out.notices.push(Notice::error_from(&e));
        }
    }

    /// Commit the surface report. Returns whether a stroke was applied.
    fn apply_surface(&mut self, surface: Option<SurfaceOutput>, out: &mut CycleOutput) -> bool {
        let Some(SurfaceOutput { pixel_snapshot, vector_json }) = surface else {
            return false;
        };

        match pixel_snapshot.map(crate::canvas::PixelSnapshot::into_image) {
            Some(Ok(snapshot)) => {
                self.state.canvas.apply_stroke(StrokeEvent { snapshot, vector_json });
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, "discarding malformed pixel snapshot");
                out.notices.push(Notice::error_from(&e));
                false
            }
            None => {
                if vector_json.is_some() {
                    self.state.canvas.content = vector_json;
                }
                false
            }
        }
    }

    // --- Step 3: chat ---

    async fn apply_chat(&mut self, action: &Action, now: OffsetDateTime, out: &mut CycleOutput) {
        let Action::SendMessage { author, body } = action else {
            return;
        };
        if let Err(e) = self.chat.append(author, body, now).await {
            warn!(session_id = %self.id, error = %e, "chat send failed");
            out.notices.push(Notice::error_from(&e));
        }
    }

    async fn refresh_messages(&mut self, out: &mut CycleOutput) {
        match self.chat.list_all().await {
            Ok(messages) => self.state.messages = messages,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "chat read-back failed; keeping last listing");
                out.notices.push(Notice::error_from(&e));
            }
        }
    }

    // --- Step 4: gallery ---

    fn apply_gallery(&mut self, action: &Action, now: OffsetDateTime, out: &mut CycleOutput) {
        let gallery = &mut self.state.gallery;
        let result = match action {
            Action::SaveDrawing { author } => gallery
                .save(author, self.state.canvas.content.as_ref(), now)
                .map(|_| Some(Notice::success(SAVED_NOTICE))),
            Action::Like { drawing_id } => gallery.like(*drawing_id).map(|_| None),
            Action::Comment { drawing_id, author, text } => gallery.comment(*drawing_id, author, text, now).map(|_| None),
            _ => return,
        };
        match result {
            Ok(Some(notice)) => out.notices.push(notice),
            Ok(None) => {}
            Err(e @ GalleryError::EmptyContent) => out.notices.push(Notice::error_with(&e, SAVE_FAILED_NOTICE)),
            Err(e) => out.notices.push(Notice::error_from(&e)),
        }
    }

    // --- Step 5: challenge ---

    fn apply_challenge(&mut self, action: &Action, now: OffsetDateTime, out: &mut CycleOutput) {
        let engine = &mut self.state.challenge;
        let result = match action {
            Action::StartChallenge { index: Some(index) } => engine.start(*index, now).map(|_| ()),
            Action::StartChallenge { index: None } => engine.start_random(&mut rand::rng(), now).map(|_| ()),
            Action::Acknowledge => engine.acknowledge(now).map(|_| ()),
            Action::Abandon => engine.abandon(now).map(|_| ()),
            _ => return,
        };
        if let Err(e) = result {
            out.notices.push(Notice::error_from(&e));
        }
    }

    // --- Step 6: music ---

    fn apply_music(&mut self, action: &Action, out: &mut CycleOutput) {
        let result = match action {
            Action::PlayMusic { mood, track, volume } => {
                self.state.music.play(&self.state.music_library, mood, track, *volume)
            }
            Action::StopMusic => self.state.music.stop(),
            _ => return,
        };
        match result {
            Ok(request) => self.emit(request, out),
            Err(e) => out.notices.push(Notice::error_from(&e)),
        }
    }

    fn emit(&self, request: AudioRequest, out: &mut CycleOutput) {
        submit_best_effort(self.audio.as_ref(), &request);
        out.effects.push(request);
    }
}
