//! Session state engine for a shared drawing surface.
//!
//! Every user interaction produces a full re-evaluation of the session: the
//! host collects the current input values into a [`session::CycleInput`] and
//! hands it to [`session::Session::run_cycle`], which walks the canvas, chat,
//! gallery, challenge and music steps in a fixed order and returns a
//! [`session::CycleReport`] describing what the widgets should show next.
//! Rendering, layout and real audio playback stay with the host.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`canvas`] | Canvas geometry, pixel buffer, resize transform, cue mapping |
//! | [`palette`] | Named color palettes and stroke color validation |
//! | [`services`] | Chat log, gallery, challenge engine, music, audio sink, orchestrator |
//! | [`state`] | The explicit `SessionState` owned by the orchestrator |
//! | [`config`] | Environment and catalog-file configuration |
//! | [`db`] | SQLite pool setup and migrations |
//! | [`notice`] | Error codes and user-visible notices |
//! | [`consts`] | Shared defaults and limits |

pub mod canvas;
pub mod config;
pub mod consts;
pub mod db;
pub mod notice;
pub mod palette;
pub mod services;
pub mod state;

pub use services::session;
