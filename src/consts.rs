//! Shared defaults and limits.

// ── Canvas ──────────────────────────────────────────────────────

/// Initial canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1400;

/// Initial canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 800;

/// Smallest size accepted on either axis by a resize.
pub const DEFAULT_MIN_DIMENSION: u32 = 100;

/// Largest size accepted on either axis by a resize.
pub const DEFAULT_MAX_DIMENSION: u32 = 5000;

/// RGBA.
pub const PIXEL_CHANNELS: u32 = 4;

// ── Stroke ──────────────────────────────────────────────────────

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 25;
pub const DEFAULT_STROKE_WIDTH: u32 = 3;

/// Stroke color before the user picks anything.
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

// ── Audio ───────────────────────────────────────────────────────

/// Cue played after a commit-style stroke (freedraw, line, rect).
pub const STROKE_CUE_FREQUENCY_HZ: u32 = 600;

/// Cue played while manipulating objects in transform mode.
pub const TRANSFORM_CUE_FREQUENCY_HZ: u32 = 300;

pub const CUE_DURATION_MS: u32 = 150;

/// Music volume when the host does not send one.
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.5;

// ── Persistence ─────────────────────────────────────────────────

pub const DEFAULT_DATABASE_URL: &str = "sqlite://chat.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// How long a writer waits on another process holding the chat store lock.
pub const DB_BUSY_TIMEOUT_MS: u64 = 5_000;
