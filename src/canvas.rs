//! Canvas state: geometry, committed pixel buffer, and the resize transform.
//!
//! DESIGN
//! ======
//! The drawing surface is an external rasterizer. After each edit it hands
//! back a full pixel snapshot plus the vector JSON of the scene; the canvas
//! keeps the latest of each and trusts them as-is. The only transform owned
//! here is resize, which rescales the committed buffer by one uniform factor
//! (linear interpolation) so strokes keep their aspect ratio. The buffer may
//! end up smaller than the canvas on one axis.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    CUE_DURATION_MS, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_MAX_DIMENSION, DEFAULT_MIN_DIMENSION,
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, PIXEL_CHANNELS,
    STROKE_CUE_FREQUENCY_HZ, TRANSFORM_CUE_FREQUENCY_HZ,
};
use crate::notice::{E_REJECTED, ErrorCode};
use crate::palette;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("pixel snapshot is {actual} bytes, expected {expected} for {width}x{height}")]
    SnapshotSize { width: u32, height: u32, expected: usize, actual: usize },
    #[error("pixel snapshot has a zero dimension")]
    EmptySnapshot,
    #[error("invalid stroke color: {0}")]
    InvalidColor(String),
}

impl ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        E_REJECTED
    }
}

/// Drawing tool selected on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Freedraw,
    Line,
    Rect,
    Circle,
    Polygon,
    Transform,
}

/// Short audible feedback requested from the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl SoundCue {
    /// Signature for commit-style strokes.
    pub const STROKE: Self = Self { frequency_hz: STROKE_CUE_FREQUENCY_HZ, duration_ms: CUE_DURATION_MS };

    /// Signature for transform-mode manipulation.
    pub const TRANSFORM: Self = Self { frequency_hz: TRANSFORM_CUE_FREQUENCY_HZ, duration_ms: CUE_DURATION_MS };
}

/// Inclusive per-axis limits applied by [`CanvasState::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for ResizeBounds {
    fn default() -> Self {
        Self { min: DEFAULT_MIN_DIMENSION, max: DEFAULT_MAX_DIMENSION }
    }
}

impl ResizeBounds {
    #[must_use]
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

/// Raw RGBA pixels as delivered by the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSnapshot {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
}

impl PixelSnapshot {
    /// Convert into an image buffer, checking the byte length.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or the byte count does not
    /// match `width * height * 4`.
    pub fn into_image(self) -> Result<RgbaImage, CanvasError> {
        if self.width == 0 || self.height == 0 {
            return Err(CanvasError::EmptySnapshot);
        }
        let expected = self.width as usize * self.height as usize * PIXEL_CHANNELS as usize;
        let actual = self.rgba.len();
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.rgba).ok_or(CanvasError::SnapshotSize {
            width,
            height,
            expected,
            actual,
        })
    }
}

/// Output of the drawing surface after an edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOutput {
    #[serde(default)]
    pub pixel_snapshot: Option<PixelSnapshot>,
    #[serde(default)]
    pub vector_json: Option<serde_json::Value>,
}

/// A committed edit: the new buffer plus the scene's vector JSON.
#[derive(Debug, Clone)]
pub struct StrokeEvent {
    pub snapshot: RgbaImage,
    pub vector_json: Option<serde_json::Value>,
}

/// Read-only view of the canvas for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasView {
    pub width: u32,
    pub height: u32,
    /// `(width, height)` of the committed buffer, if any.
    pub buffer_size: Option<(u32, u32)>,
    pub tool: Tool,
    pub stroke_width: u32,
    pub stroke_color: String,
    pub has_content: bool,
}

// =============================================================================
// CANVAS STATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pub buffer: Option<RgbaImage>,
    /// Latest vector JSON from the surface; this is what the gallery saves.
    pub content: Option<serde_json::Value>,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub tool: Tool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl CanvasState {
    /// A blank canvas with no committed buffer. Zero sizes are raised to 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            buffer: None,
            content: None,
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            tool: Tool::default(),
        }
    }

    /// Resize the canvas, clamping each axis to `bounds`.
    ///
    /// A committed buffer is rescaled by `min(w / old_w, h / old_h)` so the
    /// drawing keeps its aspect ratio. Returns the applied `(width, height)`.
    pub fn resize(&mut self, width: u32, height: u32, bounds: ResizeBounds) -> (u32, u32) {
        let new_width = bounds.clamp(width);
        let new_height = bounds.clamp(height);

        if let Some(buffer) = self.buffer.take() {
            let scale = scale_factor((self.width, self.height), (new_width, new_height));
            let (target_w, target_h) = scaled_dims(buffer.dimensions(), scale);
            let resized = if (target_w, target_h) == buffer.dimensions() {
                buffer
            } else {
                imageops::resize(&buffer, target_w, target_h, FilterType::Triangle)
            };
            debug!(scale, target_w, target_h, "resampled canvas buffer");
            self.buffer = Some(resized);
        }

        self.width = new_width;
        self.height = new_height;
        (new_width, new_height)
    }

    /// Replace the committed buffer and scene content with a new snapshot.
    pub fn apply_stroke(&mut self, event: StrokeEvent) {
        self.buffer = Some(event.snapshot);
        self.content = event.vector_json;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Set the stroke width, clamped to the supported range.
    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
    }

    /// Set the stroke color from a `#RRGGBB` string.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] and leaves the color unchanged
    /// when the string is not a hex color.
    pub fn set_stroke_color(&mut self, color: &str) -> Result<(), CanvasError> {
        let normalized = palette::normalize_hex(color).ok_or_else(|| CanvasError::InvalidColor(color.to_string()))?;
        self.stroke_color = normalized;
        Ok(())
    }

    #[must_use]
    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.buffer.as_ref().map(RgbaImage::dimensions)
    }

    #[must_use]
    pub fn view(&self) -> CanvasView {
        CanvasView {
            width: self.width,
            height: self.height,
            buffer_size: self.buffer_size(),
            tool: self.tool,
            stroke_width: self.stroke_width,
            stroke_color: self.stroke_color.clone(),
            has_content: self.content.is_some(),
        }
    }
}

/// Map an interaction to its audible feedback.
///
/// Freedraw, line and rect commits play the stroke cue. Transform mode plays
/// its own cue on every interaction, stroke or not. Circle and polygon are
/// silent.
#[must_use]
pub fn classify_interaction(tool: Tool, has_stroke: bool) -> Option<SoundCue> {
    match tool {
        Tool::Freedraw | Tool::Line | Tool::Rect if has_stroke => Some(SoundCue::STROKE),
        Tool::Transform => Some(SoundCue::TRANSFORM),
        _ => None,
    }
}

fn scale_factor(old: (u32, u32), new: (u32, u32)) -> f64 {
    let sx = f64::from(new.0) / f64::from(old.0.max(1));
    let sy = f64::from(new.1) / f64::from(old.1.max(1));
    sx.min(sy)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_dims(dims: (u32, u32), scale: f64) -> (u32, u32) {
    let w = (f64::from(dims.0) * scale).round().max(1.0);
    let h = (f64::from(dims.1) * scale).round().max(1.0);
    (w as u32, h as u32)
}
