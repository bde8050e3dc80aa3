use super::*;
use image::Rgba;
use serde_json::json;

// =============================================================
// Helpers
// =============================================================

fn filled(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
}

fn canvas_with_buffer(width: u32, height: u32) -> CanvasState {
    let mut canvas = CanvasState::new(width, height);
    canvas.apply_stroke(StrokeEvent { snapshot: filled(width, height), vector_json: Some(json!({"objects": [1]})) });
    canvas
}

fn within_one(actual: u32, expected: f64) -> bool {
    (f64::from(actual) - expected).abs() <= 1.0
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_canvas_matches_initial_size() {
    let canvas = CanvasState::default();
    assert_eq!((canvas.width, canvas.height), (1400, 800));
    assert!(canvas.buffer.is_none());
    assert_eq!(canvas.stroke_width, 3);
    assert_eq!(canvas.stroke_color, "#000000");
    assert_eq!(canvas.tool, Tool::Freedraw);
}

// =============================================================
// resize
// =============================================================

#[test]
fn resize_without_buffer_updates_dimensions_only() {
    let mut canvas = CanvasState::new(1400, 800);
    let applied = canvas.resize(700, 300, ResizeBounds::default());
    assert_eq!(applied, (700, 300));
    assert_eq!((canvas.width, canvas.height), (700, 300));
    assert!(canvas.buffer.is_none());
}

#[test]
fn resize_clamps_each_axis_to_bounds() {
    let mut canvas = CanvasState::new(1400, 800);
    assert_eq!(canvas.resize(10, 9000, ResizeBounds::default()), (100, 5000));
    assert_eq!((canvas.width, canvas.height), (100, 5000));
}

#[test]
fn resize_honors_custom_bounds() {
    let mut canvas = CanvasState::new(400, 400);
    let bounds = ResizeBounds { min: 200, max: 600 };
    assert_eq!(canvas.resize(100, 700, bounds), (200, 600));
}

#[test]
fn resize_scales_buffer_by_smaller_axis_ratio() {
    let mut canvas = canvas_with_buffer(400, 200);
    canvas.resize(200, 200, ResizeBounds::default());
    // min(200/400, 200/200) = 0.5
    assert_eq!(canvas.buffer_size(), Some((200, 100)));
    assert_eq!((canvas.width, canvas.height), (200, 200));
}

#[test]
fn resize_upscale_preserves_aspect() {
    let mut canvas = canvas_with_buffer(300, 200);
    canvas.resize(900, 400, ResizeBounds::default());
    // min(3.0, 2.0) = 2.0
    assert_eq!(canvas.buffer_size(), Some((600, 400)));
}

#[test]
fn resize_buffer_dims_follow_rounding_rule_for_odd_ratios() {
    let cases = [(1400, 800, 1000, 777), (333, 257, 128, 999), (640, 480, 101, 4999)];
    for (ow, oh, nw, nh) in cases {
        let mut canvas = canvas_with_buffer(ow, oh);
        canvas.resize(nw, nh, ResizeBounds::default());
        let scale = (f64::from(nw) / f64::from(ow)).min(f64::from(nh) / f64::from(oh));
        let (bw, bh) = canvas.buffer_size().unwrap();
        assert!(within_one(bw, f64::from(ow) * scale), "{ow}x{oh} -> {nw}x{nh}: width {bw}");
        assert!(within_one(bh, f64::from(oh) * scale), "{ow}x{oh} -> {nw}x{nh}: height {bh}");
        assert_eq!((canvas.width, canvas.height), (nw, nh));
    }
}

#[test]
fn resize_scales_relative_to_canvas_not_buffer() {
    // Buffer already shrunk by an earlier resize; the next factor still uses
    // the canvas dimensions.
    let mut canvas = canvas_with_buffer(400, 200);
    canvas.resize(200, 200, ResizeBounds::default());
    canvas.resize(400, 400, ResizeBounds::default());
    assert_eq!(canvas.buffer_size(), Some((400, 200)));
}

#[test]
fn resize_keeps_uniform_color_after_resampling() {
    let mut canvas = canvas_with_buffer(200, 200);
    canvas.resize(100, 100, ResizeBounds::default());
    let buffer = canvas.buffer.as_ref().unwrap();
    let pixel = buffer.get_pixel(50, 50);
    for (got, want) in pixel.0.iter().zip([10u8, 20, 30, 255]) {
        assert!(got.abs_diff(want) <= 1, "channel {got} drifted from {want}");
    }
}

#[test]
fn resize_to_same_size_keeps_buffer() {
    let mut canvas = canvas_with_buffer(300, 300);
    canvas.resize(300, 300, ResizeBounds::default());
    assert_eq!(canvas.buffer_size(), Some((300, 300)));
}

// =============================================================
// apply_stroke / settings
// =============================================================

#[test]
fn apply_stroke_replaces_buffer_and_content() {
    let mut canvas = canvas_with_buffer(200, 100);
    canvas.apply_stroke(StrokeEvent { snapshot: filled(50, 60), vector_json: None });
    assert_eq!(canvas.buffer_size(), Some((50, 60)));
    assert!(canvas.content.is_none());
}

#[test]
fn stroke_width_is_clamped() {
    let mut canvas = CanvasState::default();
    canvas.set_stroke_width(0);
    assert_eq!(canvas.stroke_width, 1);
    canvas.set_stroke_width(99);
    assert_eq!(canvas.stroke_width, 25);
    canvas.set_stroke_width(7);
    assert_eq!(canvas.stroke_width, 7);
}

#[test]
fn stroke_color_accepts_hex_and_rejects_garbage() {
    let mut canvas = CanvasState::default();
    assert!(canvas.set_stroke_color("#ffb3ba").is_ok());
    assert_eq!(canvas.stroke_color, "#FFB3BA");
    assert_eq!(canvas.set_stroke_color("red"), Err(CanvasError::InvalidColor("red".into())));
    assert_eq!(canvas.stroke_color, "#FFB3BA");
}

#[test]
fn view_reports_buffer_and_content() {
    let canvas = canvas_with_buffer(120, 110);
    let view = canvas.view();
    assert_eq!(view.buffer_size, Some((120, 110)));
    assert!(view.has_content);
}

// =============================================================
// PixelSnapshot
// =============================================================

#[test]
fn snapshot_into_image_checks_length() {
    let ok = PixelSnapshot { width: 2, height: 2, rgba: vec![0; 16] };
    assert_eq!(ok.into_image().unwrap().dimensions(), (2, 2));

    let short = PixelSnapshot { width: 2, height: 2, rgba: vec![0; 15] };
    assert_eq!(
        short.into_image().unwrap_err(),
        CanvasError::SnapshotSize { width: 2, height: 2, expected: 16, actual: 15 }
    );
}

#[test]
fn snapshot_with_zero_dimension_is_rejected() {
    let empty = PixelSnapshot { width: 0, height: 4, rgba: Vec::new() };
    assert_eq!(empty.into_image().unwrap_err(), CanvasError::EmptySnapshot);
}

// =============================================================
// classify_interaction
// =============================================================

#[test]
fn commit_tools_cue_only_with_stroke() {
    for tool in [Tool::Freedraw, Tool::Line, Tool::Rect] {
        assert_eq!(classify_interaction(tool, true), Some(SoundCue::STROKE));
        assert_eq!(classify_interaction(tool, false), None);
    }
}

#[test]
fn transform_cues_with_or_without_stroke() {
    assert_eq!(classify_interaction(Tool::Transform, true), Some(SoundCue::TRANSFORM));
    assert_eq!(classify_interaction(Tool::Transform, false), Some(SoundCue::TRANSFORM));
}

#[test]
fn circle_and_polygon_are_silent() {
    for tool in [Tool::Circle, Tool::Polygon] {
        assert_eq!(classify_interaction(tool, true), None);
        assert_eq!(classify_interaction(tool, false), None);
    }
}

#[test]
fn cue_signatures_are_distinct() {
    assert_eq!(SoundCue::STROKE.frequency_hz, 600);
    assert_eq!(SoundCue::TRANSFORM.frequency_hz, 300);
    assert_eq!(SoundCue::STROKE.duration_ms, 150);
    assert_ne!(SoundCue::STROKE, SoundCue::TRANSFORM);
}

#[test]
fn tool_deserializes_from_lowercase() {
    let tool: Tool = serde_json::from_str("\"polygon\"").unwrap();
    assert_eq!(tool, Tool::Polygon);
}
