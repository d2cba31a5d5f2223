// systems/backdrop.rs
//
// Geometry for the pixelated video backdrop: the video is drawn into a
// low-resolution offscreen surface with a cover crop, then scaled up to
// the viewport with smoothing disabled.

use glam::{UVec2, Vec2};

/// Canvas sizes derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropLayout {
    /// Viewport size in CSS pixels.
    pub css: Vec2,
    /// Device pixel ratio, at least 1.
    pub dpr: f32,
    /// Backing store size of the visible canvas.
    pub canvas: UVec2,
    /// Size of the down-sampled offscreen surface.
    pub offscreen: UVec2,
}

impl BackdropLayout {
    pub fn new(css: Vec2, dpr: f32, pixel: u32) -> Self {
        let dpr = if dpr.is_finite() { dpr.max(1.0) } else { 1.0 };
        let css = css.max(Vec2::ZERO);
        let pixel = pixel.max(1) as f32;
        let canvas = (css * dpr).floor().as_uvec2();
        let offscreen = (css / pixel).floor().as_uvec2().max(UVec2::ONE);
        Self { css, dpr, canvas, offscreen }
    }
}

/// Source rectangle within the video frame, in video pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub origin: Vec2,
    pub size: Vec2,
}

/// Center crop of `video` matching the aspect ratio of `target`.
/// Wider videos lose their sides, taller videos their top and bottom.
/// Returns `None` while either size is degenerate.
pub fn cover_crop(video: Vec2, target: UVec2) -> Option<SourceRect> {
    if video.x <= 0.0 || video.y <= 0.0 || target.x == 0 || target.y == 0 {
        return None;
    }
    let target = target.as_vec2();
    let video_aspect = video.x / video.y;
    let target_aspect = target.x / target.y;

    let rect = if video_aspect > target_aspect {
        let w = (video.y * target_aspect).round();
        SourceRect {
            origin: Vec2::new(((video.x - w) / 2.0).round(), 0.0),
            size: Vec2::new(w, video.y),
        }
    } else {
        let h = (video.x / target_aspect).round();
        SourceRect {
            origin: Vec2::new(0.0, ((video.y - h) / 2.0).round()),
            size: Vec2::new(video.x, h),
        }
    };
    Some(rect)
}
