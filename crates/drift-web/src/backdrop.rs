// backdrop.rs
//
// Pixelated video background: the video is cover-cropped into a small
// offscreen canvas and scaled up to the viewport with smoothing off.
//
// Usage:
//   let backdrop = Backdrop::attach(&page, &config);
//   // every animation frame:
//   backdrop.draw();

use std::cell::Cell;
use std::rc::Rc;

use drift_stage::{cover_crop, BackdropLayout, StageConfig};
use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, HtmlVideoElement};

use crate::dom::{self, Page};
use crate::listeners::Binding;

pub struct Backdrop {
    page: Page,
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    offscreen: HtmlCanvasElement,
    off_ctx: CanvasRenderingContext2d,
    pixel: u32,
    layout: BackdropLayout,
    dirty: Rc<Cell<bool>>,
    _bindings: Vec<Binding>,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Start the video, discarding the outcome. Autoplay refusals are the
/// unlock gate's concern.
fn start_video(video: &HtmlVideoElement) {
    if let Ok(promise) = video.play() {
        wasm_bindgen_futures::spawn_local(async move {
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        });
    }
}

impl Backdrop {
    /// `None` when the page has no video or canvas to work with.
    pub fn attach(page: &Page, config: &StageConfig) -> Option<Self> {
        let video: HtmlVideoElement = page.by_id(dom::VIDEO_ID)?;
        let canvas: HtmlCanvasElement = page.by_id(dom::CANVAS_ID)?;
        let ctx = context_2d(&canvas)?;
        let offscreen: HtmlCanvasElement = page.document().create_element("canvas").ok()?.dyn_into().ok()?;
        let off_ctx = context_2d(&offscreen)?;

        let rate = f64::from(config.backdrop_playback_rate);
        video.set_playback_rate(rate);
        start_video(&video);

        let dirty = Rc::new(Cell::new(true));
        let mut bindings = Vec::new();
        {
            let dirty = Rc::clone(&dirty);
            let window: &EventTarget = page.window().as_ref();
            bindings.extend(Binding::attach(window, "resize", None, move |_| dirty.set(true)));
        }
        {
            let target: EventTarget = video.clone().into();
            let video = video.clone();
            bindings.extend(Binding::attach(&target, "canplay", None, move |_| {
                video.set_playback_rate(rate);
                start_video(&video);
            }));
        }

        let mut backdrop = Self {
            page: page.clone(),
            video,
            canvas,
            ctx,
            offscreen,
            off_ctx,
            pixel: config.backdrop_pixel,
            layout: BackdropLayout::new(Vec2::ONE, 1.0, config.backdrop_pixel),
            dirty,
            _bindings: bindings,
        };
        backdrop.resize();
        log::debug!("backdrop: {:?}", backdrop.layout);
        Some(backdrop)
    }

    fn viewport(&self) -> Vec2 {
        let window = self.page.window();
        let size = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        Vec2::new(size(window.inner_width()), size(window.inner_height()))
    }

    fn resize(&mut self) {
        let css = self.viewport();
        let dpr = self.page.window().device_pixel_ratio() as f32;
        self.layout = BackdropLayout::new(css, dpr, self.pixel);

        self.canvas.set_width(self.layout.canvas.x);
        self.canvas.set_height(self.layout.canvas.y);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", css.x));
        let _ = style.set_property("height", &format!("{}px", css.y));
        let dpr = f64::from(self.layout.dpr);
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        self.offscreen.set_width(self.layout.offscreen.x);
        self.offscreen.set_height(self.layout.offscreen.y);
        self.off_ctx.set_image_smoothing_enabled(false);
        self.ctx.set_image_smoothing_enabled(false);
    }

    /// Draw the current video frame, if the video has one.
    pub fn draw(&mut self) {
        if self.dirty.replace(false) {
            self.resize();
        }
        if self.video.ready_state() < dom::HAVE_CURRENT_DATA {
            return;
        }
        let video = Vec2::new(self.video.video_width() as f32, self.video.video_height() as f32);
        let Some(crop) = cover_crop(video, self.layout.offscreen) else {
            return;
        };
        let off = self.layout.offscreen.as_dvec2();
        let css = self.layout.css.as_dvec2();

        let drawn = self
            .off_ctx
            .draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.video,
                f64::from(crop.origin.x),
                f64::from(crop.origin.y),
                f64::from(crop.size.x),
                f64::from(crop.size.y),
                0.0,
                0.0,
                off.x,
                off.y,
            )
            .and_then(|()| {
                self.ctx.draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    &self.offscreen,
                    0.0,
                    0.0,
                    off.x,
                    off.y,
                    0.0,
                    0.0,
                    css.x,
                    css.y,
                )
            });
        if let Err(err) = drawn {
            log::trace!("backdrop: {err:?}");
        }
    }
}
