use drift_stage::{Effect, InputEvent, RequestKind, Stage};
use web_sys::HtmlFormElement;

#[cfg(feature = "backdrop")]
use crate::backdrop::Backdrop;
use crate::dom::{self, Page};
use crate::listeners::Listeners;
use crate::{media, net};

/// Owns the stage and everything it touches on the page.
///
/// wasm-bindgen cannot export the stage directly, so `lib.rs` keeps one
/// runner in a `thread_local!` and forwards browser callbacks to it.
pub struct StageRunner {
    stage: Stage,
    page: Page,
    listeners: Listeners,
    #[cfg(feature = "backdrop")]
    backdrop: Option<Backdrop>,
    last_frame: Option<f64>,
}

impl StageRunner {
    pub fn new(stage: Stage, page: Page) -> Self {
        let listeners = Listeners::attach(&page);
        #[cfg(feature = "backdrop")]
        let backdrop = Backdrop::attach(&page, stage.config());
        Self {
            stage,
            page,
            listeners,
            #[cfg(feature = "backdrop")]
            backdrop,
            last_frame: None,
        }
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// One animation frame: advance the clock by the elapsed time, run due
    /// tasks, apply their effects and repaint the backdrop.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.last_frame.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame = Some(now_ms);
        self.stage.tick(dt);
        self.flush();
        self.paint();
    }

    #[cfg(feature = "backdrop")]
    fn paint(&mut self) {
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.draw();
        }
    }

    #[cfg(not(feature = "backdrop"))]
    fn paint(&mut self) {}

    pub fn dispatch(&mut self, event: InputEvent) {
        self.stage.dispatch(event);
        self.flush();
    }

    /// Apply every pending effect in emission order.
    pub fn flush(&mut self) {
        for effect in self.stage.drain_effects() {
            match effect {
                Effect::Play { media, volume } => media::play(&self.page, media, volume),
                Effect::Request(request) => {
                    let url = self.endpoint(&request.kind);
                    net::send(request, url);
                }
                Effect::DetachGestureListeners => self.listeners.detach_gestures(),
                effect => {
                    if let Err(err) = self.page.apply(&effect) {
                        log::warn!("dom: {effect:?}: {err:?}");
                    }
                }
            }
        }
    }

    /// The nickname form's own action wins over the configured endpoint.
    fn endpoint(&self, kind: &RequestKind) -> String {
        if let RequestKind::SubmitNickname { .. } = kind {
            let action = self
                .page
                .by_id::<HtmlFormElement>(dom::NICK_FORM_ID)
                .map(|form| form.action())
                .filter(|action| !action.is_empty());
            if let Some(action) = action {
                return action;
            }
        }
        kind.endpoint(self.stage.config()).to_string()
    }

    /// Cancel pending work. Listeners and the backdrop go when the runner is dropped.
    pub fn teardown(&mut self) {
        self.stage.teardown();
        self.listeners.detach_gestures();
    }
}
