pub mod dom;
pub mod listeners;
pub mod media;
pub mod net;
pub mod runner;

#[cfg(feature = "backdrop")]
pub mod backdrop;

pub use runner::StageRunner;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use drift_stage::{InputEvent, SceneId, Stage, StageConfig, VideoReadiness};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

use crate::dom::Page;

thread_local! {
    static RUNNER: RefCell<Option<StageRunner>> = const { RefCell::new(None) };
    static GENERATION: Cell<u32> = const { Cell::new(0) };
}

/// Run `f` against the live runner. `None` before init, after teardown, or
/// when the runner is already borrowed further up the stack.
fn with_runner<R>(f: impl FnOnce(&mut StageRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::warn!("drift: runner busy, call dropped");
            return None;
        };
        borrow.as_mut().map(f)
    })
}

/// Feed a browser event into the stage and apply what it produces.
pub(crate) fn dispatch(event: InputEvent) {
    if with_runner(|r| r.dispatch(event)).is_none() {
        log::debug!("drift: event arrived without a running stage");
    }
}

fn video_readiness(page: &Page) -> VideoReadiness {
    match page.by_id::<HtmlMediaElement>(dom::VIDEO_ID) {
        None => VideoReadiness::Missing,
        Some(video) if video.ready_state() >= dom::HAVE_CURRENT_DATA => VideoReadiness::Ready,
        Some(_) => VideoReadiness::Loading,
    }
}

fn parse_config(config_json: Option<String>) -> StageConfig {
    match config_json.as_deref().map(StageConfig::from_json) {
        None => StageConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(err)) => {
            log::warn!("drift: invalid config ({err}), using defaults");
            StageConfig::default()
        }
    }
}

/// Boot the stage on the current page. Calling it again replaces the running stage.
#[wasm_bindgen]
pub fn drift_init(config_json: Option<String>) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    drift_teardown();
    let Some(page) = Page::current() else {
        log::warn!("drift: no window or document");
        return;
    };

    let config = parse_config(config_json);
    let scenes: Vec<SceneId> = SceneId::ALL
        .into_iter()
        .filter(|scene| page.document().get_element_by_id(scene.key()).is_some())
        .collect();
    let has_anon = page.has_anon();
    let readiness = video_readiness(&page);
    log::info!(
        "drift: initialized ({} scenes, has_anon={has_anon}, video {readiness:?})",
        scenes.len()
    );

    let stage = Stage::new(config, scenes, has_anon);
    let runner = StageRunner::new(stage, page.clone());
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });

    with_runner(|r| {
        r.stage_mut().boot(readiness);
        r.flush();
    });
    start_frame_loop(page);
}

/// Cancel every pending timer and unhook the page.
#[wasm_bindgen]
pub fn drift_teardown() {
    GENERATION.with(|generation| generation.set(generation.get().wrapping_add(1)));
    let runner = RUNNER.with(|cell| cell.borrow_mut().take());
    if let Some(mut runner) = runner {
        runner.teardown();
        log::info!("drift: torn down");
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drive the stage clock from `requestAnimationFrame` until the next
/// init or teardown bumps the generation.
fn start_frame_loop(page: Page) {
    let generation = GENERATION.with(Cell::get);
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    let window = page.window().clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        if GENERATION.with(Cell::get) != generation {
            // Breaks the self-reference so the closure is freed.
            let _ = next.borrow_mut().take();
            return;
        }
        with_runner(|r| r.frame(now));
        request_frame(&window, &next);
    }) as Box<dyn FnMut(f64)>));

    request_frame(page.window(), &callback);
}

fn request_frame(window: &web_sys::Window, callback: &FrameCallback) {
    if let Some(callback) = callback.borrow().as_ref() {
        if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            log::warn!("drift: requestAnimationFrame failed: {err:?}");
        }
    }
}
