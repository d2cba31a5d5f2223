use drift_stage::{InputEvent, Media};
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::dom::Page;

/// Start playback and report whether the browser allowed it.
pub fn play(page: &Page, media: Media, volume: Option<f32>) {
    let Some(element) = page.media(media) else {
        log::debug!("media: no {media:?} element");
        return;
    };
    if let Some(volume) = volume {
        element.set_volume(f64::from(volume));
    }
    let promise: Result<js_sys::Promise, _> = element.play();
    spawn_local(async move {
        let ok = match promise {
            Ok(promise) => JsFuture::from(promise).await.is_ok(),
            Err(_) => false,
        };
        crate::dispatch(InputEvent::PlayResult { media, ok });
    });
}
