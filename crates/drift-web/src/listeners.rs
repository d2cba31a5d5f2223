// listeners.rs
//
// DOM event wiring. Each binding owns its closure and removes itself on drop,
// so dropping `Listeners` unhooks the whole page.

use drift_stage::{Control, Gesture, InputEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent,
};

use crate::dom::{self, Page};

type Callback = Closure<dyn FnMut(Event)>;

pub(crate) struct Binding {
    target: EventTarget,
    kind: &'static str,
    callback: Callback,
}

impl Binding {
    pub(crate) fn attach(
        target: &EventTarget,
        kind: &'static str,
        options: Option<&AddEventListenerOptions>,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Self> {
        let callback: Callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let function: &js_sys::Function = callback.as_ref().unchecked_ref();
        let attached = match options {
            Some(options) => {
                target.add_event_listener_with_callback_and_add_event_listener_options(kind, function, options)
            }
            None => target.add_event_listener_with_callback(kind, function),
        };
        if let Err(err) = attached {
            log::warn!("listeners: {kind}: {err:?}");
            return None;
        }
        Some(Self { target: target.clone(), kind, callback })
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

fn passive() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options
}

fn once() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    options
}

/// Every listener the page needs, split into the detachable unlock gestures
/// and the bindings that live until teardown.
#[derive(Default)]
pub struct Listeners {
    gestures: Vec<Binding>,
    permanent: Vec<Binding>,
}

impl Listeners {
    pub fn attach(page: &Page) -> Self {
        let mut listeners = Self::default();
        listeners.attach_gestures(page);
        listeners.attach_keys(page);
        listeners.attach_controls(page);
        listeners.attach_forms(page);
        listeners.attach_media(page);
        log::debug!(
            "listeners: {} gesture, {} permanent",
            listeners.gestures.len(),
            listeners.permanent.len()
        );
        listeners
    }

    /// Drop the unlock gestures once playback has started.
    pub fn detach_gestures(&mut self) {
        if !self.gestures.is_empty() {
            log::debug!("listeners: detaching {} gesture listeners", self.gestures.len());
        }
        self.gestures.clear();
    }

    fn attach_gestures(&mut self, page: &Page) {
        let window: &EventTarget = page.window().as_ref();
        let options = passive();
        for (kind, gesture) in [
            ("pointerdown", Gesture::PointerDown),
            ("touchstart", Gesture::TouchStart),
            ("keydown", Gesture::KeyDown),
        ] {
            let binding = Binding::attach(window, kind, Some(&options), move |_| {
                crate::dispatch(InputEvent::Gesture(gesture));
            });
            self.gestures.extend(binding);
        }
    }

    fn attach_keys(&mut self, page: &Page) {
        let window: &EventTarget = page.window().as_ref();
        let escape = Binding::attach(window, "keydown", None, |event| {
            if event.dyn_ref::<KeyboardEvent>().is_some_and(|key| key.key() == "Escape") {
                crate::dispatch(InputEvent::Escape);
            }
        });
        self.permanent.extend(escape);

        // The back control is focusable; Enter and Space act like a click.
        if let Some(back) = page.by_id::<EventTarget>("choiceBack") {
            let binding = Binding::attach(&back, "keydown", None, |event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if matches!(key.key().as_str(), "Enter" | " ") {
                    event.prevent_default();
                    crate::dispatch(InputEvent::Click(Control::ChoiceBack));
                }
            });
            self.permanent.extend(binding);
        }
    }

    fn attach_controls(&mut self, page: &Page) {
        for (id, control) in [
            ("chooseBottle", Control::ChooseBottle),
            ("choosePen", Control::ChoosePen),
            ("choiceBack", Control::ChoiceBack),
            ("backFromRead", Control::BackFromRead),
            ("backFromWrite", Control::BackFromWrite),
            ("takeLetter", Control::TakeLetter),
            ("letterClose", Control::LetterClose),
            ("letterOverlay", Control::LetterBackdrop),
        ] {
            let Some(target) = page.by_id::<EventTarget>(id) else {
                continue;
            };
            let binding = Binding::attach(&target, "click", None, move |_| {
                crate::dispatch(InputEvent::Click(control));
            });
            self.permanent.extend(binding);
        }

        // Reporting sits inside the overlay, whose clicks close the letter.
        if let Some(report) = page.by_id::<EventTarget>("reportLetter") {
            let binding = Binding::attach(&report, "click", None, |event| {
                event.stop_propagation();
                crate::dispatch(InputEvent::Click(Control::ReportLetter));
            });
            self.permanent.extend(binding);
        }
    }

    fn attach_forms(&mut self, page: &Page) {
        if let Some(form) = page.by_id::<EventTarget>(dom::NICK_FORM_ID) {
            let input = page.by_id::<HtmlInputElement>(dom::NICK_INPUT_ID);
            let binding = Binding::attach(&form, "submit", None, move |event| {
                event.prevent_default();
                let nickname = input.as_ref().map(HtmlInputElement::value).unwrap_or_default();
                crate::dispatch(InputEvent::SubmitNickname { nickname });
            });
            self.permanent.extend(binding);
        }

        let content = page.by_id::<HtmlTextAreaElement>("bottleContent");
        if let Some(area) = content.clone() {
            let target: EventTarget = area.clone().into();
            let binding = Binding::attach(&target, "input", None, move |_| {
                crate::dispatch(InputEvent::ComposerInput { text: area.value() });
            });
            self.permanent.extend(binding);
        }
        if let Some(form) = page.by_id::<EventTarget>(dom::BOTTLE_FORM_ID) {
            let binding = Binding::attach(&form, "submit", None, move |event| {
                event.prevent_default();
                let content = content.as_ref().map(HtmlTextAreaElement::value).unwrap_or_default();
                crate::dispatch(InputEvent::SubmitBottle { content });
            });
            self.permanent.extend(binding);
        }
    }

    fn attach_media(&mut self, page: &Page) {
        if let Some(video) = page.by_id::<EventTarget>(dom::VIDEO_ID) {
            let binding = Binding::attach(&video, "canplay", Some(&once()), |_| {
                crate::dispatch(InputEvent::VideoCanPlay);
            });
            self.permanent.extend(binding);
        }
    }
}
