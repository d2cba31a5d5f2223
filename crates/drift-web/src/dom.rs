// dom.rs
//
// Page handle: element lookup by id and application of DOM effects.
// Every lookup is an Option; a missing element turns its effect into a no-op.

use drift_stage::{Effect, Element, Glyph, Media};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlInputElement, HtmlMediaElement, HtmlTextAreaElement, Window};

pub const VIDEO_ID: &str = "bgVideo";
pub const AUDIO_ID: &str = "bgAudio";
pub const CANVAS_ID: &str = "bgCanvas";
pub const NICK_FORM_ID: &str = "nickForm";
pub const NICK_INPUT_ID: &str = "nickInput";
pub const BOTTLE_FORM_ID: &str = "bottleForm";

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
pub const HAVE_CURRENT_DATA: u16 = 2;

/// Page id for an element. `Body` has none.
pub fn element_id(element: Element) -> Option<&'static str> {
    let id = match element {
        Element::Body => return None,
        Element::Splash => "splash",
        Element::Scene(scene) => scene.key(),
        Element::ChooseBottle => "chooseBottle",
        Element::ChoosePen => "choosePen",
        Element::LetterOverlay => "letterOverlay",
        Element::LetterText => "letterText",
        Element::LetterMeta => "letterMeta",
        Element::ComposerInput => "bottleContent",
        Element::ComposerCounter => "bottleCounter",
    };
    Some(id)
}

fn media_id(media: Media) -> &'static str {
    match media {
        Media::Video => VIDEO_ID,
        Media::Audio => AUDIO_ID,
    }
}

#[derive(Clone)]
pub struct Page {
    window: Window,
    document: Document,
}

impl Page {
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    /// Typed lookup by id.
    pub fn by_id<T: JsCast>(&self, id: &str) -> Option<T> {
        self.document.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    pub fn element(&self, element: Element) -> Option<web_sys::Element> {
        match element_id(element) {
            Some(id) => self.document.get_element_by_id(id),
            None => self.body().map(Into::into),
        }
    }

    pub fn media(&self, media: Media) -> Option<HtmlMediaElement> {
        self.by_id(media_id(media))
    }

    /// `data-has-anon="1"` on the body.
    pub fn has_anon(&self) -> bool {
        self.body()
            .and_then(|body| body.dataset().get("hasAnon"))
            .is_some_and(|value| value == "1")
    }

    /// Apply one DOM effect. Media, request and listener effects belong to the runner.
    pub fn apply(&self, effect: &Effect) -> Result<(), JsValue> {
        match effect {
            Effect::AddClass { element, class } => {
                if let Some(el) = self.element(*element) {
                    el.class_list().add_1(class)?;
                }
            }
            Effect::RemoveClass { element, class } => {
                if let Some(el) = self.element(*element) {
                    el.class_list().remove_1(class)?;
                }
            }
            Effect::SetAriaHidden { element, hidden } => {
                if let Some(el) = self.element(*element) {
                    el.set_attribute("aria-hidden", if *hidden { "true" } else { "false" })?;
                }
            }
            Effect::SetText { element, text } => {
                if let Some(el) = self.element(*element) {
                    el.set_text_content(Some(text));
                }
            }
            Effect::RenderGlyphs { element, glyphs } => {
                if let Some(el) = self.element(*element) {
                    self.render_glyphs(&el, glyphs)?;
                }
            }
            Effect::ClearValue(element) => self.clear_value(*element),
            Effect::RemoveElement(element) => {
                if let Some(el) = self.element(*element) {
                    el.remove();
                }
            }
            Effect::ScrollToTop => self.scroll_to_top(),
            Effect::MarkHasAnon => {
                if let Some(body) = self.body() {
                    body.dataset().set("hasAnon", "1")?;
                }
            }
            Effect::Play { .. } | Effect::DetachGestureListeners | Effect::Request(_) => {}
        }
        Ok(())
    }

    /// Replace the content with one `span.ch` per glyph inside a `div.inner`,
    /// each carrying its reveal delay as `animation-delay`.
    fn render_glyphs(&self, target: &web_sys::Element, glyphs: &[Glyph]) -> Result<(), JsValue> {
        target.set_text_content(None);
        let inner = self.document.create_element("div")?;
        inner.set_class_name("inner");
        target.append_child(&inner)?;

        let mut buf = [0u8; 4];
        for glyph in glyphs {
            match glyph {
                Glyph::Break => {
                    let br = self.document.create_element("br")?;
                    inner.append_child(&br)?;
                }
                Glyph::Char { ch, delay_ms } => {
                    let span = self.document.create_element("span")?.dyn_into::<HtmlElement>()?;
                    span.set_class_name("ch");
                    span.set_text_content(Some(ch.encode_utf8(&mut buf)));
                    let delay = format!("{}s", f64::from(*delay_ms) / 1000.0);
                    span.style().set_property("animation-delay", &delay)?;
                    inner.append_child(&span)?;
                }
            }
        }
        Ok(())
    }

    fn clear_value(&self, element: Element) {
        let Some(el) = self.element(element) else {
            return;
        };
        if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value("");
        } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn scroll_to_top(&self) {
        self.window.scroll_to_with_x_and_y(0.0, 0.0);
        if let Some(root) = self.document.document_element() {
            root.set_scroll_top(0);
        }
        if let Some(body) = self.body() {
            body.set_scroll_top(0);
        }
    }
}
