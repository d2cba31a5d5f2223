// systems/letter.rs
//
// Letter reveal: fetch the day's bottle and render it one character at a
// time. The stagger itself is a pure function of the character index so
// the renderer only has to apply per-glyph delays.

use serde::Deserialize;
use crate::api::context::StageContext;
use crate::api::effect::{Effect, RequestKind};
use crate::api::types::{class, Element, RequestId};
use crate::error::FetchError;

/// Reveal delay of the `index`-th visible character (0-based).
/// Grows linearly by `base_ms` and saturates at `max_ms`.
pub fn stagger_delay(index: usize, base_ms: u32, max_ms: u32) -> u32 {
    let delay = (index as u64).saturating_mul(u64::from(base_ms));
    delay.min(u64::from(max_ms)) as u32
}

/// One unit of rendered letter content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// A visible character and its reveal delay.
    Char { ch: char, delay_ms: u32 },
    /// A line break. Takes no stagger slot.
    Break,
}

/// Split content into Unicode scalar values and assign stagger delays.
/// Newlines become breaks and do not advance the visible index.
pub fn compose_glyphs(content: &str, base_ms: u32, max_ms: u32) -> Vec<Glyph> {
    let mut visible = 0usize;
    content
        .chars()
        .map(|ch| {
            if ch == '\n' {
                Glyph::Break
            } else {
                let delay_ms = stagger_delay(visible, base_ms, max_ms);
                visible += 1;
                Glyph::Char { ch, delay_ms }
            }
        })
        .collect()
}

/// Body of the letter endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodayPayload {
    #[serde(default)]
    pub bottle: Option<BottleBody>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BottleBody {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
}

impl TodayPayload {
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        serde_json::from_str(json).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Bottle content, else the flat message, else empty.
    pub fn content(&self) -> &str {
        self.bottle
            .as_ref()
            .and_then(|b| b.content.as_deref())
            .or(self.message.as_deref())
            .unwrap_or("")
    }

    pub fn bottle_id(&self) -> Option<u64> {
        self.bottle.as_ref().and_then(|b| b.id)
    }

    /// Date line under the letter; empty when the payload has no date.
    pub fn meta(&self, prefix: &str) -> String {
        match self.date.as_deref() {
            Some(date) if !date.is_empty() => format!("{prefix}{date}"),
            _ => String::new(),
        }
    }
}

/// Overlay state of the letter reveal.
#[derive(Debug, Default)]
pub struct LetterReveal {
    open: bool,
    /// Latest letter request; older responses are dropped.
    request: Option<RequestId>,
    bottle_id: Option<u64>,
    reported: bool,
}

impl LetterReveal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.request.is_some()
    }

    /// Bottle shown in the overlay, if it came with an id.
    pub fn bottle_id(&self) -> Option<u64> {
        self.bottle_id
    }

    /// Show the overlay with a placeholder, then request the letter.
    pub fn open(&mut self, ctx: &mut StageContext) {
        self.open = true;
        self.bottle_id = None;
        self.reported = false;

        ctx.emit(Effect::AddClass { element: Element::Body, class: class::LETTER_OPEN });
        ctx.emit(Effect::AddClass { element: Element::LetterOverlay, class: class::SHOW });
        ctx.emit(Effect::SetAriaHidden { element: Element::LetterOverlay, hidden: false });
        let placeholder = ctx.config.letter_placeholder.clone();
        ctx.emit(Effect::SetText { element: Element::LetterText, text: placeholder });
        ctx.emit(Effect::SetText { element: Element::LetterMeta, text: String::new() });

        self.request = Some(ctx.issue(RequestKind::FetchLetter));
    }

    /// Render a letter response. Any failure shows the fixed fallback.
    pub fn on_response(&mut self, ctx: &mut StageContext, id: RequestId, result: Result<String, FetchError>) {
        if self.request != Some(id) {
            log::debug!("letter: dropping stale response {id:?}");
            return;
        }
        self.request = None;

        match result.and_then(|body| TodayPayload::from_json(&body)) {
            Ok(payload) => {
                let glyphs = compose_glyphs(
                    payload.content(),
                    ctx.config.letter_base_delay_ms,
                    ctx.config.letter_max_delay_ms,
                );
                log::info!("letter: revealing {} glyphs", glyphs.len());
                ctx.emit(Effect::RenderGlyphs { element: Element::LetterText, glyphs });
                let meta = payload.meta(&ctx.config.letter_date_prefix);
                ctx.emit(Effect::SetText { element: Element::LetterMeta, text: meta });
                self.bottle_id = payload.bottle_id();
            }
            Err(err) => {
                log::warn!("letter: {err}");
                let fallback = ctx.config.letter_fallback.clone();
                ctx.emit(Effect::SetText { element: Element::LetterText, text: fallback });
            }
        }
    }

    /// Hide the overlay. Safe to call at any time, any number of times.
    pub fn close(&mut self, ctx: &mut StageContext) {
        self.open = false;
        ctx.emit(Effect::RemoveClass { element: Element::Body, class: class::LETTER_OPEN });
        ctx.emit(Effect::RemoveClass { element: Element::LetterOverlay, class: class::SHOW });
        ctx.emit(Effect::SetAriaHidden { element: Element::LetterOverlay, hidden: true });
    }

    /// Forget the outstanding letter request so a late response is dropped.
    pub fn abandon(&mut self) {
        self.request = None;
    }

    /// Report the bottle currently shown. Once per letter; no id, no report.
    pub fn report(&mut self, ctx: &mut StageContext) -> bool {
        match self.bottle_id {
            Some(bottle_id) if !self.reported => {
                self.reported = true;
                ctx.issue(RequestKind::ReportBottle { bottle_id });
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StageConfig;
    use crate::api::effect::Request;
    use crate::core::scene::SceneRegistry;
    use crate::core::session::Session;

    fn ctx() -> StageContext {
        StageContext::new(StageConfig::default(), SceneRegistry::new(), Session::new(true))
    }

    fn request_id(effects: &[Effect]) -> RequestId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Request(Request { id, kind: RequestKind::FetchLetter }) => Some(*id),
                _ => None,
            })
            .expect("letter request")
    }

    fn delays(glyphs: &[Glyph]) -> Vec<u32> {
        glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Char { delay_ms, .. } => Some(*delay_ms),
                Glyph::Break => None,
            })
            .collect()
    }

    #[test]
    fn stagger_is_linear_then_saturates() {
        assert_eq!(stagger_delay(0, 1000, 2200), 0);
        assert_eq!(stagger_delay(1, 1000, 2200), 1000);
        assert_eq!(stagger_delay(2, 1000, 2200), 2000);
        assert_eq!(stagger_delay(3, 1000, 2200), 2200);
        assert_eq!(stagger_delay(usize::MAX, 1000, 2200), 2200);
    }

    #[test]
    fn newlines_take_no_slot() {
        let glyphs = compose_glyphs("ab\ncd", 250, 10_000);
        assert_eq!(glyphs[2], Glyph::Break);
        assert_eq!(delays(&glyphs), vec![0, 250, 500, 750]);
    }

    #[test]
    fn splits_by_scalar_value() {
        let glyphs = compose_glyphs("海🌊é", 100, 1000);
        let chars: Vec<char> = glyphs
            .iter()
            .filter_map(|g| match g {
                Glyph::Char { ch, .. } => Some(*ch),
                Glyph::Break => None,
            })
            .collect();
        assert_eq!(chars, vec!['海', '🌊', 'é']);
    }

    #[test]
    fn content_resolution_order() {
        let both = TodayPayload::from_json(r#"{"bottle":{"id":3,"content":"hi"},"message":"m"}"#).unwrap();
        assert_eq!(both.content(), "hi");
        assert_eq!(both.bottle_id(), Some(3));

        let null_bottle = TodayPayload::from_json(r#"{"bottle":null,"message":"empty sea"}"#).unwrap();
        assert_eq!(null_bottle.content(), "empty sea");

        let nothing = TodayPayload::from_json("{}").unwrap();
        assert_eq!(nothing.content(), "");
        assert_eq!(nothing.meta("— "), "");
    }

    #[test]
    fn open_shows_placeholder_before_request() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.open(&mut ctx);
        let effects = ctx.drain_effects();
        let placeholder = effects
            .iter()
            .position(|e| matches!(e, Effect::SetText { element: Element::LetterText, .. }))
            .unwrap();
        let request = effects.iter().position(|e| matches!(e, Effect::Request(_))).unwrap();
        assert!(placeholder < request);
        assert!(effects.contains(&Effect::SetAriaHidden { element: Element::LetterOverlay, hidden: false }));
        assert!(letter.is_open());
    }

    #[test]
    fn transport_error_shows_fallback_only() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.open(&mut ctx);
        let id = request_id(&ctx.drain_effects());
        letter.on_response(&mut ctx, id, Err(FetchError::Transport("offline".into())));
        assert_eq!(
            ctx.drain_effects(),
            vec![Effect::SetText {
                element: Element::LetterText,
                text: "波の音に、ことばが消えた。".to_string(),
            }]
        );
    }

    #[test]
    fn undecodable_body_shows_fallback() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.open(&mut ctx);
        let id = request_id(&ctx.drain_effects());
        letter.on_response(&mut ctx, id, Ok("<html>".into()));
        assert!(matches!(
            ctx.drain_effects().as_slice(),
            [Effect::SetText { element: Element::LetterText, text }] if text == "波の音に、ことばが消えた。"
        ));
    }

    #[test]
    fn success_renders_glyphs_and_date() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.open(&mut ctx);
        let id = request_id(&ctx.drain_effects());
        letter.on_response(
            &mut ctx,
            id,
            Ok(r#"{"date":"2026-10-19","bottle":{"id":9,"content":"やあ"}}"#.into()),
        );
        let effects = ctx.drain_effects();
        assert_eq!(
            effects[0],
            Effect::RenderGlyphs {
                element: Element::LetterText,
                glyphs: vec![
                    Glyph::Char { ch: 'や', delay_ms: 0 },
                    Glyph::Char { ch: 'あ', delay_ms: 1000 },
                ],
            }
        );
        assert_eq!(
            effects[1],
            Effect::SetText { element: Element::LetterMeta, text: "— 2026-10-19".into() }
        );
        assert_eq!(letter.bottle_id(), Some(9));
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.open(&mut ctx);
        let first = request_id(&ctx.drain_effects());
        letter.open(&mut ctx);
        let second = request_id(&ctx.drain_effects());

        letter.on_response(&mut ctx, first, Ok(r#"{"message":"old"}"#.into()));
        assert!(ctx.drain_effects().is_empty());
        letter.on_response(&mut ctx, second, Ok(r#"{"message":"new"}"#.into()));
        assert!(!ctx.drain_effects().is_empty());
    }

    #[test]
    fn close_is_idempotent_and_safe_before_open() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        letter.close(&mut ctx);
        let once = ctx.drain_effects();
        letter.close(&mut ctx);
        assert_eq!(ctx.drain_effects(), once);
        assert!(once.contains(&Effect::SetAriaHidden { element: Element::LetterOverlay, hidden: true }));
        assert!(!letter.is_open());
    }

    #[test]
    fn report_once_per_letter() {
        let mut ctx = ctx();
        let mut letter = LetterReveal::new();
        assert!(!letter.report(&mut ctx));

        letter.open(&mut ctx);
        let id = request_id(&ctx.drain_effects());
        letter.on_response(&mut ctx, id, Ok(r#"{"bottle":{"id":4,"content":"x"}}"#.into()));
        assert!(letter.report(&mut ctx));
        assert!(!letter.report(&mut ctx));
    }
}
