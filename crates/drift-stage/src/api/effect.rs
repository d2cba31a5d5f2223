use crate::api::config::StageConfig;
use crate::api::types::{Element, Media, RequestId};
use crate::systems::letter::Glyph;

/// A side effect emitted by the stage for the host to apply, in order.
///
/// The stage never touches the page itself; it mutates its own model and
/// describes the matching page mutation here.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddClass { element: Element, class: &'static str },
    RemoveClass { element: Element, class: &'static str },
    SetAriaHidden { element: Element, hidden: bool },
    SetText { element: Element, text: String },
    /// Replace the element's content with staggered characters.
    RenderGlyphs { element: Element, glyphs: Vec<Glyph> },
    /// Empty a form field.
    ClearValue(Element),
    /// Detach the element from the tree entirely.
    RemoveElement(Element),
    ScrollToTop,
    /// Persist `hasAnon` on the page root.
    MarkHasAnon,
    /// Attempt playback; `volume` is applied first when set.
    /// The host answers with `InputEvent::PlayResult`.
    Play { media: Media, volume: Option<f32> },
    /// Unregister every gesture listener at once.
    DetachGestureListeners,
    /// The host answers with `InputEvent::Response` carrying the same id.
    Request(Request),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: RequestId,
    pub kind: RequestKind,
}

/// What the stage needs from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    SubmitNickname { nickname: String },
    FetchLetter,
    PostBottle { content: String },
    ReportBottle { bottle_id: u64 },
}

impl RequestKind {
    pub fn method(&self) -> Method {
        match self {
            RequestKind::FetchLetter => Method::Get,
            _ => Method::Post,
        }
    }

    /// Default target. The nickname target is normally the form's own action.
    pub fn endpoint<'a>(&self, config: &'a StageConfig) -> &'a str {
        match self {
            RequestKind::SubmitNickname { .. } => &config.nickname_endpoint,
            RequestKind::FetchLetter => &config.letter_endpoint,
            RequestKind::PostBottle { .. } => &config.bottles_endpoint,
            RequestKind::ReportBottle { .. } => &config.report_endpoint,
        }
    }

    /// Form-encoded body fields.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            RequestKind::SubmitNickname { nickname } => vec![("nickname", nickname.clone())],
            RequestKind::FetchLetter => Vec::new(),
            RequestKind::PostBottle { content } => vec![("content", content.clone())],
            RequestKind::ReportBottle { bottle_id } => vec![("bottle_id", bottle_id.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_fetch_is_a_bodyless_get() {
        let kind = RequestKind::FetchLetter;
        assert_eq!(kind.method(), Method::Get);
        assert!(kind.form_fields().is_empty());
        assert_eq!(kind.endpoint(&StageConfig::default()), "/today");
    }

    #[test]
    fn report_carries_bottle_id_field() {
        let kind = RequestKind::ReportBottle { bottle_id: 42 };
        assert_eq!(kind.method(), Method::Post);
        assert_eq!(kind.form_fields(), vec![("bottle_id", "42".to_string())]);
    }
}
