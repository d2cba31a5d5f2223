use crate::api::types::{Gesture, Media, RequestId};
use crate::error::FetchError;

/// Clickable controls the stage reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ChooseBottle,
    ChoosePen,
    /// Back control inside the choice scene (click, Enter or Space).
    ChoiceBack,
    BackFromRead,
    BackFromWrite,
    TakeLetter,
    LetterClose,
    /// Click on the letter overlay outside the letter.
    LetterBackdrop,
    ReportLetter,
}

/// Input events the stage understands.
/// The host translates DOM events, media promises and fetch completions into these.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A qualifying user gesture for the media unlock gate.
    Gesture(Gesture),
    Click(Control),
    /// The cancel/escape key.
    Escape,
    /// Nickname form submitted with the raw field value.
    SubmitNickname { nickname: String },
    /// Bottle message field changed.
    ComposerInput { text: String },
    /// Bottle form submitted with the raw field value.
    SubmitBottle { content: String },
    /// The backdrop video reached `canplay`.
    VideoCanPlay,
    /// Outcome of an `Effect::Play`.
    PlayResult { media: Media, ok: bool },
    /// Outcome of an `Effect::Request`; `Ok` carries the response body.
    Response { id: RequestId, result: Result<String, FetchError> },
}

impl InputEvent {
    /// Whether this event comes from the user rather than the host machinery.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            InputEvent::Gesture(_)
                | InputEvent::Click(_)
                | InputEvent::Escape
                | InputEvent::SubmitNickname { .. }
                | InputEvent::ComposerInput { .. }
                | InputEvent::SubmitBottle { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_user_input() {
        assert!(InputEvent::Click(Control::TakeLetter).is_user_input());
        assert!(InputEvent::Gesture(Gesture::TouchStart).is_user_input());
        assert!(!InputEvent::VideoCanPlay.is_user_input());
        assert!(!InputEvent::Response {
            id: RequestId(1),
            result: Err(FetchError::Status(500)),
        }
        .is_user_input());
    }
}
