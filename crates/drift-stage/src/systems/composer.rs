use crate::api::context::StageContext;
use crate::api::effect::{Effect, RequestKind};
use crate::api::types::{Element, RequestId};
use crate::error::FetchError;

/// Remaining-character counter for a bounded text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCounter {
    max: usize,
}

impl InputCounter {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Characters left, counted in Unicode scalar values. Never negative.
    pub fn remaining(&self, text: &str) -> usize {
        self.max.saturating_sub(text.chars().count())
    }

    pub fn is_over(&self, text: &str) -> bool {
        text.chars().count() > self.max
    }

    pub fn label(&self, text: &str) -> String {
        self.remaining(text).to_string()
    }
}

/// Write-scene form: live counter plus asynchronous bottle submission.
#[derive(Debug)]
pub struct Composer {
    counter: InputCounter,
    in_flight: Option<RequestId>,
}

impl Composer {
    pub fn new(max_chars: usize) -> Self {
        Self {
            counter: InputCounter::new(max_chars),
            in_flight: None,
        }
    }

    pub fn counter(&self) -> InputCounter {
        self.counter
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Forget the outstanding submission.
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }

    /// Field changed: refresh the counter.
    pub fn input(&mut self, ctx: &mut StageContext, text: &str) {
        let label = self.counter.label(text);
        ctx.emit(Effect::SetText { element: Element::ComposerCounter, text: label });
    }

    /// Submit the message. Empty, oversized or duplicate submissions send nothing.
    pub fn submit(&mut self, ctx: &mut StageContext, raw: &str) -> bool {
        if self.in_flight.is_some() {
            log::debug!("composer: submission already in flight");
            return false;
        }
        let content = raw.trim();
        if content.is_empty() || self.counter.is_over(content) {
            return false;
        }
        let id = ctx.issue(RequestKind::PostBottle { content: content.to_string() });
        self.in_flight = Some(id);
        true
    }

    /// Returns true when the bottle was accepted.
    pub fn on_response(&mut self, ctx: &mut StageContext, result: Result<String, FetchError>) -> bool {
        self.in_flight = None;
        match result {
            Ok(_) => {
                ctx.emit(Effect::ClearValue(Element::ComposerInput));
                let label = self.counter.label("");
                ctx.emit(Effect::SetText { element: Element::ComposerCounter, text: label });
                log::info!("composer: bottle sent");
                true
            }
            Err(err) => {
                log::debug!("composer: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StageConfig;
    use crate::core::scene::SceneRegistry;
    use crate::core::session::Session;

    fn ctx() -> StageContext {
        StageContext::new(StageConfig::default(), SceneRegistry::new(), Session::new(true))
    }

    #[test]
    fn counter_counts_chars_not_bytes() {
        let counter = InputCounter::new(5);
        assert_eq!(counter.remaining("うみ"), 3);
        assert_eq!(counter.remaining("toolong"), 0);
        assert!(counter.is_over("toolong"));
        assert!(!counter.is_over("うみうみ!"));
    }

    #[test]
    fn input_updates_counter_label() {
        let mut ctx = ctx();
        let mut composer = Composer::new(90);
        composer.input(&mut ctx, "hello");
        assert_eq!(
            ctx.drain_effects(),
            vec![Effect::SetText { element: Element::ComposerCounter, text: "85".into() }]
        );
    }

    #[test]
    fn blank_or_oversized_sends_nothing() {
        let mut ctx = ctx();
        let mut composer = Composer::new(3);
        assert!(!composer.submit(&mut ctx, "   "));
        assert!(!composer.submit(&mut ctx, "four"));
        assert_eq!(ctx.in_flight(), 0);
        assert!(composer.submit(&mut ctx, "  abc  "));
        assert!(matches!(
            ctx.drain_effects().as_slice(),
            [Effect::Request(r)] if r.kind == RequestKind::PostBottle { content: "abc".into() }
        ));
    }

    #[test]
    fn one_submission_at_a_time() {
        let mut ctx = ctx();
        let mut composer = Composer::new(90);
        assert!(composer.submit(&mut ctx, "first"));
        assert!(!composer.submit(&mut ctx, "second"));
        composer.on_response(&mut ctx, Err(FetchError::Status(429)));
        assert!(!composer.is_sending());
        assert!(composer.submit(&mut ctx, "second"));
    }

    #[test]
    fn success_clears_field() {
        let mut ctx = ctx();
        let mut composer = Composer::new(90);
        composer.submit(&mut ctx, "hi");
        ctx.drain_effects();
        assert!(composer.on_response(&mut ctx, Ok(String::new())));
        assert_eq!(
            ctx.drain_effects(),
            vec![
                Effect::ClearValue(Element::ComposerInput),
                Effect::SetText { element: Element::ComposerCounter, text: "90".into() },
            ]
        );
    }
}
