use crate::api::config::StageConfig;
use crate::api::context::StageContext;
use crate::api::effect::{Effect, RequestKind};
use crate::api::types::{Choice, RequestId, SceneId, Task};
use crate::core::scene::SceneRegistry;
use crate::core::session::Session;
use crate::error::FetchError;
use crate::input::event::{Control, InputEvent};
use crate::systems::boot::{BootPhase, BootSequencer, VideoReadiness};
use crate::systems::choice::ChoiceState;
use crate::systems::composer::Composer;
use crate::systems::letter::LetterReveal;
use crate::systems::unlock::UnlockGate;
use crate::systems::{nickname, transition};

/// The whole narrative flow, driven by input events and frame ticks.
///
/// The host feeds `dispatch` and `tick`, then applies `drain_effects`
/// in order after each call.
pub struct Stage {
    ctx: StageContext,
    boot: BootSequencer,
    choice: ChoiceState,
    letter: LetterReveal,
    gate: UnlockGate,
    composer: Composer,
}

impl Stage {
    /// Create a stage for the scenes present on the page.
    pub fn new(config: StageConfig, scenes: impl IntoIterator<Item = SceneId>, has_anon: bool) -> Self {
        let composer = Composer::new(config.bottle_max_chars);
        let ctx = StageContext::new(config, SceneRegistry::with_scenes(scenes), Session::new(has_anon));
        Self {
            ctx,
            boot: BootSequencer::new(),
            choice: ChoiceState::new(),
            letter: LetterReveal::new(),
            gate: UnlockGate::new(),
            composer,
        }
    }

    /// Restore initial state and start the boot timeline. Only the first call counts.
    pub fn boot(&mut self, video: VideoReadiness) {
        if self.boot.phase() != BootPhase::Idle {
            return;
        }
        if self.ctx.session.has_anon() {
            self.choice.reset(&mut self.ctx);
        }
        self.boot.arm(&mut self.ctx, video);
    }

    /// Handle one input event immediately.
    pub fn dispatch(&mut self, event: InputEvent) {
        if event.is_user_input() {
            log::trace!("input: {event:?}");
        }
        match event {
            InputEvent::Gesture(gesture) => {
                self.gate.dispatch(&mut self.ctx, gesture);
            }
            InputEvent::Click(control) => self.click(control),
            InputEvent::Escape => self.letter.close(&mut self.ctx),
            InputEvent::SubmitNickname { nickname } => {
                nickname::submit(&mut self.ctx, &nickname);
            }
            InputEvent::ComposerInput { text } => self.composer.input(&mut self.ctx, &text),
            InputEvent::SubmitBottle { content } => {
                self.composer.submit(&mut self.ctx, &content);
            }
            InputEvent::VideoCanPlay => self.boot.video_can_play(&mut self.ctx),
            InputEvent::PlayResult { media, ok } => self.gate.on_play_result(&mut self.ctx, media, ok),
            InputEvent::Response { id, result } => self.respond(id, result),
        }
    }

    fn click(&mut self, control: Control) {
        match control {
            Control::ChooseBottle => {
                self.choice.pick(&mut self.ctx, Choice::Bottle);
            }
            Control::ChoosePen => {
                self.choice.pick(&mut self.ctx, Choice::Pen);
            }
            Control::ChoiceBack => self.choice.reset(&mut self.ctx),
            Control::BackFromRead | Control::BackFromWrite => self.back_to_choice(),
            Control::TakeLetter => self.letter.open(&mut self.ctx),
            Control::LetterClose | Control::LetterBackdrop => self.letter.close(&mut self.ctx),
            Control::ReportLetter => {
                self.letter.report(&mut self.ctx);
            }
        }
    }

    fn respond(&mut self, id: RequestId, result: Result<String, FetchError>) {
        let Some(kind) = self.ctx.settle(id) else {
            log::debug!("response {id:?} matches no request");
            return;
        };
        match kind {
            RequestKind::SubmitNickname { .. } => {
                nickname::on_response(&mut self.ctx, result);
            }
            RequestKind::FetchLetter => self.letter.on_response(&mut self.ctx, id, result),
            RequestKind::PostBottle { .. } => {
                if self.composer.on_response(&mut self.ctx, result) {
                    self.back_to_choice();
                }
            }
            RequestKind::ReportBottle { bottle_id } => match result {
                Ok(_) => log::info!("report: bottle {bottle_id} reported"),
                Err(err) => log::debug!("report: bottle {bottle_id}: {err}"),
            },
        }
    }

    /// Close the letter, return to the choice scene and reset the picker on the next frame.
    fn back_to_choice(&mut self) {
        self.letter.close(&mut self.ctx);
        transition::show(&mut self.ctx, SceneId::Choice);
        self.ctx.next_frame(Task::ResetChoice);
    }

    /// Advance the clock by one frame and run every task now due.
    pub fn tick(&mut self, dt_ms: f64) {
        let now = self.ctx.clock.advance(dt_ms);
        for task in self.ctx.timeline.advance(now) {
            self.run(task);
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::ClearLeaving { scene, epoch } => transition::clear_leaving(&mut self.ctx, scene, epoch),
            Task::ShowScene(scene) => {
                transition::show(&mut self.ctx, scene);
            }
            Task::BootStart => self.boot.timeout(&mut self.ctx),
            Task::BootReveal => self.boot.reveal(&mut self.ctx),
            Task::RemoveSplash => self.boot.remove_splash(&mut self.ctx),
            Task::ChoiceSettle(choice) => self.choice.settle(&mut self.ctx, choice),
            Task::ResetChoice => self.choice.reset(&mut self.ctx),
        }
    }

    /// Show a scene directly.
    pub fn show(&mut self, scene: SceneId) -> bool {
        transition::show(&mut self.ctx, scene)
    }

    /// Show a scene by page key; unknown keys are ignored.
    pub fn show_key(&mut self, key: &str) -> bool {
        transition::show_key(&mut self.ctx, key)
    }

    /// Take the effects produced since the last drain, in order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.ctx.drain_effects()
    }

    /// Cancel every pending task and forget unanswered requests,
    /// leaving no flow waiting on a response.
    pub fn teardown(&mut self) {
        self.choice.cancel_pending(&mut self.ctx);
        self.letter.abandon();
        self.composer.abandon();
        let pending = self.ctx.timeline.len();
        self.ctx.clear();
        log::info!("stage: torn down, {pending} pending tasks cancelled");
    }

    // ---- Accessors ----

    pub fn config(&self) -> &StageConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    pub fn scenes(&self) -> &SceneRegistry {
        &self.ctx.scenes
    }

    pub fn session(&self) -> Session {
        self.ctx.session
    }

    pub fn now(&self) -> f64 {
        self.ctx.clock.now()
    }

    pub fn boot_state(&self) -> &BootSequencer {
        &self.boot
    }

    pub fn choice(&self) -> &ChoiceState {
        &self.choice
    }

    pub fn letter(&self) -> &LetterReveal {
        &self.letter
    }

    pub fn gate(&self) -> &UnlockGate {
        &self.gate
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{class, Element, Gesture, Media};

    fn booted(has_anon: bool) -> Stage {
        let mut stage = Stage::new(StageConfig::default(), SceneId::ALL, has_anon);
        stage.boot(VideoReadiness::Ready);
        stage.tick(1800.0);
        stage.drain_effects();
        stage
    }

    #[test]
    fn boot_without_identity_lands_on_nick() {
        let stage = booted(false);
        assert_eq!(stage.scenes().active(), Some(SceneId::Nick));
        assert!(stage.boot_state().is_complete());
    }

    #[test]
    fn returning_visitor_resets_choice_at_load() {
        let mut stage = Stage::new(StageConfig::default(), SceneId::ALL, true);
        stage.boot(VideoReadiness::Ready);
        let effects = stage.drain_effects();
        assert!(effects.contains(&Effect::RemoveClass { element: Element::ChooseBottle, class: class::PICKED }));
        assert!(effects.contains(&Effect::RemoveClass { element: Element::ChoosePen, class: class::FADED }));
        stage.tick(1800.0);
        assert_eq!(stage.scenes().active(), Some(SceneId::Choice));
        assert_eq!(stage.choice().picked(), None);
    }

    #[test]
    fn back_resets_choice_one_frame_later() {
        let mut stage = booted(true);
        stage.dispatch(InputEvent::Click(Control::ChooseBottle));
        stage.tick(1200.0);
        assert_eq!(stage.scenes().active(), Some(SceneId::Read));
        stage.drain_effects();

        stage.dispatch(InputEvent::Click(Control::BackFromRead));
        assert_eq!(stage.scenes().active(), Some(SceneId::Choice));
        let immediate = stage.drain_effects();
        assert!(!immediate.contains(&Effect::RemoveClass {
            element: Element::Scene(SceneId::Choice),
            class: class::SELECTED,
        }));
        assert!(immediate.contains(&Effect::SetAriaHidden { element: Element::LetterOverlay, hidden: true }));

        stage.tick(16.0);
        assert!(stage.drain_effects().contains(&Effect::RemoveClass {
            element: Element::Scene(SceneId::Choice),
            class: class::SELECTED,
        }));
    }

    #[test]
    fn unmatched_response_is_ignored() {
        let mut stage = booted(false);
        stage.dispatch(InputEvent::Response { id: RequestId(99), result: Ok(String::new()) });
        assert!(stage.drain_effects().is_empty());
    }

    #[test]
    fn gesture_and_play_result_route_to_gate() {
        let mut stage = booted(false);
        stage.dispatch(InputEvent::Gesture(Gesture::PointerDown));
        stage.dispatch(InputEvent::PlayResult { media: Media::Audio, ok: true });
        assert_eq!(stage.drain_effects().last(), Some(&Effect::DetachGestureListeners));
    }

    #[test]
    fn teardown_cancels_pending_timers() {
        let mut stage = booted(true);
        stage.dispatch(InputEvent::Click(Control::ChoosePen));
        stage.teardown();
        stage.tick(10_000.0);
        assert_eq!(stage.scenes().active(), Some(SceneId::Choice));
        assert!(stage.drain_effects().is_empty());
    }

    #[test]
    fn teardown_clears_loading_and_sending() {
        let mut stage = booted(true);
        stage.dispatch(InputEvent::Click(Control::TakeLetter));
        stage.dispatch(InputEvent::SubmitBottle { content: "hello".into() });
        assert!(stage.letter().is_loading());
        assert!(stage.composer().is_sending());

        stage.teardown();
        assert!(!stage.letter().is_loading());
        assert!(!stage.composer().is_sending());
        assert_eq!(stage.context().in_flight(), 0);
    }
}
