use crate::api::context::StageContext;
use crate::api::effect::Effect;
use crate::api::types::{class, Choice, Element, SceneId, Task};
use crate::core::timeline::TaskHandle;
use crate::systems::transition;

/// Debounce gate shared by both choice options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoiceLock {
    held: bool,
}

impl ChoiceLock {
    /// Take the lock. Returns false if it is already held.
    pub fn acquire(&mut self) -> bool {
        !std::mem::replace(&mut self.held, true)
    }

    pub fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Two-option picker with a delayed follow-up transition.
#[derive(Debug, Default)]
pub struct ChoiceState {
    lock: ChoiceLock,
    picked: Option<Choice>,
    /// Settle task of the current pick, kept for teardown.
    pending: Option<TaskHandle>,
}

impl ChoiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_held()
    }

    /// The option currently styled as picked.
    pub fn picked(&self) -> Option<Choice> {
        self.picked
    }

    pub fn pending(&self) -> Option<TaskHandle> {
        self.pending
    }

    /// Pick an option. Ignored while a previous pick is settling.
    pub fn pick(&mut self, ctx: &mut StageContext, choice: Choice) -> bool {
        if !self.lock.acquire() {
            log::debug!("choice: {choice:?} ignored, pick in progress");
            return false;
        }
        self.picked = Some(choice);

        ctx.emit(Effect::AddClass { element: Element::Scene(SceneId::Choice), class: class::SELECTED });
        ctx.emit(Effect::AddClass { element: choice.element(), class: class::PICKED });
        ctx.emit(Effect::AddClass { element: choice.other().element(), class: class::FADED });

        let delay = ctx.config.choice_settle_ms;
        self.pending = Some(ctx.schedule(delay, Task::ChoiceSettle(choice)));
        true
    }

    /// Settle task fired: move on and release the lock.
    pub fn settle(&mut self, ctx: &mut StageContext, choice: Choice) {
        self.pending = None;
        transition::show(ctx, choice.target());
        self.lock.release();
    }

    /// Drop all selection styling and release the lock.
    /// A pending settle task is left to fire.
    pub fn reset(&mut self, ctx: &mut StageContext) {
        ctx.emit(Effect::RemoveClass { element: Element::Scene(SceneId::Choice), class: class::SELECTED });
        for option in [Choice::Bottle, Choice::Pen] {
            ctx.emit(Effect::RemoveClass { element: option.element(), class: class::PICKED });
            ctx.emit(Effect::RemoveClass { element: option.element(), class: class::FADED });
        }
        self.picked = None;
        self.lock.release();
    }

    /// Cancel the pending settle task, if any.
    pub fn cancel_pending(&mut self, ctx: &mut StageContext) -> bool {
        self.pending
            .take()
            .map(|handle| ctx.timeline.cancel(handle))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StageConfig;
    use crate::core::scene::SceneRegistry;
    use crate::core::session::Session;

    fn ctx() -> StageContext {
        let mut ctx = StageContext::new(
            StageConfig::default(),
            SceneRegistry::with_scenes(SceneId::ALL),
            Session::new(true),
        );
        transition::show(&mut ctx, SceneId::Choice);
        ctx.drain_effects();
        ctx
    }

    fn run(ctx: &mut StageContext, state: &mut ChoiceState, dt: f64) {
        let now = ctx.clock.advance(dt);
        for task in ctx.timeline.advance(now) {
            if let Task::ChoiceSettle(choice) = task {
                state.settle(ctx, choice);
            }
        }
    }

    #[test]
    fn lock_acquire_is_exclusive() {
        let mut lock = ChoiceLock::default();
        assert!(lock.acquire());
        assert!(!lock.acquire());
        lock.release();
        assert!(lock.acquire());
    }

    #[test]
    fn pick_styles_options() {
        let mut ctx = ctx();
        let mut state = ChoiceState::new();
        assert!(state.pick(&mut ctx, Choice::Pen));
        assert_eq!(
            ctx.drain_effects(),
            vec![
                Effect::AddClass { element: Element::Scene(SceneId::Choice), class: class::SELECTED },
                Effect::AddClass { element: Element::ChoosePen, class: class::PICKED },
                Effect::AddClass { element: Element::ChooseBottle, class: class::FADED },
            ]
        );
    }

    #[test]
    fn double_pick_schedules_one_transition() {
        let mut ctx = ctx();
        let mut state = ChoiceState::new();
        assert!(state.pick(&mut ctx, Choice::Bottle));
        assert!(!state.pick(&mut ctx, Choice::Pen));
        assert_eq!(ctx.timeline.len(), 1);

        run(&mut ctx, &mut state, 1200.0);
        assert_eq!(ctx.scenes.active(), Some(SceneId::Read));
        assert!(!state.is_locked());
    }

    #[test]
    fn reset_releases_lock_but_not_timer() {
        let mut ctx = ctx();
        let mut state = ChoiceState::new();
        state.pick(&mut ctx, Choice::Bottle);
        state.reset(&mut ctx);
        assert!(!state.is_locked());
        assert_eq!(state.picked(), None);
        assert!(state.pending().is_some());
        run(&mut ctx, &mut state, 1200.0);
        assert_eq!(ctx.scenes.active(), Some(SceneId::Read));
    }

    #[test]
    fn reset_clears_every_selection_class() {
        let mut ctx = ctx();
        let mut state = ChoiceState::new();
        state.reset(&mut ctx);
        let effects = ctx.drain_effects();
        assert_eq!(effects.len(), 5);
        assert!(effects.iter().all(|e| matches!(e, Effect::RemoveClass { .. })));
    }

    #[test]
    fn cancel_pending_drops_settle() {
        let mut ctx = ctx();
        let mut state = ChoiceState::new();
        state.pick(&mut ctx, Choice::Pen);
        assert!(state.cancel_pending(&mut ctx));
        run(&mut ctx, &mut state, 5000.0);
        assert_eq!(ctx.scenes.active(), Some(SceneId::Choice));
    }
}
