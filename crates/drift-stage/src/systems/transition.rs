// systems/transition.rs
//
// Crossfade transitions between scenes.
// The incoming scene is marked active before the outgoing one starts
// leaving, so there is never a frame with no visible scene.

use crate::api::context::StageContext;
use crate::api::effect::Effect;
use crate::api::types::{class, Element, SceneId, Task};
use crate::core::scene::Activation;

/// Show `scene`, crossfading away from the current one.
/// Returns true if the active scene changed.
pub fn show(ctx: &mut StageContext, scene: SceneId) -> bool {
    let changed = match ctx.scenes.activate(scene) {
        Activation::Unknown => {
            log::debug!("show: {} is not on this page", scene.key());
            return false;
        }
        Activation::AlreadyActive => false,
        Activation::Entered { interrupted_leave, previous } => {
            let target = Element::Scene(scene);
            // Re-entered mid-fade: the leave ends now. Its pending timer
            // carries an older epoch and will be ignored.
            if interrupted_leave {
                ctx.emit(Effect::RemoveClass { element: target, class: class::LEAVING });
            }
            ctx.emit(Effect::AddClass { element: target, class: class::ACTIVE });

            if let Some((prev, epoch)) = previous {
                let element = Element::Scene(prev);
                ctx.emit(Effect::AddClass { element, class: class::LEAVING });
                ctx.emit(Effect::RemoveClass { element, class: class::ACTIVE });
                let fade = ctx.config.scene_fade_ms;
                ctx.schedule(fade, Task::ClearLeaving { scene: prev, epoch });
            }
            log::info!("scene: {}", scene.key());
            true
        }
    };

    ctx.emit(Effect::ScrollToTop);
    changed
}

/// Show a scene by its page key. Unknown keys are ignored.
pub fn show_key(ctx: &mut StageContext, key: &str) -> bool {
    match SceneId::from_key(key) {
        Some(scene) => show(ctx, scene),
        None => {
            log::debug!("show: unknown scene key {key:?}");
            false
        }
    }
}

/// Timer callback ending a leave episode.
pub fn clear_leaving(ctx: &mut StageContext, scene: SceneId, epoch: u32) {
    if ctx.scenes.clear_leaving(scene, epoch) {
        ctx.emit(Effect::RemoveClass { element: Element::Scene(scene), class: class::LEAVING });
    } else {
        log::debug!("clear_leaving: stale epoch {epoch} for {}", scene.key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StageConfig;
    use crate::core::scene::SceneRegistry;
    use crate::core::session::Session;

    fn ctx() -> StageContext {
        StageContext::new(
            StageConfig::default(),
            SceneRegistry::with_scenes(SceneId::ALL),
            Session::default(),
        )
    }

    fn run_due(ctx: &mut StageContext, dt: f64) {
        let now = ctx.clock.advance(dt);
        for task in ctx.timeline.advance(now) {
            if let Task::ClearLeaving { scene, epoch } = task {
                clear_leaving(ctx, scene, epoch);
            }
        }
    }

    #[test]
    fn incoming_active_before_outgoing_leaves() {
        let mut ctx = ctx();
        show(&mut ctx, SceneId::Nick);
        ctx.drain_effects();

        show(&mut ctx, SceneId::Walk);
        let effects = ctx.drain_effects();
        let walk = Element::Scene(SceneId::Walk);
        let nick = Element::Scene(SceneId::Nick);
        assert_eq!(
            effects,
            vec![
                Effect::AddClass { element: walk, class: class::ACTIVE },
                Effect::AddClass { element: nick, class: class::LEAVING },
                Effect::RemoveClass { element: nick, class: class::ACTIVE },
                Effect::ScrollToTop,
            ]
        );
    }

    #[test]
    fn same_scene_only_scrolls() {
        let mut ctx = ctx();
        show(&mut ctx, SceneId::Choice);
        ctx.drain_effects();
        assert!(!show(&mut ctx, SceneId::Choice));
        assert_eq!(ctx.drain_effects(), vec![Effect::ScrollToTop]);
        assert!(ctx.timeline.is_empty());
    }

    #[test]
    fn leaving_cleared_after_fade() {
        let mut ctx = ctx();
        show(&mut ctx, SceneId::Nick);
        show(&mut ctx, SceneId::Walk);
        run_due(&mut ctx, 1199.0);
        assert!(ctx.scenes.get(SceneId::Nick).unwrap().is_leaving());
        run_due(&mut ctx, 1.0);
        assert!(!ctx.scenes.get(SceneId::Nick).unwrap().is_leaving());
    }

    #[test]
    fn stale_timer_leaves_fresh_episode_alone() {
        let mut ctx = ctx();
        show(&mut ctx, SceneId::Read);
        show(&mut ctx, SceneId::Choice); // Read leaves (episode 1)
        run_due(&mut ctx, 600.0);
        show(&mut ctx, SceneId::Read); // back mid-fade
        show(&mut ctx, SceneId::Choice); // Read leaves again (episode 2)
        run_due(&mut ctx, 600.0); // episode 1 timer fires
        assert!(ctx.scenes.get(SceneId::Read).unwrap().is_leaving());
        run_due(&mut ctx, 600.0); // episode 2 timer fires
        assert!(!ctx.scenes.get(SceneId::Read).unwrap().is_leaving());
    }

    #[test]
    fn reentering_mid_fade_ends_leave_and_outlives_its_timer() {
        let mut ctx = ctx();
        show(&mut ctx, SceneId::Read);
        show(&mut ctx, SceneId::Choice);
        run_due(&mut ctx, 600.0);
        ctx.drain_effects();

        show(&mut ctx, SceneId::Read);
        let read = Element::Scene(SceneId::Read);
        assert_eq!(
            ctx.drain_effects()[..2],
            [
                Effect::RemoveClass { element: read, class: class::LEAVING },
                Effect::AddClass { element: read, class: class::ACTIVE },
            ]
        );
        assert!(!ctx.scenes.get(SceneId::Read).unwrap().is_leaving());

        // The first leave's timer fires and changes nothing.
        run_due(&mut ctx, 600.0);
        assert!(ctx.drain_effects().is_empty());
        assert_eq!(ctx.scenes.active(), Some(SceneId::Read));
    }

    #[test]
    fn unknown_key_is_silent() {
        let mut ctx = ctx();
        assert!(!show_key(&mut ctx, "scene-nowhere"));
        assert!(ctx.pending_effects().is_empty());
        assert!(show_key(&mut ctx, "scene-nick"));
    }

    #[test]
    fn missing_scene_is_silent() {
        let mut ctx = StageContext::new(
            StageConfig::default(),
            SceneRegistry::with_scenes([SceneId::Nick]),
            Session::default(),
        );
        assert!(!show(&mut ctx, SceneId::Read));
        assert!(ctx.pending_effects().is_empty());
    }
}
