// systems/unlock.rs
//
// Media unlock gate. Autoplay policies may reject playback until a user
// gesture; every qualifying gesture retries until audio starts once.
//
//   Locked --gesture--> (attempt) --audio ok--> Started (terminal)
//                                 --audio err-> Blocked --gesture--> ...

use crate::api::context::StageContext;
use crate::api::effect::Effect;
use crate::api::types::{Gesture, Media};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlockState {
    /// No playback result seen yet.
    #[default]
    Locked,
    /// Audio is playing; gesture listeners are gone.
    Started,
    /// Last audio attempt was rejected; waiting for another gesture.
    Blocked,
}

#[derive(Debug, Default)]
pub struct UnlockGate {
    state: UnlockState,
    attempts: u32,
}

impl UnlockGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    /// Playback attempts made from gestures so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Handle any qualifying gesture. Returns true if playback was attempted.
    pub fn dispatch(&mut self, ctx: &mut StageContext, gesture: Gesture) -> bool {
        if self.state == UnlockState::Started {
            return false;
        }
        self.attempts += 1;
        log::debug!("unlock: {gesture:?} attempt {}", self.attempts);
        ctx.emit(Effect::Play { media: Media::Video, volume: None });
        let volume = ctx.config.audio_volume;
        ctx.emit(Effect::Play { media: Media::Audio, volume: Some(volume) });
        true
    }

    /// Record a playback outcome. Only audio decides the gate.
    pub fn on_play_result(&mut self, ctx: &mut StageContext, media: Media, ok: bool) {
        if media != Media::Audio || self.state == UnlockState::Started {
            return;
        }
        if ok {
            self.state = UnlockState::Started;
            log::info!("unlock: audio started");
            ctx.emit(Effect::DetachGestureListeners);
        } else {
            self.state = UnlockState::Blocked;
            log::debug!("unlock: audio blocked");
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
        StageContext::new(StageConfig::default(), SceneRegistry::new(), Session::default())
    }

    #[test]
    fn gesture_attempts_both_media() {
        let mut ctx = ctx();
        let mut gate = UnlockGate::new();
        assert!(gate.dispatch(&mut ctx, Gesture::PointerDown));
        assert_eq!(
            ctx.drain_effects(),
            vec![
                Effect::Play { media: Media::Video, volume: None },
                Effect::Play { media: Media::Audio, volume: Some(0.25) },
            ]
        );
    }

    #[test]
    fn gesture_audio_uses_configured_volume() {
        let mut ctx = ctx();
        ctx.config.audio_volume = 0.4;
        let mut gate = UnlockGate::new();
        gate.dispatch(&mut ctx, Gesture::KeyDown);
        assert!(ctx
            .drain_effects()
            .contains(&Effect::Play { media: Media::Audio, volume: Some(0.4) }));
    }

    #[test]
    fn blocked_keeps_listening_until_success() {
        let mut ctx = ctx();
        let mut gate = UnlockGate::new();
        gate.dispatch(&mut ctx, Gesture::TouchStart);
        gate.on_play_result(&mut ctx, Media::Audio, false);
        assert_eq!(gate.state(), UnlockState::Blocked);
        ctx.drain_effects();

        assert!(gate.dispatch(&mut ctx, Gesture::KeyDown));
        gate.on_play_result(&mut ctx, Media::Audio, true);
        assert_eq!(gate.state(), UnlockState::Started);
        assert_eq!(ctx.drain_effects().last(), Some(&Effect::DetachGestureListeners));
    }

    #[test]
    fn started_is_terminal() {
        let mut ctx = ctx();
        let mut gate = UnlockGate::new();
        gate.on_play_result(&mut ctx, Media::Audio, true);
        ctx.drain_effects();

        assert!(!gate.dispatch(&mut ctx, Gesture::PointerDown));
        gate.on_play_result(&mut ctx, Media::Audio, false);
        gate.on_play_result(&mut ctx, Media::Audio, true);
        assert_eq!(gate.state(), UnlockState::Started);
        assert!(ctx.drain_effects().is_empty());
    }

    #[test]
    fn video_result_does_not_decide() {
        let mut ctx = ctx();
        let mut gate = UnlockGate::new();
        gate.on_play_result(&mut ctx, Media::Video, true);
        assert_eq!(gate.state(), UnlockState::Locked);
    }
}
