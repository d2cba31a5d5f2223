// systems/boot.rs
//
// One-shot startup timeline:
//   wait (canplay | ceiling | missing-media delay)
//     → start: schedule reveal and splash removal
//     → reveal: booting → ready, ambient audio, first scene
//     → remove splash

use crate::api::context::StageContext;
use crate::api::effect::Effect;
use crate::api::types::{class, Element, Media, SceneId, Task};
use crate::core::timeline::TaskHandle;
use crate::systems::transition;

/// State of the backdrop video when the page loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoReadiness {
    /// Enough data to play already (`readyState >= 2`).
    Ready,
    /// Present but still loading.
    Loading,
    /// No video element on the page.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootPhase {
    #[default]
    Idle,
    /// Waiting for media or the timeout ceiling.
    Waiting,
    /// Reveal and splash removal scheduled.
    Started,
    /// First scene shown.
    Revealed,
}

#[derive(Debug, Default)]
pub struct BootSequencer {
    phase: BootPhase,
    ceiling: Option<TaskHandle>,
}

impl BootSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Whether the first scene has been revealed.
    pub fn is_complete(&self) -> bool {
        self.phase == BootPhase::Revealed
    }

    /// Enter the booting state and begin waiting. Only the first call counts.
    pub fn arm(&mut self, ctx: &mut StageContext, video: VideoReadiness) {
        if self.phase != BootPhase::Idle {
            log::debug!("boot: already armed");
            return;
        }
        ctx.emit(Effect::AddClass { element: Element::Body, class: class::BOOTING });
        self.phase = BootPhase::Waiting;

        match video {
            VideoReadiness::Ready => self.start(ctx),
            VideoReadiness::Loading => {
                let ceiling = ctx.config.boot_canplay_ceiling_ms;
                self.ceiling = Some(ctx.schedule(ceiling, Task::BootStart));
            }
            VideoReadiness::Missing => {
                log::info!("boot: no backdrop video, using short timeout");
                let delay = ctx.config.boot_missing_media_ms;
                self.ceiling = Some(ctx.schedule(delay, Task::BootStart));
            }
        }
    }

    /// The backdrop video reported `canplay`.
    pub fn video_can_play(&mut self, ctx: &mut StageContext) {
        if self.phase == BootPhase::Waiting {
            if let Some(handle) = self.ceiling.take() {
                ctx.timeline.cancel(handle);
            }
            self.start(ctx);
        }
    }

    /// Ceiling task fired.
    pub fn timeout(&mut self, ctx: &mut StageContext) {
        self.ceiling = None;
        if self.phase == BootPhase::Waiting {
            log::debug!("boot: media wait ceiling reached");
            self.start(ctx);
        }
    }

    fn start(&mut self, ctx: &mut StageContext) {
        self.phase = BootPhase::Started;
        let show = ctx.config.boot_show_ms;
        let splash = ctx.config.splash_removal_ms();
        ctx.schedule(show, Task::BootReveal);
        ctx.schedule(splash, Task::RemoveSplash);
        log::info!("boot: started");
    }

    /// Show delay elapsed: flip to ready, start audio, show the first scene.
    pub fn reveal(&mut self, ctx: &mut StageContext) {
        if self.phase != BootPhase::Started {
            return;
        }
        self.phase = BootPhase::Revealed;

        ctx.emit(Effect::RemoveClass { element: Element::Body, class: class::BOOTING });
        ctx.emit(Effect::AddClass { element: Element::Body, class: class::READY });
        ctx.emit(Effect::Play { media: Media::Audio, volume: Some(ctx.config.audio_volume) });

        let first = if ctx.session.has_anon() { SceneId::Choice } else { SceneId::Nick };
        transition::show(ctx, first);
    }

    pub fn remove_splash(&mut self, ctx: &mut StageContext) {
        ctx.emit(Effect::RemoveElement(Element::Splash));
    }
}
