pub mod api;
pub mod core;
pub mod error;
pub mod input;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::StageConfig;
pub use api::context::StageContext;
pub use api::effect::{Effect, Request, RequestKind, Method};
pub use api::stage::Stage;
pub use api::types::{class, Choice, Element, Gesture, Media, RequestId, SceneId, Task};
pub use core::scene::{SceneRegistry, SceneSlot, Activation};
pub use core::session::Session;
pub use core::time::Clock;
pub use core::timeline::{Timeline, TaskHandle};
pub use error::{ConfigError, FetchError};
pub use input::event::{Control, InputEvent};
pub use systems::backdrop::{BackdropLayout, SourceRect, cover_crop};
pub use systems::boot::{BootSequencer, BootPhase, VideoReadiness};
pub use systems::choice::{ChoiceLock, ChoiceState};
pub use systems::composer::{Composer, InputCounter};
pub use systems::letter::{Glyph, LetterReveal, TodayPayload, compose_glyphs, stagger_delay};
pub use systems::unlock::{UnlockGate, UnlockState};
