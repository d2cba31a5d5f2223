use crate::api::context::StageContext;
use crate::api::effect::{Effect, RequestKind};
use crate::api::types::{SceneId, Task};
use crate::error::FetchError;
use crate::systems::composer::InputCounter;
use crate::systems::transition;

/// Submit the nickname form. A blank or overlong nickname sends nothing.
pub fn submit(ctx: &mut StageContext, raw: &str) -> bool {
    let nickname = raw.trim();
    if nickname.is_empty() {
        return false;
    }
    if InputCounter::new(ctx.config.nickname_max_chars).is_over(nickname) {
        log::debug!("nickname: longer than {} chars", ctx.config.nickname_max_chars);
        return false;
    }
    ctx.issue(RequestKind::SubmitNickname { nickname: nickname.to_string() });
    true
}

/// Handle the submission outcome. Failures are ignored and the visitor stays put.
///
/// On success the walk scene is shown at once and the choice scene is
/// scheduled independently of the walk crossfade.
pub fn on_response(ctx: &mut StageContext, result: Result<String, FetchError>) -> bool {
    if let Err(err) = result {
        log::debug!("nickname: {err}");
        return false;
    }

    if ctx.session.mark_anon() {
        ctx.emit(Effect::MarkHasAnon);
    }
    transition::show(ctx, SceneId::Walk);
    let delay = ctx.config.walk_to_choice_ms;
    ctx.schedule(delay, Task::ShowScene(SceneId::Choice));
    true
}
