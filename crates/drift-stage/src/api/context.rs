use std::collections::HashMap;
use crate::api::config::StageConfig;
use crate::api::effect::{Effect, Request, RequestKind};
use crate::api::types::{RequestId, Task};
use crate::core::scene::SceneRegistry;
use crate::core::session::Session;
use crate::core::time::Clock;
use crate::core::timeline::{TaskHandle, Timeline};

/// Mutable access to stage state, passed to every flow.
pub struct StageContext {
    pub config: StageConfig,
    pub scenes: SceneRegistry,
    pub session: Session,
    pub clock: Clock,
    pub timeline: Timeline<Task>,
    effects: Vec<Effect>,
    requests: HashMap<RequestId, RequestKind>,
    next_request: u32,
}

impl StageContext {
    pub fn new(config: StageConfig, scenes: SceneRegistry, session: Session) -> Self {
        Self {
            config,
            scenes,
            session,
            clock: Clock::new(),
            timeline: Timeline::new(),
            effects: Vec::with_capacity(32),
            requests: HashMap::new(),
            next_request: 1,
        }
    }

    /// Queue an effect for the host.
    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Take all queued effects in emission order.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Effects emitted but not yet drained.
    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Schedule a task `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u32, task: Task) -> TaskHandle {
        self.timeline.schedule(self.clock.now(), delay_ms, task)
    }

    /// Schedule a task for the next animation frame.
    pub fn next_frame(&mut self, task: Task) -> TaskHandle {
        self.timeline.next_frame(task)
    }

    /// Emit a request effect and remember what it was for.
    pub fn issue(&mut self, kind: RequestKind) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        self.requests.insert(id, kind.clone());
        self.emit(Effect::Request(Request { id, kind }));
        id
    }

    /// Resolve a response id to the request it answers. Each id settles once.
    pub fn settle(&mut self, id: RequestId) -> Option<RequestKind> {
        self.requests.remove(&id)
    }

    /// Requests issued and not yet answered.
    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    /// Drop pending tasks, unanswered requests and queued effects.
    pub fn clear(&mut self) {
        self.timeline.cancel_all();
        self.requests.clear();
        self.effects.clear();
    }
}
