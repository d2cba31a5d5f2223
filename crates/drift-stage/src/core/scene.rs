use crate::api::types::SceneId;

/// Presentation state of one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSlot {
    pub id: SceneId,
    active: bool,
    leaving: bool,
    /// Incremented on every leave; identifies the leave episode a
    /// clear-leaving timer belongs to.
    epoch: u32,
}

impl SceneSlot {
    fn new(id: SceneId) -> Self {
        Self {
            id,
            active: false,
            leaving: false,
            epoch: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

/// Outcome of [`SceneRegistry::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The scene is not on this page.
    Unknown,
    /// Already active; nothing changed.
    AlreadyActive,
    Entered {
        /// The scene was still fading out and its leaving flag was dropped.
        interrupted_leave: bool,
        /// Scene that lost `active`, with the epoch of its new leave episode.
        previous: Option<(SceneId, u32)>,
    },
}

/// Flat registry of the scenes present on the page.
/// At most one slot is active at any time.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    slots: Vec<SceneSlot>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(SceneId::ALL.len()),
        }
    }

    /// Build a registry from the scenes found on the page. Duplicates are ignored.
    pub fn with_scenes(scenes: impl IntoIterator<Item = SceneId>) -> Self {
        let mut registry = Self::new();
        for id in scenes {
            registry.register(id);
        }
        registry
    }

    /// Add a scene. Returns false if it was already registered.
    pub fn register(&mut self, id: SceneId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots.push(SceneSlot::new(id));
        true
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SceneId) -> Option<&SceneSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: SceneId) -> Option<&mut SceneSlot> {
        self.slots.iter_mut().find(|s| s.id == id)
    }

    /// The active scene, if any.
    pub fn active(&self) -> Option<SceneId> {
        self.slots.iter().find(|s| s.active).map(|s| s.id)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Scenes currently fading out.
    pub fn leaving(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.slots.iter().filter(|s| s.leaving).map(|s| s.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Make `id` the active scene. The previous active scene becomes
    /// leaving and inactive in the same step.
    pub fn activate(&mut self, id: SceneId) -> Activation {
        let Some(target) = self.get_mut(id) else {
            return Activation::Unknown;
        };
        if target.active {
            return Activation::AlreadyActive;
        }

        target.active = true;
        let interrupted_leave = std::mem::replace(&mut target.leaving, false);

        let previous = self
            .slots
            .iter_mut()
            .find(|s| s.active && s.id != id)
            .map(|prev| {
                prev.active = false;
                prev.leaving = true;
                prev.epoch = prev.epoch.wrapping_add(1);
                (prev.id, prev.epoch)
            });

        Activation::Entered {
            interrupted_leave,
            previous,
        }
    }

    /// End a leave episode. Only the episode identified by `epoch` may
    /// clear the flag; stale or interrupted episodes are refused.
    pub fn clear_leaving(&mut self, id: SceneId, epoch: u32) -> bool {
        match self.get_mut(id) {
            Some(slot) if slot.leaving && slot.epoch == epoch => {
                slot.leaving = false;
                true
            }
            _ => false,
        }
    }
}
