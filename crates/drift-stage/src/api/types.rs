/// One full-screen narrative state.
/// The set is fixed; which of them exist on the page is decided at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Nick,
    Walk,
    Choice,
    Read,
    Write,
}

impl SceneId {
    pub const ALL: [SceneId; 5] = [
        SceneId::Nick,
        SceneId::Walk,
        SceneId::Choice,
        SceneId::Read,
        SceneId::Write,
    ];

    /// DOM id of the scene element.
    pub fn key(self) -> &'static str {
        match self {
            SceneId::Nick => "scene-nick",
            SceneId::Walk => "scene-walk",
            SceneId::Choice => "scene-choice",
            SceneId::Read => "scene-read",
            SceneId::Write => "scene-write",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// The two options of the choice scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    Bottle,
    Pen,
}

impl Choice {
    /// Scene entered once the pick settles.
    pub fn target(self) -> SceneId {
        match self {
            Choice::Bottle => SceneId::Read,
            Choice::Pen => SceneId::Write,
        }
    }

    pub fn other(self) -> Choice {
        match self {
            Choice::Bottle => Choice::Pen,
            Choice::Pen => Choice::Bottle,
        }
    }

    pub fn element(self) -> Element {
        match self {
            Choice::Bottle => Element::ChooseBottle,
            Choice::Pen => Element::ChoosePen,
        }
    }
}

/// Page elements the stage addresses in its effects.
/// The host maps each to a concrete node and ignores the ones it cannot find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Body,
    Splash,
    Scene(SceneId),
    ChooseBottle,
    ChoosePen,
    LetterOverlay,
    LetterText,
    LetterMeta,
    ComposerInput,
    ComposerCounter,
}

/// Media elements subject to autoplay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Media {
    Video,
    Audio,
}

/// Input that counts as a user gesture for autoplay purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PointerDown,
    TouchStart,
    KeyDown,
}

/// Correlates a host response with the request effect that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u32);

/// Deferred work held by the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// End of one leave episode of `scene`.
    ClearLeaving { scene: SceneId, epoch: u32 },
    /// Fire-and-forget transition (walk → choice).
    ShowScene(SceneId),
    /// Media wait is over; start the boot timeline.
    BootStart,
    /// Boot show delay elapsed; reveal the first scene.
    BootReveal,
    /// Splash fade finished; drop it from the tree.
    RemoveSplash,
    /// Choice delay elapsed; move to the option's scene.
    ChoiceSettle(Choice),
    /// Next-frame reset after back navigation.
    ResetChoice,
}

/// CSS state classes toggled by the stage.
pub mod class {
    pub const ACTIVE: &str = "is-active";
    pub const LEAVING: &str = "is-leaving";
    pub const BOOTING: &str = "is-booting";
    pub const READY: &str = "is-ready";
    pub const SELECTED: &str = "is-selected";
    pub const PICKED: &str = "is-picked";
    pub const FADED: &str = "is-faded";
    pub const LETTER_OPEN: &str = "is-letter-open";
    pub const SHOW: &str = "is-show";
}
