/// Visitor identity state for the page lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    has_anon: bool,
}

impl Session {
    /// Seed from the persisted page flag.
    pub fn new(has_anon: bool) -> Self {
        Self { has_anon }
    }

    /// Whether the visitor already has an anonymous identity.
    pub fn has_anon(&self) -> bool {
        self.has_anon
    }

    /// Record a successful nickname submission. The flag never reverts.
    /// Returns true only on the false → true transition.
    pub fn mark_anon(&mut self) -> bool {
        !std::mem::replace(&mut self.has_anon, true)
    }
}
