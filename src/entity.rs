//! Entity identity: the bare id used for batch operations and the cached
//! handle callers get back from [`World`](crate::World).

/// Bare entity identifier.
///
/// An `EntityId` is just an index into the World's entity table. It carries
/// no liveness or mask information of its own -- looking one up against a
/// `World` is how you find out whether it's still alive. Prefer [`Entity`]
/// when you want to avoid re-deriving the mask/liveness on every call.
pub type EntityId = u32;

/// A cached handle to an entity, bound to the `World` that created it.
///
/// `Entity` is a cheap value type: `{id, mask, alive}` plus (conceptually) a
/// back-reference to its owning `World`. The `mask` and `alive` fields are a
/// *snapshot* taken when the handle was last refreshed -- they can lag the
/// World's canonical entity row if the entity is mutated through a different
/// handle or through the bare id. The canonical state always lives in
/// `World`; call [`World::entity`](crate::World::entity) again to get a
/// fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    mask: u64,
    alive: bool,
}

impl Entity {
    #[must_use]
    pub(crate) const fn new(id: EntityId, mask: u64, alive: bool) -> Self {
        Self { id, mask, alive }
    }

    /// The bare id backing this handle. Stable for as long as the entity is
    /// alive; may be reused by a different entity after `destroy`.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// The cached membership mask as of when this handle was last refreshed.
    #[must_use]
    pub const fn mask(self) -> u64 {
        self.mask
    }

    /// Whether this handle's cached snapshot considered the entity alive.
    /// Does not re-check the World -- see the struct docs for staleness.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        self.alive
    }
}
