//! The `World`: entity table, free-id stack, and pool registry.

use crate::entity::{Entity, EntityId};
use crate::query::{
    Query1, Query1Mut, Query2, Query2Mut, Query3, Query3Mut, Query4, Query4Mut, Query5,
    Query5Mut, Query6, Query6Mut,
};
use crate::registry::PoolRegistry;

pub(crate) struct EntityRow {
    pub(crate) mask: u64,
    alive: bool,
}

/// Owns every entity and every component pool for one simulation.
///
/// `World` is the single entry point for entity lifecycle, component
/// mutation, and queries. See the crate docs for the aliasing and liveness
/// rules that govern handles returned from it.
pub struct World {
    entities: Vec<EntityRow>,
    free_ids: Vec<EntityId>,
    registry: PoolRegistry,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Entity> for EntityId {
    fn from(entity: Entity) -> Self {
        entity.id()
    }
}

impl World {
    /// Creates an empty World.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            free_ids: Vec::new(),
            registry: PoolRegistry::new(),
        }
    }

    fn assert_in_bounds(&self, id: EntityId) {
        assert!(
            (id as usize) < self.entities.len(),
            "entity id {id} is out of bounds (world has {} entity slots)",
            self.entities.len()
        );
    }

    fn assert_alive(&self, id: EntityId) {
        assert!(
            self.entities[id as usize].alive,
            "use-after-destroy: entity id {id} is not alive"
        );
    }

    /// Allocates a new entity, reusing a freed id (LIFO) when one is
    /// available, otherwise appending a fresh id.
    pub fn spawn(&mut self) -> Entity {
        let id = if let Some(id) = self.free_ids.pop() {
            let row = &mut self.entities[id as usize];
            row.mask = 0;
            row.alive = true;
            id
        } else {
            let id = self.entities.len() as EntityId;
            self.entities.push(EntityRow {
                mask: 0,
                alive: true,
            });
            id
        };
        Entity::new(id, 0, true)
    }

    /// Returns a fresh handle snapshot for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds or refers to a dead entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Entity {
        self.assert_in_bounds(id);
        self.assert_alive(id);
        let row = &self.entities[id as usize];
        Entity::new(id, row.mask, row.alive)
    }

    /// Number of currently-alive entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len() - self.free_ids.len()
    }

    /// Destroys an entity: removes its component from every pool it belongs
    /// to, clears its mask, and pushes its id onto the free stack. Idempotent
    /// -- a no-op if the entity is already dead.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    pub fn destroy(&mut self, id: impl Into<EntityId>) {
        let id = id.into();
        self.assert_in_bounds(id);
        if !self.entities[id as usize].alive {
            return;
        }
        self.registry.remove_entity_everywhere(id);
        let row = &mut self.entities[id as usize];
        row.mask = 0;
        row.alive = false;
        self.free_ids.push(id);
    }

    /// Adds `value` as entity `id`'s component of kind `T`, or overwrites the
    /// existing one.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds, not alive, or if registering `T` for
    /// the first time would exceed the mask's bit width (see
    /// [`crate::registry::MAX_COMPONENT_KINDS`]).
    pub fn add_component<T: 'static>(&mut self, id: impl Into<EntityId>, value: T) {
        let id = id.into();
        self.assert_in_bounds(id);
        self.assert_alive(id);
        let entity_count = self.entities.len();
        let pool = self.registry.get_or_create::<T>(entity_count);
        if pool.insert(id, entity_count, value) {
            let bit = pool.bit;
            self.entities[id as usize].mask |= bit;
        }
    }

    /// Removes entity `id`'s component of kind `T`, if present. No-op
    /// (including when `T` has never been registered on this World).
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds or not alive.
    pub fn remove_component<T: 'static>(&mut self, id: impl Into<EntityId>) -> Option<T> {
        let id = id.into();
        self.assert_in_bounds(id);
        self.assert_alive(id);
        let pool = self.registry.get_mut::<T>()?;
        let removed = pool.remove(id);
        if removed.is_some() {
            let bit = pool.bit;
            self.entities[id as usize].mask &= !bit;
        }
        removed
    }

    /// Whether entity `id` owns a component of kind `T`. A plain bitmask
    /// test -- a dead entity's mask is always `0`, so this returns `false`
    /// for dead ids without a separate liveness check.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[must_use]
    pub fn has_component<T: 'static>(&self, id: impl Into<EntityId>) -> bool {
        let id = id.into();
        self.assert_in_bounds(id);
        match self.registry.bit_of::<T>() {
            Some(bit) => self.entities[id as usize].mask & bit != 0,
            None => false,
        }
    }

    /// Returns entity `id`'s component of kind `T`, or `None` if it doesn't
    /// own one (including when `T` has never been registered).
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds or not alive.
    #[must_use]
    pub fn get_component<T: 'static>(&self, id: impl Into<EntityId>) -> Option<&T> {
        let id = id.into();
        self.assert_in_bounds(id);
        self.assert_alive(id);
        self.registry.get::<T>()?.get(id)
    }

    /// Mutable counterpart to [`World::get_component`]. The returned
    /// reference borrows `self` and becomes unusable the moment another
    /// mutator is called, which the borrow checker enforces.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds or not alive.
    pub fn get_component_mut<T: 'static>(&mut self, id: impl Into<EntityId>) -> Option<&mut T> {
        let id = id.into();
        self.assert_in_bounds(id);
        self.assert_alive(id);
        self.registry.get_mut::<T>()?.get_mut(id)
    }

    /// Resets the World to its freshly-constructed state: empties the
    /// entity table, the free stack, and the pool registry. All outstanding
    /// `Entity` handles become invalid.
    pub fn clear_all(&mut self) {
        log::debug!("clearing world ({} entities)", self.entity_count());
        self.entities.clear();
        self.free_ids.clear();
        self.registry.clear();
    }

    /// Iterates entities owning a component of kind `T1`.
    #[must_use]
    pub fn query<T1: 'static>(&self) -> Query1<'_, T1> {
        Query1::new(self)
    }

    /// Mutable counterpart to [`World::query`].
    pub fn query_mut<T1: 'static>(&mut self) -> Query1Mut<'_, T1> {
        Query1Mut::new(self)
    }

    /// Iterates entities owning components of kinds `T1` and `T2`.
    #[must_use]
    pub fn query2<T1: 'static, T2: 'static>(&self) -> Query2<'_, T1, T2> {
        Query2::new(self)
    }

    /// Mutable counterpart to [`World::query2`].
    pub fn query2_mut<T1: 'static, T2: 'static>(&mut self) -> Query2Mut<'_, T1, T2> {
        Query2Mut::new(self)
    }

    /// Iterates entities owning components of kinds `T1`, `T2`, `T3`.
    #[must_use]
    pub fn query3<T1: 'static, T2: 'static, T3: 'static>(&self) -> Query3<'_, T1, T2, T3> {
        Query3::new(self)
    }

    /// Mutable counterpart to [`World::query3`].
    pub fn query3_mut<T1: 'static, T2: 'static, T3: 'static>(
        &mut self,
    ) -> Query3Mut<'_, T1, T2, T3> {
        Query3Mut::new(self)
    }

    /// Iterates entities owning components of kinds `T1`..`T4`.
    #[must_use]
    pub fn query4<T1: 'static, T2: 'static, T3: 'static, T4: 'static>(
        &self,
    ) -> Query4<'_, T1, T2, T3, T4> {
        Query4::new(self)
    }

    /// Mutable counterpart to [`World::query4`].
    pub fn query4_mut<T1: 'static, T2: 'static, T3: 'static, T4: 'static>(
        &mut self,
    ) -> Query4Mut<'_, T1, T2, T3, T4> {
        Query4Mut::new(self)
    }

    /// Iterates entities owning components of kinds `T1`..`T5`.
    #[must_use]
    pub fn query5<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>(
        &self,
    ) -> Query5<'_, T1, T2, T3, T4, T5> {
        Query5::new(self)
    }

    /// Mutable counterpart to [`World::query5`].
    pub fn query5_mut<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static>(
        &mut self,
    ) -> Query5Mut<'_, T1, T2, T3, T4, T5> {
        Query5Mut::new(self)
    }

    /// Iterates entities owning components of kinds `T1`..`T6`.
    #[must_use]
    pub fn query6<T1: 'static, T2: 'static, T3: 'static, T4: 'static, T5: 'static, T6: 'static>(
        &self,
    ) -> Query6<'_, T1, T2, T3, T4, T5, T6> {
        Query6::new(self)
    }

    /// Mutable counterpart to [`World::query6`].
    pub fn query6_mut<
        T1: 'static,
        T2: 'static,
        T3: 'static,
        T4: 'static,
        T5: 'static,
        T6: 'static,
    >(
        &mut self,
    ) -> Query6Mut<'_, T1, T2, T3, T4, T5, T6> {
        Query6Mut::new(self)
    }

    pub(crate) fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut PoolRegistry {
        &mut self.registry
    }

    pub(crate) fn mask(&self, id: EntityId) -> u64 {
        self.entities[id as usize].mask
    }

    /// Raw pointer to the entity table, for query iterators that need to
    /// read an entity's mask without holding a `&World` borrow that would
    /// collide with the `&mut` pool borrows they also hold. Safe to
    /// dereference for the lifetime of the `World` as long as no structural
    /// mutation (spawn/destroy) happens concurrently, which the aliasing
    /// rules already forbid during iteration.
    pub(crate) fn entities_ptr(&self) -> *const EntityRow {
        self.entities.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Clone, Copy)]
    struct Pos {
        x: i32,
        y: i32,
    }

    #[derive(Debug, PartialEq, Clone, Copy)]
    struct Vel {
        vx: i32,
        vy: i32,
    }

    #[test]
    fn basic_lifecycle() {
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Pos { x: 10, y: 20 });
        assert!(world.has_component::<Pos>(e));
        assert_eq!(world.get_component::<Pos>(e), Some(&Pos { x: 10, y: 20 }));
    }

    #[test]
    fn selective_removal_leaves_sibling_pool_untouched() {
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Pos { x: 0, y: 0 });
        world.add_component(e, Vel { vx: 1, vy: 1 });
        world.remove_component::<Pos>(e);
        assert!(!world.has_component::<Pos>(e));
        assert!(world.has_component::<Vel>(e));
    }

    #[test]
    fn recycling_is_lifo_and_drains_free_stack() {
        let mut world = World::new();
        let e1 = world.spawn();
        world.destroy(e1);
        let e2 = world.spawn();
        assert_eq!(e2.id(), e1.id());
        assert_eq!(world.entity_count(), 1);
        world.destroy(e2);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn add_twice_overwrites_without_growing_pool() {
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Pos { x: 1, y: 1 });
        world.add_component(e, Pos { x: 2, y: 2 });
        assert_eq!(world.get_component::<Pos>(e), Some(&Pos { x: 2, y: 2 }));
    }

    #[test]
    fn destroy_clears_every_pool() {
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Pos { x: 0, y: 0 });
        world.add_component(e, Vel { vx: 0, vy: 0 });
        world.destroy(e);
        assert!(!world.has_component::<Pos>(e.id()));
        assert!(!world.has_component::<Vel>(e.id()));
    }

    #[test]
    fn destroy_is_idempotent_on_dead_ids() {
        let mut world = World::new();
        let e = world.spawn();
        world.destroy(e);
        world.destroy(e.id()); // must not panic
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn bounds_violation_is_fatal() {
        let world = World::new();
        let _ = world.has_component::<Pos>(0u32);
    }

    #[test]
    #[should_panic(expected = "use-after-destroy")]
    fn use_after_destroy_is_fatal_on_get() {
        let mut world = World::new();
        let e = world.spawn();
        world.destroy(e);
        let _ = world.get_component::<Pos>(e.id());
    }

    #[test]
    fn clear_all_resets_world() {
        let mut world = World::new();
        let e = world.spawn();
        world.add_component(e, Pos { x: 1, y: 2 });
        world.clear_all();
        assert_eq!(world.entity_count(), 0);
        let fresh = world.spawn();
        assert_eq!(fresh.id(), 0);
        assert!(!world.has_component::<Pos>(fresh.id()));
    }
}
