//! N-ary query iterators (arity 1..6).
//!
//! Every query picks a **driver**: the participating pool with the fewest
//! components. The driver's owner array sets the iteration order; every
//! entity it yields is then checked against the combined membership mask
//! before the caller sees it. If any participating pool doesn't exist yet or
//! is empty, the smallest-length comparison naturally picks it as the
//! driver with zero entries, so the query yields nothing -- the
//! empty-pool short-circuit falls out of driver selection rather than being
//! a special case.
//!
//! This implementation resolves every yielded component -- including the
//! driver's own -- through the same sparse-map lookup used by
//! `World::get_component`, rather than hard-coding "driver index i reads
//! `dense[i]` directly." Both give the same value (the driver's dense index
//! for its own owner *is* `i`), and using one code path keeps the six
//! arities easy to read; the driver still determines iteration order, which
//! is the property the ordering guarantee actually depends on.

use std::marker::PhantomData;

use crate::entity::{Entity, EntityId};
use crate::pool::ComponentPool;
use crate::world::{EntityRow, World};

fn make_entity(world: &World, id: EntityId) -> Entity {
    Entity::new(id, world.mask(id), true)
}

unsafe fn mask_at(entities: *const EntityRow, id: EntityId) -> u64 {
    (*entities.add(id as usize)).mask
}

// ---------------------------------------------------------------------------
// Arity 1 -- no mask check, presence in the dense array implies ownership.
// ---------------------------------------------------------------------------

/// Iterator over `(Entity, &T1)` for every entity owning a `T1`.
pub struct Query1<'a, T1> {
    world: &'a World,
    pool: Option<&'a ComponentPool<T1>>,
    index: usize,
}

impl<'a, T1: 'static> Query1<'a, T1> {
    pub(crate) fn new(world: &'a World) -> Self {
        Self {
            world,
            pool: world.registry().get::<T1>(),
            index: 0,
        }
    }
}

impl<'a, T1: 'static> Iterator for Query1<'a, T1> {
    type Item = (Entity, &'a T1);

    fn next(&mut self) -> Option<Self::Item> {
        let pool = self.pool?;
        if self.index >= pool.len() {
            return None;
        }
        let i = self.index;
        self.index += 1;
        let owner = pool.owners()[i];
        Some((make_entity(self.world, owner), &pool.dense()[i]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pool.map_or(0, |p| p.len().saturating_sub(self.index));
        (remaining, Some(remaining))
    }
}

/// Mutable counterpart to [`Query1`].
pub struct Query1Mut<'a, T1> {
    pool: Option<*mut ComponentPool<T1>>,
    entities: *const EntityRow,
    index: usize,
    len: usize,
    _marker: PhantomData<&'a mut World>,
}

impl<'a, T1: 'static> Query1Mut<'a, T1> {
    pub(crate) fn new(world: &'a mut World) -> Self {
        let entities = world.entities_ptr();
        let pool = world
            .registry_mut()
            .get_mut::<T1>()
            .map(|p| p as *mut ComponentPool<T1>);
        // SAFETY: `pool`, if present, was just obtained from `world` and no
        // other borrow of `world` exists; reading its length through the
        // raw pointer is safe and does not alias the `&mut` we hand out
        // per-item below (distinct dense indices each call).
        let len = pool.map_or(0, |p| unsafe { (*p).len() });
        Self {
            pool,
            entities,
            index: 0,
            len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T1: 'static> Iterator for Query1Mut<'a, T1> {
    type Item = (Entity, &'a mut T1);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let i = self.index;
        self.index += 1;
        // SAFETY: `pool` is `Some` whenever `len > 0`. Each `i` is visited
        // exactly once across the lifetime of this iterator, so the `&mut
        // T1` handed out here never aliases another live reference.
        unsafe {
            let pool = &mut *self.pool.expect("len > 0 implies pool is registered");
            let owner = pool.owners()[i];
            let mask = mask_at(self.entities, owner);
            let entity = Entity::new(owner, mask, true);
            let dense = pool.dense_mut();
            Some((entity, &mut *(&mut dense[i] as *mut T1)))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

macro_rules! impl_query {
    (
        $query:ident, $query_mut:ident, $arity:literal,
        [$($t:ident),+], [$($idx:tt),+]
    ) => {
        #[doc = concat!("Iterator over `(Entity", $(", &", stringify!($t)),+, ")` for every entity owning all ", $arity, " kinds.")]
        pub struct $query<'a, $($t),+> {
            world: &'a World,
            driver_owners: &'a [EntityId],
            index: usize,
            mask: u64,
            _marker: PhantomData<($($t,)+)>,
        }

        impl<'a, $($t: 'static),+> $query<'a, $($t),+> {
            pub(crate) fn new(world: &'a World) -> Self {
                let registry = world.registry();
                let bits = [$(registry.bit_of::<$t>()),+];
                let lens: [usize; $arity] = [
                    $(registry.get::<$t>().map_or(0, |p| p.len())),+
                ];
                let driver = lens
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, len)| *len)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let all_present = bits.iter().all(Option::is_some);
                let mask = if all_present {
                    bits.iter().fold(0u64, |acc, b| acc | b.unwrap_or(0))
                } else {
                    // a missing pool can never match; force an empty iteration
                    u64::MAX
                };
                let driver_owners: &'a [EntityId] = if all_present {
                    match driver {
                        $($idx => registry.get::<$t>().map_or(&[], |p| p.owners()),)+
                        _ => unreachable!(),
                    }
                } else {
                    &[]
                };
                Self {
                    world,
                    driver_owners,
                    index: 0,
                    mask,
                    _marker: PhantomData,
                }
            }
        }

        impl<'a, $($t: 'static),+> Iterator for $query<'a, $($t),+> {
            type Item = (Entity, $(&'a $t),+);

            fn next(&mut self) -> Option<Self::Item> {
                loop {
                    if self.index >= self.driver_owners.len() {
                        return None;
                    }
                    let e = self.driver_owners[self.index];
                    self.index += 1;
                    if self.world.mask(e) & self.mask != self.mask {
                        continue;
                    }
                    let entity = make_entity(self.world, e);
                    $(
                        let $t = self.world.get_component::<$t>(e)
                            .expect("mask bit implies pool membership");
                    )+
                    return Some((entity, $($t),+));
                }
            }
        }

        #[doc = concat!("Mutable counterpart to [`", stringify!($query), "`].")]
        pub struct $query_mut<'a, $($t),+> {
            entities: *const EntityRow,
            driver_owners: *const EntityId,
            driver_len: usize,
            index: usize,
            mask: u64,
            pools: ($(Option<*mut ComponentPool<$t>>,)+),
            _marker: PhantomData<&'a mut World>,
        }

        impl<'a, $($t: 'static),+> $query_mut<'a, $($t),+> {
            pub(crate) fn new(world: &'a mut World) -> Self {
                let entities = world.entities_ptr();
                let registry = world.registry();
                let bits = [$(registry.bit_of::<$t>()),+];
                let all_present = bits.iter().all(Option::is_some);
                let mask = if all_present {
                    bits.iter().fold(0u64, |acc, b| acc | b.unwrap_or(0))
                } else {
                    u64::MAX
                };
                let registry = world.registry_mut();
                let pools = ($(registry.get_mut::<$t>().map(|p| p as *mut ComponentPool<$t>),)+);
                let lens: [usize; $arity] = [
                    $(unsafe { pools.$idx.map_or(0, |p| (*p).len()) }),+
                ];
                let driver = lens
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, len)| *len)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let driver_len = if all_present { lens[driver] } else { 0 };
                let driver_owners: *const EntityId = if driver_len == 0 {
                    std::ptr::null()
                } else {
                    match driver {
                        $($idx => unsafe { (*pools.$idx.unwrap()).owners().as_ptr() },)+
                        _ => unreachable!(),
                    }
                };
                Self {
                    entities,
                    driver_owners,
                    driver_len,
                    index: 0,
                    mask,
                    pools,
                    _marker: PhantomData,
                }
            }
        }

        impl<'a, $($t: 'static),+> Iterator for $query_mut<'a, $($t),+> {
            type Item = (Entity, $(&'a mut $t),+);

            fn next(&mut self) -> Option<Self::Item> {
                loop {
                    if self.index >= self.driver_len {
                        return None;
                    }
                    let i = self.index;
                    self.index += 1;
                    // SAFETY: `driver_len > 0` implies every participating
                    // pool is registered and non-empty (see module docs), so
                    // every `pools.N` below is `Some` inside this branch.
                    let e = unsafe { *self.driver_owners.add(i) };
                    let entity_mask = unsafe { mask_at(self.entities, e) };
                    if entity_mask & self.mask != self.mask {
                        continue;
                    }
                    let entity = Entity::new(e, entity_mask, true);
                    $(
                        let $t = unsafe {
                            let pool = &mut *self.pools.$idx.expect("driver_len > 0 implies registered");
                            let r = pool.get_mut(e).expect("mask bit implies pool membership");
                            &mut *(r as *mut $t)
                        };
                    )+
                    return Some((entity, $($t),+));
                }
            }
        }
    };
}

impl_query!(Query2, Query2Mut, 2, [T1, T2], [0, 1]);
impl_query!(Query3, Query3Mut, 3, [T1, T2, T3], [0, 1, 2]);
impl_query!(Query4, Query4Mut, 4, [T1, T2, T3, T4], [0, 1, 2, 3]);
impl_query!(Query5, Query5Mut, 5, [T1, T2, T3, T4, T5], [0, 1, 2, 3, 4]);
impl_query!(Query6, Query6Mut, 6, [T1, T2, T3, T4, T5, T6], [0, 1, 2, 3, 4, 5]);
