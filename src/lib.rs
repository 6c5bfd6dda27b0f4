//! Engine ECS - Entity-Component-System
//!
//! A minimalist, single-threaded sparse-set ECS: entities are bare integer
//! ids with a per-kind membership bitmask, components live in one
//! [`ComponentPool`](pool::ComponentPool) per registered kind (dense array +
//! owner array + sparse lookup), and [`World::query`] and its `query2`..
//! `query6` siblings iterate by picking the smallest participating pool as
//! the driver and filtering the rest by mask.
//!
//! # Aliasing
//!
//! A reference returned by [`World::get_component_mut`] or yielded from a
//! query iterator borrows the `World`. The borrow checker enforces the
//! aliasing rule this engine depends on: you cannot add, remove, or destroy
//! a component of a participating kind while a query over it is still
//! borrowed, because doing so could move the value out from under a held
//! reference via swap-and-pop. Mutating component *values* in place through
//! those references, without touching membership, is the intended use and
//! is always safe.
//!
//! # Recycling
//!
//! Destroyed entity ids are pushed onto a free stack and reused, LIFO, on
//! the next [`World::spawn`]. There is no generation counter: an id that has
//! been recycled is, as far as the World is concerned, simply alive again.
//! A caller holding a stale [`Entity`] handle from before the destroy will
//! see `is_alive() == false` on that cached snapshot, but re-deriving from
//! the bare id (`world.entity(id)`, or any id-based call) observes whatever
//! entity currently holds that id. This is documented behavior, not a bug;
//! see the design notes for the rationale.

mod entity;
mod error;
mod pool;
mod query;
mod registry;
mod world;

pub use entity::{Entity, EntityId};
pub use error::EcsError;
pub use query::{
    Query1, Query1Mut, Query2, Query2Mut, Query3, Query3Mut, Query4, Query4Mut, Query5,
    Query5Mut, Query6, Query6Mut,
};
pub use world::World;
