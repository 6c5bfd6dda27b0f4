//! The pool registry: one [`ComponentPool`] per registered component kind,
//! keyed by `TypeId`, each assigned a unique power-of-two membership bit.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::entity::EntityId;
use crate::error::EcsError;
use crate::pool::{AnyPool, ComponentPool};

/// Mask width in bits. Bounds the registry to 64 distinct component kinds.
pub(crate) const MAX_COMPONENT_KINDS: u32 = u64::BITS;

#[derive(Default)]
pub(crate) struct PoolRegistry {
    pools: Vec<Box<dyn AnyPool>>,
    index_by_type: HashMap<TypeId, usize>,
    next_bit: u64,
}

impl PoolRegistry {
    pub(crate) fn new() -> Self {
        Self {
            pools: Vec::new(),
            index_by_type: HashMap::new(),
            next_bit: 1,
        }
    }

    /// Registers a pool index for `T` if one doesn't already exist. Returns
    /// the existing or newly-assigned pool index. Lazy and idempotent.
    fn register<T: 'static>(&mut self, entity_count: usize) -> Result<usize, EcsError> {
        let type_id = TypeId::of::<T>();
        if let Some(&index) = self.index_by_type.get(&type_id) {
            return Ok(index);
        }
        if self.next_bit == 0 {
            // Shifted past the top bit -- every available slot is taken.
            return Err(EcsError::PoolCapacityExhausted {
                max: MAX_COMPONENT_KINDS,
            });
        }
        let bit = self.next_bit;
        let index = self.pools.len();
        log::trace!(
            "registering component pool #{index} ({}) with bit {bit:#x}",
            std::any::type_name::<T>()
        );
        self.pools
            .push(Box::new(ComponentPool::<T>::new(bit, entity_count)));
        self.index_by_type.insert(type_id, index);
        self.next_bit = self.next_bit.checked_shl(1).unwrap_or(0);
        Ok(index)
    }

    /// Registers (if needed) and returns a mutable reference to `T`'s pool.
    ///
    /// # Panics
    ///
    /// Panics if registering `T` would exceed the mask's bit width -- more
    /// than [`MAX_COMPONENT_KINDS`] distinct component kinds have already
    /// been registered on this World. This is a programming error: a
    /// fixed-width mask bounds the registry by design, and callers must not
    /// register more distinct kinds than the mask has bits.
    pub(crate) fn get_or_create<T: 'static>(
        &mut self,
        entity_count: usize,
    ) -> &mut ComponentPool<T> {
        let index = self.register::<T>(entity_count).unwrap_or_else(|err| {
            log::error!("{err}");
            panic!("{err}");
        });
        self.pools[index]
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .expect("pool registry index/type mismatch")
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<&ComponentPool<T>> {
        let index = *self.index_by_type.get(&TypeId::of::<T>())?;
        self.pools[index].as_any().downcast_ref::<ComponentPool<T>>()
    }

    pub(crate) fn get_mut<T: 'static>(&mut self) -> Option<&mut ComponentPool<T>> {
        let index = *self.index_by_type.get(&TypeId::of::<T>())?;
        self.pools[index]
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
    }

    pub(crate) fn bit_of<T: 'static>(&self) -> Option<u64> {
        self.get::<T>().map(|pool| pool.bit)
    }

    pub(crate) fn remove_entity_everywhere(&mut self, entity: EntityId) {
        for pool in &mut self.pools {
            pool.remove_entity(entity);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pools.clear();
        self.index_by_type.clear();
        self.next_bit = 1;
    }
}
