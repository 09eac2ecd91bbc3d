//! Object pool implementation
//!
//! Fixed-capacity slab allocator in the spirit of lib/core/ogs-pool.h.
//!
//! Every slot carries a generation counter. A [`PoolHandle`] is the pair
//! (1-based slot index, generation); freeing a slot bumps its generation so
//! any handle still held elsewhere stops resolving. Lookups with stale
//! handles return `None`, while freeing through a stale handle is a
//! programming error and panics.
//!
//! Freed slots go to the tail of a FIFO free list, so a slot is reused only
//! after every other free slot has been handed out.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

/// Pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No free slot left
    #[error("Pool `{name}` exhausted (capacity {capacity})")]
    Exhausted { name: String, capacity: usize },
}

/// Stable handle to an object living in an [`OgsPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// 1-based slot index (0 is never issued)
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Rebuild a handle from its raw parts, e.g. when it travelled through
    /// an event queue as plain integers.
    pub fn from_raw(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

/// Generic fixed-capacity object pool
pub struct OgsPool<T> {
    /// Name of the pool (for diagnostics)
    name: String,
    slots: Vec<Slot<T>>,
    /// Free slot positions (0-based), FIFO
    free: VecDeque<usize>,
}

impl<T> OgsPool<T> {
    /// Create a new pool with the given capacity (ogs_pool_init)
    pub fn new(name: &str, size: usize) -> Self {
        assert!(size <= u32::MAX as usize, "pool `{name}` too large: {size}");

        let slots = (0..size)
            .map(|_| Slot {
                generation: 1,
                item: None,
            })
            .collect();

        OgsPool {
            name: name.to_string(),
            slots,
            free: (0..size).collect(),
        }
    }

    /// Allocate a slot for `item` (ogs_pool_alloc)
    pub fn alloc(&mut self, item: T) -> Result<PoolHandle, PoolError> {
        self.alloc_with(|_| item)
    }

    /// Allocate a slot whose content is built from its own handle
    pub fn alloc_with<F>(&mut self, init: F) -> Result<PoolHandle, PoolError>
    where
        F: FnOnce(PoolHandle) -> T,
    {
        let Some(pos) = self.free.pop_front() else {
            return Err(PoolError::Exhausted {
                name: self.name.clone(),
                capacity: self.slots.len(),
            });
        };

        let slot = &mut self.slots[pos];
        debug_assert!(slot.item.is_none());

        let handle = PoolHandle {
            index: pos as u32 + 1,
            generation: slot.generation,
        };
        slot.item = Some(init(handle));
        log::trace!("[{}] alloc {} (avail={})", self.name, handle, self.free.len());

        Ok(handle)
    }

    /// Release the object behind `handle` and return it (ogs_pool_free)
    ///
    /// # Panics
    ///
    /// Panics on a double free or a stale/foreign handle.
    pub fn free(&mut self, handle: PoolHandle) -> T {
        // A freed handle has an outdated generation, so double frees land here too
        let Some(pos) = self.position(handle) else {
            panic!(
                "pool `{}`: free of stale or unknown handle {}",
                self.name, handle
            );
        };

        let slot = &mut self.slots[pos];
        let Some(item) = slot.item.take() else {
            unreachable!("live position without item");
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(pos);
        log::trace!("[{}] free {} (avail={})", self.name, handle, self.free.len());

        item
    }

    /// Look up a live object; stale or never-issued handles give `None`
    pub fn find(&self, handle: PoolHandle) -> Option<&T> {
        let pos = self.position(handle)?;
        self.slots[pos].item.as_ref()
    }

    /// Mutable variant of [`OgsPool::find`]
    pub fn find_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let pos = self.position(handle)?;
        self.slots[pos].item.as_mut()
    }

    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.find(handle).is_some()
    }

    fn position(&self, handle: PoolHandle) -> Option<usize> {
        let pos = handle.index().checked_sub(1)?;
        let slot = self.slots.get(pos)?;
        (slot.generation == handle.generation && slot.item.is_some()).then_some(pos)
    }

    /// Number of free slots (ogs_pool_avail)
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total capacity (ogs_pool_size)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live objects
    pub fn allocated(&self) -> usize {
        self.capacity() - self.available()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == self.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over live objects in slot order
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(pos, slot)| {
            slot.item.as_ref().map(|item| {
                (
                    PoolHandle {
                        index: pos as u32 + 1,
                        generation: slot.generation,
                    },
                    item,
                )
            })
        })
    }

    /// Handles of every live object, detached from the pool borrow
    pub fn handles(&self) -> Vec<PoolHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Tear the pool down (ogs_pool_final)
    ///
    /// # Panics
    ///
    /// Panics if objects are still allocated; owners must free them first.
    pub fn finalize(self) {
        assert!(
            self.is_empty(),
            "pool `{}` finalized with {} live object(s)",
            self.name,
            self.allocated()
        );
        log::trace!("[{}] finalized", self.name);
    }
}

impl<T> fmt::Debug for OgsPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OgsPool")
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}
