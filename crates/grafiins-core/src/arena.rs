//! Slot arena with generational handles and FIFO slot reuse.
//!
//! # Overview
//!
//! [`Arena`] stores one kind of entity (vertex or edge) in a `Vec` of slots.
//! Removing an entity frees its slot and queues the slot index on a FIFO
//! free-list; the next [`Arena::insert`] reuses the earliest-freed index
//! before the backing `Vec` grows. Memory therefore stays bounded under
//! add/remove churn without compaction.
//!
//! # Handles
//!
//! A [`Handle`] is an `(index, generation)` pair. Each reuse of a slot bumps
//! its generation, so a handle kept across a removal no longer resolves:
//! [`Arena::contains`] returns `false` and [`Arena::at`] panics instead of
//! silently addressing the newer entity that now lives in the slot.
//!
//! ```text
//! insert(a) -> 0.0   insert(b) -> 1.0   remove(0.0)   insert(c) -> 0.1
//!
//! slots:  [ c (gen 1) | b (gen 0) ]      free: []
//! at(0.0) -> panic (stale)   at(0.1) -> c
//! ```
//!
//! # Contract
//!
//! `at`, `at_mut` and `remove` require a live handle. Passing a stale or
//! unknown handle is a caller bug and panics. `get`, `get_mut` and `contains`
//! are the non-panicking lookups.

use std::collections::VecDeque;
use std::fmt;

use rand::Rng;

/// Stable reference to a live entity in one [`Arena`].
///
/// Handles from different arenas are unrelated even when their indices
/// match. Ordering is by slot index first, so sorting live handles yields
/// slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index of this handle. Reused after the entity is removed.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Number of times the slot had been recycled when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// Indexed entity storage with O(1) insert, remove and lookup.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: VecDeque<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: VecDeque::new(),
            len: 0,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// Reuses the earliest-freed slot if there is one, otherwise appends a
    /// new slot. The returned handle is live immediately.
    ///
    /// # Panics
    ///
    /// Panics if the arena would exceed `u32::MAX` slots.
    pub fn insert(&mut self, value: T) -> Handle {
        if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none(), "free-list slot {index} is occupied");
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            self.len += 1;
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        let Ok(index) = u32::try_from(self.slots.len()) else {
            panic!("arena exceeded {} slots", u32::MAX);
        };
        self.slots.push(Slot {
            value: Some(value),
            generation: 0,
        });
        self.len += 1;
        Handle {
            index,
            generation: 0,
        }
    }

    /// Remove the entity behind `handle` and return its payload.
    ///
    /// The slot index is queued for reuse.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not live.
    #[track_caller]
    pub fn remove(&mut self, handle: Handle) -> T {
        let Some(value) = self.slot_mut(handle).and_then(|slot| slot.value.take()) else {
            stale_handle("remove", handle);
        };
        self.free.push_back(handle.index);
        self.len -= 1;
        value
    }

    /// Borrow the payload behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not live.
    #[track_caller]
    pub fn at(&self, handle: Handle) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => stale_handle("at", handle),
        }
    }

    /// Mutably borrow the payload behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not live.
    #[track_caller]
    pub fn at_mut(&mut self, handle: Handle) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => stale_handle("at_mut", handle),
        }
    }

    /// Borrow the payload behind `handle`, or `None` if it is not live.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    /// Mutably borrow the payload behind `handle`, or `None` if it is not live.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slot_mut(handle).and_then(|slot| slot.value.as_mut())
    }

    /// `true` iff `handle` currently refers to a live entity.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live entities.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, live or free.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting on the free-list.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// All live handles in ascending slot order. Not necessarily contiguous.
    #[must_use]
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Iterate live `(handle, payload)` pairs in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (handle_at(index, slot.generation), value))
        })
    }

    /// Pick one live handle uniformly at random, or `None` if the arena is empty.
    pub fn random_handle<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Handle> {
        if self.is_empty() {
            return None;
        }
        let nth = rng.gen_range(0..self.len);
        self.iter().nth(nth).map(|(handle, _)| handle)
    }

    /// Assert the slot bookkeeping is consistent.
    ///
    /// Checks that the live count equals allocated slots minus free-list
    /// length and that every free-list entry is a distinct vacant slot.
    ///
    /// # Panics
    ///
    /// Panics when an invariant does not hold.
    pub fn debug_validate_invariants(&self) {
        assert_eq!(
            self.len,
            self.slots.len() - self.free.len(),
            "live count disagrees with slots minus free-list"
        );
        assert_eq!(
            self.len,
            self.slots.iter().filter(|slot| slot.value.is_some()).count(),
            "live count disagrees with occupied slots"
        );
        let mut seen = vec![false; self.slots.len()];
        for &index in &self.free {
            let index = index as usize;
            assert!(self.slots[index].value.is_none(), "free slot {index} is occupied");
            assert!(!seen[index], "slot {index} queued twice on the free-list");
            seen[index] = true;
        }
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
    }
}

// Slot count never exceeds u32::MAX (enforced in `insert`).
#[allow(clippy::cast_possible_truncation)]
const fn handle_at(index: usize, generation: u32) -> Handle {
    Handle {
        index: index as u32,
        generation,
    }
}

#[cold]
#[track_caller]
fn stale_handle(op: &str, handle: Handle) -> ! {
    panic!("{op}: handle {handle} is stale or was never issued by this arena")
}
