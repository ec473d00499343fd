// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-capacity worker registry.
//!
//! A slot's index is the worker's identity for the lifetime of its
//! registration. Each slot sits behind its own mutex, so scanning the
//! table never holds more than one slot at a time and unrelated workers
//! are never serialized behind each other.

use crate::connection::Connection;
use std::fmt;
use std::io;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use thiserror::Error;

/// Position of a slot in the registry, doubling as worker identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered worker: the connection it owns and when it was last heard from
#[derive(Debug)]
pub struct Member<C> {
    connection: C,
    registered_at: Instant,
    last_activity: Instant,
}

impl<C: Connection> Member<C> {
    fn new(connection: C, now: Instant) -> Self {
        Self {
            connection,
            registered_at: now,
            last_activity: now,
        }
    }

    pub fn connection(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn peer(&self) -> String {
        self.connection.peer()
    }

    pub fn registered_at(&self) -> Instant {
        self.registered_at
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Record activity at `now`. Never moves the stamp backwards.
    pub fn touch(&mut self, now: Instant) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

#[derive(Debug)]
enum Slot<C> {
    Free,
    Occupied(Member<C>),
}

/// What `for_each_occupied` should do with the slot just visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    /// Close the connection and free the slot
    Release,
}

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("slot {0} is free")]
    SlotFree(SlotId),

    #[error("slot {slot} out of range (capacity {capacity})")]
    OutOfRange { slot: SlotId, capacity: usize },

    #[error("write to slot {slot} failed: {source}")]
    Send {
        slot: SlotId,
        #[source]
        source: io::Error,
    },
}

/// Returned by [`SlotRegistry::allocate`] when every slot is taken.
///
/// Hands the connection back so the caller can tell the peer why it was
/// refused before closing it.
pub struct CapacityExhausted<C> {
    pub connection: C,
    pub capacity: usize,
}

impl<C> fmt::Debug for CapacityExhausted<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityExhausted")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<C> fmt::Display for CapacityExhausted<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} worker slots are occupied", self.capacity)
    }
}

impl<C> std::error::Error for CapacityExhausted<C> {}

/// Fixed-capacity table of worker slots
pub struct SlotRegistry<C> {
    slots: Box<[Mutex<Slot<C>>]>,
}

impl<C: Connection> SlotRegistry<C> {
    /// Create a registry with `capacity` free slots
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| Mutex::new(Slot::Free)).collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn lock(&self, slot: SlotId) -> Result<MutexGuard<'_, Slot<C>>, RegistryError> {
        self.slots
            .get(slot.index())
            .map(|m| m.lock().unwrap_or_else(|e| e.into_inner()))
            .ok_or(RegistryError::OutOfRange {
                slot,
                capacity: self.capacity(),
            })
    }

    /// Claim the lowest-index free slot for `connection`.
    ///
    /// The slot's activity stamp starts at `now`. When every slot is
    /// occupied nothing is modified and the connection is returned.
    pub fn allocate(&self, connection: C, now: Instant) -> Result<SlotId, CapacityExhausted<C>> {
        for (index, cell) in self.slots.iter().enumerate() {
            let mut slot = cell.lock().unwrap_or_else(|e| e.into_inner());
            if matches!(*slot, Slot::Free) {
                *slot = Slot::Occupied(Member::new(connection, now));
                tracing::debug!(slot = index, "slot allocated");
                return Ok(SlotId(index));
            }
        }
        Err(CapacityExhausted {
            connection,
            capacity: self.capacity(),
        })
    }

    /// Close the slot's connection and mark it free.
    ///
    /// Returns `false` if the slot was already free (or does not exist).
    pub fn release(&self, slot: SlotId) -> bool {
        let Ok(mut guard) = self.lock(slot) else {
            return false;
        };
        match std::mem::replace(&mut *guard, Slot::Free) {
            Slot::Occupied(mut member) => {
                member.connection.close();
                tracing::debug!(%slot, "slot released");
                true
            }
            Slot::Free => false,
        }
    }

    /// Record activity on an occupied slot
    pub fn touch(&self, slot: SlotId, now: Instant) -> Result<(), RegistryError> {
        match &mut *self.lock(slot)? {
            Slot::Occupied(member) => {
                member.touch(now);
                Ok(())
            }
            Slot::Free => Err(RegistryError::SlotFree(slot)),
        }
    }

    /// Write `bytes` to an occupied slot's connection
    pub fn send(&self, slot: SlotId, bytes: &[u8]) -> Result<(), RegistryError> {
        match &mut *self.lock(slot)? {
            Slot::Occupied(member) => member
                .connection
                .send(bytes)
                .map_err(|source| RegistryError::Send { slot, source }),
            Slot::Free => Err(RegistryError::SlotFree(slot)),
        }
    }

    /// Visit every occupied slot, one slot lock at a time.
    ///
    /// A slot freed by another actor while the scan is running is simply
    /// skipped. Returns the number of slots visited.
    pub fn for_each_occupied<F>(&self, mut visitor: F) -> usize
    where
        F: FnMut(SlotId, &mut Member<C>) -> Visit,
    {
        let mut visited = 0;
        for (index, cell) in self.slots.iter().enumerate() {
            let mut slot = cell.lock().unwrap_or_else(|e| e.into_inner());
            let Slot::Occupied(member) = &mut *slot else {
                continue;
            };
            visited += 1;
            if visitor(SlotId(index), member) == Visit::Release {
                if let Slot::Occupied(mut member) = std::mem::replace(&mut *slot, Slot::Free) {
                    member.connection.close();
                }
            }
        }
        visited
    }

    pub fn is_occupied(&self, slot: SlotId) -> bool {
        self.lock(slot)
            .map(|guard| matches!(*guard, Slot::Occupied(_)))
            .unwrap_or(false)
    }

    /// Activity stamp of an occupied slot
    pub fn last_activity(&self, slot: SlotId) -> Option<Instant> {
        match &*self.lock(slot).ok()? {
            Slot::Occupied(member) => Some(member.last_activity),
            Slot::Free => None,
        }
    }

    /// Snapshot of occupied slot ids in index order
    pub fn occupied_slots(&self) -> Vec<SlotId> {
        (0..self.capacity())
            .map(SlotId)
            .filter(|slot| self.is_occupied(*slot))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied_slots().len()
    }

    /// Free every slot, closing all connections. Returns how many were occupied.
    pub fn release_all(&self) -> usize {
        (0..self.capacity())
            .filter(|index| self.release(SlotId(*index)))
            .count()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
