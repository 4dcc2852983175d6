// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Owns the event instances handed out to the dispatcher and recycles them.

use super::kind::EventKind;
use super::types::{ConcreteEvent, Event};
use crate::error::EventError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// How the pool hands out instances for repeated requests of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoalescePolicy {
    /// One instance per kind, refreshed on every request. Events of the same
    /// kind queued between two flushes collapse into the latest one.
    #[default]
    LatestWins,
    /// Every request gets its own instance. Idle instances (no longer queued
    /// nor held by anyone) are refreshed and reused before new ones are
    /// allocated.
    Distinct,
}

/// A shared handle to one pooled event instance.
///
/// Cloning the handle does not clone the event: all clones observe the same
/// slot, and [`PooledEvent::ptr_eq`] compares slot identity.
#[derive(Debug, Clone)]
pub struct PooledEvent {
    kind: EventKind,
    slot: Arc<RwLock<Event>>,
}

impl PooledEvent {
    fn new(event: Event) -> Self {
        Self {
            kind: event.kind(),
            slot: Arc::new(RwLock::new(event)),
        }
    }

    /// Returns the kind the slot was created for.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns a copy of the event currently stored in the slot.
    pub fn snapshot(&self) -> Event {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a copy of the slot's payload as an `E`.
    ///
    /// ## Errors
    /// [`EventError::KindMismatch`] if the slot holds another kind.
    pub fn get<E: ConcreteEvent>(&self) -> Result<E, EventError> {
        let event = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        event.cast::<E>().cloned()
    }

    /// Returns `true` if both handles point at the same slot.
    #[inline]
    pub fn ptr_eq(&self, other: &PooledEvent) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn refresh<E: ConcreteEvent>(&self, args: E::Args) -> Result<(), EventError> {
        let mut event = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        event.cast_mut::<E>()?.update(args);
        Ok(())
    }

    /// A slot is idle when the pool holds the only handle to it.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.slot) == 1
    }
}

/// Owns every event instance, keyed by [`EventKind`].
///
/// Instances are allocated on first request and only released when the pool
/// itself is dropped.
#[derive(Debug, Default)]
pub struct EventPool {
    policy: CoalescePolicy,
    slots: HashMap<EventKind, Vec<PooledEvent>>,
}

impl EventPool {
    /// Creates an empty pool using [`CoalescePolicy::LatestWins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool using the given policy.
    pub fn with_policy(policy: CoalescePolicy) -> Self {
        Self {
            policy,
            slots: HashMap::new(),
        }
    }

    /// Returns the pool's recycling policy.
    #[inline]
    pub fn policy(&self) -> CoalescePolicy {
        self.policy
    }

    /// Returns an instance of `E` holding `args`.
    ///
    /// Under [`CoalescePolicy::LatestWins`] the first call for a kind
    /// allocates and every later call refreshes and returns that same
    /// instance. Under [`CoalescePolicy::Distinct`] an idle instance is
    /// refreshed if one exists, otherwise a new one is allocated.
    pub fn acquire<E: ConcreteEvent>(&mut self, args: E::Args) -> PooledEvent {
        let policy = self.policy;
        let slots = self.slots.entry(E::KIND).or_default();

        let reusable = match policy {
            CoalescePolicy::LatestWins => slots.last(),
            CoalescePolicy::Distinct => slots.iter().find(|slot| slot.is_idle()),
        };

        if let Some(slot) = reusable {
            if let Err(e) = slot.refresh::<E>(args) {
                panic!("event pool corrupted under {}: {e}", E::KIND);
            }
            return slot.clone();
        }

        let slot = PooledEvent::new(E::create(args).into_event());
        slots.push(slot.clone());
        log::trace!(
            "Pooled a new {} instance ({} in pool).",
            E::KIND,
            slots.len()
        );
        slot
    }

    /// Returns the payload of the first instance allocated for `E`, if any.
    pub fn oldest<E: ConcreteEvent>(&self) -> Option<E> {
        self.oldest_handle(E::KIND).map(|slot| read_as::<E>(&slot))
    }

    /// Returns the payload of the last instance allocated for `E`, if any.
    pub fn newest<E: ConcreteEvent>(&self) -> Option<E> {
        self.newest_handle(E::KIND).map(|slot| read_as::<E>(&slot))
    }

    /// Returns a handle to the first instance allocated for `kind`, if any.
    pub fn oldest_handle(&self, kind: EventKind) -> Option<PooledEvent> {
        self.slots.get(&kind).and_then(|slots| slots.first()).cloned()
    }

    /// Returns a handle to the last instance allocated for `kind`, if any.
    pub fn newest_handle(&self, kind: EventKind) -> Option<PooledEvent> {
        self.slots.get(&kind).and_then(|slots| slots.last()).cloned()
    }

    /// Returns the number of instances allocated for `kind`.
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.slots.get(&kind).map_or(0, Vec::len)
    }

    /// Returns the number of instances allocated across all kinds.
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing was ever acquired.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_as<E: ConcreteEvent>(slot: &PooledEvent) -> E {
    match slot.get::<E>() {
        Ok(event) => event,
        Err(e) => panic!("event pool corrupted under {}: {e}", E::KIND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EndEvent, MouseMoveEvent, StartEvent};

    #[test]
    fn first_acquire_allocates() {
        let mut pool = EventPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.count_of(EventKind::MouseMove), 0);

        let slot = pool.acquire::<MouseMoveEvent>((1, 2));
        assert_eq!(slot.kind(), EventKind::MouseMove);
        assert_eq!(pool.count_of(EventKind::MouseMove), 1);
        assert_eq!(slot.get::<MouseMoveEvent>(), Ok(MouseMoveEvent { x: 1, y: 2 }));
    }

    #[test]
    fn latest_wins_reuses_the_same_instance() {
        let mut pool = EventPool::new();
        let first = pool.acquire::<MouseMoveEvent>((10, 20));
        let second = pool.acquire::<MouseMoveEvent>((30, 40));

        assert!(first.ptr_eq(&second));
        assert_eq!(pool.count_of(EventKind::MouseMove), 1);
        assert_eq!(
            first.get::<MouseMoveEvent>(),
            Ok(MouseMoveEvent { x: 30, y: 40 })
        );
    }

    #[test]
    fn oldest_and_newest_agree_under_latest_wins() {
        let mut pool = EventPool::new();
        assert!(pool.oldest::<StartEvent>().is_none());
        assert!(pool.newest::<StartEvent>().is_none());

        pool.acquire::<StartEvent>(1);
        pool.acquire::<StartEvent>(2);

        assert_eq!(pool.oldest::<StartEvent>(), Some(StartEvent { placeholder: 2 }));
        assert_eq!(pool.newest::<StartEvent>(), Some(StartEvent { placeholder: 2 }));
        let oldest = pool.oldest_handle(EventKind::StateStart).unwrap();
        let newest = pool.newest_handle(EventKind::StateStart).unwrap();
        assert!(oldest.ptr_eq(&newest));
    }

    #[test]
    fn kinds_are_pooled_separately() {
        let mut pool = EventPool::new();
        let start = pool.acquire::<StartEvent>(1);
        let end = pool.acquire::<EndEvent>(1);

        assert!(!start.ptr_eq(&end));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.count_of(EventKind::StateStart), 1);
        assert_eq!(pool.count_of(EventKind::StateEnd), 1);
    }

    #[test]
    fn distinct_allocates_while_instances_are_held() {
        let mut pool = EventPool::with_policy(CoalescePolicy::Distinct);
        let first = pool.acquire::<MouseMoveEvent>((10, 20));
        let second = pool.acquire::<MouseMoveEvent>((30, 40));

        assert!(!first.ptr_eq(&second));
        assert_eq!(pool.count_of(EventKind::MouseMove), 2);
        assert_eq!(first.get::<MouseMoveEvent>(), Ok(MouseMoveEvent { x: 10, y: 20 }));
        assert_eq!(second.get::<MouseMoveEvent>(), Ok(MouseMoveEvent { x: 30, y: 40 }));
        assert_eq!(pool.oldest::<MouseMoveEvent>(), Some(MouseMoveEvent { x: 10, y: 20 }));
        assert_eq!(pool.newest::<MouseMoveEvent>(), Some(MouseMoveEvent { x: 30, y: 40 }));
    }

    #[test]
    fn distinct_recycles_idle_instances() {
        let mut pool = EventPool::with_policy(CoalescePolicy::Distinct);
        let first = pool.acquire::<MouseMoveEvent>((10, 20));
        drop(first);

        let second = pool.acquire::<MouseMoveEvent>((30, 40));
        assert_eq!(pool.count_of(EventKind::MouseMove), 1);
        assert_eq!(second.get::<MouseMoveEvent>(), Ok(MouseMoveEvent { x: 30, y: 40 }));
    }

    #[test]
    fn get_rejects_the_wrong_type() {
        let mut pool = EventPool::new();
        let slot = pool.acquire::<EndEvent>(7);
        assert_eq!(
            slot.get::<StartEvent>(),
            Err(EventError::KindMismatch {
                expected: EventKind::StateStart,
                found: EventKind::StateEnd,
            })
        );
        assert_eq!(slot.snapshot(), Event::End(EndEvent { placeholder: 7 }));
    }
}
