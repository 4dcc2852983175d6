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

//! The queued event dispatcher.

use super::kind::{EventCategory, EventKind};
use super::listener::Listener;
use super::pool::{CoalescePolicy, EventPool, PooledEvent};
use super::registry::ListenerRegistry;
use super::types::{ConcreteEvent, Event};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Queues = BTreeMap<EventKind, VecDeque<PooledEvent>>;

/// What a call to [`EventDispatcher::dispatch_queued`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Kinds whose queues were flushed, in flush order.
    pub kinds: Vec<EventKind>,
    /// Number of listener callbacks invoked.
    pub notifications: usize,
    /// `true` if the flush stopped after an end event, leaving later kinds
    /// queued.
    pub halted_on_end: bool,
}

impl DispatchReport {
    /// Returns `true` if nothing was dispatched.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Queues events per kind and fans them out to subscribed listeners.
///
/// Producers on any thread call [`EventDispatcher::queue_event`]; one
/// consumer (usually the frame loop) calls
/// [`EventDispatcher::dispatch_queued`]. Listener callbacks run with no
/// internal lock held, so they may queue events or (un)subscribe.
#[derive(Debug)]
pub struct EventDispatcher {
    pool: Mutex<EventPool>,
    queues: Mutex<Queues>,
    queued: AtomicBool,
    registry: Mutex<ListenerRegistry>,
}

impl EventDispatcher {
    /// Creates a dispatcher whose pool uses [`CoalescePolicy::LatestWins`].
    pub fn new() -> Self {
        Self::with_policy(CoalescePolicy::default())
    }

    /// Creates a dispatcher whose pool uses `policy`.
    pub fn with_policy(policy: CoalescePolicy) -> Self {
        log::info!("EventDispatcher initialized ({policy:?}).");
        Self {
            pool: Mutex::new(EventPool::with_policy(policy)),
            queues: Mutex::new(Queues::new()),
            queued: AtomicBool::new(false),
            registry: Mutex::new(ListenerRegistry::new()),
        }
    }

    /// Returns the pool's recycling policy.
    pub fn policy(&self) -> CoalescePolicy {
        lock(&self.pool).policy()
    }

    /// Acquires an `E` from the pool and queues it for the next flush.
    ///
    /// An instance that is still waiting in its queue is refreshed rather
    /// than queued a second time.
    ///
    /// ## Arguments
    /// * `args` - The payload arguments, forwarded to the pool.
    pub fn queue_event<E: ConcreteEvent>(&self, args: E::Args) {
        let mut pool = lock(&self.pool);
        let slot = pool.acquire::<E>(args);

        let mut queues = lock(&self.queues);
        let queue = queues.entry(E::KIND).or_default();
        if !queue.iter().any(|queued| queued.ptr_eq(&slot)) {
            queue.push_back(slot);
        }
        self.queued.store(true, Ordering::Release);
        log::trace!("Queued {} ({} waiting).", E::KIND, queue.len());
    }

    /// Returns `true` if events are waiting for the next flush.
    #[inline]
    pub fn is_event_queued(&self) -> bool {
        self.queued.load(Ordering::Acquire)
    }

    /// Number of events waiting across all kinds.
    pub fn pending_count(&self) -> usize {
        lock(&self.queues).values().map(VecDeque::len).sum()
    }

    /// Flushes the queues.
    ///
    /// Kinds are flushed in declaration order, each from oldest to newest.
    /// Every event goes to the generic listeners of its category, then to the
    /// wildcard listeners, then to the concrete listeners of its kind. Once
    /// an end event has been dispatched the call returns: the events after
    /// it stay queued, ahead of anything queued meanwhile.
    pub fn dispatch_queued(&self) -> DispatchReport {
        let drained = {
            let mut queues = lock(&self.queues);
            self.queued.store(false, Ordering::Release);
            std::mem::take(&mut *queues)
        };

        let mut report = DispatchReport::default();
        let mut pending = drained.into_iter();
        while let Some((kind, mut events)) = pending.next() {
            report.kinds.push(kind);
            while let Some(slot) = events.pop_front() {
                report.notifications += self.notify(&slot.snapshot());
                if kind == EventKind::StateEnd {
                    report.halted_on_end = true;
                    break;
                }
            }

            if report.halted_on_end {
                let unsent = (!events.is_empty()).then_some((kind, events));
                self.requeue(unsent.into_iter().chain(pending));
                break;
            }
        }

        if !report.is_empty() {
            log::debug!(
                "Dispatched {:?}: {} notifications{}.",
                report.kinds,
                report.notifications,
                if report.halted_on_end { ", halted on end" } else { "" }
            );
        }
        report
    }

    /// Returns the payload of the oldest pooled `E`, if one was ever queued.
    pub fn oldest_event<E: ConcreteEvent>(&self) -> Option<E> {
        lock(&self.pool).oldest::<E>()
    }

    /// Returns the payload of the newest pooled `E`, if one was ever queued.
    pub fn newest_event<E: ConcreteEvent>(&self) -> Option<E> {
        lock(&self.pool).newest::<E>()
    }

    /// Number of instances the pool holds for `kind`.
    pub fn pooled_count(&self, kind: EventKind) -> usize {
        lock(&self.pool).count_of(kind)
    }

    /// Registers a listener. See [`ListenerRegistry::subscribe`].
    pub fn subscribe(&self, listener: impl Into<Listener>) {
        lock(&self.registry).subscribe(listener);
    }

    /// Unregisters a listener.
    ///
    /// ## Returns
    /// `false` if the listener was not subscribed.
    pub fn unsubscribe(&self, listener: impl Into<Listener>) -> bool {
        lock(&self.registry).unsubscribe(listener)
    }

    /// Returns `true` if `listener` is registered.
    pub fn is_subscribed(&self, listener: impl Into<Listener>) -> bool {
        lock(&self.registry).is_subscribed(listener)
    }

    /// Number of live generic listeners registered under `category` itself.
    pub fn generic_listener_count(&self, category: EventCategory) -> usize {
        lock(&self.registry).generic_count(category)
    }

    /// Number of live concrete listeners registered under `kind`.
    pub fn concrete_listener_count(&self, kind: EventKind) -> usize {
        lock(&self.registry).concrete_count(kind)
    }

    fn notify(&self, event: &Event) -> usize {
        let (generic, concrete) = {
            let registry = lock(&self.registry);
            let generic = match registry.generic_for(event.category()) {
                Ok(listeners) => listeners,
                Err(e) => panic!("cannot route {}: {e}", event.name()),
            };
            (generic, registry.concrete_for(event.kind()))
        };

        log::debug!(
            "Dispatching {event} to {} generic and {} concrete listeners.",
            generic.len(),
            concrete.len()
        );
        for listener in &generic {
            listener.notify(event);
        }
        for listener in &concrete {
            listener.notify(event);
        }
        generic.len() + concrete.len()
    }

    /// Puts undispatched kinds back in front of events queued since the drain.
    fn requeue(&self, rest: impl Iterator<Item = (EventKind, VecDeque<PooledEvent>)>) {
        let mut queues = lock(&self.queues);
        for (kind, mut events) in rest {
            if let Some(newer) = queues.remove(&kind) {
                for slot in newer {
                    if !events.iter().any(|queued| queued.ptr_eq(&slot)) {
                        events.push_back(slot);
                    }
                }
            }
            queues.insert(kind, events);
        }
        if !queues.is_empty() {
            self.queued.store(true, Ordering::Release);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
