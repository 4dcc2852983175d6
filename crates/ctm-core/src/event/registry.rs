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

//! Bookkeeping of which listeners want which events.

use super::kind::{EventCategory, EventKind};
use super::listener::{ConcreteListener, GenericListener, Listener};
use crate::error::EventError;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Weak references to subscribed listeners, keyed by category or kind.
///
/// The registry never keeps a listener alive. Entries whose listener has been
/// dropped are skipped by lookups and pruned on the next mutation.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    generic: HashMap<EventCategory, Vec<Weak<GenericListener>>>,
    concrete: HashMap<EventKind, Vec<Weak<ConcreteListener>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the end of its category's or kind's list.
    pub fn subscribe(&mut self, listener: impl Into<Listener>) {
        self.prune();
        match listener.into() {
            Listener::Generic(listener) => self
                .generic
                .entry(listener.listen_type())
                .or_default()
                .push(Arc::downgrade(&listener)),
            Listener::Concrete(listener) => self
                .concrete
                .entry(listener.listen_kind())
                .or_default()
                .push(Arc::downgrade(&listener)),
        }
    }

    /// Removes every registration of `listener`.
    ///
    /// ## Returns
    /// `false` if the listener was not subscribed.
    pub fn unsubscribe(&mut self, listener: impl Into<Listener>) -> bool {
        let removed = match listener.into() {
            Listener::Generic(listener) => self
                .generic
                .get_mut(&listener.listen_type())
                .is_some_and(|list| remove_all(list, &listener)),
            Listener::Concrete(listener) => self
                .concrete
                .get_mut(&listener.listen_kind())
                .is_some_and(|list| remove_all(list, &listener)),
        };
        self.prune();
        removed
    }

    /// Returns `true` if `listener` is currently registered.
    pub fn is_subscribed(&self, listener: impl Into<Listener>) -> bool {
        match listener.into() {
            Listener::Generic(listener) => self
                .generic
                .get(&listener.listen_type())
                .is_some_and(|list| contains(list, &listener)),
            Listener::Concrete(listener) => self
                .concrete
                .get(&listener.listen_kind())
                .is_some_and(|list| contains(list, &listener)),
        }
    }

    /// Returns the live generic listeners an event of `category` goes to:
    /// the category's own listeners in subscription order, then the wildcard
    /// listeners.
    ///
    /// ## Errors
    /// [`EventError::WildcardDispatch`] if `category` is the wildcard, since
    /// no event belongs to it.
    pub fn generic_for(
        &self,
        category: EventCategory,
    ) -> Result<Vec<Arc<GenericListener>>, EventError> {
        if category.is_wildcard() {
            return Err(EventError::WildcardDispatch);
        }
        Ok([category, EventCategory::Any]
            .iter()
            .filter_map(|c| self.generic.get(c))
            .flatten()
            .filter_map(Weak::upgrade)
            .collect())
    }

    /// Returns the live concrete listeners of `kind` in subscription order.
    pub fn concrete_for(&self, kind: EventKind) -> Vec<Arc<ConcreteListener>> {
        self.concrete
            .get(&kind)
            .map(|list| list.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// Number of live generic listeners registered under `category` itself.
    pub fn generic_count(&self, category: EventCategory) -> usize {
        self.generic.get(&category).map_or(0, |list| live(list))
    }

    /// Number of live concrete listeners registered under `kind`.
    pub fn concrete_count(&self, kind: EventKind) -> usize {
        self.concrete.get(&kind).map_or(0, |list| live(list))
    }

    /// Drops registrations whose listener no longer exists.
    pub fn prune(&mut self) {
        self.generic.retain(|_, list| {
            list.retain(|weak| weak.strong_count() > 0);
            !list.is_empty()
        });
        self.concrete.retain(|_, list| {
            list.retain(|weak| weak.strong_count() > 0);
            !list.is_empty()
        });
    }
}

fn remove_all<T>(list: &mut Vec<Weak<T>>, target: &Arc<T>) -> bool {
    let before = list.len();
    let target = Arc::downgrade(target);
    list.retain(|weak| !weak.ptr_eq(&target));
    list.len() != before
}

fn contains<T>(list: &[Weak<T>], target: &Arc<T>) -> bool {
    let target = Arc::downgrade(target);
    list.iter().any(|weak| weak.ptr_eq(&target))
}

fn live<T>(list: &[Weak<T>]) -> usize {
    list.iter().filter(|weak| weak.strong_count() > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseMoveEvent, StartEvent};

    fn generic(category: EventCategory) -> Arc<GenericListener> {
        Arc::new(GenericListener::new(category, |_| {}))
    }

    #[test]
    fn lookups_put_the_category_before_the_wildcard() {
        let mut registry = ListenerRegistry::new();
        let any = generic(EventCategory::Any);
        let state_a = generic(EventCategory::State);
        let state_b = generic(EventCategory::State);
        registry.subscribe(&any);
        registry.subscribe(&state_a);
        registry.subscribe(&state_b);

        let found = registry.generic_for(EventCategory::State).unwrap();
        assert_eq!(found.len(), 3);
        assert!(Arc::ptr_eq(&found[0], &state_a));
        assert!(Arc::ptr_eq(&found[1], &state_b));
        assert!(Arc::ptr_eq(&found[2], &any));

        let mouse = registry.generic_for(EventCategory::Mouse).unwrap();
        assert_eq!(mouse.len(), 1);
        assert!(Arc::ptr_eq(&mouse[0], &any));
    }

    #[test]
    fn wildcard_lookup_is_an_error() {
        let registry = ListenerRegistry::new();
        assert_eq!(
            registry.generic_for(EventCategory::Any).unwrap_err(),
            EventError::WildcardDispatch
        );
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut registry = ListenerRegistry::new();
        let listener = generic(EventCategory::Mouse);
        registry.subscribe(&listener);
        assert!(registry.is_subscribed(&listener));

        assert!(registry.unsubscribe(&listener));
        assert!(!registry.unsubscribe(&listener));
        assert!(!registry.is_subscribed(&listener));
        assert_eq!(registry.generic_count(EventCategory::Mouse), 0);
    }

    #[test]
    fn unsubscribe_removes_duplicate_registrations() {
        let mut registry = ListenerRegistry::new();
        let listener = Arc::new(ConcreteListener::new::<StartEvent, _>(|_| {}));
        registry.subscribe(&listener);
        registry.subscribe(&listener);
        assert_eq!(registry.concrete_count(EventKind::StateStart), 2);

        assert!(registry.unsubscribe(&listener));
        assert_eq!(registry.concrete_count(EventKind::StateStart), 0);
    }

    #[test]
    fn dropped_listeners_are_skipped_and_pruned() {
        let mut registry = ListenerRegistry::new();
        let kept = Arc::new(ConcreteListener::new::<MouseMoveEvent, _>(|_| {}));
        let dropped = Arc::new(ConcreteListener::new::<MouseMoveEvent, _>(|_| {}));
        registry.subscribe(&kept);
        registry.subscribe(&dropped);
        drop(dropped);

        let found = registry.concrete_for(EventKind::MouseMove);
        assert_eq!(found.len(), 1);
        assert!(Arc::ptr_eq(&found[0], &kept));

        registry.prune();
        assert_eq!(registry.concrete_count(EventKind::MouseMove), 1);
        assert!(registry.concrete_for(EventKind::StateEnd).is_empty());
    }
}
