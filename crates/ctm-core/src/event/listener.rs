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

//! Listener handles: callbacks bound to a category or to a single kind.

use super::kind::{EventCategory, EventKind};
use super::types::{ConcreteEvent, Event};
use std::fmt;
use std::sync::Arc;

type Callback = Box<dyn Fn(&Event) + Send + Sync>;

/// A callback interested in every event of one category.
///
/// A listener built for [`EventCategory::Any`] receives every event.
pub struct GenericListener {
    category: EventCategory,
    callback: Callback,
}

impl GenericListener {
    /// Creates a listener for `category`.
    pub fn new<F>(category: EventCategory, callback: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Self {
            category,
            callback: Box::new(callback),
        }
    }

    /// Returns the category this listener was built for.
    #[inline]
    pub fn listen_type(&self) -> EventCategory {
        self.category
    }

    /// Invokes the callback.
    ///
    /// # Panics
    /// If the event's category is neither the listener's category nor the
    /// listener is a wildcard. The dispatcher never routes such events here.
    pub fn notify(&self, event: &Event) {
        assert!(
            self.category.is_wildcard() || self.category == event.category(),
            "{} routed to a {} listener",
            event.name(),
            self.category
        );
        (self.callback)(event);
    }
}

impl fmt::Debug for GenericListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericListener")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// A callback interested in exactly one event kind, receiving its payload.
pub struct ConcreteListener {
    kind: EventKind,
    callback: Callback,
}

impl ConcreteListener {
    /// Creates a listener for `E`'s kind. The callback receives the payload.
    pub fn new<E, F>(callback: F) -> Self
    where
        E: ConcreteEvent,
        F: Fn(&E) + Send + Sync + 'static,
    {
        Self {
            kind: E::KIND,
            callback: Box::new(move |event: &Event| {
                if let Some(payload) = E::from_event(event) {
                    callback(payload);
                }
            }),
        }
    }

    /// Returns the kind this listener was built for.
    #[inline]
    pub fn listen_kind(&self) -> EventKind {
        self.kind
    }

    /// Invokes the callback.
    ///
    /// # Panics
    /// If the event is of another kind.
    pub fn notify(&self, event: &Event) {
        assert_eq!(
            self.kind,
            event.kind(),
            "{} routed to a {} listener",
            event.name(),
            self.kind
        );
        (self.callback)(event);
    }
}

impl fmt::Debug for ConcreteListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteListener")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Either flavor of listener, as held by the caller who subscribed it.
///
/// The registry only keeps weak references: a listener stays subscribed for
/// as long as the caller keeps its `Arc` alive.
#[derive(Debug, Clone)]
pub enum Listener {
    /// A category listener.
    Generic(Arc<GenericListener>),
    /// A kind listener.
    Concrete(Arc<ConcreteListener>),
}

impl From<Arc<GenericListener>> for Listener {
    fn from(listener: Arc<GenericListener>) -> Self {
        Listener::Generic(listener)
    }
}

impl From<&Arc<GenericListener>> for Listener {
    fn from(listener: &Arc<GenericListener>) -> Self {
        Listener::Generic(Arc::clone(listener))
    }
}

impl From<Arc<ConcreteListener>> for Listener {
    fn from(listener: Arc<ConcreteListener>) -> Self {
        Listener::Concrete(listener)
    }
}

impl From<&Arc<ConcreteListener>> for Listener {
    fn from(listener: &Arc<ConcreteListener>) -> Self {
        Listener::Concrete(Arc::clone(listener))
    }
}
