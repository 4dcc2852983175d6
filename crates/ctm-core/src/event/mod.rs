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

//! Typed events and their queued dispatch.
//!
//! Every event has a concrete [`EventKind`], and every kind belongs to one
//! [`EventCategory`]. Events are recycled through an [`EventPool`], queued per
//! kind by the [`EventDispatcher`] and fanned out on flush to
//! [`GenericListener`]s (by category, or every category through
//! [`EventCategory::Any`]) and [`ConcreteListener`]s (by kind).

mod dispatcher;
mod kind;
mod listener;
mod pool;
mod registry;
mod types;

pub use self::dispatcher::{DispatchReport, EventDispatcher};
pub use self::kind::{taxonomy, EventCategory, EventKind, EventTaxonomy, KindInfo};
pub use self::listener::{ConcreteListener, GenericListener, Listener};
pub use self::pool::{CoalescePolicy, EventPool, PooledEvent};
pub use self::registry::ListenerRegistry;
pub use self::types::{
    ClearFrameEvent, ConcreteEvent, DrawFrameEvent, EndEvent, Event, MouseMoveEvent, Recycle,
    StartEvent, StartFrameEvent,
};
