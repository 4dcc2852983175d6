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

//! The event taxonomy: concrete event kinds, generic categories and the
//! lookup table binding one to the other.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Identifies one specific kind of event, e.g. "mouse moved".
///
/// Declaration order is flush order: a `StateStart` queued in the same cycle
/// as a `StateEnd` is always dispatched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// The renderer was asked to start.
    StateStart,
    /// The renderer was asked to shut down.
    StateEnd,
    /// The cursor moved inside the window's client area.
    MouseMove,
    /// The current frame should be cleared and presented.
    FrameClear,
    /// A new frame began.
    FrameStart,
    /// The queued draw work of a frame should be submitted.
    FrameDraw,
}

impl EventKind {
    /// Every concrete kind, in dispatch order.
    pub const ALL: [EventKind; 6] = [
        EventKind::StateStart,
        EventKind::StateEnd,
        EventKind::MouseMove,
        EventKind::FrameClear,
        EventKind::FrameStart,
        EventKind::FrameDraw,
    ];

    /// Returns the generic category this kind belongs to.
    #[inline]
    pub fn category(self) -> EventCategory {
        taxonomy().category_of(self)
    }

    /// Returns the human-readable name of this kind.
    #[inline]
    pub fn name(self) -> &'static str {
        taxonomy().name_of(self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A broad classification grouping several [`EventKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    /// Wildcard used only when subscribing; no event ever carries it.
    Any,
    /// Renderer lifecycle events.
    State,
    /// Mouse input events.
    Mouse,
    /// Per-frame rendering events.
    Frame,
}

impl EventCategory {
    /// Every category, the wildcard included.
    pub const ALL: [EventCategory; 4] = [
        EventCategory::Any,
        EventCategory::State,
        EventCategory::Mouse,
        EventCategory::Frame,
    ];

    /// Returns `true` for the subscription-only [`EventCategory::Any`].
    #[inline]
    pub fn is_wildcard(self) -> bool {
        self == EventCategory::Any
    }

    /// Returns the human-readable name of this category.
    pub fn name(self) -> &'static str {
        match self {
            EventCategory::Any => "ANY",
            EventCategory::State => "STATE_EVENT",
            EventCategory::Mouse => "MOUSE_EVENT",
            EventCategory::Frame => "FRAME_EVENT",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The static description of one [`EventKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    /// The category the kind belongs to. Never [`EventCategory::Any`].
    pub category: EventCategory,
    /// The human-readable name of the kind.
    pub name: &'static str,
}

/// An inspectable table mapping every [`EventKind`] to its [`KindInfo`].
///
/// The table is built once, on first use, from [`EventKind::ALL`] and is
/// never mutated afterwards. Use [`taxonomy`] to access it.
#[derive(Debug)]
pub struct EventTaxonomy {
    entries: HashMap<EventKind, KindInfo>,
}

impl EventTaxonomy {
    fn build() -> Self {
        let entries: HashMap<EventKind, KindInfo> = EventKind::ALL
            .iter()
            .map(|&kind| (kind, describe(kind)))
            .collect();

        for (kind, info) in &entries {
            assert!(
                !info.category.is_wildcard(),
                "event kind {kind:?} is mapped to the wildcard category"
            );
        }

        log::trace!("Event taxonomy built with {} kinds.", entries.len());
        Self { entries }
    }

    /// Returns the description of `kind`.
    pub fn info(&self, kind: EventKind) -> KindInfo {
        match self.entries.get(&kind) {
            Some(info) => *info,
            // The table is built from `EventKind::ALL`.
            None => unreachable!("event kind {kind:?} missing from the taxonomy"),
        }
    }

    /// Returns the category of `kind`.
    #[inline]
    pub fn category_of(&self, kind: EventKind) -> EventCategory {
        self.info(kind).category
    }

    /// Returns the human-readable name of `kind`.
    #[inline]
    pub fn name_of(&self, kind: EventKind) -> &'static str {
        self.info(kind).name
    }

    /// Returns every kind belonging to `category`, in dispatch order.
    ///
    /// The wildcard category matches every kind.
    pub fn kinds_in(&self, category: EventCategory) -> Vec<EventKind> {
        EventKind::ALL
            .iter()
            .copied()
            .filter(|&kind| category.is_wildcard() || self.category_of(kind) == category)
            .collect()
    }

    /// Returns the number of kinds in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no kind.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn describe(kind: EventKind) -> KindInfo {
    let (category, name) = match kind {
        EventKind::StateStart => (EventCategory::State, "STATE_START_EVENT"),
        EventKind::StateEnd => (EventCategory::State, "STATE_END_EVENT"),
        EventKind::MouseMove => (EventCategory::Mouse, "MOUSE_MOVE_EVENT"),
        EventKind::FrameClear => (EventCategory::Frame, "FRAME_CLEAR_FRAME_EVENT"),
        EventKind::FrameStart => (EventCategory::Frame, "FRAME_START_FRAME_EVENT"),
        EventKind::FrameDraw => (EventCategory::Frame, "FRAME_DRAW_FRAME_EVENT"),
    };
    KindInfo { category, name }
}

/// Returns the process-wide event taxonomy.
pub fn taxonomy() -> &'static EventTaxonomy {
    static TAXONOMY: OnceLock<EventTaxonomy> = OnceLock::new();
    TAXONOMY.get_or_init(EventTaxonomy::build)
}
