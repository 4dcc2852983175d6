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

//! Defines the error types returned at the boundaries of the event system.

use crate::event::{EventCategory, EventKind};
use std::fmt;

/// An error raised when an event is used as something it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// An event was read as a concrete type whose kind differs from its own.
    KindMismatch {
        /// The kind the caller asked for.
        expected: EventKind,
        /// The kind the event actually carries.
        found: EventKind,
    },
    /// Listeners were requested for the subscription-only wildcard category,
    /// as if an event could belong to it.
    WildcardDispatch,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::KindMismatch { expected, found } => {
                write!(f, "Event kind mismatch: expected {expected}, found {found}")
            }
            EventError::WildcardDispatch => {
                write!(
                    f,
                    "No event belongs to the {} category; it is only used for subscriptions",
                    EventCategory::Any
                )
            }
        }
    }
}

impl std::error::Error for EventError {}
