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

//! The concrete event payloads and the [`Event`] sum type carrying them.

use super::kind::{EventCategory, EventKind};
use crate::error::EventError;
use std::fmt;

/// A payload that can be created once and then refreshed in place.
///
/// The pool calls [`Recycle::create`] the first time a kind is requested and
/// [`Recycle::update`] on every later request, passing the same arguments.
pub trait Recycle: Sized {
    /// The payload arguments, shared by creation and update.
    type Args;

    /// Builds a fresh payload.
    fn create(args: Self::Args) -> Self;

    /// Overwrites the payload of a recycled instance.
    fn update(&mut self, args: Self::Args);
}

/// A payload type bound to exactly one [`EventKind`].
pub trait ConcreteEvent: Recycle + Clone + fmt::Debug + Send + Sync + 'static {
    /// The kind every value of this type carries.
    const KIND: EventKind;

    /// Wraps the payload into an [`Event`].
    fn into_event(self) -> Event;

    /// Returns the payload if `event` is of this type.
    fn from_event(event: &Event) -> Option<&Self>;

    /// Returns the payload mutably if `event` is of this type.
    fn from_event_mut(event: &mut Event) -> Option<&mut Self>;

    /// Returns the category of this type's kind.
    #[inline]
    fn category() -> EventCategory {
        Self::KIND.category()
    }
}

/// Asks the renderer to start. The payload is a placeholder counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartEvent {
    /// Opaque value forwarded from the caller.
    pub placeholder: u32,
}

impl Recycle for StartEvent {
    type Args = u32;

    fn create(placeholder: u32) -> Self {
        Self { placeholder }
    }

    fn update(&mut self, placeholder: u32) {
        self.placeholder = placeholder;
    }
}

/// Asks the renderer to shut down. The payload is a placeholder counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndEvent {
    /// Opaque value forwarded from the caller.
    pub placeholder: u32,
}

impl Recycle for EndEvent {
    type Args = u32;

    fn create(placeholder: u32) -> Self {
        Self { placeholder }
    }

    fn update(&mut self, placeholder: u32) {
        self.placeholder = placeholder;
    }
}

/// The cursor moved to a new position in client-area coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseMoveEvent {
    /// Horizontal position.
    pub x: u32,
    /// Vertical position.
    pub y: u32,
}

impl Recycle for MouseMoveEvent {
    type Args = (u32, u32);

    fn create((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }

    fn update(&mut self, (x, y): (u32, u32)) {
        self.x = x;
        self.y = y;
    }
}

/// Clear the back buffer and present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearFrameEvent;

/// A frame began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartFrameEvent;

/// The queued draw work of the frame should be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawFrameEvent;

macro_rules! impl_unit_recycle {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Recycle for $ty {
                type Args = ();

                fn create(_: ()) -> Self {
                    $ty
                }

                fn update(&mut self, _: ()) {}
            }
        )*
    };
}

impl_unit_recycle!(ClearFrameEvent, StartFrameEvent, DrawFrameEvent);

/// A dispatched event: one variant per [`EventKind`].
///
/// There is no variant for [`EventCategory::Any`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// See [`StartEvent`].
    Start(StartEvent),
    /// See [`EndEvent`].
    End(EndEvent),
    /// See [`MouseMoveEvent`].
    MouseMove(MouseMoveEvent),
    /// See [`ClearFrameEvent`].
    ClearFrame(ClearFrameEvent),
    /// See [`StartFrameEvent`].
    StartFrame(StartFrameEvent),
    /// See [`DrawFrameEvent`].
    DrawFrame(DrawFrameEvent),
}

macro_rules! impl_concrete_event {
    ($($ty:ident => $variant:ident, $kind:expr;)*) => {
        $(
            impl ConcreteEvent for $ty {
                const KIND: EventKind = $kind;

                #[inline]
                fn into_event(self) -> Event {
                    Event::$variant(self)
                }

                #[inline]
                fn from_event(event: &Event) -> Option<&Self> {
                    match event {
                        Event::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                #[inline]
                fn from_event_mut(event: &mut Event) -> Option<&mut Self> {
                    match event {
                        Event::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Event {
                fn from(inner: $ty) -> Self {
                    Event::$variant(inner)
                }
            }
        )*

        impl Event {
            /// Returns the concrete kind of this event.
            pub fn kind(&self) -> EventKind {
                match self {
                    $(Event::$variant(_) => $kind,)*
                }
            }
        }
    };
}

impl_concrete_event! {
    StartEvent => Start, EventKind::StateStart;
    EndEvent => End, EventKind::StateEnd;
    MouseMoveEvent => MouseMove, EventKind::MouseMove;
    ClearFrameEvent => ClearFrame, EventKind::FrameClear;
    StartFrameEvent => StartFrame, EventKind::FrameStart;
    DrawFrameEvent => DrawFrame, EventKind::FrameDraw;
}

impl Event {
    /// Returns the generic category of this event. Never [`EventCategory::Any`].
    #[inline]
    pub fn category(&self) -> EventCategory {
        self.kind().category()
    }

    /// Returns the human-readable name of this event's kind.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns `true` if this event carries an `E` payload.
    #[inline]
    pub fn is<E: ConcreteEvent>(&self) -> bool {
        E::from_event(self).is_some()
    }

    /// Returns the `E` payload, or `None` if this event is of another kind.
    #[inline]
    pub fn downcast_ref<E: ConcreteEvent>(&self) -> Option<&E> {
        E::from_event(self)
    }

    /// Reads this event as an `E` payload.
    ///
    /// ## Errors
    /// [`EventError::KindMismatch`] if the event is of another kind.
    pub fn cast<E: ConcreteEvent>(&self) -> Result<&E, EventError> {
        E::from_event(self).ok_or(EventError::KindMismatch {
            expected: E::KIND,
            found: self.kind(),
        })
    }

    /// Mutable counterpart of [`Event::cast`].
    pub fn cast_mut<E: ConcreteEvent>(&mut self) -> Result<&mut E, EventError> {
        let found = self.kind();
        E::from_event_mut(self).ok_or(EventError::KindMismatch {
            expected: E::KIND,
            found,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Start(e) => write!(f, "{} ({})", self.name(), e.placeholder),
            Event::End(e) => write!(f, "{} ({})", self.name(), e.placeholder),
            Event::MouseMove(e) => write!(f, "{} ({}, {})", self.name(), e.x, e.y),
            _ => f.write_str(self.name()),
        }
    }
}
