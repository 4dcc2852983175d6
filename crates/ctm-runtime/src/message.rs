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

//! Platform messages and their translation into queued events.

use ctm_core::event::{EndEvent, EventDispatcher, MouseMoveEvent};

/// Placeholder carried by the end event queued when the window is closed.
pub const WINDOW_QUIT_CODE: u32 = 1738;

/// A message from the platform window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// The cursor moved inside the client area.
    MouseMove {
        /// Horizontal position.
        x: u32,
        /// Vertical position.
        y: u32,
    },
    /// The window was closed.
    Quit,
}

/// Where the frame loop gets platform messages from.
///
/// Every method is called from the frame loop thread only.
pub trait MessageSource: Send + 'static {
    /// Opens the window. Called when the renderer handles its start event.
    /// No message is pumped before this ran.
    fn start(&mut self);

    /// Translates pending messages into events queued on `dispatcher`.
    /// Called once per frame after the renderer started.
    ///
    /// ## Arguments
    /// * `dispatcher` - The loop's dispatcher, flushed right after the pump.
    ///
    /// ## Returns
    /// The number of messages handled.
    fn pump(&mut self, dispatcher: &EventDispatcher) -> usize;
}

/// Queues the event matching `message`.
///
/// ## Arguments
/// * `message` - The window message to translate.
/// * `dispatcher` - Where the matching event is queued.
///
/// ## Returns
/// `true` if the message asks the loop to stop reading messages.
pub fn translate(message: WindowMessage, dispatcher: &EventDispatcher) -> bool {
    match message {
        WindowMessage::MouseMove { x, y } => {
            dispatcher.queue_event::<MouseMoveEvent>((x, y));
            false
        }
        WindowMessage::Quit => {
            log::debug!("Window closed, queueing end event.");
            dispatcher.queue_event::<EndEvent>(WINDOW_QUIT_CODE);
            true
        }
    }
}

/// A headless message source fed through a [`MessagePoster`].
#[derive(Debug)]
pub struct ChannelMessageSource {
    receiver: flume::Receiver<WindowMessage>,
    started: bool,
}

impl ChannelMessageSource {
    /// Creates a source and the poster feeding it.
    ///
    /// ## Returns
    /// The source, to hand to the renderer, and a poster that can be cloned
    /// and moved to other threads.
    pub fn new() -> (Self, MessagePoster) {
        let (sender, receiver) = flume::unbounded();
        (
            Self {
                receiver,
                started: false,
            },
            MessagePoster { sender },
        )
    }

    /// ## Returns
    /// `true` once [`MessageSource::start`] ran.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl MessageSource for ChannelMessageSource {
    fn start(&mut self) {
        self.started = true;
        log::info!("Headless message source started.");
    }

    fn pump(&mut self, dispatcher: &EventDispatcher) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.receiver.try_recv() {
            handled += 1;
            if translate(message, dispatcher) {
                break;
            }
        }
        handled
    }
}

/// Posts window messages to a [`ChannelMessageSource`] from any thread.
#[derive(Debug, Clone)]
pub struct MessagePoster {
    sender: flume::Sender<WindowMessage>,
}

impl MessagePoster {
    /// Posts a message.
    ///
    /// ## Arguments
    /// * `message` - The message, delivered on the source's next pump.
    ///
    /// ## Returns
    /// `false` if the source was dropped.
    pub fn post(&self, message: WindowMessage) -> bool {
        if let Err(e) = self.sender.send(message) {
            log::warn!("Failed to post {:?}: source disconnected.", e.into_inner());
            return false;
        }
        true
    }

    /// Posts a cursor move.
    ///
    /// ## Arguments
    /// * `x` - Horizontal cursor position.
    /// * `y` - Vertical cursor position.
    ///
    /// ## Returns
    /// `false` if the source was dropped.
    pub fn mouse_move(&self, x: u32, y: u32) -> bool {
        self.post(WindowMessage::MouseMove { x, y })
    }

    /// Posts a window close. The loop stops after handling it.
    ///
    /// ## Returns
    /// `false` if the source was dropped.
    pub fn quit(&self) -> bool {
        self.post(WindowMessage::Quit)
    }
}
