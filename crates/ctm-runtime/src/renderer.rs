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

//! The renderer facade owning the frame loop thread.

use crate::backend::{GraphicsBackend, HeadlessBackend, HeadlessStats};
use crate::config::RendererSettings;
use crate::draw::Shape;
use crate::error::RendererError;
use crate::frame_loop::{
    lock, run_frame_loop, LoopShared, LoopState, SharedBackend, SharedSource, HANDSHAKE_POLL,
};
use crate::message::{ChannelMessageSource, MessagePoster, MessageSource};
use crate::timer::FramePacer;
use ctm_core::event::{ClearFrameEvent, EndEvent, EventDispatcher, StartEvent};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Placeholder carried by the start event queued by [`Renderer::start`].
pub const START_PLACEHOLDER: u32 = 1738;

/// Placeholder carried by the end event queued by [`Renderer::shutdown`].
pub const SHUTDOWN_PLACEHOLDER: u32 = 1738;

type LoopHandle = JoinHandle<Result<(), RendererError>>;

/// Drives a graphics backend from a dedicated frame loop thread.
///
/// The owner starts the loop, feeds it through the dispatcher, the draw queue
/// and the message source, then shuts it down and joins it. Dropping a
/// running renderer does both.
pub struct Renderer {
    settings: RendererSettings,
    shared: Arc<LoopShared>,
    parts: Option<(SharedBackend, SharedSource)>,
    handle: Option<LoopHandle>,
    joined: bool,
}

impl Renderer {
    /// Creates a renderer around `backend` and `source`.
    ///
    /// ## Errors
    /// [`RendererError::Config`] if `settings` do not validate.
    pub fn new(
        settings: RendererSettings,
        backend: impl GraphicsBackend,
        source: impl MessageSource,
    ) -> Result<Self, RendererError> {
        settings.validate()?;
        let dispatcher = EventDispatcher::with_policy(settings.coalesce_policy);
        let backend: Box<dyn GraphicsBackend> = Box::new(backend);
        let source: Box<dyn MessageSource> = Box::new(source);

        Ok(Self {
            settings,
            shared: Arc::new(LoopShared::new(dispatcher)),
            parts: Some((Arc::new(Mutex::new(backend)), Arc::new(Mutex::new(source)))),
            handle: None,
            joined: false,
        })
    }

    /// Creates a renderer over a [`HeadlessBackend`] and a
    /// [`ChannelMessageSource`].
    ///
    /// ## Returns
    /// The renderer, the backend's counters and the poster feeding the
    /// message source.
    pub fn headless(
        settings: RendererSettings,
    ) -> Result<(Self, Arc<HeadlessStats>, MessagePoster), RendererError> {
        let backend = HeadlessBackend::new();
        let stats = backend.stats();
        let (source, poster) = ChannelMessageSource::new();
        let renderer = Self::new(settings, backend, source)?;
        Ok((renderer, stats, poster))
    }

    /// Spawns the frame loop and queues the start event.
    ///
    /// Returns once the loop has subscribed its listener, so events queued
    /// afterwards are never missed.
    ///
    /// ## Errors
    /// * [`RendererError::AlreadyStarted`] on a second call.
    /// * [`RendererError::ThreadSpawn`] if the thread could not be created.
    /// * [`RendererError::LoopPanicked`] if the loop died before signalling.
    ///
    /// A failed start consumes the backend and message source, so the
    /// renderer is left [`LoopState::Joined`] and cannot be started again.
    pub fn start(&mut self) -> Result<(), RendererError> {
        let (backend, source) = self.parts.take().ok_or(RendererError::AlreadyStarted)?;
        let shared = Arc::clone(&self.shared);
        let pacer = FramePacer::from_settings(&self.settings);

        let handle = match thread::Builder::new()
            .name(self.settings.thread_name.clone())
            .spawn(move || run_frame_loop(shared, backend, source, pacer))
        {
            Ok(handle) => handle,
            Err(err) => return Err(self.abandon_start(RendererError::ThreadSpawn(err))),
        };

        let mut guard = lock(&self.shared.handshake);
        while !self.shared.loop_started() {
            if handle.is_finished() {
                drop(guard);
                let err = match handle.join() {
                    Ok(Err(e)) => e,
                    _ => RendererError::LoopPanicked,
                };
                return Err(self.abandon_start(err));
            }
            guard = match self.shared.loop_started_cv.wait_timeout(guard, HANDSHAKE_POLL) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        drop(guard);
        self.handle = Some(handle);

        self.shared
            .dispatcher
            .queue_event::<StartEvent>(START_PLACEHOLDER);
        log::info!("Renderer '{}' starting.", self.settings.thread_name);
        Ok(())
    }

    /// Queues the end event. The loop stops once it handles it.
    pub fn shutdown(&self) -> Result<(), RendererError> {
        self.ensure_running()?;
        self.shared
            .dispatcher
            .queue_event::<EndEvent>(SHUTDOWN_PLACEHOLDER);
        Ok(())
    }

    /// Queues a clear of the frame.
    pub fn clear_screen(&self) -> Result<(), RendererError> {
        self.ensure_running()?;
        self.shared.dispatcher.queue_event::<ClearFrameEvent>(());
        Ok(())
    }

    /// Queues a shape for the next frame.
    pub fn submit_shape(&self, shape: impl Into<Shape>) -> Result<(), RendererError> {
        self.ensure_running()?;
        lock(&self.shared.draw_queue).push(shape);
        Ok(())
    }

    /// Blocks until the loop thread exits, then joins it.
    ///
    /// Call after [`Renderer::shutdown`] or once a quit message was posted;
    /// otherwise this waits for as long as the loop runs. Joining an already
    /// joined renderer is a no-op.
    ///
    /// ## Errors
    /// * [`RendererError::NotStarted`] if the loop was never started.
    /// * [`RendererError::LoopPanicked`] if the loop thread panicked.
    /// * [`RendererError::Backend`] if a backend failure stopped the loop.
    pub fn join_for_shutdown(&mut self) -> Result<(), RendererError> {
        let Some(handle) = self.handle.take() else {
            return if self.joined {
                Ok(())
            } else {
                Err(RendererError::NotStarted)
            };
        };
        let result = handle.join().unwrap_or(Err(RendererError::LoopPanicked));
        self.joined = true;
        log::info!("Renderer '{}' joined.", self.settings.thread_name);
        result
    }

    /// Returns `true` between [`Renderer::start`] and the end of the loop.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.shared.should_run()
    }

    /// Returns the loop's lifecycle state.
    pub fn state(&self) -> LoopState {
        if self.joined {
            LoopState::Joined
        } else if self.handle.is_none() {
            LoopState::Created
        } else if !self.shared.should_run() {
            LoopState::Stopping
        } else if self.shared.renderer_started() {
            LoopState::Running
        } else {
            LoopState::Starting
        }
    }

    /// Returns the dispatcher the loop flushes every frame.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.shared.dispatcher
    }

    /// Returns the settings the renderer was created with.
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Number of frames the loop completed.
    pub fn frame_count(&self) -> u64 {
        self.shared.frame_count.load(Ordering::Relaxed)
    }

    /// Last cursor position handled by the loop, if the cursor ever moved.
    pub fn cursor_position(&self) -> Option<(u32, u32)> {
        *lock(&self.shared.cursor)
    }

    /// Marks a start that never produced a running loop as finished.
    fn abandon_start(&mut self, err: RendererError) -> RendererError {
        self.joined = true;
        log::error!("Renderer '{}' failed to start: {err}", self.settings.thread_name);
        err
    }

    fn ensure_running(&self) -> Result<(), RendererError> {
        match self.state() {
            LoopState::Created => Err(RendererError::NotStarted),
            LoopState::Starting | LoopState::Running => Ok(()),
            LoopState::Stopping | LoopState::Joined => Err(RendererError::NotRunning),
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .field("frame_count", &self.frame_count())
            .finish_non_exhaustive()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        if self.is_running() {
            self.shared
                .dispatcher
                .queue_event::<EndEvent>(SHUTDOWN_PLACEHOLDER);
        }
        if let Err(e) = self.join_for_shutdown() {
            log::error!("Renderer stopped with an error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctm_core::event::EventCategory;

    fn fast() -> RendererSettings {
        RendererSettings {
            target_fps: 500,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = RendererSettings {
            target_fps: 0,
            ..Default::default()
        };
        let err = Renderer::headless(settings).unwrap_err();
        assert!(matches!(err, RendererError::Config(_)));
    }

    #[test]
    fn misuse_before_start() {
        let (mut renderer, _, _) = Renderer::headless(fast()).unwrap();
        assert_eq!(renderer.state(), LoopState::Created);
        assert!(!renderer.is_running());
        assert!(matches!(renderer.shutdown(), Err(RendererError::NotStarted)));
        assert!(matches!(renderer.clear_screen(), Err(RendererError::NotStarted)));
        assert!(matches!(
            renderer.join_for_shutdown(),
            Err(RendererError::NotStarted)
        ));
    }

    #[test]
    fn start_twice_fails() {
        let (mut renderer, _, _) = Renderer::headless(fast()).unwrap();
        renderer.start().unwrap();
        assert!(matches!(renderer.start(), Err(RendererError::AlreadyStarted)));
        assert_eq!(
            renderer.dispatcher().generic_listener_count(EventCategory::Any),
            1
        );

        renderer.shutdown().unwrap();
        renderer.join_for_shutdown().unwrap();
        assert_eq!(renderer.state(), LoopState::Joined);
        assert!(matches!(renderer.start(), Err(RendererError::AlreadyStarted)));
        assert!(matches!(renderer.shutdown(), Err(RendererError::NotRunning)));
        assert!(renderer.join_for_shutdown().is_ok());
    }

    #[test]
    fn drop_stops_a_running_loop() {
        let (mut renderer, stats, _) = Renderer::headless(fast()).unwrap();
        renderer.start().unwrap();
        drop(renderer);
        assert!(stats.is_shut_down());
    }

    #[test]
    fn backend_failure_surfaces_on_join() {
        let (source, _poster) = ChannelMessageSource::new();
        let mut renderer = Renderer::new(fast(), HeadlessBackend::failing_init(), source).unwrap();
        renderer.start().unwrap();

        let err = renderer.join_for_shutdown().unwrap_err();
        assert!(matches!(err, RendererError::Backend(_)));
        assert!(!renderer.is_running());
    }

    #[test]
    fn failed_spawn_leaves_the_renderer_joined() {
        let (mut renderer, _, _) = Renderer::headless(fast()).unwrap();
        renderer.parts.take();
        let err = renderer.abandon_start(RendererError::ThreadSpawn(std::io::Error::other(
            "no threads left",
        )));
        assert!(matches!(err, RendererError::ThreadSpawn(_)));

        assert_eq!(renderer.state(), LoopState::Joined);
        assert!(!renderer.is_running());
        assert!(matches!(renderer.start(), Err(RendererError::AlreadyStarted)));
        assert!(matches!(renderer.shutdown(), Err(RendererError::NotRunning)));
        assert!(matches!(renderer.clear_screen(), Err(RendererError::NotRunning)));
        assert!(renderer.join_for_shutdown().is_ok());
    }
}
