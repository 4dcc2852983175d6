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

//! The frame loop run on the renderer's thread.

use crate::backend::GraphicsBackend;
use crate::draw::DrawQueue;
use crate::error::{BackendError, RendererError};
use crate::message::MessageSource;
use crate::timer::{FramePacer, Stopwatch};
use ctm_core::event::{
    ClearFrameEvent, ConcreteEvent, EndEvent, Event, EventCategory, EventDispatcher,
    GenericListener, MouseMoveEvent, StartEvent,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Lifecycle of a renderer's frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Not started yet.
    Created,
    /// The loop runs but the start event has not been handled yet.
    Starting,
    /// The start event was handled; frames are being produced.
    Running,
    /// The loop was asked to stop and its thread has not been joined.
    Stopping,
    /// The loop thread was joined.
    Joined,
}

pub(crate) type SharedBackend = Arc<Mutex<Box<dyn GraphicsBackend>>>;
pub(crate) type SharedSource = Arc<Mutex<Box<dyn MessageSource>>>;

/// State shared between the renderer facade and its loop thread.
#[derive(Debug)]
pub(crate) struct LoopShared {
    pub dispatcher: EventDispatcher,
    pub should_run: AtomicBool,
    pub loop_started: AtomicBool,
    pub renderer_started: AtomicBool,
    pub handshake: Mutex<()>,
    pub loop_started_cv: Condvar,
    pub draw_queue: Mutex<DrawQueue>,
    pub frame_count: AtomicU64,
    pub cursor: Mutex<Option<(u32, u32)>>,
    pub failure: Mutex<Option<BackendError>>,
}

impl LoopShared {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self {
            dispatcher,
            should_run: AtomicBool::new(true),
            loop_started: AtomicBool::new(false),
            renderer_started: AtomicBool::new(false),
            handshake: Mutex::new(()),
            loop_started_cv: Condvar::new(),
            draw_queue: Mutex::new(DrawQueue::new()),
            frame_count: AtomicU64::new(0),
            cursor: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    #[inline]
    pub fn should_run(&self) -> bool {
        self.should_run.load(Ordering::Acquire)
    }

    #[inline]
    pub fn renderer_started(&self) -> bool {
        self.renderer_started.load(Ordering::Acquire)
    }

    #[inline]
    pub fn loop_started(&self) -> bool {
        self.loop_started.load(Ordering::Acquire)
    }

    fn signal_loop_started(&self) {
        let _guard = lock(&self.handshake);
        self.loop_started.store(true, Ordering::Release);
        self.loop_started_cv.notify_all();
    }
}

/// Reacts to every dispatched event on behalf of the renderer.
struct FrameHandler {
    shared: Arc<LoopShared>,
    backend: SharedBackend,
    source: SharedSource,
}

impl FrameHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::Start(start) => self.on_start(start),
            Event::End(end) => self.on_end(end),
            Event::MouseMove(mouse) => self.on_mouse_move(mouse),
            Event::ClearFrame(_) => self.on_clear_frame(),
            Event::StartFrame(_) | Event::DrawFrame(_) => {
                log::debug!("Received {event}.");
            }
        }
    }

    fn on_start(&self, event: &StartEvent) {
        if self.shared.renderer_started() {
            log::warn!("Ignoring {}: renderer already started.", StartEvent::KIND);
            return;
        }
        log::debug!("Start args: {}.", event.placeholder);

        lock(&self.source).start();
        if let Err(e) = lock(&self.backend).init() {
            log::error!("Renderer failed to start: {e}");
            *lock(&self.shared.failure) = Some(e);
            self.shared.should_run.store(false, Ordering::Release);
            return;
        }

        self.shared.renderer_started.store(true, Ordering::Release);
        log::info!("Renderer started.");
    }

    fn on_end(&self, event: &EndEvent) {
        if !self.shared.renderer_started() {
            log::warn!("Ignoring {}: renderer not started.", EndEvent::KIND);
            return;
        }
        if !self.shared.should_run() {
            log::warn!("Ignoring {}: renderer already ended.", EndEvent::KIND);
            return;
        }
        log::debug!("End args: {}.", event.placeholder);

        lock(&self.backend).shutdown();
        self.shared.should_run.store(false, Ordering::Release);
        log::info!("Renderer ended.");
    }

    fn on_mouse_move(&self, event: &MouseMoveEvent) {
        *lock(&self.shared.cursor) = Some((event.x, event.y));
        log::debug!("Cursor at ({}, {}).", event.x, event.y);
    }

    fn on_clear_frame(&self) {
        log::debug!("Received {}.", ClearFrameEvent::KIND);
        let mut backend = lock(&self.backend);
        if let Err(e) = backend.clear().and_then(|()| backend.present()) {
            log::error!("Failed to clear the frame: {e}");
        }
    }
}

/// Runs the frame loop until the renderer stops.
///
/// The loop subscribes a wildcard listener and signals `loop_started` before
/// its first frame. Each frame pumps platform messages once the renderer has
/// started, flushes queued events, draws queued shapes and then sleeps off
/// the rest of the frame budget.
///
/// ## Returns
/// The backend failure that stopped the loop, if any.
pub(crate) fn run_frame_loop(
    shared: Arc<LoopShared>,
    backend: SharedBackend,
    source: SharedSource,
    pacer: FramePacer,
) -> Result<(), RendererError> {
    let handler = FrameHandler {
        shared: Arc::clone(&shared),
        backend: Arc::clone(&backend),
        source: Arc::clone(&source),
    };
    let listener = Arc::new(GenericListener::new(EventCategory::Any, move |event| {
        handler.handle(event)
    }));
    let dispatcher = &shared.dispatcher;
    dispatcher.subscribe(&listener);
    shared.signal_loop_started();
    log::info!(
        "Frame loop started ({:?} per frame).",
        pacer.target_frame_duration()
    );

    let mut watch = Stopwatch::new();
    while shared.should_run() {
        watch.reset();
        lock(&backend).begin_frame(watch.started_at());

        if shared.renderer_started() {
            let handled = lock(&source).pump(dispatcher);
            if handled > 0 {
                log::trace!("Pumped {handled} window messages.");
            }
        }

        if dispatcher.is_event_queued() {
            dispatcher.dispatch_queued();
            if !shared.should_run() {
                break;
            }
        }

        let shapes = lock(&shared.draw_queue).drain();
        if let Err(e) = lock(&backend).end_frame(&shapes) {
            log::error!("Failed to draw {} queued shapes: {e}", shapes.len());
        }
        shared.frame_count.fetch_add(1, Ordering::Relaxed);

        let elapsed = watch.elapsed();
        let slept = pacer.sleep_remaining(elapsed);
        log::trace!("Frame took {elapsed:?}, slept {slept:?}.");
    }

    dispatcher.unsubscribe(&listener);
    log::info!(
        "Frame loop stopped after {} frames.",
        shared.frame_count.load(Ordering::Relaxed)
    );

    match lock(&shared.failure).take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Interval at which the owner re-checks the loop thread while waiting for
/// the start handshake.
pub(crate) const HANDSHAKE_POLL: Duration = Duration::from_millis(10);

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
