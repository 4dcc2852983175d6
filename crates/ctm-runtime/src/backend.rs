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

//! The graphics seam driven by the frame loop, and a headless implementation.

use crate::draw::Shape;
use crate::error::BackendError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A graphics device the frame loop renders through.
///
/// Every method is called from the frame loop thread only.
pub trait GraphicsBackend: Send + 'static {
    /// Brings the device up. Called when the renderer handles its start event.
    ///
    /// ## Errors
    /// A [`BackendError`] if the device cannot be created. The loop stops.
    fn init(&mut self) -> Result<(), BackendError>;

    /// Clears the back buffer.
    ///
    /// ## Errors
    /// A [`BackendError`] if the device rejected the clear.
    fn clear(&mut self) -> Result<(), BackendError>;

    /// Presents the back buffer.
    ///
    /// ## Errors
    /// A [`BackendError`] if the device rejected the present.
    fn present(&mut self) -> Result<(), BackendError>;

    /// Called at the top of every loop iteration.
    ///
    /// ## Arguments
    /// * `frame_start` - When the iteration began, before pumping messages.
    fn begin_frame(&mut self, frame_start: Instant);

    /// Called once per iteration with the shapes drained from the draw queue.
    ///
    /// ## Arguments
    /// * `shapes` - The shapes submitted since the previous frame, in
    ///   submission order. Empty when nothing was submitted.
    ///
    /// ## Errors
    /// A [`BackendError`] if the shapes could not be drawn.
    fn end_frame(&mut self, shapes: &[Shape]) -> Result<(), BackendError>;

    /// Releases the device. Called when the renderer handles its end event.
    fn shutdown(&mut self);
}

const RECORDED_FRAME_STARTS: usize = 256;

/// Counters recorded by a [`HeadlessBackend`], readable from any thread.
#[derive(Debug, Default)]
pub struct HeadlessStats {
    initialized: AtomicBool,
    shut_down: AtomicBool,
    clears: AtomicU64,
    presents: AtomicU64,
    frames: AtomicU64,
    shapes_drawn: AtomicU64,
    frame_starts: Mutex<VecDeque<Instant>>,
}

impl HeadlessStats {
    /// ## Returns
    /// `true` once `init` succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// ## Returns
    /// `true` once `shutdown` ran, `false` before.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// ## Returns
    /// The number of `clear` calls.
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// ## Returns
    /// The number of `present` calls.
    pub fn presents(&self) -> u64 {
        self.presents.load(Ordering::Relaxed)
    }

    /// ## Returns
    /// The number of `begin_frame` calls, one per loop iteration.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// ## Returns
    /// The total number of shapes passed to `end_frame`.
    pub fn shapes_drawn(&self) -> u64 {
        self.shapes_drawn.load(Ordering::Relaxed)
    }

    /// Copies out the recorded frame starts.
    ///
    /// ## Returns
    /// The most recent frame start instants, oldest first.
    pub fn frame_starts(&self) -> Vec<Instant> {
        self.frame_starts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// ## Returns
    /// The mean interval between the recorded frame starts, or `None` until
    /// at least two were recorded.
    pub fn mean_frame_interval(&self) -> Option<Duration> {
        let starts = self.frame_starts();
        let (first, last) = (starts.first()?, starts.last()?);
        let intervals = u32::try_from(starts.len() - 1).ok().filter(|n| *n > 0)?;
        Some(last.duration_since(*first) / intervals)
    }

    fn record_frame_start(&self, at: Instant) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        let mut starts = self
            .frame_starts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if starts.len() == RECORDED_FRAME_STARTS {
            starts.pop_front();
        }
        starts.push_back(at);
    }
}

/// A backend without a device: it only records what it was asked to do.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Arc<HeadlessStats>,
    fail_init: bool,
}

impl HeadlessBackend {
    /// Creates a headless backend.
    ///
    /// ## Returns
    /// A backend whose every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a headless backend whose `init` fails.
    ///
    /// ## Returns
    /// A backend returning [`BackendError`] from `init`, so the loop stops
    /// right after its start event.
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// ## Returns
    /// A shared handle to the recorded counters. It stays readable after the
    /// backend moved to the loop thread.
    pub fn stats(&self) -> Arc<HeadlessStats> {
        Arc::clone(&self.stats)
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn init(&mut self) -> Result<(), BackendError> {
        if self.fail_init {
            return Err(BackendError::new("initialize", "no device available"));
        }
        self.stats.initialized.store(true, Ordering::Release);
        log::info!("Headless graphics backend initialized.");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        self.stats.clears.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        self.stats.presents.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn begin_frame(&mut self, frame_start: Instant) {
        self.stats.record_frame_start(frame_start);
    }

    fn end_frame(&mut self, shapes: &[Shape]) -> Result<(), BackendError> {
        if !shapes.is_empty() {
            log::trace!("Headless backend drew {} shapes.", shapes.len());
        }
        self.stats
            .shapes_drawn
            .fetch_add(shapes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.stats.shut_down.store(true, Ordering::Release);
        log::info!("Headless graphics backend shut down.");
    }
}
