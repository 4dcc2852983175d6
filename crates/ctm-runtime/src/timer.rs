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

//! Frame timing: a stopwatch for measuring frames and a pacer for sleeping
//! off the rest of the frame budget.

use crate::config::RendererSettings;
use std::thread;
use std::time::{Duration, Instant};

/// Measures time since it was created or last reset.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch started now.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Restarts the stopwatch.
    /// ## Returns
    /// The time elapsed before the reset.
    #[inline]
    pub fn reset(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.start_time);
        self.start_time = now;
        lap
    }

    /// Returns the instant the stopwatch was last (re)started.
    #[inline]
    pub fn started_at(&self) -> Instant {
        self.start_time
    }

    /// Returns the time elapsed since the stopwatch was last (re)started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time in fractional milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Open-loop frame pacing: sleep for whatever is left of the frame budget,
/// never try to catch up on overrun frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    target: Duration,
}

impl FramePacer {
    /// Creates a pacer for the given frame rate. A rate of zero is treated as
    /// one frame per second.
    pub fn new(target_fps: u32) -> Self {
        Self {
            target: Duration::from_nanos(1_000_000_000 / u64::from(target_fps.max(1))),
        }
    }

    /// Creates a pacer for the frame rate of `settings`.
    pub fn from_settings(settings: &RendererSettings) -> Self {
        Self {
            target: settings.target_frame_duration(),
        }
    }

    /// Returns the duration budgeted for one frame.
    #[inline]
    pub fn target_frame_duration(&self) -> Duration {
        self.target
    }

    /// Returns what is left of the frame budget after `elapsed`, or zero if
    /// the frame overran.
    #[inline]
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.target.saturating_sub(elapsed)
    }

    /// Sleeps for what is left of the frame budget after `elapsed`.
    /// ## Returns
    /// The duration slept.
    pub fn sleep_remaining(&self, elapsed: Duration) -> Duration {
        let remaining = self.remaining(elapsed);
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
        remaining
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::from_settings(&RendererSettings::default())
    }
}
