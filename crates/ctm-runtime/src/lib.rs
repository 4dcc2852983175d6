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

//! # CTM Runtime
//!
//! The frame loop that pumps a [`ctm_core::event::EventDispatcher`] at a
//! fixed rate on its own thread, and the [`Renderer`] facade owning it.

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod draw;
pub mod error;
mod frame_loop;
pub mod message;
pub mod renderer;
pub mod timer;

pub use backend::{GraphicsBackend, HeadlessBackend, HeadlessStats};
pub use config::RendererSettings;
pub use draw::{Color, DrawQueue, Rect, Shape};
pub use error::{BackendError, ConfigError, RendererError};
pub use frame_loop::LoopState;
pub use message::{
    ChannelMessageSource, MessagePoster, MessageSource, WindowMessage, WINDOW_QUIT_CODE,
};
pub use renderer::{Renderer, SHUTDOWN_PLACEHOLDER, START_PLACEHOLDER};
pub use timer::{FramePacer, Stopwatch};
