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

//! Defines the error types of the renderer runtime.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error raised while loading or validating [`crate::RendererSettings`].
#[derive(Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    Io {
        /// The path that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The settings document is not valid JSON for the settings schema.
    Parse(serde_json::Error),
    /// The target frame rate is outside `1..=1000`.
    InvalidTargetFps(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read settings from '{}': {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "Failed to parse settings: {err}"),
            ConfigError::InvalidTargetFps(fps) => {
                write!(f, "Invalid target frame rate {fps}, expected 1..=1000")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::InvalidTargetFps(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// A failure reported by a [`crate::GraphicsBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// What the backend was doing.
    pub operation: &'static str,
    /// Backend-specific details.
    pub details: String,
}

impl BackendError {
    /// Creates a new backend error.
    pub fn new(operation: &'static str, details: impl Into<String>) -> Self {
        Self {
            operation,
            details: details.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graphics backend failed to {}: {}", self.operation, self.details)
    }
}

impl std::error::Error for BackendError {}

/// A high-level error of the [`crate::Renderer`] facade.
#[derive(Debug)]
pub enum RendererError {
    /// `start` was called on a renderer that was already started.
    AlreadyStarted,
    /// The renderer was used before `start`.
    NotStarted,
    /// The renderer was used after its loop stopped.
    NotRunning,
    /// The frame loop thread could not be spawned.
    ThreadSpawn(io::Error),
    /// The frame loop thread panicked.
    LoopPanicked,
    /// The graphics backend failed, stopping the frame loop.
    Backend(BackendError),
    /// The renderer settings were rejected.
    Config(ConfigError),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererError::AlreadyStarted => write!(f, "Renderer was already started"),
            RendererError::NotStarted => write!(f, "Renderer has not been started"),
            RendererError::NotRunning => write!(f, "Renderer is no longer running"),
            RendererError::ThreadSpawn(err) => {
                write!(f, "Failed to spawn the frame loop thread: {err}")
            }
            RendererError::LoopPanicked => write!(f, "Frame loop thread panicked"),
            RendererError::Backend(err) => write!(f, "{err}"),
            RendererError::Config(err) => write!(f, "Invalid renderer settings: {err}"),
        }
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RendererError::ThreadSpawn(err) => Some(err),
            RendererError::Backend(err) => Some(err),
            RendererError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for RendererError {
    fn from(err: BackendError) -> Self {
        RendererError::Backend(err)
    }
}

impl From<ConfigError> for RendererError {
    fn from(err: ConfigError) -> Self {
        RendererError::Config(err)
    }
}
