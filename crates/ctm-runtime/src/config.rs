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

//! Renderer settings, loadable from JSON.

use crate::error::ConfigError;
use ctm_core::event::CoalescePolicy;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Accepted values for [`RendererSettings::target_fps`].
pub const TARGET_FPS_RANGE: RangeInclusive<u32> = 1..=1000;

/// Configuration of a [`crate::Renderer`].
///
/// Missing fields take their default value when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Frames per second the loop paces itself to.
    pub target_fps: u32,
    /// How the event pool recycles repeated events of one kind.
    pub coalesce_policy: CoalescePolicy,
    /// Name given to the frame loop thread.
    pub thread_name: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            target_fps: 60,
            coalesce_policy: CoalescePolicy::LatestWins,
            thread_name: "ctm-frame-loop".to_string(),
        }
    }
}

impl RendererSettings {
    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TARGET_FPS_RANGE.contains(&self.target_fps) {
            return Err(ConfigError::InvalidTargetFps(self.target_fps));
        }
        Ok(())
    }

    /// Parses and validates settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded renderer settings from '{}'.", path.display());
        Ok(settings)
    }

    /// Duration of one frame at [`RendererSettings::target_fps`].
    pub fn target_frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }
}
