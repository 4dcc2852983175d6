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


// CTM Sandbox
// Headless demo driving the renderer frame loop

use anyhow::{Context, Result};
use ctm_core::event::{ConcreteListener, EventCategory, GenericListener, MouseMoveEvent};
use ctm_runtime::{Color, Rect, Renderer, RendererSettings};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn load_settings() -> Result<RendererSettings> {
    match std::env::args().nth(1) {
        Some(path) => RendererSettings::load(&path)
            .with_context(|| format!("Failed to load settings from '{path}'")),
        None => Ok(RendererSettings::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = load_settings()?;
    log::info!("Sandbox settings: {settings:?}");
    let (mut renderer, stats, poster) = Renderer::headless(settings)?;

    let state_logger = Arc::new(GenericListener::new(EventCategory::State, |event| {
        log::info!("Sandbox saw {event}.");
    }));
    let cursor_logger = Arc::new(ConcreteListener::new::<MouseMoveEvent, _>(|m| {
        log::info!("Sandbox saw the cursor at ({}, {}).", m.x, m.y);
    }));
    renderer.dispatcher().subscribe(&state_logger);
    renderer.dispatcher().subscribe(&cursor_logger);

    renderer.start()?;

    renderer.clear_screen()?;
    for i in 0..5u8 {
        let offset = f32::from(i) * 20.0;
        renderer.submit_shape(Rect::new(
            offset,
            offset,
            offset + 50.0,
            offset + 50.0,
            Color::rgb(50 * i, 0, 255 - 50 * i),
        ))?;
        poster.mouse_move(u32::from(i) * 10, u32::from(i) * 5);
        thread::sleep(Duration::from_millis(100));
    }

    // Closing the window ends the loop the same way a shutdown does.
    poster.quit();
    renderer.join_for_shutdown()?;

    log::info!(
        "Sandbox done: {} frames, {} shapes drawn, {} presents, cursor at {:?}.",
        renderer.frame_count(),
        stats.shapes_drawn(),
        stats.presents(),
        renderer.cursor_position()
    );
    Ok(())
}
