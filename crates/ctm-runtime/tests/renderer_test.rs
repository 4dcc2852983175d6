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


use anyhow::Result;
use ctm_core::event::{ConcreteListener, EndEvent, EventCategory, MouseMoveEvent};
use ctm_runtime::{
    Color, LoopState, Rect, Renderer, RendererError, RendererSettings, WINDOW_QUIT_CODE,
};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_LIMIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

fn settings(target_fps: u32) -> RendererSettings {
    RendererSettings {
        target_fps,
        ..Default::default()
    }
}

#[test]
fn wildcard_listener_is_registered_when_start_returns() -> Result<()> {
    let (mut renderer, _, _) = Renderer::headless(settings(120))?;
    renderer.start()?;

    assert_eq!(
        renderer.dispatcher().generic_listener_count(EventCategory::Any),
        1
    );
    assert!(renderer.is_running());

    renderer.shutdown()?;
    renderer.join_for_shutdown()?;
    Ok(())
}

#[test]
fn shutdown_terminates_the_loop() -> Result<()> {
    let (mut renderer, stats, _) = Renderer::headless(settings(120))?;
    renderer.start()?;
    assert!(wait_until(|| renderer.state() == LoopState::Running));
    assert!(stats.is_initialized());

    renderer.shutdown()?;
    renderer.join_for_shutdown()?;

    assert_eq!(renderer.state(), LoopState::Joined);
    assert!(!renderer.is_running());
    assert!(stats.is_shut_down());
    assert_eq!(
        renderer.dispatcher().generic_listener_count(EventCategory::Any),
        0
    );
    assert!(matches!(
        renderer.clear_screen(),
        Err(RendererError::NotRunning)
    ));
    Ok(())
}

#[test]
fn frames_are_paced_to_the_target_rate() -> Result<()> {
    let (mut renderer, stats, _) = Renderer::headless(settings(60))?;
    renderer.start()?;
    thread::sleep(Duration::from_millis(600));
    renderer.shutdown()?;
    renderer.join_for_shutdown()?;

    let mean = stats
        .mean_frame_interval()
        .expect("several frames were recorded");
    let target = Duration::from_secs_f64(1.0 / 60.0);
    let margin = Duration::from_millis(5);
    assert!(
        mean + margin >= target && mean <= target + margin,
        "Mean frame interval ({mean:?}) should be near {target:?}"
    );
    assert!(renderer.frame_count() >= 20);
    Ok(())
}

#[test]
fn window_messages_reach_the_loop() -> Result<()> {
    let (mut renderer, _, poster) = Renderer::headless(settings(200))?;
    let moves = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&moves);
    let listener = Arc::new(ConcreteListener::new::<MouseMoveEvent, _>(move |m| {
        sink.lock().unwrap().push((m.x, m.y));
    }));
    renderer.dispatcher().subscribe(&listener);

    renderer.start()?;
    assert!(wait_until(|| renderer.state() == LoopState::Running));

    poster.mouse_move(30, 40);
    assert!(wait_until(|| moves.lock().unwrap().last() == Some(&(30, 40))));
    assert_eq!(renderer.cursor_position(), Some((30, 40)));

    poster.quit();
    renderer.join_for_shutdown()?;
    assert_eq!(
        renderer.dispatcher().oldest_event::<EndEvent>(),
        Some(EndEvent {
            placeholder: WINDOW_QUIT_CODE
        })
    );
    Ok(())
}

#[test]
fn clear_and_draw_reach_the_backend() -> Result<()> {
    let (mut renderer, stats, _) = Renderer::headless(settings(200))?;
    renderer.start()?;

    renderer.clear_screen()?;
    renderer.submit_shape(Rect::new(0.0, 0.0, 10.0, 10.0, Color::RED))?;
    renderer.submit_shape(Rect::new(5.0, 5.0, 15.0, 15.0, Color::BLUE))?;

    assert!(wait_until(|| stats.presents() == 1 && stats.shapes_drawn() == 2));
    assert_eq!(stats.clears(), 1);

    renderer.shutdown()?;
    renderer.join_for_shutdown()?;
    Ok(())
}

#[test]
fn loop_thread_is_named_from_settings() -> Result<()> {
    let mut config = settings(200);
    config.thread_name = "named-loop".to_string();
    let (mut renderer, _, _) = Renderer::headless(config)?;

    let name = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&name);
    let listener = Arc::new(ConcreteListener::new::<EndEvent, _>(move |_| {
        *sink.lock().unwrap() = thread::current().name().map(str::to_owned);
    }));
    renderer.dispatcher().subscribe(&listener);

    renderer.start()?;
    renderer.shutdown()?;
    renderer.join_for_shutdown()?;

    assert_eq!(name.lock().unwrap().as_deref(), Some("named-loop"));
    Ok(())
}
