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
use ctm_core::event::{
    taxonomy, ClearFrameEvent, ConcreteEvent, ConcreteListener, DrawFrameEvent, EndEvent, Event,
    EventCategory, EventDispatcher, EventKind, GenericListener, MouseMoveEvent, StartEvent,
    StartFrameEvent,
};
use ctm_core::EventError;
use std::sync::{Arc, Mutex};

fn sample(kind: EventKind) -> Event {
    match kind {
        EventKind::StateStart => StartEvent { placeholder: 1 }.into(),
        EventKind::StateEnd => EndEvent { placeholder: 1 }.into(),
        EventKind::MouseMove => MouseMoveEvent { x: 1, y: 2 }.into(),
        EventKind::FrameClear => ClearFrameEvent.into(),
        EventKind::FrameStart => StartFrameEvent.into(),
        EventKind::FrameDraw => DrawFrameEvent.into(),
    }
}

fn queue(dispatcher: &EventDispatcher, kind: EventKind) {
    match kind {
        EventKind::StateStart => dispatcher.queue_event::<StartEvent>(1),
        EventKind::StateEnd => dispatcher.queue_event::<EndEvent>(1),
        EventKind::MouseMove => dispatcher.queue_event::<MouseMoveEvent>((1, 2)),
        EventKind::FrameClear => dispatcher.queue_event::<ClearFrameEvent>(()),
        EventKind::FrameStart => dispatcher.queue_event::<StartFrameEvent>(()),
        EventKind::FrameDraw => dispatcher.queue_event::<DrawFrameEvent>(()),
    }
}

#[test]
fn every_kind_agrees_with_its_category() {
    for kind in EventKind::ALL {
        let event = sample(kind);
        assert_eq!(event.kind(), kind);
        assert_eq!(event.category(), kind.category());
        assert_eq!(taxonomy().category_of(kind), kind.category());
        assert!(!event.category().is_wildcard());
    }
    assert_eq!(StartEvent::category(), EventCategory::State);
    assert_eq!(MouseMoveEvent::category(), EventCategory::Mouse);
    assert_eq!(DrawFrameEvent::category(), EventCategory::Frame);
}

#[test]
fn wildcard_listener_sees_every_kind_once() -> Result<()> {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let any = Arc::new(GenericListener::new(EventCategory::Any, move |e| {
        sink.lock().unwrap().push(e.kind());
    }));
    dispatcher.subscribe(&any);

    for kind in EventKind::ALL {
        queue(&dispatcher, kind);
    }
    // The end event halts the first flush, the rest follows on the second.
    let first = dispatcher.dispatch_queued();
    assert!(first.halted_on_end);
    let second = dispatcher.dispatch_queued();
    assert!(!second.halted_on_end);

    assert_eq!(*seen.lock().unwrap(), EventKind::ALL.to_vec());
    assert_eq!(first.notifications + second.notifications, EventKind::ALL.len());
    Ok(())
}

#[test]
fn fan_out_reaches_each_listener_exactly_once() {
    let dispatcher = EventDispatcher::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&order);
    let mouse = Arc::new(GenericListener::new(EventCategory::Mouse, move |_| {
        log.lock().unwrap().push("mouse");
    }));
    let log = Arc::clone(&order);
    let any = Arc::new(GenericListener::new(EventCategory::Any, move |_| {
        log.lock().unwrap().push("any");
    }));
    let log = Arc::clone(&order);
    let moved = Arc::new(ConcreteListener::new::<MouseMoveEvent, _>(move |_| {
        log.lock().unwrap().push("moved");
    }));
    dispatcher.subscribe(&moved);
    dispatcher.subscribe(&any);
    dispatcher.subscribe(&mouse);

    dispatcher.queue_event::<MouseMoveEvent>((3, 4));
    let report = dispatcher.dispatch_queued();

    assert_eq!(*order.lock().unwrap(), vec!["mouse", "any", "moved"]);
    assert_eq!(report.notifications, 3);
}

#[test]
fn end_stops_the_flush_before_mouse_events() {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let any = Arc::new(GenericListener::new(EventCategory::Any, move |e| {
        sink.lock().unwrap().push(e.kind());
    }));
    dispatcher.subscribe(&any);

    dispatcher.queue_event::<StartEvent>(1);
    dispatcher.queue_event::<EndEvent>(1);
    dispatcher.queue_event::<MouseMoveEvent>((1, 1));
    dispatcher.dispatch_queued();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![EventKind::StateStart, EventKind::StateEnd]
    );
    assert!(dispatcher.is_event_queued());
}

#[test]
fn dropped_listener_stops_receiving() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&hits);
    let listener = Arc::new(ConcreteListener::new::<ClearFrameEvent, _>(move |_| {
        *sink.lock().unwrap() += 1;
    }));
    dispatcher.subscribe(&listener);

    dispatcher.queue_event::<ClearFrameEvent>(());
    dispatcher.dispatch_queued();
    drop(listener);
    dispatcher.queue_event::<ClearFrameEvent>(());
    let report = dispatcher.dispatch_queued();

    assert_eq!(*hits.lock().unwrap(), 1);
    assert_eq!(report.notifications, 0);
    assert_eq!(dispatcher.concrete_listener_count(EventKind::FrameClear), 0);
}

#[test]
fn casting_reports_the_mismatch() {
    let event = sample(EventKind::MouseMove);
    assert_eq!(event.cast::<MouseMoveEvent>().map(|m| (m.x, m.y)), Ok((1, 2)));
    let err = event.cast::<EndEvent>().unwrap_err();
    assert_eq!(
        err,
        EventError::KindMismatch {
            expected: EventKind::StateEnd,
            found: EventKind::MouseMove,
        }
    );
    assert!(err.to_string().contains("MOUSE_MOVE_EVENT"));
}
