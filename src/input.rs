//! Injectable input sources.
//!
//! The engine pulls events from an [`InputSource`] at the start of every frame
//! and applies all of them before any item moves.

use std::collections::VecDeque;

use crossbeam_channel::Receiver;

use crate::events::{InputEvent, WheelDelta};

pub const LINE_HEIGHT_PX: f64 = 40.0;
pub const PAGE_HEIGHT_PX: f64 = 800.0;

/// Wheel delta in pixels.
pub fn normalize_wheel(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(px) => px,
        WheelDelta::Lines(lines) => lines * LINE_HEIGHT_PX,
        WheelDelta::Pages(pages) => pages * PAGE_HEIGHT_PX,
    }
}

pub trait InputSource {
    /// Called once per frame before polling; `frame` counts from 0.
    fn begin_frame(&mut self, _frame: u64) {}

    fn poll_event(&mut self) -> Option<InputEvent>;
}

impl InputSource for Receiver<InputEvent> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.try_recv().ok()
    }
}

impl InputSource for VecDeque<InputEvent> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

/// Source with no events; autoplay only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        None
    }
}

/// Events released at fixed frame numbers, for deterministic runs.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    pending: VecDeque<(u64, InputEvent)>,
    frame: u64,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<(u64, InputEvent)>) -> Self {
        events.sort_by_key(|(frame, _)| *frame);
        Self {
            pending: events.into(),
            frame: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl InputSource for ScriptedInput {
    fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        match self.pending.front() {
            Some((at, _)) if *at <= self.frame => self.pending.pop_front().map(|(_, ev)| ev),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_units_become_pixels() {
        assert_eq!(normalize_wheel(WheelDelta::Pixels(12.5)), 12.5);
        assert_eq!(normalize_wheel(WheelDelta::Lines(-3.0)), -120.0);
        assert_eq!(normalize_wheel(WheelDelta::Pages(1.0)), 800.0);
    }

    #[test]
    fn scripted_events_wait_for_their_frame() {
        let mut input = ScriptedInput::new(vec![
            (2, InputEvent::PointerUp),
            (0, InputEvent::PointerDown { y: 10.0 }),
        ]);
        input.begin_frame(0);
        assert_eq!(input.poll_event(), Some(InputEvent::PointerDown { y: 10.0 }));
        assert_eq!(input.poll_event(), None);
        input.begin_frame(1);
        assert_eq!(input.poll_event(), None);
        input.begin_frame(2);
        assert_eq!(input.poll_event(), Some(InputEvent::PointerUp));
        assert_eq!(input.remaining(), 0);
    }
}
