//! Frame drivers.
//!
//! The engine never schedules itself. Something outside calls `tick()`: the
//! window's redraw loop in the viewer, or a [`FrameClock`] through [`drive`].

use std::ops::ControlFlow;
use std::time::Duration;

use serde::Serialize;

use crate::gallery::GalleryEngine;
use crate::input::InputSource;
use crate::media::PlaneFrame;
use crate::scroll::{Direction, ScrollState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    /// Logical time since the first frame.
    pub elapsed: Duration,
}

pub trait FrameClock {
    /// `None` ends the run.
    fn next_frame(&mut self) -> Option<FrameTick>;
}

/// Logical clock advancing by a constant step without sleeping.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    interval: Duration,
    limit: Option<u64>,
    next: u64,
}

impl FixedStepClock {
    pub fn new(interval: Duration, frames: u64) -> Self {
        Self {
            interval,
            limit: Some(frames),
            next: 0,
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            limit: None,
            next: 0,
        }
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> Option<FrameTick> {
        if self.limit.is_some_and(|limit| self.next >= limit) {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let steps = u32::try_from(index).unwrap_or(u32::MAX);
        Some(FrameTick {
            index,
            elapsed: self.interval.saturating_mul(steps),
        })
    }
}

/// Run the engine until the clock stops or `observe` breaks. Input is drained
/// before each tick; `observe` sees the tick's scroll snapshot and every plane
/// it produced. The returned count includes the frame that broke.
pub fn drive<F>(
    engine: &mut GalleryEngine,
    clock: &mut dyn FrameClock,
    input: &mut dyn InputSource,
    mut observe: F,
) -> u64
where
    F: FnMut(&FrameTick, &ScrollState, &[PlaneFrame]) -> ControlFlow<()>,
{
    let mut planes: Vec<PlaneFrame> = Vec::with_capacity(engine.items().len());
    let mut count = 0;
    while let Some(tick) = clock.next_frame() {
        engine.drain_input(input);
        planes.clear();
        let snapshot = engine.tick(&mut planes);
        count += 1;
        if observe(&tick, &snapshot, &planes).is_break() {
            break;
        }
    }
    count
}

/// One line of headless output.
#[derive(Debug, Serialize)]
pub struct FrameReport<'a> {
    pub frame: u64,
    pub elapsed_ms: u64,
    pub current: f64,
    pub target: f64,
    pub direction: Direction,
    pub planes: &'a [PlaneFrame],
}

impl<'a> FrameReport<'a> {
    pub fn new(tick: &FrameTick, scroll: &ScrollState, planes: &'a [PlaneFrame]) -> Self {
        Self {
            frame: tick.index,
            elapsed_ms: u64::try_from(tick.elapsed.as_millis()).unwrap_or(u64::MAX),
            current: scroll.current,
            target: scroll.target,
            direction: scroll.direction,
            planes,
        }
    }
}
