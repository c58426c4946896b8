//! Eased scroll state.
//!
//! [`ScrollState`] is a plain value; every transition returns a new state.
//! [`ScrollController`] owns one state plus the tuning it was built with and is
//! the only thing input handlers and the engine talk to.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    None,
    Up,
    Down,
}

/// Sign convention applied to wheel deltas.
///
/// `Natural` moves the target with the delta, `Inverted` against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WheelDirection {
    Natural,
    #[default]
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// Fraction of the remaining distance covered per tick, in (0, 1).
    pub ease: f64,
    /// Autoplay drift magnitude; the sign follows the last direction.
    pub base_speed: f64,
    pub wheel_gain: f64,
    pub wheel_direction: WheelDirection,
    pub drag_gain: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            ease: 0.05,
            base_speed: 2.0,
            wheel_gain: 0.5,
            wheel_direction: WheelDirection::default(),
            drag_gain: 2.0,
        }
    }
}

impl ScrollSettings {
    pub fn signed_wheel_gain(&self) -> f64 {
        match self.wheel_direction {
            WheelDirection::Natural => self.wheel_gain,
            WheelDirection::Inverted => -self.wheel_gain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollState {
    pub current: f64,
    pub target: f64,
    pub last: f64,
    pub ease: f64,
    pub speed: f64,
    pub direction: Direction,
    pub dragging: bool,
    pub drag_origin: f64,
    pub drag_start_pointer: f64,
}

impl ScrollState {
    pub fn new(ease: f64, base_speed: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            last: 0.0,
            ease,
            speed: base_speed,
            direction: Direction::None,
            dragging: false,
            drag_origin: 0.0,
            drag_start_pointer: 0.0,
        }
    }

    /// Scroll travelled since the previous commit, in pixels.
    pub fn delta(&self) -> f64 {
        self.current - self.last
    }

    pub fn wheeled(self, delta_px: f64, signed_gain: f64) -> Self {
        Self {
            target: self.target + delta_px * signed_gain,
            ..self
        }
    }

    pub fn drag_started(self, pointer_y: f64) -> Self {
        Self {
            dragging: true,
            drag_origin: self.current,
            drag_start_pointer: pointer_y,
            ..self
        }
    }

    pub fn dragged(self, pointer_y: f64, drag_gain: f64) -> Self {
        if !self.dragging {
            return self;
        }
        Self {
            target: self.drag_origin + (self.drag_start_pointer - pointer_y) * drag_gain,
            ..self
        }
    }

    pub fn drag_ended(self) -> Self {
        Self {
            dragging: false,
            ..self
        }
    }

    /// One frame of easing. `last` is left untouched; see [`ScrollState::committed`].
    pub fn advanced(self, autoplay_speed: f64, base_speed: f64) -> Self {
        let target = if self.dragging {
            self.target
        } else {
            self.target + autoplay_speed
        };
        let current = self.current + (target - self.current) * self.ease;

        let direction = if current > self.last {
            Direction::Down
        } else if current < self.last {
            Direction::Up
        } else {
            self.direction
        };
        let speed = match direction {
            Direction::Down => base_speed,
            Direction::Up => -base_speed,
            Direction::None => self.speed,
        };

        Self {
            current,
            target,
            direction,
            speed,
            ..self
        }
    }

    pub fn committed(self) -> Self {
        Self {
            last: self.current,
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    state: ScrollState,
    settings: ScrollSettings,
}

impl ScrollController {
    pub fn new(settings: ScrollSettings) -> Self {
        Self::with_state(settings, ScrollState::new(settings.ease, settings.base_speed))
    }

    /// Start from an explicit state (tests, restored sessions). The settings'
    /// ease replaces whatever the state carries.
    pub fn with_state(settings: ScrollSettings, state: ScrollState) -> Self {
        debug_assert!(
            settings.ease > 0.0 && settings.ease < 1.0,
            "ease must be within (0, 1), got {}",
            settings.ease
        );
        Self {
            state: ScrollState {
                ease: settings.ease,
                ..state
            },
            settings,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// Autoplay drift for the next tick.
    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn on_wheel_delta(&mut self, delta_pixels_y: f64) {
        self.state = self
            .state
            .wheeled(delta_pixels_y, self.settings.signed_wheel_gain());
    }

    pub fn on_drag_start(&mut self, pointer_y: f64) {
        self.state = self.state.drag_started(pointer_y);
        debug!(pointer_y, origin = self.state.drag_origin, "drag started");
    }

    pub fn on_drag_move(&mut self, pointer_y: f64) {
        self.state = self.state.dragged(pointer_y, self.settings.drag_gain);
    }

    pub fn on_drag_end(&mut self) {
        if self.state.dragging {
            debug!(target = self.state.target, "drag ended");
        }
        self.state = self.state.drag_ended();
    }

    /// Ease toward the target and derive direction/speed. Returns the tick's
    /// snapshot; `last` still holds the previous tick until [`Self::commit`].
    pub fn advance(&mut self, autoplay_speed: f64) -> ScrollState {
        self.state = self
            .state
            .advanced(autoplay_speed, self.settings.base_speed);
        self.state
    }

    pub fn commit(&mut self) {
        self.state = self.state.committed();
    }
}
