//! Per-plane positioning.
//!
//! An item's pixel bounds are fixed between resizes; each tick turns them into
//! scene-space scale and position for the current scroll and recycles the item
//! to the other end of the loop once it has left the viewport in the direction
//! of travel.

use serde::Serialize;
use tracing::debug;

use crate::scroll::{Direction, ScrollState};
use crate::viewport::{ScreenMetrics, Vec2, ViewportMetrics, pixels_to_scene};

/// Layout box of one element in pixels, measured at scroll 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemBounds {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Shared metrics every item positions against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemMetrics {
    pub screen: ScreenMetrics,
    pub viewport: ViewportMetrics,
    /// Gallery period in scene units.
    pub period: f64,
}

/// Partial metrics update delivered on resize; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemResize {
    pub period: Option<f64>,
    pub screen: Option<ScreenMetrics>,
    pub viewport: Option<ViewportMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ItemState {
    pub scale: Vec2,
    pub position: Vec2,
    pub wrap_offset: f64,
    pub is_before: bool,
    pub is_after: bool,
}

impl ItemState {
    /// Scale, position and edge flags for `scroll_current`, without wrapping.
    pub fn placed(
        bounds: &ItemBounds,
        metrics: &ItemMetrics,
        wrap_offset: f64,
        scroll_current: f64,
    ) -> Self {
        let ItemMetrics {
            screen, viewport, ..
        } = metrics;

        let scale = Vec2::new(
            pixels_to_scene(bounds.width, screen.width(), viewport.width),
            pixels_to_scene(bounds.height, screen.height(), viewport.height),
        );
        let position = Vec2::new(
            -viewport.width / 2.0
                + scale.x / 2.0
                + pixels_to_scene(bounds.left, screen.width(), viewport.width),
            viewport.height / 2.0
                - scale.y / 2.0
                - pixels_to_scene(
                    bounds.top - scroll_current,
                    screen.height(),
                    viewport.height,
                )
                - wrap_offset,
        );

        let half_view = viewport.height / 2.0;
        Self {
            scale,
            position,
            wrap_offset,
            is_before: position.y + scale.y / 2.0 < -half_view,
            is_after: position.y - scale.y / 2.0 > half_view,
        }
    }

    /// Full per-tick step. Only `Down` + after and `Up` + before recycle the
    /// item; the mirrored pairs are left alone. A new offset shows up in
    /// `position` from the next step on.
    pub fn step(
        self,
        bounds: &ItemBounds,
        metrics: &ItemMetrics,
        scroll_current: f64,
        direction: Direction,
    ) -> Self {
        let mut next = Self::placed(bounds, metrics, self.wrap_offset, scroll_current);
        let wrapped = match direction {
            Direction::Down if next.is_after => Some(metrics.period),
            Direction::Up if next.is_before => Some(-metrics.period),
            _ => None,
        };
        if let Some(shift) = wrapped {
            next.wrap_offset += shift;
            next.is_before = false;
            next.is_after = false;
        }
        next
    }
}

/// What the renderer receives for one plane on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneFrame {
    /// Index into the source element list (stable across ticks).
    pub index: usize,
    pub scale: Vec2,
    pub position: Vec2,
    pub strength: f64,
    pub viewport: ViewportMetrics,
    /// Natural pixel size of the source image, when known.
    pub image_size: Option<[u32; 2]>,
}

#[derive(Debug, Clone)]
pub struct MediaItem {
    source_index: usize,
    bounds: ItemBounds,
    image_size: Option<[u32; 2]>,
    metrics: ItemMetrics,
    strength_gain: f64,
    state: ItemState,
    strength: f64,
}

impl MediaItem {
    pub fn new(
        source_index: usize,
        bounds: ItemBounds,
        metrics: ItemMetrics,
        image_size: Option<[u32; 2]>,
        strength_gain: f64,
    ) -> Self {
        Self {
            source_index,
            bounds,
            image_size,
            metrics,
            strength_gain,
            state: ItemState::placed(&bounds, &metrics, 0.0, 0.0),
            strength: 0.0,
        }
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn bounds(&self) -> &ItemBounds {
        &self.bounds
    }

    pub fn metrics(&self) -> &ItemMetrics {
        &self.metrics
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn scale(&self) -> Vec2 {
        self.state.scale
    }

    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    pub fn wrap_offset(&self) -> f64 {
        self.state.wrap_offset
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Reads `scroll.current` and `scroll.last`; both must still describe the
    /// same tick.
    pub fn update(&mut self, scroll: &ScrollState, direction: Direction) -> PlaneFrame {
        let previous = self.state.wrap_offset;
        self.state = self
            .state
            .step(&self.bounds, &self.metrics, scroll.current, direction);
        if self.state.wrap_offset != previous {
            debug!(
                item = self.source_index,
                ?direction,
                wrap_offset = self.state.wrap_offset,
                "item wrapped"
            );
        }
        self.strength = scroll.delta() / self.metrics.screen.width() * self.strength_gain;
        self.frame()
    }

    /// Drops accumulated wrapping and re-places the item against fresh bounds.
    pub fn on_resize(&mut self, resize: ItemResize, bounds: ItemBounds, scroll_current: f64) {
        if let Some(period) = resize.period {
            self.metrics.period = period;
        }
        if let Some(screen) = resize.screen {
            self.metrics.screen = screen;
        }
        if let Some(viewport) = resize.viewport {
            self.metrics.viewport = viewport;
        }
        self.bounds = bounds;
        self.state = ItemState::placed(&self.bounds, &self.metrics, 0.0, scroll_current);
    }

    pub fn frame(&self) -> PlaneFrame {
        PlaneFrame {
            index: self.source_index,
            scale: self.state.scale,
            position: self.state.position,
            strength: self.strength,
            viewport: self.metrics.viewport,
            image_size: self.image_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1000x1000 px mapped onto a 10x10 scene: 1 scene unit per 100 px.
    fn metrics() -> ItemMetrics {
        ItemMetrics {
            screen: ScreenMetrics::new(1000, 1000).unwrap(),
            viewport: ViewportMetrics {
                width: 10.0,
                height: 10.0,
            },
            period: 20.0,
        }
    }

    fn square_at_top() -> ItemBounds {
        ItemBounds {
            top: 0.0,
            left: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }

    #[test]
    fn placement_at_rest() {
        let s = ItemState::placed(&square_at_top(), &metrics(), 0.0, 0.0);
        assert_eq!(s.scale, Vec2::new(1.0, 1.0));
        assert!((s.position.x + 4.5).abs() < 1e-12);
        assert!((s.position.y - 4.5).abs() < 1e-12);
        assert!(!s.is_before && !s.is_after);
    }

    #[test]
    fn down_past_top_edge_wraps_forward() {
        let s = ItemState::default().step(&square_at_top(), &metrics(), 150.0, Direction::Down);
        assert!((s.position.y - 6.0).abs() < 1e-12);
        assert_eq!(s.wrap_offset, 20.0);
        assert!(!s.is_after);
    }

    #[test]
    fn mirrored_pairs_never_wrap() {
        let m = metrics();
        let after = ItemState::default().step(&square_at_top(), &m, 150.0, Direction::Up);
        assert_eq!(after.wrap_offset, 0.0);
        assert!(after.is_after);

        let before = ItemState::default().step(&square_at_top(), &m, -1100.0, Direction::Down);
        assert_eq!(before.wrap_offset, 0.0);
        assert!(before.is_before);
    }

    #[test]
    fn strength_tracks_tick_delta() {
        let mut item = MediaItem::new(3, square_at_top(), metrics(), None, 10.0);
        let mut scroll = ScrollState::new(0.05, 2.0);
        scroll.current = 25.0;
        scroll.last = 20.0;
        let frame = item.update(&scroll, Direction::Down);
        assert_eq!(frame.index, 3);
        assert!((frame.strength - 0.05).abs() < 1e-12);
    }

    #[test]
    fn resize_resets_wrap_offset() {
        let mut item = MediaItem::new(0, square_at_top(), metrics(), None, 10.0);
        let mut scroll = ScrollState::new(0.05, 2.0);
        scroll.current = 150.0;
        item.update(&scroll, Direction::Down);
        assert_eq!(item.wrap_offset(), 20.0);

        item.on_resize(
            ItemResize {
                period: Some(30.0),
                ..ItemResize::default()
            },
            square_at_top(),
            0.0,
        );
        assert_eq!(item.wrap_offset(), 0.0);
        assert_eq!(item.metrics().period, 30.0);
        assert!((item.position().y - 4.5).abs() < 1e-12);
    }
}
