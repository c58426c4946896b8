//! The per-frame driver that ties scroll, layout and items together.

use tracing::{info, warn};

use crate::error::GalleryError;
use crate::events::InputEvent;
use crate::input::{InputSource, normalize_wheel};
use crate::layout::{LayoutSource, Measurement};
use crate::media::{ItemBounds, ItemMetrics, ItemResize, MediaItem, PlaneFrame};
use crate::scroll::{ScrollController, ScrollSettings, ScrollState};
use crate::viewport::{CameraParams, ScreenMetrics, ViewportMetrics, pixels_to_scene};

/// Receives every plane once per tick, in item order.
pub trait PlaneSink {
    fn plane(&mut self, frame: &PlaneFrame);
}

impl PlaneSink for Vec<PlaneFrame> {
    fn plane(&mut self, frame: &PlaneFrame) {
        self.push(*frame);
    }
}

/// Discards frames; useful when only scroll state matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PlaneSink for NullSink {
    fn plane(&mut self, _frame: &PlaneFrame) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GallerySettings {
    pub camera: CameraParams,
    pub scroll: ScrollSettings,
    pub strength_gain: f64,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            camera: CameraParams::default(),
            scroll: ScrollSettings::default(),
            strength_gain: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleryEngine {
    settings: GallerySettings,
    screen: ScreenMetrics,
    viewport: ViewportMetrics,
    container: ItemBounds,
    period: f64,
    scroll: ScrollController,
    items: Vec<MediaItem>,
    frames: u64,
}

impl GalleryEngine {
    /// Measure the layout once and create one item per measured element.
    pub fn init(
        layout: &dyn LayoutSource,
        width: u32,
        height: u32,
        settings: GallerySettings,
    ) -> Result<Self, GalleryError> {
        let screen = ScreenMetrics::new(width, height)?;
        let viewport = settings.camera.viewport_for(&screen);
        let Measurement {
            container,
            elements,
        } = layout.measure(&screen);
        let period = pixels_to_scene(container.height, screen.height(), viewport.height);
        let metrics = ItemMetrics {
            screen,
            viewport,
            period,
        };

        let mut items = Vec::with_capacity(elements.len());
        for (index, bounds) in elements.into_iter().enumerate() {
            match bounds {
                Some(bounds) => items.push(MediaItem::new(
                    index,
                    bounds,
                    metrics,
                    layout.image_size(index),
                    settings.strength_gain,
                )),
                None => warn!(element = index, "element has no bounds; excluded from gallery"),
            }
        }

        info!(
            items = items.len(),
            width,
            height,
            viewport_w = viewport.width,
            viewport_h = viewport.height,
            period,
            "gallery initialized"
        );

        Ok(Self {
            settings,
            screen,
            viewport,
            container,
            period,
            scroll: ScrollController::new(settings.scroll),
            items,
            frames: 0,
        })
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn screen(&self) -> &ScreenMetrics {
        &self.screen
    }

    pub fn viewport(&self) -> &ViewportMetrics {
        &self.viewport
    }

    pub fn container(&self) -> &ItemBounds {
        &self.container
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Ticks completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Wheel(delta) => self.scroll.on_wheel_delta(normalize_wheel(delta)),
            InputEvent::PointerDown { y } => self.scroll.on_drag_start(y),
            InputEvent::PointerMove { y } => self.scroll.on_drag_move(y),
            InputEvent::PointerUp => self.scroll.on_drag_end(),
        }
    }

    /// Apply everything the source has for the upcoming frame.
    pub fn drain_input(&mut self, input: &mut dyn InputSource) -> usize {
        input.begin_frame(self.frames);
        let mut applied = 0;
        while let Some(event) = input.poll_event() {
            self.handle_input(event);
            applied += 1;
        }
        applied
    }

    /// Advance one frame. Every item sees the same snapshot, whose `last` is
    /// the previous frame's `current`; `last` moves forward only afterwards.
    pub fn tick(&mut self, sink: &mut dyn PlaneSink) -> ScrollState {
        let autoplay = self.scroll.speed();
        let snapshot = self.scroll.advance(autoplay);
        for item in &mut self.items {
            let frame = item.update(&snapshot, snapshot.direction);
            sink.plane(&frame);
        }
        self.scroll.commit();
        self.frames += 1;
        snapshot
    }

    /// Re-measure for a new screen size. A zero dimension is rejected and the
    /// previous metrics stay in place. Drag state is left as is.
    pub fn on_resize(
        &mut self,
        layout: &dyn LayoutSource,
        width: u32,
        height: u32,
    ) -> Result<(), GalleryError> {
        let screen = ScreenMetrics::new(width, height)?;
        let viewport = self.settings.camera.viewport_for(&screen);
        let Measurement {
            container,
            elements,
        } = layout.measure(&screen);
        let period = pixels_to_scene(container.height, screen.height(), viewport.height);

        self.screen = screen;
        self.viewport = viewport;
        self.container = container;
        self.period = period;

        let resize = ItemResize {
            period: Some(period),
            screen: Some(screen),
            viewport: Some(viewport),
        };
        let current = self.scroll.state().current;
        for item in &mut self.items {
            let index = item.source_index();
            let bounds = match elements.get(index).copied().flatten() {
                Some(bounds) => bounds,
                None => {
                    warn!(element = index, "element lost its bounds; keeping previous layout");
                    *item.bounds()
                }
            };
            item.on_resize(resize, bounds, current);
        }

        info!(
            width,
            height,
            viewport_w = viewport.width,
            viewport_h = viewport.height,
            period,
            "gallery resized"
        );
        Ok(())
    }
}
