/// Wheel movement as reported by the platform, before normalization.
///
/// Positive values scroll toward the end of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    Pixels(f64),
    Lines(f64),
    Pages(f64),
}

/// Input the scroll controller understands. `y` is the pointer's vertical
/// position in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel(WheelDelta),
    PointerDown { y: f64 },
    PointerMove { y: f64 },
    PointerUp,
}
