//! Pixel layout of the gallery column(s).
//!
//! The engine never measures anything itself; it asks a [`LayoutSource`] for
//! the container box and one box per element. [`ColumnLayout`] is the masonry
//! layout the host uses.

use crate::media::ItemBounds;
use crate::viewport::ScreenMetrics;

/// Result of measuring the whole element set against one screen size.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub container: ItemBounds,
    /// One entry per source element; `None` when the element could not be measured.
    pub elements: Vec<Option<ItemBounds>>,
}

pub trait LayoutSource {
    fn measure(&self, screen: &ScreenMetrics) -> Measurement;

    /// Natural pixel size of the element's media, if known.
    fn image_size(&self, _index: usize) -> Option<[u32; 2]> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutElement {
    Image { width: u32, height: u32 },
    /// Size unknown; laid out with the fallback aspect.
    Placeholder,
    /// Source could not be read; never measured.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub columns: usize,
    pub gap_px: f64,
    pub padding_px: f64,
    /// Height / width used for placeholders.
    pub fallback_aspect: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            columns: 3,
            gap_px: 40.0,
            padding_px: 80.0,
            fallback_aspect: 1.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnLayout {
    settings: LayoutSettings,
    elements: Vec<LayoutElement>,
}

impl ColumnLayout {
    pub fn new(settings: LayoutSettings, elements: Vec<LayoutElement>) -> Self {
        Self { settings, elements }
    }

    pub fn placeholders(settings: LayoutSettings, count: usize) -> Self {
        Self::new(settings, vec![LayoutElement::Placeholder; count])
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    fn column_width(&self, screen: &ScreenMetrics) -> f64 {
        let LayoutSettings {
            columns,
            gap_px,
            padding_px,
            ..
        } = self.settings;
        let columns = columns.max(1) as f64;
        (screen.width() - 2.0 * padding_px - (columns - 1.0) * gap_px) / columns
    }

    fn aspect_of(&self, element: &LayoutElement) -> Option<f64> {
        match *element {
            LayoutElement::Image { width, height } if width > 0 && height > 0 => {
                Some(f64::from(height) / f64::from(width))
            }
            LayoutElement::Image { .. } | LayoutElement::Placeholder => {
                Some(self.settings.fallback_aspect)
            }
            LayoutElement::Missing => None,
        }
    }
}

impl LayoutSource for ColumnLayout {
    fn measure(&self, screen: &ScreenMetrics) -> Measurement {
        let LayoutSettings {
            gap_px, padding_px, ..
        } = self.settings;
        let column_width = self.column_width(screen);
        let mut column_heights = vec![padding_px; self.settings.columns.max(1)];
        let mut placed_any = false;

        let elements = self
            .elements
            .iter()
            .map(|element| {
                if column_width <= 0.0 {
                    return None;
                }
                let aspect = self.aspect_of(element)?;
                // first shortest column wins ties
                let (column, top) = column_heights.iter().copied().enumerate().fold(
                    (0, f64::INFINITY),
                    |best, (idx, h)| if h < best.1 { (idx, h) } else { best },
                );
                let height = column_width * aspect;
                column_heights[column] = top + height + gap_px;
                placed_any = true;
                Some(ItemBounds {
                    top,
                    left: padding_px + column as f64 * (column_width + gap_px),
                    width: column_width,
                    height,
                })
            })
            .collect();

        let content_bottom = if placed_any {
            column_heights.iter().copied().fold(0.0, f64::max) - gap_px
        } else {
            padding_px
        };

        Measurement {
            container: ItemBounds {
                top: 0.0,
                left: 0.0,
                width: screen.width(),
                height: content_bottom + padding_px,
            },
            elements,
        }
    }

    fn image_size(&self, index: usize) -> Option<[u32; 2]> {
        match self.elements.get(index)? {
            LayoutElement::Image { width, height } => Some([*width, *height]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LayoutSettings {
        LayoutSettings {
            columns: 2,
            gap_px: 20.0,
            padding_px: 40.0,
            fallback_aspect: 1.0,
        }
    }

    #[test]
    fn fills_shortest_column_first() {
        // column width = (1000 - 80 - 20) / 2 = 450
        let layout = ColumnLayout::new(
            settings(),
            vec![
                LayoutElement::Image {
                    width: 100,
                    height: 200,
                },
                LayoutElement::Placeholder,
                LayoutElement::Placeholder,
            ],
        );
        let screen = ScreenMetrics::new(1000, 800).unwrap();
        let m = layout.measure(&screen);

        let a = m.elements[0].unwrap();
        let b = m.elements[1].unwrap();
        let c = m.elements[2].unwrap();
        assert_eq!((a.top, a.left, a.width, a.height), (40.0, 40.0, 450.0, 900.0));
        assert_eq!((b.top, b.left), (40.0, 510.0));
        // right column is shorter after two items
        assert_eq!((c.top, c.left), (510.0, 510.0));
        // tallest column ends at 510 + 450 = 960, plus bottom padding
        assert_eq!(m.container.height, 1000.0);
    }

    #[test]
    fn missing_elements_are_unmeasured() {
        let layout = ColumnLayout::new(
            settings(),
            vec![LayoutElement::Missing, LayoutElement::Placeholder],
        );
        let m = layout.measure(&ScreenMetrics::new(1000, 800).unwrap());
        assert!(m.elements[0].is_none());
        assert_eq!(m.elements[1].unwrap().left, 40.0);
        assert_eq!(layout.image_size(0), None);
    }

    #[test]
    fn empty_layout_is_just_padding() {
        let layout = ColumnLayout::placeholders(settings(), 0);
        let m = layout.measure(&ScreenMetrics::new(1000, 800).unwrap());
        assert!(m.elements.is_empty());
        assert_eq!(m.container.height, 80.0);
    }
}
