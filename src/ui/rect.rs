//! Rectangle primitives
//!
//! Menu space is normalized: `(0, 0)` is the bottom-left corner of the
//! window and `(1, 1)` the top-right, so y grows upward.

use glam::{Vec2, Vec4};
use smallvec::SmallVec;

/// One flat colored quad in menu space, ready for the UI pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiQuad {
    /// Bottom-left corner
    pub min: Vec2,
    /// Top-right corner
    pub max: Vec2,
    pub color: Vec4,
}

impl UiQuad {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2, color: Vec4) -> Self {
        Self { min, max, color }
    }
}

/// Rectangle style
#[derive(Debug, Clone, Copy)]
pub struct RectStyle {
    pub background_color: Vec4,
    pub border_color: Vec4,
    /// Border width in menu units; zero draws no border
    pub border_width: f32,
}

impl Default for RectStyle {
    fn default() -> Self {
        Self {
            background_color: Vec4::new(0.05, 0.05, 0.12, 0.85),
            border_color: Vec4::new(1.0, 0.78, 0.125, 1.0),
            border_width: 0.004,
        }
    }
}

impl RectStyle {
    #[must_use]
    pub const fn with_background(mut self, color: Vec4) -> Self {
        self.background_color = color;
        self
    }
}

/// A styled rectangle placed by its center
#[derive(Debug, Clone)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
    pub style: RectStyle,
}

impl Rect {
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            style: RectStyle::default(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: RectStyle) -> Self {
        self.style = style;
        self
    }

    /// `(min, max)` corners
    #[must_use]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.size * 0.5;
        (self.center - half, self.center + half)
    }

    /// Inclusive on every edge
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = self.bounds();
        point.cmpge(min).all() && point.cmple(max).all()
    }

    /// Background plus four border strips
    #[must_use]
    pub fn quads(&self) -> SmallVec<[UiQuad; 5]> {
        let (min, max) = self.bounds();
        let mut quads = SmallVec::new();
        quads.push(UiQuad::new(min, max, self.style.background_color));

        let w = self.style.border_width;
        if w > 0.0 {
            let color = self.style.border_color;
            quads.push(UiQuad::new(min, Vec2::new(max.x, min.y + w), color));
            quads.push(UiQuad::new(Vec2::new(min.x, max.y - w), max, color));
            quads.push(UiQuad::new(min, Vec2::new(min.x + w, max.y), color));
            quads.push(UiQuad::new(Vec2::new(max.x - w, min.y), max, color));
        }
        quads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::centered(Vec2::new(0.2, 0.15), Vec2::new(0.2, 0.1));

        assert!(rect.contains(Vec2::new(0.2, 0.15)));
        assert!(rect.contains(Vec2::new(0.1, 0.1)));
        assert!(!rect.contains(Vec2::new(0.05, 0.05)));
    }

    #[test]
    fn test_bounds_around_center() {
        let rect = Rect::centered(Vec2::splat(0.5), Vec2::new(0.4, 0.2));
        let (min, max) = rect.bounds();
        assert!((min - Vec2::new(0.3, 0.4)).length() < 1e-6);
        assert!((max - Vec2::new(0.7, 0.6)).length() < 1e-6);
    }

    #[test]
    fn test_quads_with_and_without_border() {
        let rect = Rect::centered(Vec2::splat(0.5), Vec2::new(0.2, 0.1));
        assert_eq!(rect.quads().len(), 5);

        let plain = rect.with_style(RectStyle {
            border_width: 0.0,
            ..RectStyle::default()
        });
        assert_eq!(plain.quads().len(), 1);
    }
}
