use crate::coords::{Rect, Vec2};
use crate::paint::Color;

/// Outline drawn on the outer edge of a shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    #[inline]
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// One primitive the panel renderer knows how to draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
        border: Option<Border>,
    },
}

impl Shape {
    /// Axis-aligned bounds, border included.
    pub fn bounds(&self) -> Rect {
        match *self {
            Shape::Rect { rect, .. } => rect,
            Shape::Circle { center, radius, .. } => {
                Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
            }
        }
    }

    /// Whether drawing this would touch no pixels.
    pub fn is_invisible(&self) -> bool {
        match *self {
            Shape::Rect { rect, color } => rect.is_empty() || color.a <= 0.0,
            Shape::Circle { radius, fill, border, .. } => {
                radius <= 0.0
                    || (fill.a <= 0.0 && border.is_none_or(|b| b.width <= 0.0 || b.color.a <= 0.0))
            }
        }
    }
}
