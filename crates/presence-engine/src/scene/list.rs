use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::{Border, Shape, SortKey, ZIndex};

/// A recorded shape with its paint-order key.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub shape: Shape,
}

/// Shapes recorded for one panel frame.
///
/// `push` is O(1); the paint-order index buffer is reused across frames.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,
    sorted: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all items, keeping capacity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.sorted.clear();
        self.next_order = 0;
        self.sorted_dirty = false;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Records `shape` unless it would be invisible.
    pub fn push(&mut self, z: ZIndex, shape: Shape) {
        if shape.is_invisible() {
            return;
        }
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            shape,
        });
        self.sorted_dirty = true;
    }

    pub fn fill_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push(z, Shape::Rect { rect, color });
    }

    pub fn circle(&mut self, z: ZIndex, center: Vec2, radius: f32, fill: Color, border: Option<Border>) {
        self.push(z, Shape::Circle { center, radius, fill, border });
    }

    /// Unfilled circle outline.
    pub fn ring(&mut self, z: ZIndex, center: Vec2, radius: f32, width: f32, color: Color) {
        self.circle(z, center, radius, Color::TRANSPARENT, Some(Border::new(width, color)));
    }

    /// Items back-to-front.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.sorted.clear();
            self.sorted.extend(0..self.items.len());
            let items = &self.items;
            self.sorted.sort_by_key(|&i| items[i].key);
            self.sorted_dirty = false;
        }
        self.sorted.iter().map(|&i| &self.items[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(n: f32) -> Rect {
        Rect::new(n, n, 10.0, 10.0)
    }

    fn origins(list: &mut DrawList) -> Vec<f32> {
        list.iter_in_paint_order()
            .map(|item| item.shape.bounds().origin.x)
            .collect()
    }

    #[test]
    fn paint_order_is_z_then_insertion() {
        let mut list = DrawList::new();
        list.fill_rect(ZIndex(2), rect(0.0), Color::WHITE);
        list.fill_rect(ZIndex(1), rect(1.0), Color::WHITE);
        list.fill_rect(ZIndex(2), rect(2.0), Color::WHITE);
        list.fill_rect(ZIndex(-1), rect(3.0), Color::WHITE);
        assert_eq!(origins(&mut list), vec![3.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn order_refreshes_after_push() {
        let mut list = DrawList::new();
        list.fill_rect(ZIndex(5), rect(0.0), Color::WHITE);
        assert_eq!(origins(&mut list), vec![0.0]);
        list.fill_rect(ZIndex(0), rect(1.0), Color::WHITE);
        assert_eq!(origins(&mut list), vec![1.0, 0.0]);
    }

    #[test]
    fn invisible_shapes_are_dropped() {
        let mut list = DrawList::new();
        list.fill_rect(ZIndex(0), Rect::new(0.0, 0.0, 0.0, 5.0), Color::WHITE);
        list.fill_rect(ZIndex(0), rect(0.0), Color::TRANSPARENT);
        list.circle(ZIndex(0), Vec2::ZERO, 0.0, Color::WHITE, None);
        list.circle(ZIndex(0), Vec2::ZERO, 4.0, Color::TRANSPARENT, None);
        assert!(list.is_empty());

        list.ring(ZIndex(0), Vec2::ZERO, 4.0, 1.0, Color::WHITE);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_resets_order() {
        let mut list = DrawList::new();
        list.fill_rect(ZIndex(0), rect(0.0), Color::WHITE);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter_in_paint_order().count(), 0);
        list.fill_rect(ZIndex(0), rect(1.0), Color::WHITE);
        assert_eq!(list.items()[0].key.order, 0);
    }

    #[test]
    fn circle_bounds_cover_radius() {
        let s = Shape::Circle {
            center: Vec2::new(10.0, 20.0),
            radius: 5.0,
            fill: Color::WHITE,
            border: None,
        };
        assert_eq!(s.bounds(), Rect::new(5.0, 15.0, 10.0, 10.0));
    }
}
