//! Draw stream for the panel.
//!
//! Shapes are recorded in panel pixels with a z-index and painted
//! back-to-front; equal z keeps insertion order.

mod key;
mod list;
mod shape;

pub use key::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
pub use shape::{Border, Shape};
