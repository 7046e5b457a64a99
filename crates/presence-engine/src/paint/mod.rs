//! Colors for the panel renderers.
//!
//! Everything is linear premultiplied alpha; conversion from sRGB literals
//! happens once at construction.

mod color;

pub use color::Color;
