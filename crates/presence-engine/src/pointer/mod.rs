//! Controller ray → panel pixel projection.
//!
//! The panel is a flat quad facing +Z in the reference space. Pixel space is
//! the panel texture's: origin top-left, +X right, +Y down.

mod geometry;
mod projector;
mod state;

pub use geometry::{PanelGeometry, ProjectorParams};
pub use projector::{forward, project};
pub use state::{PointerSample, PointerState};
