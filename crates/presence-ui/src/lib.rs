//! Presence UI: the panel composited into the headset view.
//!
//! - `presence`: the group presence capability and its mocked implementation
//! - `panel`: fixed layout, hit testing and painting of the test panel
//! - `delegate`: the `RenderDelegate` that ties both to the frame loop

pub mod delegate;
pub mod panel;
pub mod presence;

pub use delegate::{PanelDelegate, PanelModel};
pub use panel::{Panel, PanelAction, PanelLayout};
pub use presence::{MockPresence, PresenceService, PresenceState, startup_banner};
