pub mod content;
pub mod geometry;
pub mod loader;
pub mod registry;

pub use content::{build_bubble, build_bubbles, group_routes, Bubble, BubbleField, GroupedRoute, PopupView};
pub use geometry::{clamp_width, drag_handle_rect, max_width_for_bubbles, resize_edge_at, Interaction, InteractionError, PopupGeometry, Rect, ResizeEdge};
pub use loader::{LoadState, LoadTicket, PopupLoader};
pub use registry::{ConnectorLine, OpenPopups, PopupInstance};
