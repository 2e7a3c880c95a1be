mod batch;
mod cluster;
mod hit_detection;
mod style;

pub use batch::insert_in_batches;
pub use cluster::{MarkerCluster, MarkerDatum, PlacedMarker};
pub use hit_detection::{find_marker_at, ScreenMarker};
pub use style::{marker_color, marker_glyph, IconCache, IconKey, MarkerStyle};
