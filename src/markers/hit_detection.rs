use crate::geometry::{screen_distance, LatLon};
use crate::models::MarkerKey;
use super::cluster::PlacedMarker;

/// A marker as last drawn on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMarker {
    pub key: MarkerKey,
    pub record: usize,
    pub screen: (f64, f64),
    pub radius: f64,
    /// Where the marker was drawn, after any cluster spread
    pub position: LatLon,
}

impl ScreenMarker {
    #[must_use]
    pub fn drawn(placed: &PlacedMarker, screen: (f64, f64), radius: f64) -> Self {
        Self { key: placed.datum.key(), record: placed.datum.record, screen, radius, position: placed.position }
    }
}

/// Topmost marker under the pointer. Markers are drawn in slice order, so the
/// search runs backwards.
#[must_use]
pub fn find_marker_at(markers: &[ScreenMarker], x: f64, y: f64) -> Option<&ScreenMarker> {
    markers.iter().rev().find(|m| screen_distance(m.screen, (x, y)) <= m.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{MarkerCluster, MarkerDatum};
    use crate::models::StopSide;

    fn marker(stop_id: i64, x: f64, y: f64) -> ScreenMarker {
        ScreenMarker {
            key: MarkerKey { side: StopSide::Atlas, stop_id },
            record: 0,
            screen: (x, y),
            radius: 6.0,
            position: LatLon::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_topmost_marker_wins() {
        let markers = [marker(1, 100.0, 100.0), marker(2, 103.0, 100.0)];
        assert_eq!(find_marker_at(&markers, 101.0, 100.0).map(|m| m.key.stop_id), Some(2));
        assert_eq!(find_marker_at(&markers, 95.0, 100.0).map(|m| m.key.stop_id), Some(1));
        assert!(find_marker_at(&markers, 200.0, 200.0).is_none());
    }

    #[test]
    fn test_spread_marker_keeps_its_own_position() {
        let mut cluster = MarkerCluster::new();
        for (stop_id, side) in [(1, StopSide::Atlas), (2, StopSide::Osm)] {
            let datum = MarkerDatum { position: LatLon::new(46.95, 7.44), side, color: "#000", stop_id, record: 0 };
            cluster.add_marker(46.95, 7.44, datum);
        }
        let placed = cluster.layout();
        let osm = placed.iter().find(|m| m.datum.side == StopSide::Osm).expect("osm marker placed");
        let drawn = ScreenMarker::drawn(osm, (10.0, 10.0), 6.0);
        assert_eq!(drawn.key, MarkerKey { side: StopSide::Osm, stop_id: 2 });
        assert_eq!(drawn.position, osm.position);
        assert_ne!(drawn.position, osm.center);
    }
}
