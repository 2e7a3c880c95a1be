use indexmap::IndexMap;
use std::f64::consts::TAU;
use crate::constants::{CLUSTER_RADIUS_M, CLUSTER_TOLERANCE_DEG};
use crate::geometry::{offset_by_meters, LatLon};
use crate::models::{MarkerKey, StopRecord, StopSide};
use super::style::marker_color;

/// One marker before layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerDatum {
    pub position: LatLon,
    pub side: StopSide,
    pub color: &'static str,
    pub stop_id: i64,
    /// Index of the record in the viewport's record list
    pub record: usize,
}

impl MarkerDatum {
    #[must_use]
    pub fn key(&self) -> MarkerKey {
        MarkerKey { side: self.side, stop_id: self.stop_id }
    }
}

/// A marker with its final (possibly spread out) position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedMarker {
    pub datum: MarkerDatum,
    pub position: LatLon,
    /// Shared coordinate of the bucket the marker was spread around
    pub center: LatLon,
}

type BucketKey = (i64, i64);

#[allow(clippy::cast_possible_truncation)]
fn quantize(p: LatLon) -> BucketKey {
    ((p.lat / CLUSTER_TOLERANCE_DEG).round() as i64, (p.lon / CLUSTER_TOLERANCE_DEG).round() as i64)
}

/// Groups markers that share (almost) the same coordinate so they can be
/// fanned out around it and stay individually clickable.
#[derive(Debug, Default)]
pub struct MarkerCluster {
    buckets: IndexMap<BucketKey, Vec<MarkerDatum>>,
}

impl MarkerCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers for every side of every record that has coordinates
    #[must_use]
    pub fn from_records(records: &[StopRecord]) -> Self {
        let mut cluster = Self::new();
        for (index, record) in records.iter().enumerate() {
            for side in record.sides() {
                let Some(position) = record.position(side) else { continue };
                cluster.add_marker(position.lat, position.lon, MarkerDatum {
                    position,
                    side,
                    color: marker_color(record, side),
                    stop_id: record.id,
                    record: index,
                });
            }
        }
        cluster
    }

    pub fn add_marker(&mut self, lat: f64, lon: f64, datum: MarkerDatum) {
        self.buckets.entry(quantize(LatLon::new(lat, lon))).or_default().push(datum);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Final positions. Within a bucket ATLAS markers come first, then the
    /// markers are spaced evenly on a circle of fixed radius.
    #[must_use]
    pub fn layout(&self) -> Vec<PlacedMarker> {
        let mut placed = Vec::with_capacity(self.len());
        for bucket in self.buckets.values() {
            let Some(first) = bucket.first() else { continue };
            if bucket.len() == 1 {
                placed.push(PlacedMarker { datum: *first, position: first.position, center: first.position });
                continue;
            }

            let mut sorted = bucket.clone();
            sorted.sort_by_key(|d| d.side);

            #[allow(clippy::cast_precision_loss)]
            let n = sorted.len() as f64;
            let center = first.position;
            for (i, datum) in sorted.into_iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU * i as f64 / n;
                let position = offset_by_meters(center, CLUSTER_RADIUS_M * angle.sin(), CLUSTER_RADIUS_M * angle.cos());
                placed.push(PlacedMarker { datum, position, center });
            }
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::haversine_m;
    use crate::models::StopKind;

    fn datum(side: StopSide, stop_id: i64, lat: f64, lon: f64) -> MarkerDatum {
        MarkerDatum { position: LatLon::new(lat, lon), side, color: "#000", stop_id, record: 0 }
    }

    fn bearing(center: LatLon, p: LatLon) -> f64 {
        let east = (p.lon - center.lon) * center.lat.to_radians().cos();
        let north = p.lat - center.lat;
        east.atan2(north).rem_euclid(TAU)
    }

    #[test]
    fn test_three_identical_markers_spread_evenly() {
        let mut cluster = MarkerCluster::new();
        for (i, side) in [StopSide::Osm, StopSide::Atlas, StopSide::Osm].into_iter().enumerate() {
            cluster.add_marker(46.95, 7.44, datum(side, i64::try_from(i).expect("small"), 46.95, 7.44));
        }
        let placed = cluster.layout();
        assert_eq!(placed.len(), 3);
        assert_eq!(placed[0].datum.side, StopSide::Atlas);

        let mut angles: Vec<f64> = placed.iter().map(|m| bearing(m.center, m.position)).collect();
        angles.sort_by(f64::total_cmp);
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - TAU / 3.0).abs() < 1e-3, "angles {angles:?}");
        }
        for m in &placed {
            assert!((haversine_m(m.center, m.position) - CLUSTER_RADIUS_M).abs() < 0.01);
        }
    }

    #[test]
    fn test_single_marker_has_no_offset() {
        let mut cluster = MarkerCluster::new();
        cluster.add_marker(47.0, 8.0, datum(StopSide::Atlas, 1, 47.0, 8.0));
        cluster.add_marker(47.1, 8.0, datum(StopSide::Osm, 2, 47.1, 8.0));
        let placed = cluster.layout();
        assert_eq!(cluster.bucket_count(), 2);
        for m in placed {
            assert_eq!(m.position, m.datum.position);
        }
    }

    #[test]
    fn test_markers_within_tolerance_share_a_bucket() {
        let mut cluster = MarkerCluster::new();
        cluster.add_marker(47.000_001, 8.0, datum(StopSide::Atlas, 1, 47.000_001, 8.0));
        cluster.add_marker(47.000_002, 8.0, datum(StopSide::Osm, 2, 47.000_002, 8.0));
        cluster.add_marker(47.001, 8.0, datum(StopSide::Osm, 3, 47.001, 8.0));
        assert_eq!(cluster.bucket_count(), 2);
        assert_eq!(cluster.len(), 3);
    }

    #[test]
    fn test_from_records_emits_both_sides_of_a_match() {
        let records = vec![
            StopRecord {
                id: 1,
                stop_type: StopKind::Matched,
                atlas_lat: Some(47.0),
                atlas_lon: Some(8.0),
                osm_lat: Some(47.0001),
                osm_lon: Some(8.0001),
                ..StopRecord::default()
            },
            StopRecord { id: 2, stop_type: StopKind::Unmatched, ..StopRecord::default() },
        ];
        let cluster = MarkerCluster::from_records(&records);
        assert_eq!(cluster.len(), 2);
        let keys: Vec<MarkerKey> = cluster.layout().iter().map(|m| m.datum.key()).collect();
        assert!(keys.contains(&MarkerKey { side: StopSide::Atlas, stop_id: 1 }));
        assert!(keys.contains(&MarkerKey { side: StopSide::Osm, stop_id: 1 }));
    }
}
