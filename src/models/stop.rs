use serde::{Deserialize, Serialize};
use crate::geometry::LatLon;

/// Which dataset a record (or a marker) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopSide {
    Atlas,
    Osm,
}

impl StopSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atlas => "atlas",
            Self::Osm => "osm",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Atlas => "ATLAS",
            Self::Osm => "OSM",
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Atlas => Self::Osm,
            Self::Osm => Self::Atlas,
        }
    }
}

/// Identity of one map marker: a record seen from one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub side: StopSide,
    pub stop_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    Matched,
    #[default]
    Unmatched,
    /// OSM node without any ATLAS counterpart
    Osm,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteInfo {
    pub route_id: String,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub direction_id: Option<String>,
}

/// One stop row as delivered by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StopRecord {
    pub id: i64,
    pub stop_type: StopKind,

    pub sloid: Option<String>,
    pub uic_ref: Option<String>,
    pub atlas_designation_official: Option<String>,
    pub atlas_designation: Option<String>,
    pub atlas_lat: Option<f64>,
    pub atlas_lon: Option<f64>,
    pub atlas_business_org_abbr: Option<String>,
    pub atlas_duplicate_sloid: Option<String>,
    pub atlas_note: Option<String>,
    pub atlas_note_author: Option<String>,
    pub routes_atlas: Vec<RouteInfo>,

    pub osm_node_id: Option<String>,
    pub osm_name: Option<String>,
    pub osm_local_ref: Option<String>,
    pub osm_lat: Option<f64>,
    pub osm_lon: Option<f64>,
    pub osm_operator: Option<String>,
    pub osm_node_type: Option<String>,
    pub osm_public_transport: Option<String>,
    pub osm_note: Option<String>,
    pub osm_note_author: Option<String>,
    pub routes_osm: Vec<RouteInfo>,

    pub match_type: Option<String>,
    pub distance_m: Option<f64>,
    pub transport_types: Vec<String>,

    /// Further records correlated with this one, only filled by the popup endpoint
    pub matches: Vec<StopRecord>,
}

impl StopRecord {
    #[must_use]
    pub fn position(&self, side: StopSide) -> Option<LatLon> {
        match side {
            StopSide::Atlas => Some(LatLon::new(self.atlas_lat?, self.atlas_lon?)),
            StopSide::Osm => Some(LatLon::new(self.osm_lat?, self.osm_lon?)),
        }
    }

    /// Sides that carry data for this record
    #[must_use]
    pub fn sides(&self) -> Vec<StopSide> {
        match self.stop_type {
            StopKind::Matched => vec![StopSide::Atlas, StopSide::Osm],
            StopKind::Unmatched => vec![StopSide::Atlas],
            StopKind::Osm => vec![StopSide::Osm],
        }
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.stop_type == StopKind::Matched
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.atlas_duplicate_sloid.as_deref().is_some_and(|s| !s.is_empty())
    }

    #[must_use]
    pub fn routes(&self, side: StopSide) -> &[RouteInfo] {
        match side {
            StopSide::Atlas => &self.routes_atlas,
            StopSide::Osm => &self.routes_osm,
        }
    }

    /// Human readable name for the given side
    #[must_use]
    pub fn name(&self, side: StopSide) -> &str {
        let name = match side {
            StopSide::Atlas => self.atlas_designation_official.as_deref(),
            StopSide::Osm => self.osm_name.as_deref(),
        };
        name.unwrap_or("")
    }

    /// True when both sides name an operator and they disagree
    #[must_use]
    pub fn operator_mismatch(&self) -> bool {
        match (self.atlas_business_org_abbr.as_deref(), self.osm_operator.as_deref()) {
            (Some(a), Some(o)) if !a.is_empty() && !o.is_empty() => !a.eq_ignore_ascii_case(o),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sparse_record() {
        let json = r#"{"id": 7, "stop_type": "osm", "osm_node_id": "123", "osm_lat": 47.1, "osm_lon": 8.2}"#;
        let record: StopRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(record.stop_type, StopKind::Osm);
        assert_eq!(record.sides(), vec![StopSide::Osm]);
        assert_eq!(record.position(StopSide::Osm), Some(LatLon::new(47.1, 8.2)));
        assert_eq!(record.position(StopSide::Atlas), None);
        assert!(record.routes_osm.is_empty());
    }

    #[test]
    fn test_operator_mismatch_ignores_case_and_missing() {
        let mut record = StopRecord {
            atlas_business_org_abbr: Some("SBB".to_string()),
            osm_operator: Some("sbb".to_string()),
            ..StopRecord::default()
        };
        assert!(!record.operator_mismatch());
        record.osm_operator = Some("BLS".to_string());
        assert!(record.operator_mismatch());
        record.osm_operator = None;
        assert!(!record.operator_mismatch());
    }

    #[test]
    fn test_duplicate_flag() {
        let mut record = StopRecord::default();
        assert!(!record.is_duplicate());
        record.atlas_duplicate_sloid = Some("ch:1:sloid:7000:1".to_string());
        assert!(record.is_duplicate());
    }
}
