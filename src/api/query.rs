use crate::geometry::Bounds;
use crate::models::{FilterState, ProblemsFilter, ProblemType, SolutionFilter};

/// Query string for `GET /api/data`, in the order the parameters are sent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataQuery {
    pairs: Vec<(&'static str, String)>,
}

impl DataQuery {
    /// Viewport bounds and zoom followed by every active filter. List
    /// parameters repeat their key once per value.
    #[must_use]
    pub fn from_state(state: &FilterState, bounds: &Bounds, zoom: f64) -> Self {
        let mut pairs: Vec<(&'static str, String)> = vec![
            ("min_lat", format!("{:.6}", bounds.south)),
            ("min_lon", format!("{:.6}", bounds.west)),
            ("max_lat", format!("{:.6}", bounds.north)),
            ("max_lon", format!("{:.6}", bounds.east)),
            ("zoom", format!("{}", zoom.floor())),
        ];

        let derived = state.derived();
        pairs.extend(derived.stop_type.iter().map(|s| ("stop_type", s.as_str().to_string())));
        pairs.extend(derived.match_methods.iter().map(|m| ("match_method", (*m).to_string())));

        for filter in state.station_filters() {
            pairs.push(("station_filter", filter.value.clone()));
            pairs.push(("filter_type", filter.kind.as_str().to_string()));
            pairs.push(("route_direction", filter.direction.as_str().to_string()));
        }
        pairs.extend(state.node_types().iter().map(|v| ("node_type", v.clone())));
        pairs.extend(state.transport_types().iter().map(|v| ("transport_type", v.clone())));
        pairs.extend(state.atlas_operators().iter().map(|v| ("atlas_operator", v.clone())));

        if let Some(n) = state.top_n() {
            pairs.push(("top_n", n.to_string()));
        }
        if state.show_duplicates_only() {
            pairs.push(("show_duplicates_only", "true".to_string()));
        }
        Self { pairs }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Values of one parameter, in order
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs.iter().filter(|(k, _)| *k == key).map(|(_, v)| v.as_str()).collect()
    }
}

/// Query string for `GET /api/problems`; unrestricted filters are left out
#[must_use]
pub fn problems_query(filter: &ProblemsFilter) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if filter.problem_type != ProblemType::All {
        pairs.push(("problem_type", filter.problem_type.as_str().to_string()));
    }
    if filter.solution != SolutionFilter::All {
        pairs.push(("solution_status", filter.solution.as_str().to_string()));
    }
    pairs.extend(filter.operators.iter().map(|op| ("operator", op.clone())));
    if let Some(priority) = filter.priority {
        pairs.push(("priority", priority.level().to_string()));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterKind, MatchedNode, Priority, RouteDirection, UnmatchedNode};

    fn bounds() -> Bounds {
        Bounds { south: 46.9, west: 7.4, north: 47.0, east: 7.5 }
    }

    #[test]
    fn test_bounds_come_first() {
        let query = DataQuery::from_state(&FilterState::new(), &bounds(), 13.7);
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["min_lat", "min_lon", "max_lat", "max_lon", "zoom"]);
        assert_eq!(query.values("zoom"), vec!["13"]);
    }

    #[test]
    fn test_filters_are_serialized() {
        let mut state = FilterState::new();
        state.set_matched(MatchedNode::Distance, true);
        state.set_unmatched(UnmatchedNode::OsmNearby, true);
        state.add_station_filter("R7", FilterKind::Route, RouteDirection::Return).expect("valid");
        state.toggle_operator("SBB");
        state.set_top_n(Some(5)).expect("matched active");
        state.set_show_duplicates_only(true);

        let query = DataQuery::from_state(&state, &bounds(), 12.0);
        assert_eq!(query.values("stop_type"), vec!["matched", "unmatched"]);
        assert_eq!(query.values("match_method"), vec![
            "distance_matching_1",
            "distance_matching_2",
            "distance_matching_3a",
            "distance_matching_3b",
            "osm_within_50m",
        ]);
        assert_eq!(query.values("station_filter"), vec!["R7"]);
        assert_eq!(query.values("filter_type"), vec![FilterKind::Route.as_str()]);
        assert_eq!(query.values("route_direction"), vec!["1"]);
        assert_eq!(query.values("atlas_operator"), vec!["SBB"]);
        assert_eq!(query.values("top_n"), vec!["5"]);
        assert_eq!(query.values("show_duplicates_only"), vec!["true"]);
    }

    #[test]
    fn test_problems_query_skips_defaults() {
        assert!(problems_query(&ProblemsFilter::default()).is_empty());
        let filter = ProblemsFilter { priority: Some(Priority::Medium), ..ProblemsFilter::default() };
        assert_eq!(problems_query(&filter), vec![("priority", "2".to_string())]);
    }
}
