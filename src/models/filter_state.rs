use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;
use serde::{Deserialize, Serialize};
use super::check_tree::{CheckNode, TriState};

/// What a station filter value identifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// UIC station number
    Station,
    /// ATLAS SLOID
    Atlas,
    /// OSM node id
    Osm,
    /// GTFS route id
    Route,
    HrdfRoute,
    /// Free text matched against names
    Custom,
}

impl FilterKind {
    pub const ALL: [Self; 6] = [Self::Station, Self::Atlas, Self::Osm, Self::Route, Self::HrdfRoute, Self::Custom];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Atlas => "atlas",
            Self::Osm => "osm",
            Self::Route => "route",
            Self::HrdfRoute => "hrdf_route",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Station => "UIC",
            Self::Atlas => "SLOID",
            Self::Osm => "OSM node",
            Self::Route => "Route",
            Self::HrdfRoute => "HRDF route",
            Self::Custom => "Text",
        }
    }

    #[must_use]
    pub const fn is_route(self) -> bool {
        matches!(self, Self::Route | Self::HrdfRoute)
    }
}

/// Direction restriction of a route filter, wire values '', '0' and '1'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RouteDirection {
    #[default]
    #[serde(rename = "")]
    Any,
    #[serde(rename = "0")]
    Outbound,
    #[serde(rename = "1")]
    Return,
}

impl RouteDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Outbound => "0",
            Self::Return => "1",
        }
    }

    /// Unknown values mean no restriction
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "0" => Self::Outbound,
            "1" => Self::Return,
            _ => Self::Any,
        }
    }

    /// '' -> '0' -> '1' -> ''
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Any => Self::Outbound,
            Self::Outbound => Self::Return,
            Self::Return => Self::Any,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Any => "both directions",
            Self::Outbound => "direction 0",
            Self::Return => "direction 1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationFilter {
    pub value: String,
    pub kind: FilterKind,
    pub direction: RouteDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchedNode {
    All,
    Exact,
    Name,
    Manual,
    Distance,
    Stage1,
    Stage2,
    Stage3a,
    Stage3b,
    Route,
    Gtfs,
    Hrdf,
}

impl MatchedNode {
    /// Identifier sent to the backend, `None` for group nodes
    #[must_use]
    pub const fn method_id(self) -> Option<&'static str> {
        match self {
            Self::Exact => Some("exact"),
            Self::Name => Some("name"),
            Self::Manual => Some("manual"),
            Self::Stage1 => Some("distance_matching_1"),
            Self::Stage2 => Some("distance_matching_2"),
            Self::Stage3a => Some("distance_matching_3a"),
            Self::Stage3b => Some("distance_matching_3b"),
            Self::Gtfs => Some("route_gtfs"),
            Self::Hrdf => Some("route_hrdf"),
            Self::All | Self::Distance | Self::Route => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All matched",
            Self::Exact => "Exact",
            Self::Name => "Name",
            Self::Manual => "Manual",
            Self::Distance => "Distance",
            Self::Stage1 => "Stage 1",
            Self::Stage2 => "Stage 2",
            Self::Stage3a => "Stage 3a",
            Self::Stage3b => "Stage 3b",
            Self::Route => "Route",
            Self::Gtfs => "GTFS",
            Self::Hrdf => "HRDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnmatchedNode {
    All,
    NoNearbyOsm,
    OsmNearby,
}

impl UnmatchedNode {
    #[must_use]
    pub const fn method_id(self) -> Option<&'static str> {
        match self {
            Self::NoNearbyOsm => Some("no_osm_within_50m"),
            Self::OsmNearby => Some("osm_within_50m"),
            Self::All => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All unmatched",
            Self::NoNearbyOsm => "No OSM within 50 m",
            Self::OsmNearby => "OSM within 50 m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopStatus {
    Matched,
    Unmatched,
}

impl StopStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Unmatched => "unmatched",
        }
    }
}

/// Fields computed from the leaf flags; never edited directly
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Derived {
    pub stop_type: Vec<StopStatus>,
    pub match_methods: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecomputeOutcome {
    /// Top-N was switched off because no matched method is active any more
    pub top_n_cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    EmptyValue,
    MissingRouteId,
    Duplicate(StationFilter),
    InvalidTopN,
    TopNWithoutMatched,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "Please enter a value to filter by"),
            Self::MissingRouteId => write!(f, "Please enter a route ID"),
            Self::Duplicate(filter) => write!(f, "{} {} is already filtered", filter.kind.label(), filter.value),
            Self::InvalidTopN => write!(f, "Top N must be a positive number"),
            Self::TopNWithoutMatched => write!(f, "Top N needs at least one matching method selected"),
        }
    }
}

impl std::error::Error for FilterError {}

/// One atomic removal, as triggered by a chip's remove control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveFilter {
    NodeType(String),
    Matched(MatchedNode),
    Unmatched(UnmatchedNode),
    StationFilter(usize),
    TransportType(String),
    Operator(String),
    TopN,
    DuplicatesOnly,
}

fn matched_tree() -> CheckNode<MatchedNode> {
    use MatchedNode as M;
    CheckNode::group(M::All, vec![
        CheckNode::leaf(M::Exact),
        CheckNode::leaf(M::Name),
        CheckNode::leaf(M::Manual),
        CheckNode::group(M::Distance, vec![
            CheckNode::leaf(M::Stage1),
            CheckNode::leaf(M::Stage2),
            CheckNode::leaf(M::Stage3a),
            CheckNode::leaf(M::Stage3b),
        ]),
        CheckNode::group(M::Route, vec![CheckNode::leaf(M::Gtfs), CheckNode::leaf(M::Hrdf)]),
    ])
}

fn unmatched_tree() -> CheckNode<UnmatchedNode> {
    CheckNode::group(UnmatchedNode::All, vec![
        CheckNode::leaf(UnmatchedNode::NoNearbyOsm),
        CheckNode::leaf(UnmatchedNode::OsmNearby),
    ])
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// The active map filters.
///
/// All mutation goes through methods so the derived fields are recomputed in
/// one place after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    station_filters: Vec<StationFilter>,
    node_types: BTreeSet<String>,
    transport_types: BTreeSet<String>,
    atlas_operators: BTreeSet<String>,
    matched: CheckNode<MatchedNode>,
    unmatched: CheckNode<UnmatchedNode>,
    top_n: Option<NonZeroU32>,
    show_duplicates_only: bool,
    derived: Derived,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            station_filters: Vec::new(),
            node_types: BTreeSet::new(),
            transport_types: BTreeSet::new(),
            atlas_operators: BTreeSet::new(),
            matched: matched_tree(),
            unmatched: unmatched_tree(),
            top_n: None,
            show_duplicates_only: false,
            derived: Derived::default(),
        }
    }

    #[must_use]
    pub fn station_filters(&self) -> &[StationFilter] {
        &self.station_filters
    }

    #[must_use]
    pub fn node_types(&self) -> &BTreeSet<String> {
        &self.node_types
    }

    #[must_use]
    pub fn transport_types(&self) -> &BTreeSet<String> {
        &self.transport_types
    }

    #[must_use]
    pub fn atlas_operators(&self) -> &BTreeSet<String> {
        &self.atlas_operators
    }

    #[must_use]
    pub fn matched(&self) -> &CheckNode<MatchedNode> {
        &self.matched
    }

    #[must_use]
    pub fn unmatched(&self) -> &CheckNode<UnmatchedNode> {
        &self.unmatched
    }

    #[must_use]
    pub fn matched_state(&self, node: MatchedNode) -> TriState {
        self.matched.state_of(node).unwrap_or(TriState::Unchecked)
    }

    #[must_use]
    pub fn unmatched_state(&self, node: UnmatchedNode) -> TriState {
        self.unmatched.state_of(node).unwrap_or(TriState::Unchecked)
    }

    #[must_use]
    pub fn top_n(&self) -> Option<u32> {
        self.top_n.map(NonZeroU32::get)
    }

    #[must_use]
    pub fn show_duplicates_only(&self) -> bool {
        self.show_duplicates_only
    }

    #[must_use]
    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    #[must_use]
    pub fn has_matched_method(&self) -> bool {
        self.matched.state().is_any()
    }

    /// Appends a station/route filter.
    ///
    /// # Errors
    ///
    /// Rejects empty values and exact duplicates without touching the state.
    pub fn add_station_filter(&mut self, value: &str, kind: FilterKind, direction: RouteDirection) -> Result<(), FilterError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(if kind.is_route() { FilterError::MissingRouteId } else { FilterError::EmptyValue });
        }
        let filter = StationFilter {
            value: value.to_string(),
            kind,
            direction: if kind.is_route() { direction } else { RouteDirection::Any },
        };
        if self.station_filters.contains(&filter) {
            return Err(FilterError::Duplicate(filter));
        }
        self.station_filters.push(filter);
        self.recompute();
        Ok(())
    }

    pub fn remove_station_filter(&mut self, index: usize) -> Option<StationFilter> {
        if index >= self.station_filters.len() {
            return None;
        }
        let removed = self.station_filters.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Returns false when the index is stale
    pub fn set_route_direction(&mut self, index: usize, direction: RouteDirection) -> bool {
        let Some(filter) = self.station_filters.get_mut(index) else { return false };
        filter.direction = direction;
        self.recompute();
        true
    }

    pub fn cycle_route_direction(&mut self, index: usize) -> Option<RouteDirection> {
        let next = self.station_filters.get(index)?.direction.next();
        self.set_route_direction(index, next);
        Some(next)
    }

    pub fn toggle_node_type(&mut self, value: &str) {
        toggle(&mut self.node_types, value);
        self.recompute();
    }

    pub fn toggle_transport_type(&mut self, value: &str) {
        toggle(&mut self.transport_types, value);
        self.recompute();
    }

    pub fn toggle_operator(&mut self, value: &str) {
        toggle(&mut self.atlas_operators, value);
        self.recompute();
    }

    pub fn set_matched(&mut self, node: MatchedNode, value: bool) -> RecomputeOutcome {
        self.matched.set(node, value);
        self.recompute()
    }

    pub fn set_unmatched(&mut self, node: UnmatchedNode, value: bool) -> RecomputeOutcome {
        self.unmatched.set(node, value);
        self.recompute()
    }

    /// Sets or clears Top-N.
    ///
    /// # Errors
    ///
    /// Zero is rejected, as is any value while no matched method is active.
    pub fn set_top_n(&mut self, top_n: Option<u32>) -> Result<(), FilterError> {
        let value = match top_n {
            None => None,
            Some(n) => {
                let n = NonZeroU32::new(n).ok_or(FilterError::InvalidTopN)?;
                if !self.has_matched_method() {
                    return Err(FilterError::TopNWithoutMatched);
                }
                Some(n)
            }
        };
        self.top_n = value;
        self.recompute();
        Ok(())
    }

    pub fn set_show_duplicates_only(&mut self, value: bool) {
        self.show_duplicates_only = value;
        self.recompute();
    }

    /// Clears every filter
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a removal still targets an active filter
    #[must_use]
    pub fn is_active(&self, removal: &RemoveFilter) -> bool {
        match removal {
            RemoveFilter::NodeType(v) => self.node_types.contains(v),
            RemoveFilter::Matched(node) => self.matched_state(*node).is_any(),
            RemoveFilter::Unmatched(node) => self.unmatched_state(*node).is_any(),
            RemoveFilter::StationFilter(index) => *index < self.station_filters.len(),
            RemoveFilter::TransportType(v) => self.transport_types.contains(v),
            RemoveFilter::Operator(v) => self.atlas_operators.contains(v),
            RemoveFilter::TopN => self.top_n.is_some(),
            RemoveFilter::DuplicatesOnly => self.show_duplicates_only,
        }
    }

    /// Performs exactly one removal. A stale target is a contract violation:
    /// it is logged and answered with a full recompute.
    pub fn apply_removal(&mut self, removal: &RemoveFilter) -> RecomputeOutcome {
        if !self.is_active(removal) {
            leptos::logging::error!("Filter removal {removal:?} did not match any active filter, recomputing state");
            return self.recompute();
        }
        match removal {
            RemoveFilter::NodeType(v) => {
                self.node_types.remove(v);
            }
            RemoveFilter::Matched(node) => {
                self.matched.set(*node, false);
            }
            RemoveFilter::Unmatched(node) => {
                self.unmatched.set(*node, false);
            }
            RemoveFilter::StationFilter(index) => {
                self.station_filters.remove(*index);
            }
            RemoveFilter::TransportType(v) => {
                self.transport_types.remove(v);
            }
            RemoveFilter::Operator(v) => {
                self.atlas_operators.remove(v);
            }
            RemoveFilter::TopN => self.top_n = None,
            RemoveFilter::DuplicatesOnly => self.show_duplicates_only = false,
        }
        self.recompute()
    }

    fn recompute(&mut self) -> RecomputeOutcome {
        let matched_leaves = self.matched.checked_leaves();
        let unmatched_leaves = self.unmatched.checked_leaves();

        let mut stop_type = Vec::new();
        if !matched_leaves.is_empty() {
            stop_type.push(StopStatus::Matched);
        }
        if !unmatched_leaves.is_empty() {
            stop_type.push(StopStatus::Unmatched);
        }

        let match_methods = matched_leaves.iter().filter_map(|n| n.method_id())
            .chain(unmatched_leaves.iter().filter_map(|n| n.method_id()))
            .collect();

        let top_n_cleared = self.top_n.is_some() && matched_leaves.is_empty();
        if top_n_cleared {
            self.top_n = None;
        }

        self.derived = Derived { stop_type, match_methods };
        RecomputeOutcome { top_n_cleared }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_duplicate_station_filter_rejected() {
        let mut state = FilterState::new();
        assert!(state.add_station_filter("8500010", FilterKind::Station, RouteDirection::Any).is_ok());
        let err = state.add_station_filter("8500010", FilterKind::Station, RouteDirection::Any);
        assert!(matches!(err, Err(FilterError::Duplicate(_))));
        assert_eq!(state.station_filters().len(), 1);
    }

    #[test]
    fn test_empty_values_rejected_without_mutation() {
        let mut state = FilterState::new();
        assert_eq!(state.add_station_filter("  ", FilterKind::Station, RouteDirection::Any), Err(FilterError::EmptyValue));
        assert_eq!(state.add_station_filter("", FilterKind::Route, RouteDirection::Outbound), Err(FilterError::MissingRouteId));
        assert!(state.station_filters().is_empty());
    }

    #[test]
    fn test_same_route_different_direction_is_distinct() {
        let mut state = FilterState::new();
        state.add_station_filter("91-10-A-j24-1", FilterKind::Route, RouteDirection::Outbound).expect("first");
        state.add_station_filter("91-10-A-j24-1", FilterKind::Route, RouteDirection::Return).expect("second");
        assert_eq!(state.station_filters().len(), 2);
    }

    #[test]
    fn test_direction_ignored_for_non_route_kinds() {
        let mut state = FilterState::new();
        state.add_station_filter("8503000", FilterKind::Station, RouteDirection::Return).expect("add");
        assert_eq!(state.station_filters()[0].direction, RouteDirection::Any);
    }

    #[test]
    fn test_remove_then_readd_restores_filters() {
        let mut state = FilterState::new();
        state.add_station_filter("8500010", FilterKind::Station, RouteDirection::Any).expect("a");
        state.add_station_filter("ch:1:sloid:10", FilterKind::Atlas, RouteDirection::Any).expect("b");
        state.add_station_filter("R1", FilterKind::Route, RouteDirection::Outbound).expect("c");
        let before: HashSet<StationFilter> = state.station_filters().iter().cloned().collect();

        let removed = state.remove_station_filter(1).expect("index 1 exists");
        assert_eq!(removed.value, "ch:1:sloid:10");
        assert_eq!(state.station_filters().len(), 2);
        assert_eq!(state.station_filters()[1].value, "R1");
        assert_eq!(state.station_filters()[1].direction, RouteDirection::Outbound);

        state.add_station_filter(&removed.value, removed.kind, removed.direction).expect("re-add");
        let after: HashSet<StationFilter> = state.station_filters().iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_cycle_route_direction() {
        let mut state = FilterState::new();
        state.add_station_filter("R1", FilterKind::Route, RouteDirection::Any).expect("add");
        assert_eq!(state.cycle_route_direction(0), Some(RouteDirection::Outbound));
        assert_eq!(state.cycle_route_direction(0), Some(RouteDirection::Return));
        assert_eq!(state.cycle_route_direction(0), Some(RouteDirection::Any));
        assert_eq!(state.cycle_route_direction(5), None);
    }

    #[test]
    fn test_derived_fields_follow_leaves() {
        let mut state = FilterState::new();
        assert!(state.derived().stop_type.is_empty());

        state.set_matched(MatchedNode::Stage1, true);
        state.set_matched(MatchedNode::Gtfs, true);
        assert_eq!(state.derived().stop_type, vec![StopStatus::Matched]);
        assert_eq!(state.derived().match_methods, vec!["distance_matching_1", "route_gtfs"]);
        assert_eq!(state.matched_state(MatchedNode::Distance), TriState::Mixed);

        state.set_unmatched(UnmatchedNode::NoNearbyOsm, true);
        assert_eq!(state.derived().stop_type, vec![StopStatus::Matched, StopStatus::Unmatched]);
        assert!(state.derived().match_methods.contains(&"no_osm_within_50m"));

        state.set_matched(MatchedNode::All, false);
        assert_eq!(state.derived().stop_type, vec![StopStatus::Unmatched]);
        assert_eq!(state.derived().match_methods, vec!["no_osm_within_50m"]);
    }

    #[test]
    fn test_derived_for_every_leaf_combination() {
        let leaves = FilterState::new().matched().leaves();
        for mask in 0u32..(1 << leaves.len()) {
            let mut state = FilterState::new();
            for (bit, leaf) in leaves.iter().enumerate() {
                state.set_matched(*leaf, mask & (1 << bit) != 0);
            }
            let expected: Vec<&str> = leaves.iter().enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .filter_map(|(_, leaf)| leaf.method_id())
                .collect();
            assert_eq!(state.derived().match_methods, expected);
            assert_eq!(state.derived().stop_type.contains(&StopStatus::Matched), mask != 0);
            assert_eq!(state.matched_state(MatchedNode::All).is_checked(), mask == (1 << leaves.len()) - 1);
        }
    }

    #[test]
    fn test_top_n_auto_clears_when_no_matched_method_left() {
        let mut state = FilterState::new();
        state.set_matched(MatchedNode::All, true);
        state.set_top_n(Some(10)).expect("valid top n");
        assert_eq!(state.top_n(), Some(10));

        let leaves = state.matched().leaves();
        let (last, rest) = leaves.split_last().expect("tree has leaves");
        for leaf in rest {
            assert!(!state.set_matched(*leaf, false).top_n_cleared);
        }
        assert_eq!(state.top_n(), Some(10));
        assert!(state.set_matched(*last, false).top_n_cleared);
        assert_eq!(state.top_n(), None);
    }

    #[test]
    fn test_top_n_validation() {
        let mut state = FilterState::new();
        assert_eq!(state.set_top_n(Some(5)), Err(FilterError::TopNWithoutMatched));
        state.set_matched(MatchedNode::Exact, true);
        assert_eq!(state.set_top_n(Some(0)), Err(FilterError::InvalidTopN));
        assert_eq!(state.top_n(), None);
        assert!(state.set_top_n(Some(5)).is_ok());
        assert!(state.set_top_n(None).is_ok());
        assert_eq!(state.top_n(), None);
    }

    #[test]
    fn test_stale_removal_falls_back_to_recompute() {
        let mut state = FilterState::new();
        state.set_matched(MatchedNode::Exact, true);
        let outcome = state.apply_removal(&RemoveFilter::StationFilter(3));
        assert!(!outcome.top_n_cleared);
        assert_eq!(state.derived().match_methods, vec!["exact"]);
    }

    #[test]
    fn test_removal_of_unchecked_match_node_is_stale() {
        let mut state = FilterState::new();
        state.set_matched(MatchedNode::Exact, true);
        let chip = RemoveFilter::Matched(MatchedNode::Exact);
        assert!(state.is_active(&chip));
        state.apply_removal(&chip);
        assert_eq!(state.matched_state(MatchedNode::Exact), TriState::Unchecked);
        assert!(!state.is_active(&chip));
        assert!(!state.is_active(&RemoveFilter::Unmatched(UnmatchedNode::All)));
        assert!(!state.is_active(&RemoveFilter::TopN));
    }

    #[test]
    fn test_toggles_are_membership_only() {
        let mut state = FilterState::new();
        state.toggle_node_type("Platform");
        state.toggle_node_type("Station");
        state.toggle_node_type("Platform");
        assert_eq!(state.node_types().iter().collect::<Vec<_>>(), vec!["Station"]);
    }
}
