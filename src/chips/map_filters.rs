use crate::models::{FilterState, MatchedNode, RemoveFilter, TriState, UnmatchedNode, RouteDirection};
use super::{Chip, ChipExpr};

type Expr = ChipExpr<RemoveFilter>;

fn chip(label: String, removal: RemoveFilter) -> Expr {
    ChipExpr::Chip(Chip::new(label, removal))
}

fn set_group(values: impl Iterator<Item = String>, prefix: &str, removal: fn(String) -> RemoveFilter) -> Option<Expr> {
    ChipExpr::or(values.map(|v| chip(format!("{prefix}: {v}"), removal(v))).collect())
}

/// Stage chips below a matched method: OR of the checked stages, or one "all" chip
fn stage_group(state: &FilterState, parent: MatchedNode, title: &str) -> Option<Expr> {
    match state.matched_state(parent) {
        TriState::Unchecked => None,
        TriState::Checked => Some(chip(format!("{title}: All"), RemoveFilter::Matched(parent))),
        TriState::Mixed => {
            let node = state.matched().find(parent)?;
            ChipExpr::or(node.checked_leaves().into_iter()
                .map(|leaf| chip(format!("{title}: {}", leaf.label()), RemoveFilter::Matched(leaf)))
                .collect())
        }
    }
}

fn matched_side(state: &FilterState) -> Option<Expr> {
    match state.matched_state(MatchedNode::All) {
        TriState::Unchecked => None,
        TriState::Checked => Some(chip("Matched: All".to_string(), RemoveFilter::Matched(MatchedNode::All))),
        TriState::Mixed => {
            let methods = [MatchedNode::Exact, MatchedNode::Name, MatchedNode::Manual, MatchedNode::Distance, MatchedNode::Route]
                .into_iter()
                .filter(|m| state.matched_state(*m).is_any())
                .map(|m| chip(format!("Match: {}", m.label()), RemoveFilter::Matched(m)))
                .collect();

            let parts = [
                ChipExpr::or(methods),
                stage_group(state, MatchedNode::Distance, "Distance stage"),
                stage_group(state, MatchedNode::Route, "Route source"),
            ];
            ChipExpr::and(parts.into_iter().flatten().collect())
        }
    }
}

fn unmatched_side(state: &FilterState) -> Option<Expr> {
    match state.unmatched_state(UnmatchedNode::All) {
        TriState::Unchecked => None,
        TriState::Checked => Some(chip("Unmatched: All".to_string(), RemoveFilter::Unmatched(UnmatchedNode::All))),
        TriState::Mixed => ChipExpr::or(state.unmatched().checked_leaves().into_iter()
            .map(|reason| chip(format!("Unmatched: {}", reason.label()), RemoveFilter::Unmatched(reason)))
            .collect()),
    }
}

fn identifier_group(state: &FilterState) -> Option<Expr> {
    ChipExpr::or(state.station_filters().iter().enumerate().map(|(i, f)| {
        let label = if f.kind.is_route() && f.direction != RouteDirection::Any {
            format!("{}: {} ({})", f.kind.label(), f.value, f.direction.label())
        } else {
            format!("{}: {}", f.kind.label(), f.value)
        };
        chip(label, RemoveFilter::StationFilter(i))
    }).collect())
}

/// Builds the chip expression for the map page.
///
/// Groups appear in a fixed order and are joined with AND; inside a group the
/// alternatives are joined with OR. With nothing active the result is the
/// "All entries" sentinel.
#[must_use]
pub fn map_filter_chips(state: &FilterState) -> Expr {
    let status = ChipExpr::or([matched_side(state), unmatched_side(state)].into_iter().flatten().collect());

    let groups = [
        set_group(state.node_types().iter().cloned(), "Node", RemoveFilter::NodeType),
        status,
        identifier_group(state),
        set_group(state.transport_types().iter().cloned(), "Transport", RemoveFilter::TransportType),
        set_group(state.atlas_operators().iter().cloned(), "Operator", RemoveFilter::Operator),
        state.top_n().map(|n| chip(format!("Top {n} by distance"), RemoveFilter::TopN)),
        state.show_duplicates_only().then(|| chip("Duplicates only".to_string(), RemoveFilter::DuplicatesOnly)),
    ];

    ChipExpr::and(groups.into_iter().flatten().collect()).unwrap_or(ChipExpr::Everything)
}
