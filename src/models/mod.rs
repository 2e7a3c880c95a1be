mod check_tree;
mod filter_state;
mod manual_match;
mod problems_filter;
mod stop;

pub use check_tree::{CheckNode, TriState};
pub use filter_state::{
    Derived, FilterError, FilterKind, FilterState, MatchedNode, RecomputeOutcome, RemoveFilter,
    RouteDirection, StationFilter, StopStatus, UnmatchedNode,
};
pub use manual_match::{ManualMatch, ManualMatchRequest, ManualMatchResponse, MatchOutcome, MatchStep, PendingMatch};
pub use problems_filter::{Priority, Problem, ProblemType, ProblemsFilter, RemoveProblemFilter, SolutionFilter};
pub use stop::{MarkerKey, RouteInfo, StopKind, StopRecord, StopSide};
