//! Filter badges ("chips") and the boolean expression that ties them together.
//!
//! Chips are plain data: each carries the removal command that undoes exactly
//! one store mutation. Rendering walks the expression as a flat token stream so
//! the same layout feeds the Leptos view and the plain-text summary.

mod map_filters;
mod problem_filters;

pub use map_filters::map_filter_chips;
pub use problem_filters::problem_filter_chips;

use crate::models::{RemoveFilter, RemoveProblemFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChipCategory {
    NodeType,
    MatchStatus,
    Identifier,
    TransportType,
    Operator,
    TopN,
    DuplicatesOnly,
    ProblemType,
    Solution,
    ProblemOperator,
    Priority,
}

impl ChipCategory {
    /// Categories shown on the map page
    pub const MAP: [Self; 7] = [
        Self::NodeType,
        Self::MatchStatus,
        Self::Identifier,
        Self::TransportType,
        Self::Operator,
        Self::TopN,
        Self::DuplicatesOnly,
    ];

    /// Categories shown on the problems page
    pub const PROBLEMS: [Self; 4] = [Self::ProblemType, Self::Solution, Self::ProblemOperator, Self::Priority];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NodeType => "node_type",
            Self::MatchStatus => "match_status",
            Self::Identifier => "identifier",
            Self::TransportType => "transport_type",
            Self::Operator => "operator",
            Self::TopN => "top_n",
            Self::DuplicatesOnly => "duplicates_only",
            Self::ProblemType => "problem_type",
            Self::Solution => "solution",
            Self::ProblemOperator => "problem_operator",
            Self::Priority => "priority",
        }
    }
}

/// Commands that know which chip category they belong to
pub trait ChipRemoval: Clone {
    fn category(&self) -> ChipCategory;
}

impl ChipRemoval for RemoveFilter {
    fn category(&self) -> ChipCategory {
        match self {
            Self::NodeType(_) => ChipCategory::NodeType,
            Self::Matched(_) | Self::Unmatched(_) => ChipCategory::MatchStatus,
            Self::StationFilter(_) => ChipCategory::Identifier,
            Self::TransportType(_) => ChipCategory::TransportType,
            Self::Operator(_) => ChipCategory::Operator,
            Self::TopN => ChipCategory::TopN,
            Self::DuplicatesOnly => ChipCategory::DuplicatesOnly,
        }
    }
}

impl ChipRemoval for RemoveProblemFilter {
    fn category(&self) -> ChipCategory {
        match self {
            Self::ProblemType => ChipCategory::ProblemType,
            Self::Solution => ChipCategory::Solution,
            Self::Operator(_) => ChipCategory::ProblemOperator,
            Self::Priority => ChipCategory::Priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip<A> {
    pub label: String,
    pub removal: A,
}

impl<A: ChipRemoval> Chip<A> {
    pub fn new(label: impl Into<String>, removal: A) -> Self {
        Self { label: label.into(), removal }
    }

    #[must_use]
    pub fn category(&self) -> ChipCategory {
        self.removal.category()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipExpr<A> {
    /// Nothing filters the data
    Everything,
    Chip(Chip<A>),
    Or(Vec<ChipExpr<A>>),
    And(Vec<ChipExpr<A>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    And,
    Or,
}

impl Separator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChipToken<'a, A> {
    Everything,
    Chip(&'a Chip<A>),
    Separator(Separator),
    Open,
    Close,
}

impl<A: ChipRemoval> ChipExpr<A> {
    /// OR-group: nothing for no elements, the bare element for one
    #[must_use]
    pub fn or(items: Vec<Self>) -> Option<Self> {
        Self::group(items, Self::Or)
    }

    #[must_use]
    pub fn and(items: Vec<Self>) -> Option<Self> {
        Self::group(items, Self::And)
    }

    fn group(mut items: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(wrap(items)),
        }
    }

    /// Flat rendering order with separators and parentheses
    #[must_use]
    pub fn tokens(&self) -> Vec<ChipToken<'_, A>> {
        let mut out = Vec::new();
        self.push_tokens(&mut out, false);
        out
    }

    fn push_tokens<'a>(&'a self, out: &mut Vec<ChipToken<'a, A>>, nested: bool) {
        match self {
            Self::Everything => out.push(ChipToken::Everything),
            Self::Chip(chip) => out.push(ChipToken::Chip(chip)),
            Self::Or(items) => {
                out.push(ChipToken::Open);
                Self::push_joined(items, Separator::Or, out);
                out.push(ChipToken::Close);
            }
            Self::And(items) => {
                if nested {
                    out.push(ChipToken::Open);
                }
                Self::push_joined(items, Separator::And, out);
                if nested {
                    out.push(ChipToken::Close);
                }
            }
        }
    }

    fn push_joined<'a>(items: &'a [Self], sep: Separator, out: &mut Vec<ChipToken<'a, A>>) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(ChipToken::Separator(sep));
            }
            item.push_tokens(out, true);
        }
    }

    #[must_use]
    pub fn chips(&self) -> Vec<&Chip<A>> {
        self.tokens().into_iter().filter_map(|t| match t {
            ChipToken::Chip(c) => Some(c),
            _ => None,
        }).collect()
    }

    /// Plain-text summary, e.g. `Node: Platform AND (Match: Exact OR Match: Name)`
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for token in self.tokens() {
            match token {
                ChipToken::Everything => out.push_str(EVERYTHING_LABEL),
                ChipToken::Chip(c) => out.push_str(&c.label),
                ChipToken::Separator(s) => {
                    out.push(' ');
                    out.push_str(s.as_str());
                    out.push(' ');
                }
                ChipToken::Open => out.push('('),
                ChipToken::Close => out.push(')'),
            }
        }
        out
    }
}

pub const EVERYTHING_LABEL: &str = "All entries";

#[cfg(test)]
mod tests {
    use super::*;

    fn chip(label: &str) -> ChipExpr<RemoveFilter> {
        ChipExpr::Chip(Chip::new(label, RemoveFilter::NodeType(label.to_string())))
    }

    #[test]
    fn test_group_sizes() {
        assert_eq!(ChipExpr::<RemoveFilter>::or(vec![]), None);
        assert_eq!(ChipExpr::or(vec![chip("a")]), Some(chip("a")));
        let two = ChipExpr::or(vec![chip("a"), chip("b")]).expect("group");
        assert_eq!(two.to_text(), "(a OR b)");
    }

    #[test]
    fn test_and_is_parenthesized_only_when_nested() {
        let inner = ChipExpr::and(vec![chip("a"), chip("b")]).expect("and");
        assert_eq!(inner.to_text(), "a AND b");
        let outer = ChipExpr::or(vec![inner, chip("c")]).expect("or");
        assert_eq!(outer.to_text(), "((a AND b) OR c)");
    }

    #[test]
    fn test_tokens_count_chips() {
        let expr = ChipExpr::and(vec![chip("a"), ChipExpr::or(vec![chip("b"), chip("c")]).expect("or")]).expect("and");
        assert_eq!(expr.chips().len(), 3);
        assert_eq!(expr.to_text(), "a AND (b OR c)");
    }
}
