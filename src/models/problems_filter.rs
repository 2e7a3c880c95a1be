use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    #[default]
    All,
    Unmatched,
    Distance,
    Attributes,
    Duplicates,
}

impl ProblemType {
    pub const ALL: [Self; 5] = [Self::All, Self::Unmatched, Self::Distance, Self::Attributes, Self::Duplicates];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unmatched => "unmatched",
            Self::Distance => "distance",
            Self::Attributes => "attributes",
            Self::Duplicates => "duplicates",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All problems",
            Self::Unmatched => "Unmatched",
            Self::Distance => "Distance",
            Self::Attributes => "Attribute mismatch",
            Self::Duplicates => "Duplicates",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionFilter {
    #[default]
    All,
    Solved,
    Unsolved,
}

impl SolutionFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Solved, Self::Unsolved];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Solved => "solved",
            Self::Unsolved => "unsolved",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Any state",
            Self::Solved => "Solved",
            Self::Unsolved => "Unsolved",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.level() == level)
    }
}

/// One atomic removal on the problems page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveProblemFilter {
    ProblemType,
    Solution,
    Operator(String),
    Priority,
}

/// Filters of the problems page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProblemsFilter {
    pub problem_type: ProblemType,
    pub solution: SolutionFilter,
    pub operators: BTreeSet<String>,
    pub priority: Option<Priority>,
}

impl ProblemsFilter {
    /// Nothing restricts the list
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.problem_type == ProblemType::All
            && self.solution == SolutionFilter::All
            && self.operators.is_empty()
            && self.priority.is_none()
    }

    pub fn toggle_operator(&mut self, operator: &str) {
        if !self.operators.remove(operator) {
            self.operators.insert(operator.to_string());
        }
    }

    pub fn apply_removal(&mut self, removal: &RemoveProblemFilter) {
        match removal {
            RemoveProblemFilter::ProblemType => self.problem_type = ProblemType::All,
            RemoveProblemFilter::Solution => self.solution = SolutionFilter::All,
            RemoveProblemFilter::Operator(op) => {
                if !self.operators.remove(op) {
                    leptos::logging::error!("Operator filter {op} is not active");
                }
            }
            RemoveProblemFilter::Priority => self.priority = None,
        }
    }
}

/// One entry of the problems list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Problem {
    pub id: i64,
    pub stop_id: i64,
    pub problem_type: String,
    pub priority: Option<u8>,
    pub solution: Option<String>,
    pub is_persistent: bool,
    pub sloid: Option<String>,
    pub name: Option<String>,
    pub operator: Option<String>,
}
