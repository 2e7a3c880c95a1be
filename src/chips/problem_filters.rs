use crate::models::{ProblemType, ProblemsFilter, RemoveProblemFilter, SolutionFilter};
use super::{Chip, ChipExpr};

type Expr = ChipExpr<RemoveProblemFilter>;

/// Chips for the problems page, `None` when the list is unrestricted
#[must_use]
pub fn problem_filter_chips(filter: &ProblemsFilter) -> Option<Expr> {
    if filter.is_unrestricted() {
        return None;
    }

    let problem_type = (filter.problem_type != ProblemType::All).then(|| {
        ChipExpr::Chip(Chip::new(format!("Problem: {}", filter.problem_type.label()), RemoveProblemFilter::ProblemType))
    });
    let solution = (filter.solution != SolutionFilter::All).then(|| {
        ChipExpr::Chip(Chip::new(format!("State: {}", filter.solution.label()), RemoveProblemFilter::Solution))
    });
    let operators = ChipExpr::or(filter.operators.iter()
        .map(|op| ChipExpr::Chip(Chip::new(format!("Operator: {op}"), RemoveProblemFilter::Operator(op.clone()))))
        .collect());
    let priority = filter.priority.map(|p| {
        ChipExpr::Chip(Chip::new(format!("Priority: {}", p.label()), RemoveProblemFilter::Priority))
    });

    ChipExpr::and([problem_type, solution, operators, priority].into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{ChipCategory, ChipRemoval};
    use crate::models::Priority;
    use std::collections::BTreeSet;

    #[test]
    fn test_unrestricted_renders_nothing() {
        assert_eq!(problem_filter_chips(&ProblemsFilter::default()), None);
    }

    #[test]
    fn test_composition() {
        let mut filter = ProblemsFilter { problem_type: ProblemType::Distance, ..ProblemsFilter::default() };
        filter.toggle_operator("SBB");
        filter.toggle_operator("BLS");
        let expr = problem_filter_chips(&filter).expect("restricted");
        assert_eq!(expr.to_text(), "Problem: Distance AND (Operator: BLS OR Operator: SBB)");
    }

    #[test]
    fn test_every_problem_category_has_a_removal() {
        let mut filter = ProblemsFilter {
            problem_type: ProblemType::Attributes,
            solution: SolutionFilter::Unsolved,
            priority: Some(Priority::Low),
            ..ProblemsFilter::default()
        };
        filter.toggle_operator("PostAuto");
        let expr = problem_filter_chips(&filter).expect("restricted");
        let seen: BTreeSet<ChipCategory> = expr.chips().iter().map(|c| c.removal.category()).collect();
        assert_eq!(seen, ChipCategory::PROBLEMS.into_iter().collect());

        for chip in expr.chips() {
            filter.apply_removal(&chip.removal);
        }
        assert!(filter.is_unrestricted());
    }
}
