//! Round-to-nearest solvers.
//!
//! The header names the rounding base (`Round to the nearest 10`), the
//! equation annotation carries the source number, and the answer is either
//! typed or clicked depending on the exercise's modality.

use super::helpers::{annotation_number, choice_matching_value, nearest_base, round_to_base};
use super::Solver;
use crate::context::ChallengeContext;
use crate::plan::{format_number, Answer, SolveResult, UiAction};

/// Clicks the choice showing the rounded value.
pub struct RoundToNearestChoiceSolver;

impl Solver for RoundToNearestChoiceSolver {
    fn name(&self) -> &'static str {
        "round-to-nearest-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.header_text().contains("round")
            && nearest_base(ctx.header_text()).is_some()
            && !ctx.choices().is_empty()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(base) = nearest_base(ctx.header_text()) else {
            return SolveResult::failure(self.name(), "no rounding base in header");
        };
        let Some(source) = annotation_number(ctx) else {
            return SolveResult::failure(self.name(), "no source number in annotation");
        };
        let rounded = round_to_base(source, base);

        let Some(index) = choice_matching_value(ctx, rounded as f64) else {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", rounded),
            );
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Types the rounded value into the text input.
pub struct RoundToNearestTypeSolver;

impl Solver for RoundToNearestTypeSolver {
    fn name(&self) -> &'static str {
        "round-to-nearest-type"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.header_text().contains("round")
            && nearest_base(ctx.header_text()).is_some()
            && ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(base) = nearest_base(ctx.header_text()) else {
            return SolveResult::failure(self.name(), "no rounding base in header");
        };
        let Some(source) = annotation_number(ctx) else {
            return SolveResult::failure(self.name(), "no source number in annotation");
        };
        let rounded = round_to_base(source, base);
        let value = format_number(rounded as f64);

        SolveResult::solved(
            self.name(),
            Answer::Number {
                value: rounded as f64,
            },
            vec![UiAction::TypeText { value }],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ChoiceSnapshot, EquationSnapshot, ExerciseSnapshot};

    fn rounding_ctx(annotation: &str, choices: &[&str], text_input: bool) -> ChallengeContext {
        ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Round to the nearest 10".into(),
            equation: Some(EquationSnapshot {
                markup: String::new(),
                annotation: Some(annotation.into()),
            }),
            text_input,
            choices: choices
                .iter()
                .map(|c| ChoiceSnapshot {
                    text: c.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_choice_variant_selects_forty() {
        let ctx = rounding_ctx("41", &["40", "50"], false);
        let solver = RoundToNearestChoiceSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert!(result.success);
        assert_eq!(result.answer, Some(Answer::Choice { index: 0 }));
        assert_eq!(result.actions, vec![UiAction::click(0)]);
    }

    #[test]
    fn test_half_up_rounding() {
        let ctx = rounding_ctx("45", &["40", "50"], false);
        let result = RoundToNearestChoiceSolver.solve(&ctx);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_type_variant() {
        let ctx = rounding_ctx("41", &[], true);
        let solver = RoundToNearestTypeSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert!(result.success);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText { value: "40".into() }]
        );
    }

    #[test]
    fn test_no_matching_choice_fails_cleanly() {
        let ctx = rounding_ctx("41", &["10", "20"], false);
        let result = RoundToNearestChoiceSolver.solve(&ctx);
        assert!(!result.success);
        assert!(result.actions.is_empty());
    }

    #[test]
    fn test_predicate_rejects_other_headers() {
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Simplify the fraction".into(),
            ..Default::default()
        });
        assert!(!RoundToNearestChoiceSolver.can_solve(&ctx));
    }
}
