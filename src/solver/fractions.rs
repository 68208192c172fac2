//! Diagram-reading and fraction-relation solvers.
//!
//! These connect the visual decoders to answer modalities: read the
//! fraction or count a widget shows, then type it or click the choice
//! that matches.

use super::helpers::{choice_matching_value, staggered_clicks};
use super::Solver;
use crate::context::ChallengeContext;
use crate::diagram::{block, grid, pie};
use crate::math::equation::{has_blank, replace_blank, solve_blank};
use crate::math::eval::evaluate;
use crate::math::fraction::Fraction;
use crate::math::normalize::normalize;
use crate::plan::{format_number, Answer, SolveResult, UiAction};

/// The first frame that decodes as a pie chart.
fn pie_fraction(ctx: &ChallengeContext) -> Option<Fraction> {
    ctx.frames().iter().find_map(|f| pie::decode(&f.srcdoc))
}

fn grid_fraction(ctx: &ChallengeContext) -> Option<Fraction> {
    ctx.frames().iter().find_map(|f| grid::decode(&f.srcdoc))
}

fn block_count(ctx: &ChallengeContext) -> Option<i64> {
    ctx.frames().iter().find_map(|f| block::decode(&f.srcdoc))
}

/// Types the fraction a pie chart shows.
pub struct PieFractionTypeSolver;

impl Solver for PieFractionTypeSolver {
    fn name(&self) -> &'static str {
        "pie-fraction-type"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.has_text_input() && ctx.frames().iter().any(|f| pie::is_pie_chart(&f.srcdoc))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(fraction) = pie_fraction(ctx) else {
            return SolveResult::failure(self.name(), "pie chart did not decode");
        };
        SolveResult::solved(
            self.name(),
            Answer::Fraction { fraction },
            vec![UiAction::TypeText {
                value: fraction.to_string(),
            }],
        )
    }
}

/// Clicks the choice matching the fraction a pie chart shows.
pub struct PieFractionChoiceSolver;

impl Solver for PieFractionChoiceSolver {
    fn name(&self) -> &'static str {
        "pie-fraction-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        !ctx.has_text_input()
            && !ctx.choices().is_empty()
            && ctx.frames().iter().any(|f| pie::is_pie_chart(&f.srcdoc))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(fraction) = pie_fraction(ctx) else {
            return SolveResult::failure(self.name(), "pie chart did not decode");
        };
        let Some(index) = choice_matching_value(ctx, fraction.value()) else {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", fraction),
            );
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Reads a grid diagram and answers in whichever modality the exercise
/// offers.
pub struct GridFractionSolver;

impl Solver for GridFractionSolver {
    fn name(&self) -> &'static str {
        "grid-fraction"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        (ctx.has_text_input() || !ctx.choices().is_empty())
            && ctx.frames().iter().any(|f| grid::is_grid_diagram(&f.srcdoc))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(fraction) = grid_fraction(ctx) else {
            return SolveResult::failure(self.name(), "grid did not decode");
        };
        if ctx.has_text_input() {
            return SolveResult::solved(
                self.name(),
                Answer::Fraction { fraction },
                vec![UiAction::TypeText {
                    value: fraction.to_string(),
                }],
            );
        }
        let Some(index) = choice_matching_value(ctx, fraction.value()) else {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", fraction),
            );
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Reads a base-10 block diagram and answers with its count.
pub struct BlockCountSolver;

impl Solver for BlockCountSolver {
    fn name(&self) -> &'static str {
        "block-count"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        (ctx.has_text_input() || !ctx.choices().is_empty())
            && ctx
                .frames()
                .iter()
                .any(|f| block::is_block_diagram(&f.srcdoc))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(count) = block_count(ctx) else {
            return SolveResult::failure(self.name(), "block diagram did not decode");
        };
        if ctx.has_text_input() {
            return SolveResult::solved(
                self.name(),
                Answer::Number {
                    value: count as f64,
                },
                vec![UiAction::TypeText {
                    value: count.to_string(),
                }],
            );
        }
        let Some(index) = choice_matching_value(ctx, count as f64) else {
            return SolveResult::failure(self.name(), format!("no choice decodes to {}", count));
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Clicks the choice equivalent to the fraction on the known side of a
/// blank equation (`1/2 = ▢`).
pub struct EquivalentFractionChoiceSolver;

impl Solver for EquivalentFractionChoiceSolver {
    fn name(&self) -> &'static str {
        "equivalent-fraction-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        !ctx.has_text_input()
            && !ctx.choices().is_empty()
            && ctx.equation_markup().map_or(false, |m| {
                has_blank(m) && (m.contains("\\frac") || normalize(m).contains('/'))
            })
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup() else {
            return SolveResult::failure(self.name(), "no equation markup");
        };
        let Some(target) = solve_blank(markup) else {
            return SolveResult::failure(self.name(), "equation did not solve");
        };
        let Some(index) = choice_matching_value(ctx, target) else {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", format_number(target)),
            );
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Select-all variant: click every choice equal to the target expression.
/// The only solver with a one-to-many selection contract.
pub struct SelectAllEqualSolver;

impl Solver for SelectAllEqualSolver {
    fn name(&self) -> &'static str {
        "select-all-equal"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.header_text().contains("select all")
            && !ctx.choices().is_empty()
            && ctx.equation_markup().is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup() else {
            return SolveResult::failure(self.name(), "no target expression");
        };
        // Both orderings appear: `X = expr` and `expr = ▢`.
        let cleaned = replace_blank(&normalize(markup));
        let target = match cleaned.split_once('=') {
            Some((lhs, rhs)) => {
                let lhs_value = (!lhs.contains('X')).then(|| evaluate(lhs)).flatten();
                let rhs_value = (!rhs.contains('X')).then(|| evaluate(rhs)).flatten();
                lhs_value.or(rhs_value)
            }
            None => evaluate(&cleaned),
        };
        let Some(target) = target else {
            return SolveResult::failure(self.name(), "target expression did not evaluate");
        };

        let matches = super::helpers::choices_matching_value(ctx, target);
        if matches.is_empty() {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", format_number(target)),
            );
        }
        let actions = staggered_clicks(&matches);
        SolveResult::solved(self.name(), Answer::Choices { indices: matches }, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ChoiceSnapshot, EquationSnapshot, ExerciseSnapshot, FrameSnapshot};

    fn pie_markup(colored: usize, total: usize) -> String {
        let mut s = String::from("<svg>");
        for i in 0..total {
            let fill = if i < colored { "#1cb0f6" } else { "#e5e5e5" };
            s.push_str(&format!(
                r##"<path d="M100 100 L100 20 A80 80 0 0 1 180 100 Z" fill="{}" stroke="#fff" data-i="{}"/>"##,
                fill, i
            ));
        }
        s.push_str("</svg>");
        s
    }

    #[test]
    fn test_pie_type() {
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "What fraction is shown?".into(),
            text_input: true,
            frames: vec![FrameSnapshot {
                srcdoc: pie_markup(3, 4),
            }],
            ..Default::default()
        });
        let solver = PieFractionTypeSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText {
                value: "3/4".into()
            }]
        );
    }

    #[test]
    fn test_pie_choice() {
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Select the fraction shown".into(),
            choices: vec![
                ChoiceSnapshot {
                    markup: Some("\\frac{1}{2}".into()),
                    ..Default::default()
                },
                ChoiceSnapshot {
                    markup: Some("\\frac{3}{4}".into()),
                    ..Default::default()
                },
            ],
            frames: vec![FrameSnapshot {
                srcdoc: pie_markup(3, 4),
            }],
            ..Default::default()
        });
        let result = PieFractionChoiceSolver.solve(&ctx);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_block_count_typed() {
        let mut srcdoc = String::from("<svg>");
        for i in 0..3 {
            srcdoc.push_str(&format!(
                r##"<rect x="{}" height="80" fill="#1cb0f6"/>"##,
                i * 30
            ));
        }
        srcdoc.push_str("</svg>");
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "How many?".into(),
            text_input: true,
            frames: vec![FrameSnapshot { srcdoc }],
            ..Default::default()
        });
        let result = BlockCountSolver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText { value: "30".into() }]
        );
    }

    #[test]
    fn test_equivalent_fraction_choice() {
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Select the equivalent fraction".into(),
            equation: Some(EquationSnapshot {
                markup: "\\frac{1}{2}=\\duoblank{1}".into(),
                annotation: None,
            }),
            choices: vec![
                ChoiceSnapshot {
                    markup: Some("\\frac{2}{3}".into()),
                    ..Default::default()
                },
                ChoiceSnapshot {
                    markup: Some("\\frac{2}{4}".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let solver = EquivalentFractionChoiceSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_select_all_equal() {
        let ctx = ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Select all expressions equal to the target".into(),
            equation: Some(EquationSnapshot {
                markup: "\\duoblank{1}=6".into(),
                annotation: None,
            }),
            choices: vec![
                ChoiceSnapshot {
                    text: "2*3".into(),
                    ..Default::default()
                },
                ChoiceSnapshot {
                    text: "7-2".into(),
                    ..Default::default()
                },
                ChoiceSnapshot {
                    text: "12/2".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let solver = SelectAllEqualSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert_eq!(
            result.answer,
            Some(Answer::Choices {
                indices: vec![0, 2]
            })
        );
        assert_eq!(result.actions.len(), 2);
    }
}
