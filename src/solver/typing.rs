//! Text-input solvers.
//!
//! The type-the-answer solver is the deliberate catch-all for anything
//! with a text field: it tries simplify-a-fraction, then the inequality
//! variant, then the general equation-with-blank solver, and the first
//! branch that produces an answer wins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::helpers::annotation_number;
use super::Solver;
use crate::context::ChallengeContext;
use crate::math::equation::{has_blank, solve_blank, solve_inequality_blank};
use crate::math::fraction::simplify_fraction;
use crate::math::normalize::normalize;
use crate::plan::{format_number, Answer, SolveResult, UiAction};

static PLAIN_FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?(-?\d+)/(-?\d+)\)?$").unwrap());

/// Converts between percent and decimal notation as the header directs.
pub struct PercentDecimalSolver;

impl Solver for PercentDecimalSolver {
    fn name(&self) -> &'static str {
        "percent-decimal"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        let header = ctx.header_text();
        ctx.has_text_input()
            && (header.contains("as a decimal") || header.contains("as a percent"))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let source = ctx
            .annotation()
            .map(str::to_string)
            .or_else(|| ctx.equation_markup().map(normalize));
        let Some(source) = source else {
            return SolveResult::failure(self.name(), "no source value");
        };
        let Some(value) = annotation_number(ctx).or_else(|| {
            source
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
        }) else {
            return SolveResult::failure(self.name(), "source did not parse as a number");
        };

        let answer = if ctx.header_text().contains("as a decimal") {
            // a percent source reads ÷100
            value / 100.0
        } else {
            value * 100.0
        };
        let rendered = format_number(answer);

        SolveResult::solved(
            self.name(),
            Answer::Number { value: answer },
            vec![UiAction::TypeText { value: rendered }],
        )
    }
}

/// Catch-all for text-input exercises: simplify a fraction, satisfy an
/// inequality, or solve the equation for its blank.
pub struct TypeAnswerSolver;

impl Solver for TypeAnswerSolver {
    fn name(&self) -> &'static str {
        "type-answer"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.has_text_input() && (ctx.equation_markup().is_some() || ctx.annotation().is_some())
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let markup = ctx
            .equation_markup()
            .or_else(|| ctx.annotation())
            .unwrap_or_default();
        let normalized = normalize(markup);

        // 1. simplify-a-fraction: a bare fraction, no equation, no blank
        if !normalized.contains('=') && !has_blank(markup) {
            if let Some(caps) = PLAIN_FRACTION.captures(&normalized) {
                let num: i64 = caps[1].parse().unwrap_or(0);
                let den: i64 = caps[2].parse().unwrap_or(0);
                if let Ok(fraction) = simplify_fraction(num, den) {
                    debug!("type-answer branch: simplify fraction");
                    let rendered = if fraction.denominator == 1 {
                        fraction.numerator.to_string()
                    } else {
                        fraction.to_string()
                    };
                    return SolveResult::solved(
                        self.name(),
                        Answer::Fraction { fraction },
                        vec![UiAction::TypeText { value: rendered }],
                    );
                }
            }
        }

        // 2. inequality-with-blank: an explicit operator, or an inequality
        //    cue in the header, and no bare `=` without one
        let has_inequality_signal = normalized.contains(">=")
            || normalized.contains("<=")
            || normalized.contains('>')
            || normalized.contains('<')
            || ctx.header_text().contains("inequality");
        if has_blank(markup) && has_inequality_signal {
            if let Some(answer) = solve_inequality_blank(markup) {
                debug!("type-answer branch: inequality");
                return SolveResult::solved(
                    self.name(),
                    Answer::Text {
                        value: answer.clone(),
                    },
                    vec![UiAction::TypeText { value: answer }],
                );
            }
        }

        // 3. equation-with-blank
        if let Some(value) = solve_blank(markup) {
            debug!("type-answer branch: equation");
            let rendered = format_number(value);
            return SolveResult::solved(
                self.name(),
                Answer::Number { value },
                vec![UiAction::TypeText { value: rendered }],
            );
        }

        SolveResult::failure(self.name(), "no branch produced an answer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EquationSnapshot, ExerciseSnapshot};

    fn typed_ctx(header: &str, markup: &str, annotation: Option<&str>) -> ChallengeContext {
        ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: header.into(),
            text_input: true,
            equation: Some(EquationSnapshot {
                markup: markup.into(),
                annotation: annotation.map(str::to_string),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_simplify_fraction_branch() {
        let ctx = typed_ctx("Simplify", "\\frac{6}{8}", None);
        let result = TypeAnswerSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText {
                value: "3/4".into()
            }]
        );
    }

    #[test]
    fn test_simplify_to_integer() {
        let ctx = typed_ctx("Simplify", "\\frac{8}{4}", None);
        let result = TypeAnswerSolver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText { value: "2".into() }]
        );
    }

    #[test]
    fn test_inequality_branch() {
        let ctx = typed_ctx("Fill the blank", "\\duoblank{1}>\\frac{3}{8}", None);
        let result = TypeAnswerSolver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText {
                value: "4/8".into()
            }]
        );
    }

    #[test]
    fn test_equation_branch() {
        let ctx = typed_ctx("Fill the blank", "3+\\duoblank{1}=7", None);
        let result = TypeAnswerSolver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText { value: "4".into() }]
        );
    }

    #[test]
    fn test_unsolvable_fails() {
        let ctx = typed_ctx("Fill the blank", "nothing here", None);
        let result = TypeAnswerSolver.solve(&ctx);
        assert!(!result.success);
        assert!(result.actions.is_empty());
    }

    #[test]
    fn test_percent_to_decimal() {
        let ctx = typed_ctx("Write 45% as a decimal", "45%", Some("45%"));
        let solver = PercentDecimalSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText {
                value: "0.45".into()
            }]
        );
    }

    #[test]
    fn test_decimal_to_percent() {
        let ctx = typed_ctx("Write 0.3 as a percent", "0.3", Some("0.3"));
        let result = PercentDecimalSolver.solve(&ctx);
        assert_eq!(
            result.actions,
            vec![UiAction::TypeText { value: "30".into() }]
        );
    }
}
