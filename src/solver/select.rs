//! Choice-selection solvers for relations and operators.

use super::helpers::choice_matching_value;
use super::Solver;
use crate::context::ChallengeContext;
use crate::math::approx_eq;
use crate::math::equation::{has_blank, replace_blank, solve_blank};
use crate::math::eval::{evaluate, evaluate_clean};
use crate::math::normalize::normalize;
use crate::plan::{format_number, Answer, SolveResult, UiAction};

const COMPARISON_SYMBOLS: &[&str] = &["<", ">", "=", "≤", "≥", "<=", ">="];
const OPERATOR_SYMBOLS: &[&str] = &["+", "-", "*", "/", "×", "÷", "−", "⋅"];

fn choices_are_symbols(ctx: &ChallengeContext, symbols: &[&str]) -> bool {
    !ctx.choices().is_empty()
        && ctx
            .choices()
            .iter()
            .all(|c| symbols.contains(&c.text.trim()))
}

/// Picks the comparison operator (`<`, `=`, `>`) relating the two operands
/// around the blank.
pub struct ComparisonOperatorSolver;

impl Solver for ComparisonOperatorSolver {
    fn name(&self) -> &'static str {
        "comparison-operator"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        choices_are_symbols(ctx, COMPARISON_SYMBOLS)
            && ctx.equation_markup().map_or(false, has_blank)
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup() else {
            return SolveResult::failure(self.name(), "no equation markup");
        };
        let cleaned = replace_blank(&normalize(markup));
        let Some((left, right)) = cleaned.split_once('X') else {
            return SolveResult::failure(self.name(), "no blank between operands");
        };
        let (Some(a), Some(b)) = (evaluate_clean(left), evaluate_clean(right)) else {
            return SolveResult::failure(self.name(), "operands did not evaluate");
        };

        let symbol = if approx_eq(a, b) {
            "="
        } else if a < b {
            "<"
        } else {
            ">"
        };
        let Some(index) = ctx
            .choices()
            .iter()
            .position(|c| c.text.trim() == symbol)
        else {
            return SolveResult::failure(self.name(), format!("no '{}' choice", symbol));
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Picks the arithmetic operator making `a ▢ b = c` true.
pub struct ArithmeticOperatorSolver;

impl Solver for ArithmeticOperatorSolver {
    fn name(&self) -> &'static str {
        "arithmetic-operator"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        choices_are_symbols(ctx, OPERATOR_SYMBOLS)
            && ctx.equation_markup().map_or(false, has_blank)
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup() else {
            return SolveResult::failure(self.name(), "no equation markup");
        };
        let cleaned = replace_blank(&normalize(markup));
        let Some((unknown_side, known_side)) = split_around_equals(&cleaned) else {
            return SolveResult::failure(self.name(), "no equals sign");
        };
        let Some(target) = evaluate_clean(known_side) else {
            return SolveResult::failure(self.name(), "target side did not evaluate");
        };
        let Some((left, right)) = unknown_side.split_once('X') else {
            return SolveResult::failure(self.name(), "no blank between operands");
        };
        let (Some(a), Some(b)) = (evaluate_clean(left), evaluate_clean(right)) else {
            return SolveResult::failure(self.name(), "operands did not evaluate");
        };

        for (op, result) in [
            ("+", a + b),
            ("-", a - b),
            ("*", a * b),
            ("/", if b == 0.0 { f64::NAN } else { a / b }),
        ] {
            if result.is_finite() && approx_eq(result, target) {
                let Some(index) = ctx
                    .choices()
                    .iter()
                    .position(|c| canonical_operator(c.text.trim()) == op)
                else {
                    continue;
                };
                return SolveResult::solved(
                    self.name(),
                    Answer::Choice { index },
                    vec![UiAction::click(index)],
                );
            }
        }
        SolveResult::failure(self.name(), "no operator satisfies the equation")
    }
}

fn canonical_operator(symbol: &str) -> &str {
    match symbol {
        "×" | "⋅" | "*" => "*",
        "÷" | "/" => "/",
        "−" | "-" => "-",
        other => other,
    }
}

/// `a ▢ b = c` puts the blank left of `=`; `c = a ▢ b` puts it right.
fn split_around_equals(cleaned: &str) -> Option<(&str, &str)> {
    let (lhs, rhs) = cleaned.split_once('=')?;
    if lhs.contains('X') {
        Some((lhs, rhs))
    } else if rhs.contains('X') {
        Some((rhs, lhs))
    } else {
        None
    }
}

/// Computes the blank's value and clicks the choice showing it.
pub struct EquationBlankChoiceSolver;

impl Solver for EquationBlankChoiceSolver {
    fn name(&self) -> &'static str {
        "equation-blank-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        !ctx.has_text_input()
            && !ctx.choices().is_empty()
            && ctx.equation_markup().map_or(false, has_blank)
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup() else {
            return SolveResult::failure(self.name(), "no equation markup");
        };
        let Some(value) = solve_blank(markup) else {
            return SolveResult::failure(self.name(), "equation did not solve");
        };
        let Some(index) = choice_matching_value(ctx, value) else {
            return SolveResult::failure(
                self.name(),
                format!("no choice decodes to {}", format_number(value)),
            );
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Final fallback: evaluate the equation and click the first matching
/// choice.
pub struct ChoiceEqualsEquationSolver;

impl Solver for ChoiceEqualsEquationSolver {
    fn name(&self) -> &'static str {
        "choice-equals-equation"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        !ctx.has_text_input()
            && !ctx.choices().is_empty()
            && (ctx.equation_markup().is_some() || ctx.annotation().is_some())
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let target = ctx
            .equation_markup()
            .and_then(|m| solve_blank(m).or_else(|| evaluate(m)))
            .or_else(|| ctx.annotation().and_then(evaluate));
        let Some(target) = target else {
            return SolveResult::failure(self.name(), "equation did not evaluate");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ChoiceSnapshot, EquationSnapshot, ExerciseSnapshot};

    fn ctx(markup: &str, choices: &[&str]) -> ChallengeContext {
        ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Pick the answer".into(),
            equation: Some(EquationSnapshot {
                markup: markup.into(),
                annotation: None,
            }),
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
    fn test_comparison_less() {
        let c = ctx("\\frac{1}{3}\\duoblank{1}\\frac{1}{2}", &["<", "=", ">"]);
        let solver = ComparisonOperatorSolver;
        assert!(solver.can_solve(&c));
        let result = solver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 0 }));
    }

    #[test]
    fn test_comparison_equal() {
        let c = ctx("\\frac{2}{4}\\duoblank{1}\\frac{1}{2}", &["<", "=", ">"]);
        let result = ComparisonOperatorSolver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_arithmetic_operator() {
        let c = ctx("3\\duoblank{1}4=12", &["+", "−", "×", "÷"]);
        let solver = ArithmeticOperatorSolver;
        assert!(solver.can_solve(&c));
        let result = solver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 2 }));
    }

    #[test]
    fn test_arithmetic_operator_reversed_equation() {
        let c = ctx("7=3\\duoblank{1}4", &["+", "−", "×", "÷"]);
        let result = ArithmeticOperatorSolver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 0 }));
    }

    #[test]
    fn test_equation_blank_choice() {
        let c = ctx("3+\\duoblank{1}=7", &["2", "4", "5"]);
        let solver = EquationBlankChoiceSolver;
        assert!(solver.can_solve(&c));
        let result = solver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_choice_equals_equation_fallback() {
        let c = ctx("6\\times7", &["41", "42"]);
        let solver = ChoiceEqualsEquationSolver;
        assert!(solver.can_solve(&c));
        let result = solver.solve(&c);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
    }

    #[test]
    fn test_symbol_predicate_rejects_numbers() {
        let c = ctx("3\\duoblank{1}4=12", &["12", "7"]);
        assert!(!ArithmeticOperatorSolver.can_solve(&c));
    }
}
