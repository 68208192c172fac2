//! Factor, LCM and GCF solvers.
//!
//! These exercises either name their two numbers in the header, or show a
//! small table of already-solved pairs with one pair marked `?` — in that
//! case the question numbers sit in the cell adjacent to the mark.

use super::helpers::{choice_matching_value, extract_integers};
use super::Solver;
use crate::context::ChallengeContext;
use crate::math::fraction::{gcd, lcm};
use crate::plan::{Answer, SolveResult, UiAction};

/// All factors of `n`, ascending, by trial division.
pub(crate) fn factor_list(n: i64) -> Vec<i64> {
    let n = n.abs();
    if n == 0 {
        return Vec::new();
    }
    let mut factors = Vec::new();
    for d in 1..=n {
        if n % d == 0 {
            factors.push(d);
        }
    }
    factors
}

/// The two question numbers of an exercise: from the header when it names
/// them, otherwise from the cell next to the `?` mark in the pair table.
fn question_pair(ctx: &ChallengeContext) -> Option<(i64, i64)> {
    let from_header = extract_integers(ctx.header_text());
    if from_header.len() >= 2 {
        return Some((from_header[0], from_header[1]));
    }

    let markup = ctx.equation_markup().or_else(|| ctx.annotation())?;
    let mark = markup.find('?')?;
    // numbers in the adjacent cell, scanning back from the mark
    let cell = &markup[..mark];
    let numbers = extract_integers(cell);
    if numbers.len() >= 2 {
        let pair = &numbers[numbers.len() - 2..];
        return Some((pair[0], pair[1]));
    }
    None
}

fn solve_pair_exercise(
    name: &'static str,
    ctx: &ChallengeContext,
    compute: impl Fn(i64, i64) -> i64,
    typed: bool,
) -> SolveResult {
    let Some((a, b)) = question_pair(ctx) else {
        return SolveResult::failure(name, "no question pair found");
    };
    let value = compute(a, b);

    if typed {
        return SolveResult::solved(
            name,
            Answer::Number {
                value: value as f64,
            },
            vec![UiAction::TypeText {
                value: value.to_string(),
            }],
        );
    }

    let Some(index) = choice_matching_value(ctx, value as f64) else {
        return SolveResult::failure(name, format!("no choice decodes to {}", value));
    };
    SolveResult::solved(
        name,
        Answer::Choice { index },
        vec![UiAction::click(index)],
    )
}

/// Clicks the choice showing the least common multiple.
pub struct LcmChoiceSolver;

impl Solver for LcmChoiceSolver {
    fn name(&self) -> &'static str {
        "lcm-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        is_lcm_header(ctx) && !ctx.choices().is_empty() && !ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        solve_pair_exercise(self.name(), ctx, lcm, false)
    }
}

/// Types the least common multiple.
pub struct LcmTypeSolver;

impl Solver for LcmTypeSolver {
    fn name(&self) -> &'static str {
        "lcm-type"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        is_lcm_header(ctx) && ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        solve_pair_exercise(self.name(), ctx, lcm, true)
    }
}

/// Clicks the choice showing the greatest common factor.
pub struct GcfChoiceSolver;

impl Solver for GcfChoiceSolver {
    fn name(&self) -> &'static str {
        "gcf-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        is_gcf_header(ctx) && !ctx.choices().is_empty() && !ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        solve_pair_exercise(self.name(), ctx, gcd, false)
    }
}

/// Types the greatest common factor.
pub struct GcfTypeSolver;

impl Solver for GcfTypeSolver {
    fn name(&self) -> &'static str {
        "gcf-type"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        is_gcf_header(ctx) && ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        solve_pair_exercise(self.name(), ctx, gcd, true)
    }
}

fn is_lcm_header(ctx: &ChallengeContext) -> bool {
    let header = ctx.header_text();
    header.contains("least common multiple") || header.contains("lcm")
}

fn is_gcf_header(ctx: &ChallengeContext) -> bool {
    let header = ctx.header_text();
    header.contains("greatest common factor")
        || header.contains("gcf")
        || header.contains("greatest common divisor")
}

/// Clicks the choice listing all factors of the header's number.
pub struct FactorListChoiceSolver;

impl Solver for FactorListChoiceSolver {
    fn name(&self) -> &'static str {
        "factor-list-choice"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.header_text().contains("factors of")
            && !ctx.choices().is_empty()
            && !ctx.has_text_input()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(&n) = extract_integers(ctx.header_text()).first() else {
            return SolveResult::failure(self.name(), "no number in header");
        };
        let expected = factor_list(n);
        if expected.is_empty() {
            return SolveResult::failure(self.name(), "number has no factor list");
        }

        let index = ctx.choices().iter().position(|choice| {
            let listed = extract_integers(choice.content());
            listed == expected
        });
        let Some(index) = index else {
            return SolveResult::failure(self.name(), "no choice lists the full factor set");
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}

/// Completes a factor-pair table: the `?` cell is the cofactor of the
/// number next to it.
pub struct FactorPairTableSolver;

impl Solver for FactorPairTableSolver {
    fn name(&self) -> &'static str {
        "factor-pair-table"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        let header = ctx.header_text();
        (header.contains("factor pair") || header.contains("complete the pair"))
            && ctx
                .equation_markup()
                .or_else(|| ctx.annotation())
                .map_or(false, |m| m.contains('?'))
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some(markup) = ctx.equation_markup().or_else(|| ctx.annotation()) else {
            return SolveResult::failure(self.name(), "no table markup");
        };
        let Some(&product) = extract_integers(ctx.header_text()).first() else {
            return SolveResult::failure(self.name(), "no product in header");
        };
        let Some(mark) = markup.find('?') else {
            return SolveResult::failure(self.name(), "no question mark in table");
        };

        // the known half of the pair is the last number before the mark
        let Some(&known) = extract_integers(&markup[..mark]).last() else {
            return SolveResult::failure(self.name(), "no number adjacent to the mark");
        };
        if known == 0 || product % known != 0 {
            return SolveResult::failure(
                self.name(),
                format!("{} does not divide {}", known, product),
            );
        }
        let missing = product / known;

        if ctx.has_text_input() {
            return SolveResult::solved(
                self.name(),
                Answer::Number {
                    value: missing as f64,
                },
                vec![UiAction::TypeText {
                    value: missing.to_string(),
                }],
            );
        }
        let Some(index) = choice_matching_value(ctx, missing as f64) else {
            return SolveResult::failure(self.name(), format!("no choice decodes to {}", missing));
        };
        SolveResult::solved(
            self.name(),
            Answer::Choice { index },
            vec![UiAction::click(index)],
        )
    }
}
