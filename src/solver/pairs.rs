//! Pairs-matching solver.
//!
//! Matching exercises present a board of draggable tokens to be joined in
//! pairs. Every token is classified first (diagram kinds, rounding
//! targets, factor lists, equations, unit rates, plain expressions), then
//! a priority-ordered sequence of matching strategies runs; the first
//! strategy whose input token populations are non-empty wins. Within a
//! strategy tokens are consumed greedily and marked used so nothing pairs
//! twice. Clicks are staggered with increasing delays to let the page
//! settle between interactions.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::helpers::CLICK_STAGGER_MS;
use super::Solver;
use crate::context::{ChallengeContext, ChoiceSnapshot};
use crate::diagram::{block, pie};
use crate::math::approx_eq;
use crate::math::eval::evaluate;
use crate::plan::{Answer, SolveResult, UiAction};

static NEAREST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)nearest\s*(\d+)").unwrap());
static FACTOR_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+(\s*,\s*\d+)+\s*$").unwrap());
static UNIT_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(-?\d+(?:\.\d+)?)\s*per\b").unwrap());
static LINEAR_COEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\s*\(?(-?\d+(?:\.\d+)?)\)?\s*\*?\s*[xX]").unwrap());

/// A classified reading of one draggable token. Produced fresh each solve,
/// never cached across exercises.
#[derive(Debug, Clone)]
pub struct Token {
    pub index: usize,
    pub text: String,
    pub value: Option<f64>,
    pub rounding_base: Option<i64>,
    pub factor_values: Vec<i64>,
    pub is_pie_chart: bool,
    pub is_block_diagram: bool,
    pub is_rounding_target: bool,
    pub is_factors_list: bool,
    pub is_equation: bool,
    pub is_unit_rate: bool,
}

impl Token {
    /// A token with no special kind flags: a plain number or expression.
    pub fn is_plain(&self) -> bool {
        !(self.is_pie_chart
            || self.is_block_diagram
            || self.is_rounding_target
            || self.is_factors_list
            || self.is_equation
            || self.is_unit_rate)
    }
}

/// Classify one choice element into a token.
pub fn classify(index: usize, choice: &ChoiceSnapshot) -> Token {
    let text = choice.text.clone();
    let content = choice.content();

    let mut token = Token {
        index,
        text: text.clone(),
        value: None,
        rounding_base: None,
        factor_values: Vec::new(),
        is_pie_chart: false,
        is_block_diagram: false,
        is_rounding_target: false,
        is_factors_list: false,
        is_equation: false,
        is_unit_rate: false,
    };

    if let Some(srcdoc) = choice.srcdoc.as_deref() {
        if block::is_block_diagram(srcdoc) {
            token.is_block_diagram = true;
            token.value = block::decode(srcdoc).map(|c| c as f64);
            return token;
        }
        if pie::is_pie_chart(srcdoc) {
            token.is_pie_chart = true;
            token.value = pie::decode(srcdoc).map(|f| f.value());
            return token;
        }
    }

    if let Some(caps) = NEAREST.captures(&text) {
        token.is_rounding_target = true;
        token.rounding_base = caps[1].parse().ok();
        // the markup carries the rounded result the source must land on
        token.value = choice.markup.as_deref().and_then(evaluate);
        return token;
    }

    if FACTOR_LIST.is_match(content) {
        token.is_factors_list = true;
        token.factor_values = content
            .split(',')
            .filter_map(|p| p.trim().parse().ok())
            .collect();
        return token;
    }

    if let Some(caps) = UNIT_RATE.captures(&text) {
        token.is_unit_rate = true;
        token.value = caps[1].parse().ok();
        return token;
    }

    if content.contains('=') {
        token.is_equation = true;
        token.value = LINEAR_COEF
            .captures(content)
            .and_then(|caps| caps[1].parse().ok());
        return token;
    }

    token.value = evaluate(content);
    token
}

/// The ×100 scale tolerance used when a block diagram stands for a decimal
/// or a percent. Inherently ambiguous near integer/100 boundaries; the
/// fallback order (exact, ÷100, ×100) is load-bearing legacy behavior.
fn matches_scaled(a: f64, b: f64) -> bool {
    if approx_eq(a, b) {
        return true;
    }
    if approx_eq(a / 100.0, b) {
        debug!("scaled match: {} read as {}", a, a / 100.0);
        return true;
    }
    if approx_eq(a * 100.0, b) {
        debug!("scaled match: {} read as {}", a, a * 100.0);
        return true;
    }
    false
}

/// Matches every pair of a board of tokens.
pub struct PairsMatchingSolver;

impl Solver for PairsMatchingSolver {
    fn name(&self) -> &'static str {
        "pairs-matching"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        let header = ctx.header_text();
        (header.contains("match") || header.contains("pair"))
            && !ctx.has_text_input()
            && ctx.choices().len() >= 4
            && ctx.choices().len() % 2 == 0
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let tokens: Vec<Token> = ctx
            .choices()
            .iter()
            .enumerate()
            .map(|(i, c)| classify(i, c))
            .collect();

        let Some(pairs) = match_pairs(&tokens) else {
            return SolveResult::failure(self.name(), "no matching strategy produced pairs");
        };

        let mut actions = Vec::new();
        for (n, &(a, b)) in pairs.iter().enumerate() {
            actions.push(UiAction::ClickChoice {
                index: a,
                delay_ms: (2 * n) as u64 * CLICK_STAGGER_MS,
            });
            actions.push(UiAction::ClickChoice {
                index: b,
                delay_ms: (2 * n + 1) as u64 * CLICK_STAGGER_MS,
            });
        }

        SolveResult::solved(self.name(), Answer::Pairs { pairs }, actions)
    }
}

/// Run the strategy chain: the first strategy whose input populations are
/// non-empty is selected, and only that strategy pairs tokens.
pub(crate) fn match_pairs(tokens: &[Token]) -> Option<Vec<(usize, usize)>> {
    let mut used = vec![false; tokens.len()];

    let rounding: Vec<&Token> = tokens.iter().filter(|t| t.is_rounding_target).collect();
    let equations: Vec<&Token> = tokens.iter().filter(|t| t.is_equation).collect();
    let unit_rates: Vec<&Token> = tokens.iter().filter(|t| t.is_unit_rate).collect();
    let blocks: Vec<&Token> = tokens.iter().filter(|t| t.is_block_diagram).collect();
    let factor_lists: Vec<&Token> = tokens.iter().filter(|t| t.is_factors_list).collect();
    let pies: Vec<&Token> = tokens.iter().filter(|t| t.is_pie_chart).collect();
    let plain: Vec<&Token> = tokens.iter().filter(|t| t.is_plain()).collect();

    let pairs = if !rounding.is_empty() && !plain.is_empty() {
        debug!("pairing strategy: rounding");
        pair_by(&rounding, &plain, &mut used, |target, source| {
            match (target.rounding_base, target.value, source.value) {
                (Some(base), Some(rounded), Some(v)) => {
                    super::helpers::round_to_base(v, base) as f64 == rounded
                }
                _ => false,
            }
        })
    } else if !equations.is_empty() && !unit_rates.is_empty() {
        debug!("pairing strategy: equation to unit rate");
        pair_by(&equations, &unit_rates, &mut used, |eq, rate| {
            match (eq.value, rate.value) {
                (Some(a), Some(b)) => approx_eq(a, b),
                _ => false,
            }
        })
    } else if !blocks.is_empty() && !plain.is_empty() {
        debug!("pairing strategy: block diagram to number");
        pair_by(&blocks, &plain, &mut used, |blk, num| {
            match (blk.value, num.value) {
                (Some(a), Some(b)) => matches_scaled(a, b),
                _ => false,
            }
        })
    } else if !factor_lists.is_empty() && !plain.is_empty() {
        debug!("pairing strategy: factor list to number");
        pair_by(&factor_lists, &plain, &mut used, |list, num| {
            match num.value {
                Some(v) if v.fract() == 0.0 && v != 0.0 => {
                    let n = v as i64;
                    !list.factor_values.is_empty()
                        && list.factor_values.iter().all(|f| *f != 0 && n % f == 0)
                }
                _ => false,
            }
        })
    } else if !pies.is_empty() && !plain.is_empty() {
        debug!("pairing strategy: pie chart to number");
        pair_by(&pies, &plain, &mut used, |p, num| match (p.value, num.value) {
            (Some(a), Some(b)) => approx_eq(a, b),
            _ => false,
        })
    } else if plain.len() >= 2 {
        debug!("pairing strategy: expression to number");
        pair_values(&plain, &mut used)
    } else {
        Vec::new()
    };

    if !pairs.is_empty() {
        return Some(pairs);
    }

    // Final any-to-any fallback: consume remaining tokens sequentially.
    let leftovers: Vec<usize> = (0..tokens.len()).filter(|&i| !used[i]).collect();
    if leftovers.len() >= 2 {
        debug!("pairing strategy: any-to-any fallback");
        return Some(leftovers.chunks(2).filter(|c| c.len() == 2).map(|c| (c[0], c[1])).collect());
    }
    None
}

/// Greedily pair each left token with the first unused right token the
/// predicate accepts.
fn pair_by(
    left: &[&Token],
    right: &[&Token],
    used: &mut [bool],
    matches: impl Fn(&Token, &Token) -> bool,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for &l in left {
        if used[l.index] {
            continue;
        }
        for &r in right {
            if used[r.index] || r.index == l.index {
                continue;
            }
            if matches(l, r) {
                used[l.index] = true;
                used[r.index] = true;
                pairs.push((l.index, r.index));
                break;
            }
        }
    }
    pairs
}

/// Pair plain tokens by equal evaluated value (an expression card with the
/// number card it reduces to).
fn pair_values(tokens: &[&Token], used: &mut [bool]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in tokens.iter().enumerate() {
        if used[a.index] {
            continue;
        }
        for b in tokens.iter().skip(i + 1) {
            if used[b.index] {
                continue;
            }
            if let (Some(va), Some(vb)) = (a.value, b.value) {
                if approx_eq(va, vb) {
                    used[a.index] = true;
                    used[b.index] = true;
                    pairs.push((a.index, b.index));
                    break;
                }
            }
        }
    }
    pairs
}
