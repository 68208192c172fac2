//! Interactive-widget solvers.
//!
//! Each widget ships as a sandboxed frame with its own script context. A
//! solver recognizes the widget by a markup signature, reads the widget's
//! input-description object out of the embedded script source (several
//! fallback extraction paths; first success is authoritative), computes
//! the required value with the same machinery the static solvers use, and
//! emits the widget action plan in fixed fallback order. Writes are
//! fire-and-forget: the shell's next polling cycle observes the outcome.

use serde_json::json;
use tracing::debug;

use super::helpers::{
    annotation_number, input_number, parse_frame_input, staggered_clicks,
};
use super::Solver;
use crate::context::ChallengeContext;
use crate::math::equation::solve_blank;
use crate::math::eval::evaluate;
use crate::math::{approx_eq, EPSILON};
use crate::plan::{
    format_number, inject_set_entries, inject_set_value, Answer, SolveResult, UiAction,
};

// Markup signatures for each widget variant. Vendor-derived; expect these
// to need recalibration when the widget bundle changes.
const SLIDER_SIGNATURE: &str = "interactive-slider";
const SPINNER_SIGNATURE: &str = "number-spinner";
const EXPRESSION_BUILDER_SIGNATURE: &str = "expression-builder";
const FACTOR_TREE_SIGNATURE: &str = "factor-tree";
const TABLE_FILL_SIGNATURE: &str = "table-fill";
const POINT_PLOT_SIGNATURE: &str = "point-plot";
const LINE_GRAPH_SIGNATURE: &str = "line-graph";

/// The value the exercise asks the widget to take: the blank's value when
/// the prompt is an equation, otherwise the evaluated prompt itself.
fn prompt_target(ctx: &ChallengeContext) -> Option<f64> {
    for source in [ctx.equation_markup(), ctx.annotation()] {
        let Some(text) = source else { continue };
        if let Some(v) = solve_blank(text) {
            return Some(v);
        }
        if let Some(v) = evaluate(text) {
            return Some(v);
        }
    }
    annotation_number(ctx)
}

/// The standard widget delivery plan: state write, notify hook, message
/// fallback, script injection last.
fn numeric_plan(frame: usize, path: &str, value: f64) -> Vec<UiAction> {
    vec![
        UiAction::WidgetWrite {
            frame,
            path: path.to_string(),
            value: json!(value),
        },
        UiAction::WidgetNotify { frame },
        UiAction::PostMessage {
            frame,
            payload: json!({ "type": "set-input", "path": path, "value": value }),
        },
        inject_set_value(frame, value),
    ]
}

fn entries_plan(frame: usize, path: &str, entries: Vec<serde_json::Value>) -> Vec<UiAction> {
    vec![
        UiAction::WidgetWrite {
            frame,
            path: path.to_string(),
            value: serde_json::Value::Array(entries.clone()),
        },
        UiAction::WidgetNotify { frame },
        UiAction::PostMessage {
            frame,
            payload: json!({ "type": "set-input", "path": path, "value": entries }),
        },
        inject_set_entries(frame, &entries),
    ]
}

// =============================================================================
// Slider
// =============================================================================

/// Drags a slider widget to the prompted value, snapped to the widget's
/// min/max/step.
pub struct SliderSolver;

impl Solver for SliderSolver {
    fn name(&self) -> &'static str {
        "slider"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(SLIDER_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, snap)) = ctx.frame_with_signature(SLIDER_SIGNATURE) else {
            return SolveResult::failure(self.name(), "slider frame disappeared");
        };
        let Some(target) = prompt_target(ctx) else {
            return SolveResult::failure(self.name(), "no target value in prompt");
        };

        let input = parse_frame_input(&snap.srcdoc);
        let min = input.as_ref().and_then(|i| input_number(i, "min")).unwrap_or(0.0);
        let max = input.as_ref().and_then(|i| input_number(i, "max")).unwrap_or(100.0);
        let step = input
            .as_ref()
            .and_then(|i| input_number(i, "step"))
            .filter(|s| *s > 0.0)
            .unwrap_or(1.0);

        let snapped = (min + ((target - min) / step).round() * step).clamp(min, max);
        if !approx_eq(snapped, target) {
            debug!("slider target {} snapped to {}", target, snapped);
        }

        SolveResult::solved(
            self.name(),
            Answer::Number { value: snapped },
            numeric_plan(frame, "value", snapped),
        )
    }
}

// =============================================================================
// Spinner
// =============================================================================

/// Sets a number-spinner widget to the prompted value.
pub struct SpinnerSolver;

impl Solver for SpinnerSolver {
    fn name(&self) -> &'static str {
        "spinner"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(SPINNER_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, _)) = ctx.frame_with_signature(SPINNER_SIGNATURE) else {
            return SolveResult::failure(self.name(), "spinner frame disappeared");
        };
        let Some(target) = prompt_target(ctx) else {
            return SolveResult::failure(self.name(), "no target value in prompt");
        };
        SolveResult::solved(
            self.name(),
            Answer::Number { value: target },
            numeric_plan(frame, "value", target),
        )
    }
}

// =============================================================================
// Expression builder
// =============================================================================

/// Fills an expression-builder widget: picks the draggable token(s), and an
/// operator when the widget has one, whose expression equals the blank's
/// value.
pub struct ExpressionBuilderSolver;

impl Solver for ExpressionBuilderSolver {
    fn name(&self) -> &'static str {
        "expression-builder"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(EXPRESSION_BUILDER_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, snap)) = ctx.frame_with_signature(EXPRESSION_BUILDER_SIGNATURE) else {
            return SolveResult::failure(self.name(), "builder frame disappeared");
        };
        let Some(target) = prompt_target(ctx) else {
            return SolveResult::failure(self.name(), "no target value in prompt");
        };

        let input = parse_frame_input(&snap.srcdoc);
        let slots = input
            .as_ref()
            .and_then(|i| input_number(i, "slots"))
            .map(|s| s as usize)
            .unwrap_or(1);

        let tokens: Vec<(usize, f64)> = (0..ctx.choices().len())
            .filter_map(|i| ctx.choice_value(i).map(|v| (i, v)))
            .collect();
        if tokens.is_empty() {
            return SolveResult::failure(self.name(), "no numeric tokens to build with");
        }

        if slots <= 1 {
            let Some(&(index, value)) = tokens.iter().find(|(_, v)| approx_eq(*v, target)) else {
                return SolveResult::failure(
                    self.name(),
                    format!("no token equals target {}", format_number(target)),
                );
            };
            let mut actions = vec![UiAction::click(index)];
            actions.extend(entries_plan(frame, "entries", vec![json!(value)]));
            return SolveResult::solved(self.name(), Answer::Choice { index }, actions);
        }

        // Multi-slot: two tokens joined by one of the widget's operators.
        let operators: Vec<String> = input
            .as_ref()
            .and_then(|i| i.get("operators"))
            .and_then(|v| v.as_array())
            .map(|ops| {
                ops.iter()
                    .filter_map(|o| o.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(|| vec!["+".into(), "-".into(), "*".into(), "/".into()]);

        for &(i, a) in &tokens {
            for &(j, b) in &tokens {
                if i == j {
                    continue;
                }
                for op in &operators {
                    let result = match op.as_str() {
                        "+" => a + b,
                        "-" => a - b,
                        "*" => a * b,
                        "/" if b.abs() > EPSILON => a / b,
                        _ => continue,
                    };
                    if approx_eq(result, target) {
                        let mut actions = staggered_clicks(&[i, j]);
                        actions.extend(entries_plan(
                            frame,
                            "entries",
                            vec![json!(a), json!(op), json!(b)],
                        ));
                        return SolveResult::solved(
                            self.name(),
                            Answer::Choices { indices: vec![i, j] },
                            actions,
                        );
                    }
                }
            }
        }

        SolveResult::failure(self.name(), "no token combination reaches the target")
    }
}

// =============================================================================
// Factor tree
// =============================================================================

/// Completes a factor-tree widget with the prime factorization of the root.
pub struct FactorTreeSolver;

impl Solver for FactorTreeSolver {
    fn name(&self) -> &'static str {
        "factor-tree"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(FACTOR_TREE_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, snap)) = ctx.frame_with_signature(FACTOR_TREE_SIGNATURE) else {
            return SolveResult::failure(self.name(), "factor tree frame disappeared");
        };
        let input = parse_frame_input(&snap.srcdoc);
        let root = input
            .as_ref()
            .and_then(|i| input_number(i, "root"))
            .or_else(|| annotation_number(ctx))
            .map(|v| v as i64);
        let Some(root) = root.filter(|n| *n >= 2) else {
            return SolveResult::failure(self.name(), "no factorable root value");
        };

        let factors = prime_factors(root);
        let entries: Vec<serde_json::Value> = factors.iter().map(|f| json!(f)).collect();
        let rendered = factors
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join("*");

        SolveResult::solved(
            self.name(),
            Answer::Text { value: rendered },
            entries_plan(frame, "factors", entries),
        )
    }
}

/// Prime factorization by trial division, ascending.
pub(crate) fn prime_factors(mut n: i64) -> Vec<i64> {
    let mut factors = Vec::new();
    let mut d = 2;
    while d * d <= n {
        while n % d == 0 {
            factors.push(d);
            n /= d;
        }
        d += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

// =============================================================================
// Table fill
// =============================================================================

/// Fills the one missing cell of a ratio table by inferring the unit rate
/// from the complete rows.
pub struct TableFillSolver;

impl Solver for TableFillSolver {
    fn name(&self) -> &'static str {
        "table-fill"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(TABLE_FILL_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, snap)) = ctx.frame_with_signature(TABLE_FILL_SIGNATURE) else {
            return SolveResult::failure(self.name(), "table frame disappeared");
        };
        let Some(input) = parse_frame_input(&snap.srcdoc) else {
            return SolveResult::failure(self.name(), "table state not readable");
        };
        let Some(rows) = input.get("rows").and_then(|r| r.as_array()) else {
            return SolveResult::failure(self.name(), "table state has no rows");
        };

        let mut rate = None;
        let mut gap: Option<(usize, usize, f64)> = None; // row, col, known value
        for (ri, row) in rows.iter().enumerate() {
            let Some(cells) = row.as_array() else { continue };
            if cells.len() != 2 {
                continue;
            }
            let x = cells[0].as_f64();
            let y = cells[1].as_f64();
            match (x, y) {
                (Some(x), Some(y)) if x != 0.0 => rate = rate.or(Some(y / x)),
                (Some(x), None) => gap = gap.or(Some((ri, 1, x))),
                (None, Some(y)) => gap = gap.or(Some((ri, 0, y))),
                _ => {}
            }
        }

        let (Some(rate), Some((row, col, known))) = (rate, gap) else {
            return SolveResult::failure(self.name(), "table has no inferable rate or gap");
        };
        let value = if col == 1 { known * rate } else { known / rate };

        SolveResult::solved(
            self.name(),
            Answer::Number { value },
            numeric_plan(frame, &format!("rows.{}.{}", row, col), value),
        )
    }
}

// =============================================================================
// Point plot / line graph
// =============================================================================

/// Evaluate the right side of `y = f(x)` at a concrete x.
fn eval_rhs_at(equation: &str, x: f64) -> Option<f64> {
    let normalized = crate::math::normalize::normalize(equation);
    let rhs = normalized
        .split_once('=')
        .map(|(_, r)| r)
        .unwrap_or(&normalized);
    let substituted = rhs
        .replace('x', &format!("({})", x))
        .replace('X', &format!("({})", x));
    crate::math::eval::evaluate(&substituted)
}

/// Plots the prompted point on a coordinate widget.
pub struct PointPlotSolver;

impl Solver for PointPlotSolver {
    fn name(&self) -> &'static str {
        "point-plot"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(POINT_PLOT_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, snap)) = ctx.frame_with_signature(POINT_PLOT_SIGNATURE) else {
            return SolveResult::failure(self.name(), "plot frame disappeared");
        };
        let Some(equation) = ctx.equation_markup().or_else(|| ctx.annotation()) else {
            return SolveResult::failure(self.name(), "no equation to plot");
        };

        let input = parse_frame_input(&snap.srcdoc);
        let x = input
            .as_ref()
            .and_then(|i| input_number(i, "x"))
            .unwrap_or(1.0);
        let Some(y) = eval_rhs_at(equation, x) else {
            return SolveResult::failure(self.name(), "equation did not evaluate");
        };

        let mut actions = vec![
            UiAction::WidgetWrite {
                frame,
                path: "point".into(),
                value: json!([x, y]),
            },
            UiAction::WidgetNotify { frame },
            UiAction::PostMessage {
                frame,
                payload: json!({ "type": "set-input", "path": "point", "value": [x, y] }),
            },
        ];
        actions.push(inject_set_entries(frame, &[json!(x), json!(y)]));

        SolveResult::solved(
            self.name(),
            Answer::Text {
                value: format!("({}, {})", format_number(x), format_number(y)),
            },
            actions,
        )
    }
}

/// Draws the prompted line through two computed points.
pub struct LineGraphSolver;

impl Solver for LineGraphSolver {
    fn name(&self) -> &'static str {
        "line-graph"
    }

    fn can_solve(&self, ctx: &ChallengeContext) -> bool {
        ctx.frame_with_signature(LINE_GRAPH_SIGNATURE).is_some()
    }

    fn solve(&self, ctx: &ChallengeContext) -> SolveResult {
        let Some((frame, _)) = ctx.frame_with_signature(LINE_GRAPH_SIGNATURE) else {
            return SolveResult::failure(self.name(), "graph frame disappeared");
        };
        let Some(equation) = ctx.equation_markup().or_else(|| ctx.annotation()) else {
            return SolveResult::failure(self.name(), "no equation to graph");
        };

        let (Some(y0), Some(y1)) = (eval_rhs_at(equation, 0.0), eval_rhs_at(equation, 1.0)) else {
            return SolveResult::failure(self.name(), "equation did not evaluate");
        };
        let points = json!([[0.0, y0], [1.0, y1]]);

        let actions = vec![
            UiAction::WidgetWrite {
                frame,
                path: "points".into(),
                value: points.clone(),
            },
            UiAction::WidgetNotify { frame },
            UiAction::PostMessage {
                frame,
                payload: json!({ "type": "set-input", "path": "points", "value": points }),
            },
            inject_set_entries(frame, &[json!([0.0, y0]), json!([1.0, y1])]),
        ];

        SolveResult::solved(
            self.name(),
            Answer::Equation {
                equation: equation.to_string(),
                value: y1 - y0,
            },
            actions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{
        ChoiceSnapshot, EquationSnapshot, ExerciseSnapshot, FrameSnapshot,
    };

    fn widget_ctx(signature: &str, script: &str, equation: Option<&str>) -> ChallengeContext {
        ChallengeContext::from_snapshot(ExerciseSnapshot {
            header: "Use the widget".into(),
            equation: equation.map(|m| EquationSnapshot {
                markup: m.into(),
                annotation: None,
            }),
            frames: vec![FrameSnapshot {
                srcdoc: format!(r#"<div class="{}"></div><script>{}</script>"#, signature, script),
            }],
            ..Default::default()
        })
    }

    #[test]
    fn test_slider_snaps_to_step() {
        let ctx = widget_ctx(
            SLIDER_SIGNATURE,
            r#"var challengeInput = {"min": 0, "max": 50, "step": 5};"#,
            Some("\\duoblank{1}=5*5"),
        );
        let solver = SliderSolver;
        assert!(solver.can_solve(&ctx));
        let result = solver.solve(&ctx);
        assert!(result.success);
        assert_eq!(result.answer, Some(Answer::Number { value: 25.0 }));
        assert_eq!(result.actions[0].name(), "widget_write");
        assert_eq!(result.actions.last().unwrap().name(), "inject_script");
    }

    #[test]
    fn test_slider_without_state_uses_defaults() {
        let ctx = widget_ctx(SLIDER_SIGNATURE, "", Some("\\duoblank{1}=42"));
        let result = SliderSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(result.answer, Some(Answer::Number { value: 42.0 }));
    }

    #[test]
    fn test_expression_builder_single_slot() {
        let mut snapshot = ExerciseSnapshot {
            header: "Build the expression".into(),
            equation: Some(EquationSnapshot {
                markup: "-10=\\duoblank{3}".into(),
                annotation: None,
            }),
            frames: vec![FrameSnapshot {
                srcdoc: format!(
                    r#"<div class="{}"></div><script>var challengeInput = {{"slots": 1}};</script>"#,
                    EXPRESSION_BUILDER_SIGNATURE
                ),
            }],
            ..Default::default()
        };
        for t in ["3", "-10", "-4"] {
            snapshot.choices.push(ChoiceSnapshot {
                text: t.into(),
                ..Default::default()
            });
        }
        let ctx = ChallengeContext::from_snapshot(snapshot);
        let result = ExpressionBuilderSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(result.answer, Some(Answer::Choice { index: 1 }));
        assert_eq!(result.actions[0], UiAction::click(1));
    }

    #[test]
    fn test_expression_builder_two_tokens() {
        let mut snapshot = ExerciseSnapshot {
            header: "Build the expression".into(),
            equation: Some(EquationSnapshot {
                markup: "12=\\duoblank{1}".into(),
                annotation: None,
            }),
            frames: vec![FrameSnapshot {
                srcdoc: format!(
                    r#"<div class="{}"></div><script>var challengeInput = {{"slots": 3, "operators": ["*"]}};</script>"#,
                    EXPRESSION_BUILDER_SIGNATURE
                ),
            }],
            ..Default::default()
        };
        for t in ["5", "3", "4"] {
            snapshot.choices.push(ChoiceSnapshot {
                text: t.into(),
                ..Default::default()
            });
        }
        let ctx = ChallengeContext::from_snapshot(snapshot);
        let result = ExpressionBuilderSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(
            result.answer,
            Some(Answer::Choices {
                indices: vec![1, 2]
            })
        );
    }

    #[test]
    fn test_factor_tree() {
        let ctx = widget_ctx(
            FACTOR_TREE_SIGNATURE,
            r#"var challengeInput = {"root": 12};"#,
            None,
        );
        let result = FactorTreeSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(
            result.answer,
            Some(Answer::Text {
                value: "2*2*3".into()
            })
        );
    }

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(12), vec![2, 2, 3]);
        assert_eq!(prime_factors(97), vec![97]);
        assert_eq!(prime_factors(60), vec![2, 2, 3, 5]);
    }

    #[test]
    fn test_table_fill() {
        let ctx = widget_ctx(
            TABLE_FILL_SIGNATURE,
            r#"var challengeInput = {"rows": [[1, 3], [2, 6], [4, null]]};"#,
            None,
        );
        let result = TableFillSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(result.answer, Some(Answer::Number { value: 12.0 }));
        if let UiAction::WidgetWrite { path, .. } = &result.actions[0] {
            assert_eq!(path, "rows.2.1");
        } else {
            panic!("expected WidgetWrite first");
        }
    }

    #[test]
    fn test_point_plot() {
        let ctx = widget_ctx(
            POINT_PLOT_SIGNATURE,
            r#"var challengeInput = {"x": 3};"#,
            Some("y=2*x+1"),
        );
        let result = PointPlotSolver.solve(&ctx);
        assert!(result.success);
        assert_eq!(
            result.answer,
            Some(Answer::Text {
                value: "(3, 7)".into()
            })
        );
    }

    #[test]
    fn test_line_graph() {
        let ctx = widget_ctx(LINE_GRAPH_SIGNATURE, "", Some("y=3*x+2"));
        let result = LineGraphSolver.solve(&ctx);
        assert!(result.success);
        if let Some(Answer::Equation { value, .. }) = result.answer {
            assert!(approx_eq(value, 3.0));
        } else {
            panic!("expected equation answer");
        }
    }

    #[test]
    fn test_widget_failure_has_no_actions() {
        let ctx = widget_ctx(SLIDER_SIGNATURE, "", None);
        let result = SliderSolver.solve(&ctx);
        assert!(!result.success);
        assert!(result.actions.is_empty());
        assert!(result.error.is_some());
    }
}
