//! Solve results and the UI action plan.
//!
//! Solvers never touch the page themselves: they return a [`SolveResult`]
//! whose `actions` field is the ordered plan the automation shell executes.
//! Widget-directed actions come in a fixed fallback order (state write,
//! notify hook, cross-window message, script injection); the shell stops at
//! the first surface that succeeds and never acknowledges back.

use serde::Serialize;

use crate::math::fraction::Fraction;

/// One UI interaction for the shell to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    /// Pointer click on a choice element by index. `delay_ms` staggers
    /// multi-click plans so the page can settle between interactions.
    ClickChoice { index: usize, delay_ms: u64 },

    /// Set the text input's value and fire its input notification event.
    TypeText { value: String },

    /// In-place mutation of a sandboxed widget's exposed state object.
    /// `path` is a dotted property path; `value` is a JSON literal.
    WidgetWrite {
        frame: usize,
        path: String,
        value: serde_json::Value,
    },

    /// Invoke the widget's own update-notification hook.
    WidgetNotify { frame: usize },

    /// Cross-window message fallback.
    PostMessage {
        frame: usize,
        payload: serde_json::Value,
    },

    /// Last-resort script injection. Sources come only from the enumerated
    /// templates below — never from solver-built strings.
    InjectScript { frame: usize, source: String },
}

impl UiAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClickChoice { .. } => "click_choice",
            Self::TypeText { .. } => "type_text",
            Self::WidgetWrite { .. } => "widget_write",
            Self::WidgetNotify { .. } => "widget_notify",
            Self::PostMessage { .. } => "post_message",
            Self::InjectScript { .. } => "inject_script",
        }
    }

    pub fn click(index: usize) -> Self {
        Self::ClickChoice { index, delay_ms: 0 }
    }
}

/// Enumerated injection templates. Values are serialized through
/// `serde_json` so only numeric/array literals can ever reach the page.
pub fn inject_set_value(frame: usize, value: f64) -> UiAction {
    UiAction::InjectScript {
        frame,
        source: format!(
            "window.setInput && window.setInput({});",
            serde_json::json!(value)
        ),
    }
}

/// Injection template for entry-list widgets (expression builder, factor
/// tree).
pub fn inject_set_entries(frame: usize, entries: &[serde_json::Value]) -> UiAction {
    UiAction::InjectScript {
        frame,
        source: format!(
            "window.setEntries && window.setEntries({});",
            serde_json::Value::Array(entries.to_vec())
        ),
    }
}

/// Kind-specific payload of a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Answer {
    Number { value: f64 },
    Fraction { fraction: Fraction },
    Text { value: String },
    Choice { index: usize },
    Choices { indices: Vec<usize> },
    Pairs { pairs: Vec<(usize, usize)> },
    Equation { equation: String, value: f64 },
}

/// What one solve attempt produced.
///
/// Invariant: `success == false` implies `error` is present and `actions`
/// is empty — failures are detected before any plan is emitted.
#[derive(Debug, Clone, Serialize)]
pub struct SolveResult {
    /// Discriminator: the name of the solver that produced this result.
    pub kind: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    pub actions: Vec<UiAction>,
}

impl SolveResult {
    pub fn solved(kind: &'static str, answer: Answer, actions: Vec<UiAction>) -> Self {
        Self {
            kind,
            success: true,
            error: None,
            answer: Some(answer),
            actions,
        }
    }

    pub fn failure(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            success: false,
            error: Some(reason.into()),
            answer: None,
            actions: Vec::new(),
        }
    }
}

/// Render a derived number the way exercises expect typed answers:
/// integers as plain digits, decimals trimmed of trailing zeros.
pub fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < crate::math::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        let s = format!("{:.4}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        let ok = SolveResult::solved("demo", Answer::Number { value: 4.0 }, vec![UiAction::click(1)]);
        assert!(ok.success);
        assert!(ok.error.is_none());
        assert_eq!(ok.actions.len(), 1);

        let failed = SolveResult::failure("demo", "nothing matched");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("nothing matched"));
        assert!(failed.actions.is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(40.0), "40");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(1.95), "1.95");
        assert_eq!(format_number(0.5), "0.5");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(UiAction::click(0).name(), "click_choice");
        assert_eq!(
            UiAction::TypeText { value: "4".into() }.name(),
            "type_text"
        );
    }

    #[test]
    fn test_inject_templates_are_literal() {
        let action = inject_set_value(0, 12.5);
        if let UiAction::InjectScript { source, .. } = action {
            assert_eq!(source, "window.setInput && window.setInput(12.5);");
        } else {
            panic!("expected InjectScript");
        }

        let entries = vec![serde_json::json!(2), serde_json::json!(3)];
        let action = inject_set_entries(1, &entries);
        if let UiAction::InjectScript { source, .. } = action {
            assert_eq!(source, "window.setEntries && window.setEntries([2,3]);");
        } else {
            panic!("expected InjectScript");
        }
    }
}
