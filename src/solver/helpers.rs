//! Extraction helpers shared across solvers.
//!
//! Free functions, not inherited state: every solver composes these the
//! same way the family it belongs to does.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::context::ChallengeContext;
use crate::math::approx_eq;
use crate::plan::UiAction;

/// Delay between staggered clicks in a multi-click plan.
pub const CLICK_STAGGER_MS: u64 = 250;

static NEAREST_BASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"nearest\s*(\d+)").unwrap());
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+").unwrap());
static FLOAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

/// Rounding base from header text (`nearest 10`, `nearest100`).
pub fn nearest_base(header_text: &str) -> Option<i64> {
    NEAREST_BASE
        .captures(header_text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Every integer in a piece of text, in order.
pub fn extract_integers(text: &str) -> Vec<i64> {
    INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Every number (integer or decimal) in a piece of text, in order.
pub fn extract_floats(text: &str) -> Vec<f64> {
    FLOAT
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// First number in the equation annotation, the usual home of the "source"
/// value an exercise transforms.
pub fn annotation_number(ctx: &ChallengeContext) -> Option<f64> {
    extract_floats(ctx.annotation()?).first().copied()
}

/// Half-up rounding to the nearest multiple of `base`.
pub fn round_to_base(value: f64, base: i64) -> i64 {
    let base_f = base as f64;
    ((value / base_f + 0.5).floor() * base_f) as i64
}

/// Index of the first choice whose decoded value matches `target`.
pub fn choice_matching_value(ctx: &ChallengeContext, target: f64) -> Option<usize> {
    (0..ctx.choices().len()).find(|&i| {
        ctx.choice_value(i)
            .map_or(false, |v| approx_eq(v, target))
    })
}

/// Indices of every choice whose decoded value matches `target`.
pub fn choices_matching_value(ctx: &ChallengeContext, target: f64) -> Vec<usize> {
    (0..ctx.choices().len())
        .filter(|&i| {
            ctx.choice_value(i)
                .map_or(false, |v| approx_eq(v, target))
        })
        .collect()
}

/// Clicks for a set of choices, staggered with increasing delays.
pub fn staggered_clicks(indices: &[usize]) -> Vec<UiAction> {
    indices
        .iter()
        .enumerate()
        .map(|(n, &index)| UiAction::ClickChoice {
            index,
            delay_ms: n as u64 * CLICK_STAGGER_MS,
        })
        .collect()
}

/// Extract a widget's input-description object from its embedded script
/// source. The widget's internal structure varies across versions, so
/// several access paths are tried in a fixed order and the first parse
/// that succeeds is authoritative.
pub fn parse_frame_input(srcdoc: &str) -> Option<serde_json::Value> {
    static ASSIGNMENT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?:challengeInput|inputState)\s*=\s*\{").unwrap());
    static INPUT_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""input"\s*:\s*\{"#).unwrap());
    static DATA_ATTR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"data-input="([^"]*)""#).unwrap());

    // 1. direct assignment in script source
    if let Some(m) = ASSIGNMENT.find(srcdoc) {
        let open = m.end() - 1;
        if let Some(blob) = json_blob(srcdoc, open) {
            if let Ok(value) = serde_json::from_str(blob) {
                return Some(value);
            }
        }
        debug!("widget input assignment found but did not parse");
    }

    // 2. an "input" key inside a larger serialized state object
    if let Some(m) = INPUT_KEY.find(srcdoc) {
        let open = m.end() - 1;
        if let Some(blob) = json_blob(srcdoc, open) {
            if let Ok(value) = serde_json::from_str(blob) {
                return Some(value);
            }
        }
        debug!("widget input key found but did not parse");
    }

    // 3. an HTML-escaped data attribute
    if let Some(caps) = DATA_ATTR.captures(srcdoc) {
        let unescaped = caps[1]
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");
        if let Ok(value) = serde_json::from_str(&unescaped) {
            return Some(value);
        }
        debug!("widget data attribute found but did not parse");
    }

    None
}

/// The balanced `{...}` blob starting at `open`, brace depth tracked
/// outside string literals.
fn json_blob(s: &str, open: usize) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Numeric field of a widget input object, tolerating both number and
/// numeric-string encodings.
pub fn input_number(input: &serde_json::Value, key: &str) -> Option<f64> {
    match input.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
