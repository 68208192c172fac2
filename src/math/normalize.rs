//! Math-text normalizer — desugars exercise markup into an ASCII
//! arithmetic expression the evaluator understands.
//!
//! The vendor renders formulas as LaTeX-flavoured markup. Normalization
//! unwraps formatting commands, rewrites named operators and unicode
//! symbols to `+ - * /`, converts fraction commands to `(a/b)`, and strips
//! whitespace. Commands with unbalanced braces are left unexpanded rather
//! than failing the whole string.

/// Formatting-only wrappers whose argument replaces the whole command.
const WRAPPER_COMMANDS: &[&str] = &["\\mathbf", "\\textbf", "\\boxed", "\\text"];

/// Unary negation wrapper applied to a parenthesized sub-expression.
const NEGATION_COMMAND: &str = "\\neg";

/// Cap on negation-resolution passes; malformed input stops here instead
/// of spinning.
const MAX_NEGATION_PASSES: usize = 16;

/// LaTeX spacing commands that carry no arithmetic meaning.
const SPACING_COMMANDS: &[&str] = &["\\quad", "\\qquad", "\\,", "\\;", "\\:", "\\!", "\\ "];

/// Normalize raw exercise markup into a plain arithmetic expression.
///
/// Steps run in a fixed order: wrapper stripping, bracket normalization,
/// negation resolution, operator mapping, comparison mapping, fraction
/// conversion, whitespace stripping. Empty and already-plain input pass
/// through unchanged.
pub fn normalize(raw: &str) -> String {
    let mut s = strip_wrappers(raw);
    s = strip_directional_brackets(&s);
    s = resolve_negations(&s);

    s = replace_command(&s, "\\times", "*");
    s = replace_command(&s, "\\centerdot", "*");
    s = replace_command(&s, "\\cdot", "*");
    s = replace_command(&s, "\\div", "/");
    s = s.replace('×', "*").replace('⋅', "*").replace('÷', "/");
    s = s.replace('−', "-");

    s = replace_command(&s, "\\geq", ">=");
    s = replace_command(&s, "\\leq", "<=");
    s = replace_command(&s, "\\ge", ">=");
    s = replace_command(&s, "\\le", "<=");
    s = replace_command(&s, "\\pm", "+-");
    s = s.replace('≥', ">=").replace('≤', "<=").replace('±', "+-");

    s = convert_fractions(&s);

    for cmd in SPACING_COMMANDS {
        s = s.replace(cmd, "");
    }
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Convert every `\frac{a}{b}` occurrence into `(a/b)`.
///
/// Each pass consumes exactly one outer fraction; inner fractions surface
/// in the replacement text and are converted on a later pass, so nesting
/// resolves outer-first. Malformed fractions (missing or unbalanced brace
/// arguments) are left as-is.
pub fn convert_fractions(input: &str) -> String {
    let mut s = input.to_string();
    loop {
        let Some(pos) = find_command(&s, "\\frac") else {
            break;
        };
        let after = pos + "\\frac".len();
        if !s[after..].starts_with('{') {
            break;
        }
        let Some((numerator, num_end)) = brace_argument(&s, after) else {
            break;
        };
        if !s[num_end..].starts_with('{') {
            break;
        }
        let Some((denominator, den_end)) = brace_argument(&s, num_end) else {
            break;
        };
        let replacement = format!("({}/{})", numerator, denominator);
        s.replace_range(pos..den_end, &replacement);
    }
    s
}

/// Find the first occurrence of `cmd` that is not a prefix of a longer
/// command name (the next character must not be alphabetic).
pub(crate) fn find_command(s: &str, cmd: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = s[from..].find(cmd) {
        let pos = from + rel;
        let after = pos + cmd.len();
        let boundary = s[after..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphabetic());
        if boundary {
            return Some(pos);
        }
        from = after;
    }
    None
}

/// Extract the balanced `{...}` argument starting at `open` (which must
/// point at `{`). Returns the argument content and the index just past the
/// closing brace, or `None` when braces never balance.
pub(crate) fn brace_argument(s: &str, open: usize) -> Option<(String, usize)> {
    if !s[open..].starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((s[open + 1..open + i].to_string(), open + i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Replace every standalone occurrence of a command with `replacement`.
fn replace_command(s: &str, cmd: &str, replacement: &str) -> String {
    let mut out = s.to_string();
    while let Some(pos) = find_command(&out, cmd) {
        out.replace_range(pos..pos + cmd.len(), replacement);
    }
    out
}

/// Unwrap formatting commands, innermost surviving until a later pass.
fn strip_wrappers(input: &str) -> String {
    let mut s = input.to_string();
    loop {
        let mut changed = false;
        for cmd in WRAPPER_COMMANDS {
            if let Some(pos) = find_command(&s, cmd) {
                let after = pos + cmd.len();
                if let Some((arg, end)) = brace_argument(&s, after) {
                    s.replace_range(pos..end, &arg);
                    changed = true;
                }
                // unbalanced or missing braces: leave the command in place
            }
        }
        if !changed {
            break;
        }
    }
    s
}

/// `\left(` / `\right)` carry no arithmetic meaning; drop the commands and
/// keep the plain brackets.
fn strip_directional_brackets(input: &str) -> String {
    let mut s = replace_command(input, "\\left", "");
    s = replace_command(&s, "\\right", "");
    s
}

/// Rewrite `\neg( ... )` as `-( ... )`, matching the closing parenthesis by
/// depth counting. A negation command with no parenthesized argument is
/// stripped blind.
fn resolve_negations(input: &str) -> String {
    let mut s = input.to_string();
    for _ in 0..MAX_NEGATION_PASSES {
        let Some(pos) = find_command(&s, NEGATION_COMMAND) else {
            break;
        };
        let after = pos + NEGATION_COMMAND.len();
        let trimmed = s[after..].trim_start();
        let open = after + (s[after..].len() - trimmed.len());
        if trimmed.starts_with('(') && matching_paren(&s, open).is_some() {
            s.replace_range(pos..open, "-");
        } else {
            s.replace_range(pos..after, "");
        }
    }
    s
}

/// Index of the parenthesis matching the one at `open`, by depth counting.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_passes_through() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("2+3"), "2+3");
        assert_eq!(normalize("10 * 5"), "10*5");
    }

    #[test]
    fn test_wrapper_stripping() {
        assert_eq!(normalize("\\mathbf{42}"), "42");
        assert_eq!(normalize("\\text{3}+\\boxed{4}"), "3+4");
    }

    #[test]
    fn test_nested_wrappers_fully_unwrap() {
        assert_eq!(normalize("\\mathbf{\\text{7}}"), "7");
        assert_eq!(normalize("\\boxed{\\mathbf{1}+2}"), "1+2");
    }

    #[test]
    fn test_textbf_not_confused_with_text() {
        assert_eq!(normalize("\\textbf{5}"), "5");
    }

    #[test]
    fn test_unbalanced_wrapper_left_unexpanded() {
        assert_eq!(normalize("\\mathbf{42"), "\\mathbf{42");
    }

    #[test]
    fn test_fraction_conversion() {
        assert_eq!(convert_fractions("\\frac{1}{2}"), "(1/2)");
        assert_eq!(normalize("\\frac{1}{2}"), "(1/2)");
    }

    #[test]
    fn test_nested_fraction_conversion() {
        assert_eq!(convert_fractions("\\frac{\\frac{1}{2}}{3}"), "((1/2)/3)");
    }

    #[test]
    fn test_operator_mapping() {
        assert_eq!(normalize("3\\times4"), "3*4");
        assert_eq!(normalize("8\\div2"), "8/2");
        assert_eq!(normalize("2\\cdot3"), "2*3");
        assert_eq!(normalize("6×7"), "6*7");
        assert_eq!(normalize("9÷3"), "9/3");
        assert_eq!(normalize("5−2"), "5-2");
    }

    #[test]
    fn test_comparison_mapping() {
        assert_eq!(normalize("x\\geq3"), "x>=3");
        assert_eq!(normalize("x≤\\frac{1}{2}"), "x<=(1/2)");
    }

    #[test]
    fn test_directional_brackets() {
        assert_eq!(normalize("\\left(1+2\\right)"), "(1+2)");
    }

    #[test]
    fn test_negation_rewrite() {
        assert_eq!(normalize("\\neg(3+4)"), "-(3+4)");
        assert_eq!(normalize("2-\\neg(1)"), "2--(1)");
    }

    #[test]
    fn test_negation_blind_strip_without_parens() {
        assert_eq!(normalize("\\neg 5"), "5");
    }

    #[test]
    fn test_spacing_commands_removed() {
        assert_eq!(normalize("1\\,+\\;2"), "1+2");
        assert_eq!(normalize("3\\quad*\\qquad2"), "3*2");
    }
}
