//! Challenge context — the immutable snapshot every solver reads.
//!
//! The automation shell scrapes the current exercise container into an
//! [`ExerciseSnapshot`] once per polling cycle. The context wraps that
//! snapshot with the derived accessors solvers share (lower-cased header,
//! decoded choice values) and is discarded after one solve attempt.

use serde::{Deserialize, Serialize};

use crate::diagram::{block, grid, pie};
use crate::math::eval::evaluate;

/// One exercise as scraped from the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseSnapshot {
    /// Instruction text above the exercise.
    #[serde(default)]
    pub header: String,

    /// The primary formula container, if any.
    #[serde(default)]
    pub equation: Option<EquationSnapshot>,

    /// Whether a free-text answer field is present.
    #[serde(default)]
    pub text_input: bool,

    /// Selectable answer elements, in DOM order. Order is significant:
    /// the index is the click target.
    #[serde(default)]
    pub choices: Vec<ChoiceSnapshot>,

    /// Sandboxed widget frames in the container, in DOM order.
    #[serde(default)]
    pub frames: Vec<FrameSnapshot>,
}

/// The primary formula of an exercise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationSnapshot {
    /// KaTeX-style source of the formula.
    #[serde(default)]
    pub markup: String,

    /// Raw accessibility annotation (e.g. the plain number the formula
    /// renders), when the scraper found one.
    #[serde(default)]
    pub annotation: Option<String>,
}

/// One selectable answer element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceSnapshot {
    /// Visible text of the choice.
    #[serde(default)]
    pub text: String,

    /// KaTeX markup inside the choice, when present.
    #[serde(default)]
    pub markup: Option<String>,

    /// Embedded diagram markup, when the choice renders an SVG widget.
    #[serde(default)]
    pub srcdoc: Option<String>,
}

impl ChoiceSnapshot {
    /// The markup to evaluate for this choice: KaTeX if present, else the
    /// visible text.
    pub fn content(&self) -> &str {
        self.markup.as_deref().unwrap_or(&self.text)
    }

    /// Decode this choice to a number: evaluated KaTeX/text first, then
    /// the diagram decoders over the embedded markup.
    pub fn value(&self) -> Option<f64> {
        if let Some(v) = evaluate(self.content()) {
            return Some(v);
        }
        let srcdoc = self.srcdoc.as_deref()?;
        if let Some(count) = block::decode(srcdoc) {
            return Some(count as f64);
        }
        if let Some(f) = pie::decode(srcdoc) {
            return Some(f.value());
        }
        grid::decode(srcdoc).map(|f| f.value())
    }
}

/// One sandboxed widget frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// The frame's literal HTML payload, including any embedded script
    /// source.
    #[serde(default)]
    pub srcdoc: String,
}

/// The immutable view of one exercise handed to every solver.
#[derive(Debug, Clone)]
pub struct ChallengeContext {
    snapshot: ExerciseSnapshot,
    header_text: String,
}

impl ChallengeContext {
    /// Build a context from a scraped snapshot. Called once per polling
    /// cycle; the context is never mutated afterwards.
    pub fn from_snapshot(snapshot: ExerciseSnapshot) -> Self {
        let header_text = snapshot.header.to_lowercase();
        Self {
            snapshot,
            header_text,
        }
    }

    /// Raw header text.
    pub fn header(&self) -> &str {
        &self.snapshot.header
    }

    /// Lower-cased header text, what predicates match against.
    pub fn header_text(&self) -> &str {
        &self.header_text
    }

    pub fn equation(&self) -> Option<&EquationSnapshot> {
        self.snapshot.equation.as_ref()
    }

    /// KaTeX markup of the primary formula, empty-string-free.
    pub fn equation_markup(&self) -> Option<&str> {
        self.equation()
            .map(|e| e.markup.as_str())
            .filter(|m| !m.is_empty())
    }

    /// Raw annotation of the primary formula.
    pub fn annotation(&self) -> Option<&str> {
        self.equation()
            .and_then(|e| e.annotation.as_deref())
            .filter(|a| !a.is_empty())
    }

    pub fn has_text_input(&self) -> bool {
        self.snapshot.text_input
    }

    pub fn choices(&self) -> &[ChoiceSnapshot] {
        &self.snapshot.choices
    }

    pub fn choice(&self, index: usize) -> Option<&ChoiceSnapshot> {
        self.snapshot.choices.get(index)
    }

    /// Decoded numeric value of a choice.
    pub fn choice_value(&self, index: usize) -> Option<f64> {
        self.choice(index)?.value()
    }

    /// The primary sandboxed widget (the first frame), if any.
    pub fn iframe(&self) -> Option<&FrameSnapshot> {
        self.snapshot.frames.first()
    }

    /// All widget frames in the container.
    pub fn frames(&self) -> &[FrameSnapshot] {
        &self.snapshot.frames
    }

    /// Index and snapshot of the first frame whose markup contains the
    /// given signature.
    pub fn frame_with_signature(&self, signature: &str) -> Option<(usize, &FrameSnapshot)> {
        self.snapshot
            .frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.srcdoc.contains(signature))
    }
}
