//! Fixture files — deterministic exercise runs defined in YAML.
//!
//! A fixture bundles scraped exercise snapshots with optional
//! expectations, so solver behavior can be replayed and checked without a
//! live page.

use std::path::Path;

use serde::Deserialize;

use crate::context::ExerciseSnapshot;
use crate::math::approx_eq;
use crate::plan::{Answer, SolveResult, UiAction};
use crate::{Error, Result};

/// Top-level fixture structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Name of this fixture.
    pub name: String,

    /// Exercises to run, in order.
    #[serde(default)]
    pub exercises: Vec<ExerciseFixture>,
}

/// One exercise plus what the run should produce.
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseFixture {
    #[serde(flatten)]
    pub snapshot: ExerciseSnapshot,

    /// Expected outcome (optional).
    pub expect: Option<Expectation>,
}

/// Expected outcome of one exercise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectation {
    /// Name of the solver that should match.
    pub solver: Option<String>,

    /// Index of the choice that should be clicked.
    pub choice: Option<usize>,

    /// Indices that should all be clicked (select-all, pairs flattened).
    pub choices: Option<Vec<usize>>,

    /// Text that should be typed.
    pub text: Option<String>,

    /// Numeric answer within the standard tolerance.
    pub number: Option<f64>,
}

impl Fixture {
    /// Load a fixture from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a fixture from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self> {
        let fixture: Fixture = serde_yaml::from_str(yaml)?;
        fixture.validate()?;
        Ok(fixture)
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Fixture("name is required".into()));
        }
        if self.exercises.is_empty() {
            return Err(Error::Fixture("at least one exercise is required".into()));
        }
        for (i, exercise) in self.exercises.iter().enumerate() {
            let s = &exercise.snapshot;
            let has_surface = !s.header.is_empty()
                || s.equation.is_some()
                || !s.choices.is_empty()
                || !s.frames.is_empty();
            if !has_surface {
                return Err(Error::Fixture(format!("exercise {} is empty", i + 1)));
            }
        }
        Ok(())
    }
}

impl Expectation {
    /// Check a solve outcome against this expectation. `Err` carries the
    /// first mismatch, human-readable.
    pub fn check(
        &self,
        solver_name: Option<&str>,
        result: Option<&SolveResult>,
    ) -> std::result::Result<(), String> {
        if let Some(ref expected) = self.solver {
            match solver_name {
                Some(actual) if actual == expected => {}
                Some(actual) => {
                    return Err(format!("expected solver '{}', got '{}'", expected, actual))
                }
                None => return Err(format!("expected solver '{}', none matched", expected)),
            }
        }

        let Some(result) = result else {
            if self.choice.is_some()
                || self.choices.is_some()
                || self.text.is_some()
                || self.number.is_some()
            {
                return Err("expected an answer but nothing solved".into());
            }
            return Ok(());
        };

        if let Some(expected) = self.choice {
            let clicked = clicked_indices(result);
            if clicked != vec![expected] {
                return Err(format!("expected click on {}, got {:?}", expected, clicked));
            }
        }
        if let Some(ref expected) = self.choices {
            let clicked = clicked_indices(result);
            if &clicked != expected {
                return Err(format!("expected clicks {:?}, got {:?}", expected, clicked));
            }
        }
        if let Some(ref expected) = self.text {
            let typed = result.actions.iter().find_map(|a| match a {
                UiAction::TypeText { value } => Some(value.as_str()),
                _ => None,
            });
            if typed != Some(expected.as_str()) {
                return Err(format!("expected typed '{}', got {:?}", expected, typed));
            }
        }
        if let Some(expected) = self.number {
            let value = match &result.answer {
                Some(Answer::Number { value }) => Some(*value),
                Some(Answer::Fraction { fraction }) => Some(fraction.value()),
                Some(Answer::Equation { value, .. }) => Some(*value),
                _ => None,
            };
            match value {
                Some(v) if approx_eq(v, expected) => {}
                other => return Err(format!("expected number {}, got {:?}", expected, other)),
            }
        }
        Ok(())
    }
}

fn clicked_indices(result: &SolveResult) -> Vec<usize> {
    result
        .actions
        .iter()
        .filter_map(|a| match a {
            UiAction::ClickChoice { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}
