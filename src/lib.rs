//! # mathdrill
//!
//! Challenge classification and answer derivation for in-page math exercise
//! widgets. The crate is the solving core of a browser automation loop: an
//! external shell scrapes the current exercise into an [`ExerciseSnapshot`],
//! the core classifies it, derives the answer, and hands back a
//! [`SolveResult`] carrying a plan of UI actions for the shell to execute.
//!
//! ## Quick Start
//!
//! ```rust
//! use mathdrill::{ChallengeContext, ExerciseSnapshot, SolverRegistry};
//!
//! let snapshot: ExerciseSnapshot = serde_yaml::from_str(
//!     r#"
//! header: "Solve for the missing number"
//! text_input: true
//! equation:
//!   markup: "3+\\duoblank{1}=7"
//! "#,
//! )
//! .unwrap();
//!
//! let registry = SolverRegistry::with_default_solvers();
//! let ctx = ChallengeContext::from_snapshot(snapshot);
//! let result = registry.solve(&ctx).expect("a solver should match");
//! assert!(result.success);
//! ```

pub mod context;
pub mod diagram;
pub mod fixture;
pub mod math;
pub mod plan;
pub mod runner;
pub mod solver;

pub use context::{ChallengeContext, ChoiceSnapshot, EquationSnapshot, ExerciseSnapshot, FrameSnapshot};
pub use fixture::{Expectation, ExerciseFixture, Fixture};
pub use math::fraction::Fraction;
pub use plan::{Answer, SolveResult, UiAction};
pub use runner::{run_fixture, RunReport};
pub use solver::{Solver, SolverRegistry};

/// Result type for mathdrill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during fixture loading or answer derivation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fixture error: {0}")]
    Fixture(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("division by zero")]
    DivisionByZero,
}
