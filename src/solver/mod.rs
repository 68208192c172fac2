//! Solver chain-of-responsibility and its registry.
//!
//! Every solver pairs a fast, side-effect-free recognition predicate with
//! an answer-derivation algorithm. The registry holds an explicit ordered
//! list built once at startup (no module-level singletons); resolution is
//! strictly first-match-wins, because predicates are narrow but not
//! globally disjoint.

pub mod factors;
pub mod fractions;
pub mod helpers;
pub mod pairs;
pub mod rounding;
pub mod select;
pub mod typing;
pub mod widgets;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::context::ChallengeContext;
use crate::plan::SolveResult;

pub use pairs::Token;

/// One exercise variant: a recognition predicate plus its solving
/// algorithm.
pub trait Solver: Send + Sync {
    /// Stable name, used as the result discriminator and in logs.
    fn name(&self) -> &'static str;

    /// Fast, pure check whether this solver understands the exercise.
    fn can_solve(&self, ctx: &ChallengeContext) -> bool;

    /// Derive the answer and the UI action plan.
    fn solve(&self, ctx: &ChallengeContext) -> SolveResult;
}

/// The ordered solver list. Built explicitly by the caller and handed
/// around by reference; nothing here is global.
pub struct SolverRegistry {
    solvers: Vec<Box<dyn Solver>>,
}

impl SolverRegistry {
    /// An empty registry; register solvers in priority order.
    pub fn new() -> Self {
        Self {
            solvers: Vec::new(),
        }
    }

    /// The production solver chain.
    ///
    /// Ordering is load-bearing — predicates are not globally disjoint:
    /// - widget solvers run first: their containers usually also carry
    ///   equation markup that would satisfy later predicates;
    /// - pairs-matching precedes the choice families, whose signatures are
    ///   subsets of a token board;
    /// - round-to-nearest precedes generic choice-equality, whose
    ///   detection signature is a superset of its own;
    /// - the operator/comparison pickers precede equation-blank-choice,
    ///   which also accepts a blank equation with choices;
    /// - select-all precedes every single-choice solver;
    /// - type-answer is the last text-input solver (it is the catch-all);
    /// - choice-equals-equation is registered dead last.
    pub fn with_default_solvers() -> Self {
        let mut registry = Self::new();

        registry.register(Box::new(widgets::SliderSolver));
        registry.register(Box::new(widgets::SpinnerSolver));
        registry.register(Box::new(widgets::ExpressionBuilderSolver));
        registry.register(Box::new(widgets::FactorTreeSolver));
        registry.register(Box::new(widgets::TableFillSolver));
        registry.register(Box::new(widgets::PointPlotSolver));
        registry.register(Box::new(widgets::LineGraphSolver));

        registry.register(Box::new(pairs::PairsMatchingSolver));

        registry.register(Box::new(rounding::RoundToNearestChoiceSolver));
        registry.register(Box::new(rounding::RoundToNearestTypeSolver));

        registry.register(Box::new(factors::LcmChoiceSolver));
        registry.register(Box::new(factors::LcmTypeSolver));
        registry.register(Box::new(factors::GcfChoiceSolver));
        registry.register(Box::new(factors::GcfTypeSolver));
        registry.register(Box::new(factors::FactorListChoiceSolver));
        registry.register(Box::new(factors::FactorPairTableSolver));

        registry.register(Box::new(fractions::PieFractionTypeSolver));
        registry.register(Box::new(fractions::PieFractionChoiceSolver));
        registry.register(Box::new(fractions::GridFractionSolver));
        registry.register(Box::new(fractions::BlockCountSolver));

        registry.register(Box::new(fractions::SelectAllEqualSolver));
        registry.register(Box::new(fractions::EquivalentFractionChoiceSolver));
        registry.register(Box::new(select::ComparisonOperatorSolver));
        registry.register(Box::new(select::ArithmeticOperatorSolver));
        registry.register(Box::new(select::EquationBlankChoiceSolver));

        registry.register(Box::new(typing::PercentDecimalSolver));
        registry.register(Box::new(typing::TypeAnswerSolver));

        registry.register(Box::new(select::ChoiceEqualsEquationSolver));

        registry
    }

    /// Append a solver at the lowest priority.
    pub fn register(&mut self, solver: Box<dyn Solver>) {
        self.solvers.push(solver);
    }

    /// The first solver (in registration order) whose predicate accepts.
    pub fn find_solver(&self, ctx: &ChallengeContext) -> Option<&dyn Solver> {
        for solver in &self.solvers {
            if solver.can_solve(ctx) {
                debug!("predicate accepted: {}", solver.name());
                return Some(solver.as_ref());
            }
        }
        None
    }

    /// Run the matched solver. Any panic inside a solver is contained
    /// here, logged, and converted to `None` — a fault in one solver must
    /// never crash the polling loop.
    pub fn solve(&self, ctx: &ChallengeContext) -> Option<SolveResult> {
        let solver = self.find_solver(ctx)?;
        info!("solving with {}", solver.name());
        match catch_unwind(AssertUnwindSafe(|| solver.solve(ctx))) {
            Ok(result) => {
                if !result.success {
                    warn!(
                        "{} could not solve: {}",
                        solver.name(),
                        result.error.as_deref().unwrap_or("unknown reason")
                    );
                }
                Some(result)
            }
            Err(_) => {
                warn!("{} panicked; treating as unsolved", solver.name());
                None
            }
        }
    }

    /// Registered solver names, in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.solvers.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }
}

impl Default for SolverRegistry {
    fn default() -> Self {
        Self::with_default_solvers()
    }
}
