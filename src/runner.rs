//! Fixture runner — builds a context per exercise, runs the solver chain,
//! and checks expectations.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::ChallengeContext;
use crate::fixture::Fixture;
use crate::solver::SolverRegistry;

/// Result of running a fixture.
#[derive(Debug)]
pub struct RunReport {
    /// Whether every exercise solved and every expectation held.
    pub success: bool,
    /// Exercises that produced a successful solve.
    pub solved: usize,
    /// Total exercises in the fixture.
    pub total: usize,
    /// Human-readable failures, one per failed exercise.
    pub failures: Vec<String>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Run every exercise of a fixture through the registry.
pub fn run_fixture(registry: &SolverRegistry, fixture: &Fixture) -> RunReport {
    let start = Instant::now();
    let mut solved = 0;
    let mut failures = Vec::new();

    for (i, exercise) in fixture.exercises.iter().enumerate() {
        let label = format!("exercise {}", i + 1);
        let ctx = ChallengeContext::from_snapshot(exercise.snapshot.clone());

        let solver_name = registry.find_solver(&ctx).map(|s| s.name());
        debug!(
            "{}: matched solver {:?} (header: '{}')",
            label,
            solver_name,
            ctx.header_text()
        );

        let result = registry.solve(&ctx);
        match &result {
            Some(r) if r.success => {
                solved += 1;
                info!("{}: solved by {} ({} actions)", label, r.kind, r.actions.len());
            }
            Some(r) => {
                warn!(
                    "{}: {} failed: {}",
                    label,
                    r.kind,
                    r.error.as_deref().unwrap_or("unknown reason")
                );
                failures.push(format!(
                    "{}: {} failed: {}",
                    label,
                    r.kind,
                    r.error.as_deref().unwrap_or("unknown reason")
                ));
            }
            None => {
                warn!("{}: no solver matched", label);
                failures.push(format!("{}: no solver matched", label));
            }
        }

        if let Some(ref expect) = exercise.expect {
            if let Err(mismatch) = expect.check(solver_name, result.as_ref()) {
                warn!("{}: expectation failed: {}", label, mismatch);
                failures.push(format!("{}: {}", label, mismatch));
            }
        }
    }

    RunReport {
        success: failures.is_empty(),
        solved,
        total: fixture.exercises.len(),
        failures,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}
