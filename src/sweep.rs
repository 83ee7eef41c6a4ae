//! Range sweep: one independent angle search per integer target distance.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::constants::{
    DEFAULT_SWEEP_END_YARDS, DEFAULT_SWEEP_START_YARDS, DEFAULT_SWEEP_STEP_YARDS,
};
use crate::error::{Result, SightError};
use crate::solver::{AngleOutcome, AngleSolver};

/// Sight angle per target distance in yards, ordered by distance.
pub type AngleTable = BTreeMap<u32, AngleOutcome>;

/// Inclusive range of target distances, in whole yards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRange {
    pub start_yards: u32,
    pub end_yards: u32,
    pub step_yards: u32,
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            start_yards: DEFAULT_SWEEP_START_YARDS,
            end_yards: DEFAULT_SWEEP_END_YARDS,
            step_yards: DEFAULT_SWEEP_STEP_YARDS,
        }
    }
}

impl SweepRange {
    pub fn validate(&self) -> Result<()> {
        if self.step_yards == 0 {
            return Err(SightError::invalid("step_yards", "must be at least 1"));
        }
        if self.start_yards > self.end_yards {
            return Err(SightError::invalid(
                "sweep range",
                format!(
                    "start {} is past end {}",
                    self.start_yards, self.end_yards
                ),
            ));
        }
        Ok(())
    }

    pub fn distances(&self) -> Vec<u32> {
        (self.start_yards..=self.end_yards)
            .step_by(self.step_yards.max(1) as usize)
            .collect()
    }
}

/// Solve every distance in `range`.
///
/// With `parallel` the searches run on the rayon pool. Each search owns its
/// own simulation state, so the table is identical either way.
pub fn sweep(solver: &AngleSolver, range: &SweepRange, parallel: bool) -> Result<AngleTable> {
    range.validate()?;
    let distances = range.distances();

    let solve_one = |&yards: &u32| -> Result<(u32, AngleOutcome)> {
        let outcome = solver.solve(f64::from(yards))?;
        if !outcome.is_found() {
            warn!(distance_yards = yards, "no suitable angle found");
        }
        Ok((yards, outcome))
    };

    let table: AngleTable = if parallel {
        distances
            .par_iter()
            .map(solve_one)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .collect()
    } else {
        distances
            .iter()
            .map(solve_one)
            .collect::<Result<AngleTable>>()?
    };

    let found = table.values().filter(|o| o.is_found()).count();
    info!(
        distances = table.len(),
        found,
        missing = table.len() - found,
        "sweep complete"
    );

    Ok(table)
}
