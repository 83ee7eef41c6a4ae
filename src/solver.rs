//! Launch-angle search by bisection over the trajectory integrator.
//!
//! The search assumes range is non-decreasing in launch angle over the
//! bracket. That holds for angles below the range-maximizing angle, so the
//! upper bound of the bracket must stay under it.

use tracing::debug;

use crate::constants::{
    ANGLE_RESOLUTION_DEG, DEFAULT_MAX_ANGLE_DEG, DEFAULT_TOLERANCE_YARDS, YARDS_PER_METER,
};
use crate::error::{Result, SightError};
use crate::trajectory::TrajectoryIntegrator;

/// Result of searching for one target distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleOutcome {
    Found { angle_deg: f64, iterations: usize },
    NotFound { iterations: usize },
}

impl AngleOutcome {
    pub fn angle(&self) -> Option<f64> {
        match *self {
            AngleOutcome::Found { angle_deg, .. } => Some(angle_deg),
            AngleOutcome::NotFound { .. } => None,
        }
    }

    pub fn iterations(&self) -> usize {
        match *self {
            AngleOutcome::Found { iterations, .. } | AngleOutcome::NotFound { iterations } => {
                iterations
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, AngleOutcome::Found { .. })
    }
}

/// Search bracket and acceptance criteria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
    pub tolerance_yards: f64,
    pub resolution_deg: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            min_angle_deg: 0.0,
            max_angle_deg: DEFAULT_MAX_ANGLE_DEG,
            tolerance_yards: DEFAULT_TOLERANCE_YARDS,
            resolution_deg: ANGLE_RESOLUTION_DEG,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.min_angle_deg.is_finite() || !self.max_angle_deg.is_finite() {
            return Err(SightError::invalid("angle bounds", "must be finite"));
        }
        if self.min_angle_deg >= self.max_angle_deg {
            return Err(SightError::invalid(
                "angle bounds",
                format!(
                    "lower bound {} must be below upper bound {}",
                    self.min_angle_deg, self.max_angle_deg
                ),
            ));
        }
        if !self.tolerance_yards.is_finite() || self.tolerance_yards <= 0.0 {
            return Err(SightError::invalid(
                "tolerance_yards",
                format!("must be a positive finite number, got {}", self.tolerance_yards),
            ));
        }
        if !self.resolution_deg.is_finite() || self.resolution_deg <= 0.0 {
            return Err(SightError::invalid(
                "resolution_deg",
                format!("must be a positive finite number, got {}", self.resolution_deg),
            ));
        }
        Ok(())
    }
}

/// Convert yards to meters.
pub fn yards_to_meters(yards: f64) -> f64 {
    yards / YARDS_PER_METER
}

/// Finds the launch angle whose simulated range matches a target distance.
#[derive(Debug, Clone)]
pub struct AngleSolver {
    integrator: TrajectoryIntegrator,
    settings: SolverSettings,
}

impl AngleSolver {
    pub fn new(integrator: TrajectoryIntegrator, settings: SolverSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            integrator,
            settings,
        })
    }

    pub fn integrator(&self) -> &TrajectoryIntegrator {
        &self.integrator
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Acceptance window in meters.
    pub fn tolerance_m(&self) -> f64 {
        yards_to_meters(self.settings.tolerance_yards)
    }

    /// Upper bound on bisection iterations, `ceil(log2(width / resolution))`.
    ///
    /// Counted by halving the bracket until it is within the resolution, so
    /// rounding in `log2` cannot stop the search one halving early.
    pub fn max_iterations(&self) -> usize {
        let mut width = self.settings.max_angle_deg - self.settings.min_angle_deg;
        let mut halvings = 0;
        while width > self.settings.resolution_deg {
            width /= 2.0;
            halvings += 1;
        }
        halvings
    }

    /// Bisect for the angle reaching `target_yards`.
    ///
    /// Exhausting the bracket without a hit yields [`AngleOutcome::NotFound`].
    /// An integrator failure is returned as an error.
    pub fn solve(&self, target_yards: f64) -> Result<AngleOutcome> {
        let target_m = yards_to_meters(target_yards);
        let tolerance_m = self.tolerance_m();
        let max_iterations = self.max_iterations();

        let mut low = self.settings.min_angle_deg;
        let mut high = self.settings.max_angle_deg;
        let mut iterations = 0;

        while high - low > self.settings.resolution_deg && iterations < max_iterations {
            let mid = (low + high) / 2.0;
            let distance = self.integrator.range_at(mid)?;
            iterations += 1;

            debug!(
                target_yards,
                iteration = iterations,
                angle_deg = mid,
                distance_m = distance,
                "bisection step"
            );

            if (distance - target_m).abs() < tolerance_m {
                debug!(target_yards, angle_deg = mid, iterations, "angle found");
                return Ok(AngleOutcome::Found {
                    angle_deg: mid,
                    iterations,
                });
            } else if distance < target_m {
                low = mid;
            } else {
                high = mid;
            }
        }

        debug!(target_yards, iterations, "bracket exhausted without a hit");
        Ok(AngleOutcome::NotFound { iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicalParameters;

    fn solver(dt: f64, tolerance_yards: f64) -> AngleSolver {
        let mut integrator = TrajectoryIntegrator::new(PhysicalParameters::default()).unwrap();
        integrator.set_time_step(dt).unwrap();
        let settings = SolverSettings {
            tolerance_yards,
            ..Default::default()
        };
        AngleSolver::new(integrator, settings).unwrap()
    }

    #[test]
    fn test_yards_to_meters() {
        assert!((yards_to_meters(1.09361) - 1.0).abs() < 1e-12);
        assert!((yards_to_meters(50.0) - 45.7202).abs() < 1e-4);
    }

    #[test]
    fn test_max_iterations_default_bracket() {
        // 20 deg / 1e-5 deg = 2e6, log2 = 20.93
        assert_eq!(solver(0.001, 0.1).max_iterations(), 21);
    }

    #[test]
    fn test_max_iterations_reaches_resolution() {
        // 1 / 2^10 is just above the resolution, so an eleventh halving is needed
        let mut integrator = TrajectoryIntegrator::new(PhysicalParameters::default()).unwrap();
        integrator.set_time_step(0.001).unwrap();
        let settings = SolverSettings {
            max_angle_deg: 1.0,
            resolution_deg: (1.0 / 1024.0) / (1.0 + f64::EPSILON),
            ..Default::default()
        };
        let solver = AngleSolver::new(integrator, settings).unwrap();
        assert_eq!(solver.max_iterations(), 11);

        // every midpoint falls short, so the search runs the bracket down
        assert_eq!(
            solver.solve(2000.0).unwrap(),
            AngleOutcome::NotFound { iterations: 11 }
        );
    }

    #[test]
    fn test_solve_converges_within_tolerance() {
        let solver = solver(0.001, 0.1);
        for &yards in &[20.0, 50.0, 100.0] {
            let outcome = solver.solve(yards).unwrap();
            let angle = outcome.angle().expect("target should be reachable");
            let distance = solver.integrator().range_at(angle).unwrap();
            assert!((distance - yards_to_meters(yards)).abs() < solver.tolerance_m());
            assert!(outcome.iterations() <= solver.max_iterations());
        }
    }

    #[test]
    fn test_farther_targets_need_higher_angles() {
        let solver = solver(0.001, 0.1);
        let near = solver.solve(30.0).unwrap().angle().unwrap();
        let far = solver.solve(90.0).unwrap().angle().unwrap();
        assert!(far > near);
    }

    #[test]
    fn test_unreachable_target_is_not_found() {
        let solver = solver(0.001, 0.1);
        let outcome = solver.solve(2000.0).unwrap();
        assert!(!outcome.is_found());
        assert_eq!(outcome.angle(), None);
        assert!(outcome.iterations() <= solver.max_iterations());
    }

    #[test]
    fn test_zero_distance_resolves_near_zero_degrees() {
        let solver = solver(0.001, 0.1);
        let angle = solver.solve(0.0).unwrap().angle().unwrap();
        assert!((0.0..0.1).contains(&angle));
    }

    #[test]
    fn test_solve_is_idempotent() {
        let solver = solver(0.001, 0.1);
        assert_eq!(solver.solve(64.0).unwrap(), solver.solve(64.0).unwrap());
    }

    #[test]
    fn test_invalid_settings() {
        let integrator = TrajectoryIntegrator::new(PhysicalParameters::default()).unwrap();
        let bad = [
            SolverSettings {
                max_angle_deg: 0.0,
                ..Default::default()
            },
            SolverSettings {
                tolerance_yards: 0.0,
                ..Default::default()
            },
            SolverSettings {
                resolution_deg: -1.0,
                ..Default::default()
            },
            SolverSettings {
                max_angle_deg: f64::NAN,
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(AngleSolver::new(integrator.clone(), settings).is_err());
        }
    }

    #[test]
    fn test_non_finite_flight_propagates() {
        let params = PhysicalParameters {
            initial_speed: 1e200,
            ..Default::default()
        };
        let integrator = TrajectoryIntegrator::new(params).unwrap();
        let solver = AngleSolver::new(integrator, SolverSettings::default()).unwrap();
        assert!(matches!(
            solver.solve(50.0),
            Err(SightError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_integration_failure_propagates() {
        let mut integrator = TrajectoryIntegrator::new(PhysicalParameters::default()).unwrap();
        integrator.set_time_step(0.001).unwrap();
        integrator.set_max_steps(5);
        let solver = AngleSolver::new(integrator, SolverSettings::default()).unwrap();
        assert!(matches!(
            solver.solve(50.0),
            Err(SightError::IntegrationExhausted { .. })
        ));
    }
}
