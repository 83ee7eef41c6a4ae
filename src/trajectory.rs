//! Fixed-step trajectory integration for a point-mass arrow.
//!
//! The arrow is launched from the origin and followed until it first drops
//! below launch height. Drag is quadratic in speed and always opposes the
//! velocity; gravity acts straight down.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TIME_STEP_S, MAX_FLIGHT_TIME_S};
use crate::error::{Result, SightError};
use crate::physics::PhysicalParameters;

/// Position, velocity and elapsed time of one simulated arrow.
///
/// Owned by a single integration call and discarded when it returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub position: Vector2<f64>, // (downrange, height) in meters
    pub velocity: Vector2<f64>, // m/s
    pub time: f64,              // seconds
}

impl SimulationState {
    /// State at release: on the launch line, moving at `speed` along `angle_deg`.
    pub fn launch(speed: f64, angle_deg: f64) -> Self {
        let theta = angle_deg.to_radians();
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::new(speed * theta.cos(), speed * theta.sin()),
            time: 0.0,
        }
    }

    /// Advance one step of semi-implicit Euler.
    ///
    /// Velocity is updated first and the new velocity moves the position.
    /// Speed must be non-zero, which holds for any launch with `v0 > 0`.
    pub fn step(&mut self, params: &PhysicalParameters, dt: f64) {
        let speed = self.velocity.norm();
        let drag = params.drag_factor() * speed * speed;

        let acceleration = Vector2::new(
            -drag * (self.velocity.x / speed),
            -params.gravity - drag * (self.velocity.y / speed),
        );

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.time += dt;
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}

/// Summary of one simulated flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSummary {
    pub angle_deg: f64,
    pub range_m: f64,
    pub apex_m: f64,
    pub time_of_flight_s: f64,
    pub impact_speed_mps: f64,
    pub steps: usize,
}

/// Integrates arrow flights for a fixed parameter set and time step.
#[derive(Debug, Clone)]
pub struct TrajectoryIntegrator {
    params: PhysicalParameters,
    time_step: f64,
    max_steps: Option<usize>,
}

impl TrajectoryIntegrator {
    pub fn new(params: PhysicalParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            time_step: DEFAULT_TIME_STEP_S,
            max_steps: None,
        })
    }

    pub fn set_time_step(&mut self, step: f64) -> Result<()> {
        if !step.is_finite() || step <= 0.0 {
            return Err(SightError::invalid(
                "time_step",
                format!("must be a positive finite number, got {step}"),
            ));
        }
        self.time_step = step;
        Ok(())
    }

    /// Override the step budget. By default it covers
    /// [`MAX_FLIGHT_TIME_S`] of simulated flight.
    pub fn set_max_steps(&mut self, steps: usize) {
        self.max_steps = Some(steps);
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
            .unwrap_or_else(|| (MAX_FLIGHT_TIME_S / self.time_step).ceil() as usize)
    }

    /// Horizontal distance covered when the arrow returns to launch height.
    pub fn range_at(&self, angle_deg: f64) -> Result<f64> {
        let (state, _) = self.integrate(angle_deg, |_| {})?;
        Ok(state.position.x)
    }

    /// Full flight summary at the given launch angle.
    pub fn fly(&self, angle_deg: f64) -> Result<FlightSummary> {
        let mut apex = 0.0_f64;
        let (state, steps) = self.integrate(angle_deg, |s| apex = apex.max(s.position.y))?;

        Ok(FlightSummary {
            angle_deg,
            range_m: state.position.x,
            apex_m: apex,
            time_of_flight_s: state.time,
            impact_speed_mps: state.velocity.norm(),
            steps,
        })
    }

    fn integrate<F>(&self, angle_deg: f64, mut observe: F) -> Result<(SimulationState, usize)>
    where
        F: FnMut(&SimulationState),
    {
        let max_steps = self.max_steps();
        let mut state = SimulationState::launch(self.params.initial_speed, angle_deg);
        let mut steps = 0;

        while state.position.y >= 0.0 {
            if steps >= max_steps {
                return Err(SightError::IntegrationExhausted { angle_deg, steps });
            }
            state.step(&self.params, self.time_step);
            steps += 1;
            if !state.is_finite() {
                return Err(SightError::NonFinite { angle_deg, steps });
            }
            observe(&state);
        }

        Ok((state, steps))
    }
}

/// One-shot form of [`TrajectoryIntegrator::range_at`].
pub fn simulate(params: &PhysicalParameters, angle_deg: f64, time_step: f64) -> Result<f64> {
    let mut integrator = TrajectoryIntegrator::new(*params)?;
    integrator.set_time_step(time_step)?;
    integrator.range_at(angle_deg)
}
