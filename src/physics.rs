//! Physical parameter set shared by every trajectory in a run.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_KG_M3, ARROW_DIAMETER_M, ARROW_DRAG_COEFFICIENT, ARROW_LENGTH_M, ARROW_MASS_KG,
    ARROW_SPEED_MPS, G_ACCEL_MPS2,
};
use crate::error::{Result, SightError};

/// Constants describing the arrow and the air it flies through.
///
/// All values are SI. The parameter set is read-only during a run and may be
/// shared freely between worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    pub gravity: f64,          // m/s²
    pub mass: f64,             // kg
    pub area: f64,             // m²
    pub air_density: f64,      // kg/m³
    pub drag_coefficient: f64, // dimensionless, 0 disables drag
    pub initial_speed: f64,    // m/s
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self::for_arrow(
            ARROW_LENGTH_M,
            ARROW_DIAMETER_M,
            ARROW_MASS_KG,
            ARROW_SPEED_MPS,
        )
    }
}

impl PhysicalParameters {
    /// Parameters for an arrow of the given length and shaft diameter.
    ///
    /// The reference area is the shaft's side profile, `length * diameter`.
    pub fn for_arrow(length: f64, diameter: f64, mass: f64, initial_speed: f64) -> Self {
        Self {
            gravity: G_ACCEL_MPS2,
            mass,
            area: length * diameter,
            air_density: AIR_DENSITY_KG_M3,
            drag_coefficient: ARROW_DRAG_COEFFICIENT,
            initial_speed,
        }
    }

    /// Same parameters with drag switched off.
    pub fn without_drag(self) -> Self {
        Self {
            drag_coefficient: 0.0,
            ..self
        }
    }

    /// Drag constant `k` such that the drag deceleration is `k * v²`.
    pub fn drag_factor(&self) -> f64 {
        0.5 * self.air_density * self.area * self.drag_coefficient / self.mass
    }

    /// Check every field is finite and in range.
    ///
    /// The integrator divides by the speed each step, so a positive launch
    /// speed is a hard precondition.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("gravity", self.gravity),
            ("mass", self.mass),
            ("area", self.area),
            ("air_density", self.air_density),
            ("initial_speed", self.initial_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SightError::invalid(
                    name,
                    format!("must be a positive finite number, got {value}"),
                ));
            }
        }

        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(SightError::invalid(
                "drag_coefficient",
                format!("must be a non-negative finite number, got {}", self.drag_coefficient),
            ));
        }

        Ok(())
    }
}

/// Drag-free range on level ground: `v0² sin(2θ) / g`.
pub fn closed_form_range(params: &PhysicalParameters, angle_deg: f64) -> f64 {
    let theta = angle_deg.to_radians();
    params.initial_speed * params.initial_speed * (2.0 * theta).sin() / params.gravity
}

/// Drag-free launch angle (degrees, low solution) reaching `range_m`.
///
/// Returns `None` when the range exceeds the drag-free maximum.
pub fn closed_form_angle(params: &PhysicalParameters, range_m: f64) -> Option<f64> {
    let ratio = range_m * params.gravity / (params.initial_speed * params.initial_speed);
    if !(0.0..=1.0).contains(&ratio) {
        return None;
    }
    Some(0.5 * ratio.asin().to_degrees())
}
