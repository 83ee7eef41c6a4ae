//! Physical and numerical constants used by the arrow solver

/// Standard gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Yards per meter. Target distances are converted with `1 / YARDS_PER_METER`.
pub const YARDS_PER_METER: f64 = 1.09361;

/// Conversion factor: points per inch (PostScript/SVG user units)
pub const POINTS_PER_INCH: f64 = 72.0;

// Reference arrow

/// Arrow length, nock throat to tip (m)
pub const ARROW_LENGTH_M: f64 = 0.6949988;

/// Arrow shaft diameter (m)
pub const ARROW_DIAMETER_M: f64 = 0.000575;

/// Arrow mass (kg)
pub const ARROW_MASS_KG: f64 = 0.0232;

/// Air density used for the reference arrow (kg/m³)
pub const AIR_DENSITY_KG_M3: f64 = 1.2;

/// Drag coefficient of the reference arrow
pub const ARROW_DRAG_COEFFICIENT: f64 = 0.3;

/// Launch speed of the reference arrow (m/s), 260 fps
pub const ARROW_SPEED_MPS: f64 = 79.248;

// Integration

/// Integration time step (s)
pub const DEFAULT_TIME_STEP_S: f64 = 0.00005;

/// Longest flight the integrator will follow before giving up (s)
pub const MAX_FLIGHT_TIME_S: f64 = 600.0;

// Angle search

/// Upper bound of the launch-angle search (degrees)
///
/// Must stay below the range-maximizing angle so that range is
/// non-decreasing over the searched interval.
pub const DEFAULT_MAX_ANGLE_DEG: f64 = 20.0;

/// Bisection stops once the bracket is narrower than this (degrees)
pub const ANGLE_RESOLUTION_DEG: f64 = 0.00001;

/// Acceptance window around the target distance (yards)
pub const DEFAULT_TOLERANCE_YARDS: f64 = 0.005;

// Default sweep

pub const DEFAULT_SWEEP_START_YARDS: u32 = 20;
pub const DEFAULT_SWEEP_END_YARDS: u32 = 120;
pub const DEFAULT_SWEEP_STEP_YARDS: u32 = 1;
