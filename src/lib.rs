//! # Arrow Sight
//!
//! Sight-angle tables for archery. A fixed-step trajectory integrator with
//! quadratic drag is inverted by bisection to find, for every target
//! distance, the launch angle that lands the arrow there.

// Re-export the main types and functions
pub use error::{Result, SightError};
pub use physics::{closed_form_angle, closed_form_range, PhysicalParameters};
pub use trajectory::{simulate, FlightSummary, SimulationState, TrajectoryIntegrator};
pub use solver::{yards_to_meters, AngleOutcome, AngleSolver, SolverSettings};
pub use sweep::{sweep, AngleTable, SweepRange};
pub use report::{
    parse_report, read_report, render, write_report, NotFoundPolicy, ReportFormat,
    ReportOptions, ReportRow, NOT_FOUND_TEXT,
};
pub use sight_tape::{render_svg, MarkKind, SightTape, TapeMark, TapeSetup};

// Module declarations
pub mod constants;
mod error;
mod physics;
mod trajectory;
mod solver;
mod sweep;
pub mod report;
pub mod sight_tape;
