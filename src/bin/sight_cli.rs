use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use arrow_sight::constants::*;
use arrow_sight::{
    read_report, render_svg, sweep, write_report, yards_to_meters, AngleOutcome, AngleSolver,
    NotFoundPolicy, PhysicalParameters, ReportFormat, ReportOptions, SightTape, SolverSettings,
    SweepRange, TapeSetup, TrajectoryIntegrator,
};

#[derive(Parser)]
#[command(name = "sight-cli")]
#[command(author = "Arrow Sight Team")]
#[command(version)]
#[command(about = "Archery sight-angle calculator with quadratic drag", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arrow and air description, shared by every subcommand that simulates.
#[derive(Args, Debug, Clone)]
struct ArrowArgs {
    /// Launch speed (m/s)
    #[arg(short = 'v', long, default_value_t = ARROW_SPEED_MPS)]
    velocity: f64,

    /// Arrow mass (kg)
    #[arg(short = 'm', long, default_value_t = ARROW_MASS_KG)]
    mass: f64,

    /// Arrow length, nock throat to tip (m)
    #[arg(long, default_value_t = ARROW_LENGTH_M)]
    length: f64,

    /// Shaft diameter (m)
    #[arg(short = 'd', long, default_value_t = ARROW_DIAMETER_M)]
    diameter: f64,

    /// Drag coefficient (0 disables drag)
    #[arg(long, default_value_t = ARROW_DRAG_COEFFICIENT)]
    drag_coefficient: f64,

    /// Air density (kg/m³)
    #[arg(long, default_value_t = AIR_DENSITY_KG_M3)]
    air_density: f64,

    /// Gravitational acceleration (m/s²)
    #[arg(long, default_value_t = G_ACCEL_MPS2)]
    gravity: f64,

    /// Integration time step (seconds)
    #[arg(long, default_value_t = DEFAULT_TIME_STEP_S)]
    time_step: f64,
}

/// Angle search bracket and acceptance window.
#[derive(Args, Debug, Clone)]
struct SearchArgs {
    /// Upper bound of the launch-angle search (degrees)
    #[arg(long, default_value_t = DEFAULT_MAX_ANGLE_DEG)]
    max_angle: f64,

    /// Accept an angle when the range is within this many yards of the target
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_YARDS)]
    tolerance: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve every target distance in a range and write the sight table
    Sweep {
        #[command(flatten)]
        arrow: ArrowArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// First target distance (yards)
        #[arg(long, default_value_t = DEFAULT_SWEEP_START_YARDS)]
        start: u32,

        /// Last target distance, inclusive (yards)
        #[arg(long, default_value_t = DEFAULT_SWEEP_END_YARDS)]
        end: u32,

        /// Distance increment (yards)
        #[arg(long, default_value_t = DEFAULT_SWEEP_STEP_YARDS)]
        step: u32,

        /// Report file, overwritten on each run
        #[arg(short = 'o', long, default_value = "angles.txt")]
        output: PathBuf,

        /// Report format
        #[arg(short = 'f', long, default_value = "text")]
        format: TableFormat,

        /// Leave unreachable distances out of the report
        #[arg(long)]
        omit_missing: bool,

        /// Round angles to this many decimals
        #[arg(long)]
        decimals: Option<usize>,

        /// Solve distances one after another instead of in parallel
        #[arg(long)]
        serial: bool,
    },

    /// Find the sight angle for a single target distance
    Solve {
        #[command(flatten)]
        arrow: ArrowArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Target distance (yards)
        #[arg(short = 't', long)]
        distance: f64,
    },

    /// Simulate a single shot
    Trajectory {
        #[command(flatten)]
        arrow: ArrowArgs,

        /// Launch angle (degrees)
        #[arg(short = 'a', long)]
        angle: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: ShotFormat,
    },

    /// Lay out a printable sight tape from a sight table
    Tape {
        /// Sight table written by `sweep` in text format
        #[arg(long, default_value = "angles.txt")]
        angles: PathBuf,

        /// First reference range (yards)
        #[arg(long)]
        range_1: u32,

        /// Second reference range (yards)
        #[arg(long)]
        range_2: u32,

        /// Measured distance between the sight marks of the reference ranges (inches)
        #[arg(long)]
        separation: f64,

        /// Shortest range on the tape (yards)
        #[arg(long, default_value_t = DEFAULT_SWEEP_START_YARDS)]
        min_range: u32,

        /// Longest range on the tape (yards)
        #[arg(long, default_value_t = DEFAULT_SWEEP_END_YARDS)]
        max_range: u32,

        /// SVG output file
        #[arg(short = 'o', long, default_value = "sight_tape.svg")]
        output: PathBuf,
    },

    /// Display the reference arrow and solver defaults
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableFormat {
    Text,
    Json,
    Csv,
}

impl From<TableFormat> for ReportFormat {
    fn from(format: TableFormat) -> Self {
        match format {
            TableFormat::Text => ReportFormat::Text,
            TableFormat::Json => ReportFormat::Json,
            TableFormat::Csv => ReportFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShotFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_integrator(arrow: &ArrowArgs) -> Result<TrajectoryIntegrator, Box<dyn Error>> {
    let params = PhysicalParameters {
        gravity: arrow.gravity,
        air_density: arrow.air_density,
        drag_coefficient: arrow.drag_coefficient,
        ..PhysicalParameters::for_arrow(arrow.length, arrow.diameter, arrow.mass, arrow.velocity)
    };

    let mut integrator = TrajectoryIntegrator::new(params)?;
    integrator.set_time_step(arrow.time_step)?;
    Ok(integrator)
}

fn build_solver(arrow: &ArrowArgs, search: &SearchArgs) -> Result<AngleSolver, Box<dyn Error>> {
    let settings = SolverSettings {
        max_angle_deg: search.max_angle,
        tolerance_yards: search.tolerance,
        ..Default::default()
    };
    Ok(AngleSolver::new(build_integrator(arrow)?, settings)?)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Sweep {
            arrow,
            search,
            start,
            end,
            step,
            output,
            format,
            omit_missing,
            decimals,
            serial,
        } => {
            let solver = build_solver(&arrow, &search)?;
            let range = SweepRange {
                start_yards: start,
                end_yards: end,
                step_yards: step,
            };

            let table = sweep(&solver, &range, !serial)?;

            let policy = if omit_missing {
                NotFoundPolicy::Omit
            } else {
                NotFoundPolicy::Explicit
            };
            let options = ReportOptions {
                format: format.into(),
                policy,
                decimals,
            };
            write_report(&output, &table, &options)?;

            let missing = table.values().filter(|o| !o.is_found()).count();
            println!(
                "Wrote {} distances ({} without a suitable angle) to {}",
                table.len(),
                missing,
                output.display()
            );
        }

        Commands::Solve { arrow, search, distance } => {
            let solver = build_solver(&arrow, &search)?;
            let outcome = solver.solve(distance)?;

            println!("╔════════════════════════════════════════╗");
            println!("║            SIGHT ANGLE                 ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Target:            {:>8.2} yd         ║", distance);
            println!("║                    {:>8.3} m          ║", yards_to_meters(distance));
            match outcome {
                AngleOutcome::Found { angle_deg, iterations } => {
                    let range = solver.integrator().range_at(angle_deg)?;
                    println!("║ Angle:           {:>10.5} deg        ║", angle_deg);
                    println!("║ Simulated range:   {:>8.3} m          ║", range);
                    println!("║ Iterations:        {:>8}            ║", iterations);
                }
                AngleOutcome::NotFound { iterations } => {
                    println!("║ No suitable angle found                ║");
                    println!("║ Iterations:        {:>8}            ║", iterations);
                }
            }
            println!("╚════════════════════════════════════════╝");
        }

        Commands::Trajectory { arrow, angle, output } => {
            let integrator = build_integrator(&arrow)?;
            let flight = integrator.fly(angle)?;

            match output {
                ShotFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&flight)?);
                }
                ShotFormat::Table => {
                    println!("╔════════════════════════════════════════╗");
                    println!("║         TRAJECTORY RESULTS             ║");
                    println!("╠════════════════════════════════════════╣");
                    println!("║ Launch Angle:      {:>8.3} deg        ║", flight.angle_deg);
                    println!("║ Range:             {:>8.3} m          ║", flight.range_m);
                    println!("║ Max Height:        {:>8.3} m          ║", flight.apex_m);
                    println!("║ Time of Flight:    {:>8.3} s          ║", flight.time_of_flight_s);
                    println!("║ Impact Velocity:   {:>8.2} m/s        ║", flight.impact_speed_mps);
                    println!("║ Steps:             {:>8}            ║", flight.steps);
                    println!("╚════════════════════════════════════════╝");
                }
            }
        }

        Commands::Tape {
            angles,
            range_1,
            range_2,
            separation,
            min_range,
            max_range,
            output,
        } => {
            let table = read_report(&angles)?;
            let setup = TapeSetup {
                range_1,
                range_2,
                mark_separation_in: separation,
                min_range,
                max_range,
            };
            let tape = SightTape::build(&table, &setup)?;
            render_svg(&tape, &output)?;

            println!("Scale:        {:.4} in/deg", tape.inches_per_degree);
            println!("Tape length:  {:.3} in", tape.length_in);
            println!("Marks:        {}", tape.marks.len());
            println!("Written to    {}", output.display());
        }

        Commands::Info => {
            let params = PhysicalParameters::default();
            println!("╔════════════════════════════════════════╗");
            println!("║          ARROW SIGHT v{:<8}         ║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Reference arrow                        ║");
            println!("║ Speed:             {:>8.3} m/s        ║", params.initial_speed);
            println!("║ Mass:              {:>8.4} kg         ║", params.mass);
            println!("║ Area:              {:>8.3e} m²        ║", params.area);
            println!("║ Drag coefficient:  {:>8.3}            ║", params.drag_coefficient);
            println!("║ Air density:       {:>8.3} kg/m³      ║", params.air_density);
            println!("║ Gravity:           {:>8.5} m/s²       ║", params.gravity);
            println!("╠════════════════════════════════════════╣");
            println!("║ Solver                                 ║");
            println!("║ Time step:         {:>8.0e} s          ║", DEFAULT_TIME_STEP_S);
            println!("║ Max angle:         {:>8.1} deg        ║", DEFAULT_MAX_ANGLE_DEG);
            println!("║ Tolerance:         {:>8.3} yd         ║", DEFAULT_TOLERANCE_YARDS);
            println!(
                "║ Sweep:             {:>3}-{:<3} yd         ║",
                DEFAULT_SWEEP_START_YARDS, DEFAULT_SWEEP_END_YARDS
            );
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}
