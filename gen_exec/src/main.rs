//! Trajectory generation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logging
//!     - Load the generation parameters
//!     - Load the path definition file
//!     - Split the waypoint sequence into sub-paths at stop points
//!     - Generate a trajectory for each sub-path
//!     - Save the trajectories into the session directory

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod path_file;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::env;

// Internal
use params::Params;
use traj_gen::{generate_group, GenConfig, PathConstraints};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file used when none is given on the command line.
const DEFAULT_PARAMS_PATH: &str = "params/gen.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("gen_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Trajectory Generation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PROCESS ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let path_file_path = match args.get(1) {
        Some(p) => p,
        None => return Err(eyre!("Usage: gen_exec <path_file> [params_file]")),
    };

    // ---- LOAD PARAMETERS ----

    let gen_params: Params = util::params::load(
        args.get(2).map(String::as_str).unwrap_or(DEFAULT_PARAMS_PATH),
    )
    .wrap_err("Could not load generation params")?;

    info!("Exec parameters loaded");

    // ---- LOAD PATH FILE ----

    let file = path_file::load_path_file(path_file_path)
        .wrap_err_with(|| format!("Could not load path file {:?}", path_file_path))?;

    info!(
        "Loaded path file with {} waypoints and {} markers",
        file.waypoints.len(),
        file.markers.len()
    );

    // Use the file's authored constraints if present, otherwise the defaults
    // from the parameter file
    let constraints = match path_file::constraints_from_file(&file) {
        Ok(c) => c,
        Err(path_file::PathFileError::NoAuthoredConstraints) => {
            info!("Path file carries no constraints, using parameter defaults");
            vec![PathConstraints::new(
                gen_params.max_velocity_ms,
                gen_params.max_acceleration_mss,
            )]
        }
        Err(e) => return Err(e).wrap_err("Could not read path file constraints"),
    };

    // ---- GENERATE ----

    let specs = path_file::split_at_stop_points(&file);

    info!("Path splits into {} sub-path(s)", specs.len());

    let config = GenConfig {
        resolution: gen_params.resolution,
    };

    let trajectories = generate_group(&specs, &constraints, file.reversed, &config)
        .wrap_err("Trajectory generation failed")?;

    // ---- SAVE RESULTS ----

    for (i, trajectory) in trajectories.iter().enumerate() {
        info!(
            "Trajectory {}: {} states, {:.3} s, {:.3} m, {} markers",
            i,
            trajectory.states().len(),
            trajectory.duration_s(),
            trajectory.length_m(),
            trajectory.markers().len()
        );

        session.save(format!("trajectories/trajectory_{}.json", i), trajectory);
    }

    info!("Generation complete");

    Ok(())
}
