//! Trajectory executable entry point.
//!
//! Follows a path on a simulated mecanum base, archiving the follower status each cycle.
//!
//! # Usage
//!
//! ```text
//! traj_exec <path_spec.toml>
//! ```
//!
//! The path spec is loaded from the given path on the host. Executable and follower parameters are
//! loaded from `traj_exec.toml` and `follower.toml` in the params directory.
//!
//! # Architecture
//!
//!     - Initialise session, logging and parameters
//!     - Build the path and give it to the follower
//!     - Main loop:
//!         - Step the simulated base
//!         - Update the follower
//!         - Archive the status report
//!     - Stop the base and report the final error

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use traj_lib::{
    drive::{Drivetrain, Localizer},
    follower::{self, Follower},
    params::TrajExecParams,
    path::{Curve, Path, PathSpec},
    sim::SimBase,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of points saved when sampling the path for plotting.
const NUM_PATH_SAMPLES: usize = 200;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: TrajExecParams =
        util::params::load("traj_exec.toml").wrap_err("Could not load exec params")?;
    let follower_params: follower::Params =
        util::params::load("follower.toml").wrap_err("Could not load follower params")?;

    info!("Exec parameters loaded");

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "Cycle period must be positive, found {}",
            exec_params.cycle_period_s
        ));
    }

    // ---- LOAD PATH ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let path_spec: PathSpec = if args.len() == 2 {
        info!("Loading path from \"{}\"", &args[1]);
        util::params::load_path(&args[1]).wrap_err("Failed to load path spec")?
    } else {
        return Err(eyre!("Expected path to a path spec file as only argument"));
    };

    let path = Path::from_path_spec(&path_spec).wrap_err("Failed to build the path")?;

    info!(
        "Path built from {:?} to {:?}, {:.3} m long",
        path.start_pose().position(),
        path.end_pose().position(),
        path.length()
    );

    session
        .save_json("path.json", &path)
        .wrap_err("Failed to save the path")?;
    session
        .save_json("path_samples.json", &path.sample(NUM_PATH_SAMPLES))
        .wrap_err("Failed to save the path samples")?;

    // ---- MODULE INIT ----

    let mut base = SimBase::new(exec_params.initial_pose(), exec_params.feedforward)
        .with_velocity_scale(exec_params.velocity_scale);

    let mut follower = Follower::new(follower_params).wrap_err("Failed to create the follower")?;
    follower
        .set_path(Some(path))
        .wrap_err("Failed to set the follower path")?;

    let mut archiver = if exec_params.archive {
        Archiver::from_path(&session, "follower.csv")
            .wrap_err("Failed to create the follower archive")?
    } else {
        Archiver::default()
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let dt = exec_params.cycle_period_s;
    let mut num_cycles: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();

        // ---- SIMULATION ----

        if num_cycles > 0 {
            base.step(dt).wrap_err("Failed to step the simulated base")?;
        }

        // ---- FOLLOWER ----

        // Sample the pose once per cycle
        let pose = base.pose();

        if let Some(report) = follower.update(dt, &pose, &mut base) {
            if let Err(e) = archiver.serialise(report) {
                warn!("Could not archive follower status: {}", e);
            }
        }

        num_cycles += 1;

        if follower.done() {
            info!(
                "Path complete after {} cycles ({:.3} s)",
                num_cycles,
                follower.elapsed_s()
            );
            break;
        }

        if follower.elapsed_s() >= exec_params.max_run_time_s {
            warn!(
                "Path not complete after {:.3} s, abandoning",
                exec_params.max_run_time_s
            );
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if exec_params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(dt).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - dt
                ),
            }
        }
    }

    // ---- SHUTDOWN ----

    base.step(dt).wrap_err("Failed to step the simulated base")?;
    base.stop();

    let final_pose = base.pose();
    let end_pose = follower
        .path()
        .map(|p| p.end_pose())
        .ok_or_else(|| eyre!("Follower lost its path"))?;

    info!("Final pose: {}", final_pose);
    info!(
        "Final position error: {:.4} m",
        final_pose.distance_to(&end_pose)
    );
    debug!("Final wheel powers: {:?}", base.wheel_powers());

    Ok(())
}
