//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The executable follows a single trajectory with a simulated drivetrain:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the trajectory given on the command line
//!     - Schedule the trajectory follower on the command runner
//!     - Main loop:
//!         - Step the simulated drivetrain with the last output
//!         - Tick the command runner with the simulated sensor data
//!         - Archive telemetry
//!         - Turn to the final heading once the trajectory is complete, if one
//!           is configured
//!     - Stop once the command runner is idle

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use drive_lib::{
    cmd::{self, CmdRunner, FollowTrajectory, RunnerEvent, StatusReport, TurnToHeading},
    loc::Pose,
    loco_ctrl::{self, Drivetrain},
    sim::SimTank,
    tm::TmArchive,
    traj_ctrl::{self, Trajectory},
};
use params::DriveExecParams;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter, LogConfig},
    session::Session,
    time::duration_to_seconds,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the run, saved into the session directory.
#[derive(Debug, Serialize)]
struct RunSummary {
    trajectory_path: String,
    duration_s: f64,
    sim_time_s: f64,
    num_cycles: u64,
    outcomes: Vec<String>,
    final_pose_est: Pose,
    final_pose_true: Pose,
    final_desired: Pose,
    final_report: Option<StatusReport>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger, the tracking law is traced every cycle into the file
    let log_config = LogConfig {
        console_level: LevelFilter::Info,
        file_level: LevelFilter::Debug,
        module_levels: vec![("drive_lib::traj_ctrl", LevelFilter::Trace)],
    };
    logger_init(&log_config, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: DriveExecParams = util::params::load(
        "drive_exec.toml"
    ).wrap_err("Could not load exec params")?;
    let loco_params: loco_ctrl::Params = util::params::load(
        "loco_ctrl.toml"
    ).wrap_err("Could not load LocoCtrl params")?;
    let traj_params: traj_ctrl::Params = util::params::load(
        "traj_ctrl.toml"
    ).wrap_err("Could not load TrajCtrl params")?;
    let cmd_params: cmd::Params = util::params::load(
        "cmd.toml"
    ).wrap_err("Could not load command params")?;

    exec_params.validate().wrap_err("Invalid exec params")?;
    loco_params.validate().wrap_err("Invalid LocoCtrl params")?;
    traj_params.validate().wrap_err("Invalid TrajCtrl params")?;
    cmd_params.validate().wrap_err("Invalid command params")?;

    info!("Parameters loaded");

    // ---- LOAD TRAJECTORY ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the trajectory file), found {}", args.len() - 1
        ));
    }
    let traj_path = &args[1];

    info!("Loading trajectory from \"{}\"", traj_path);

    let traj_str = std::fs::read_to_string(traj_path)
        .wrap_err("Failed to read the trajectory file")?;
    let traj: Trajectory = serde_json::from_str(&traj_str)
        .wrap_err("Failed to parse the trajectory")?;

    info!(
        "Loaded trajectory lasts {:.02} s and contains {} states\n",
        traj.duration_s(),
        traj.states().len()
    );
    session.save("trajectory.json", &traj);

    let duration_s = traj.duration_s();
    let final_desired = traj.final_state().pose;

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let sim = SimTank::new(&loco_params, exec_params.sim);
    let follow = FollowTrajectory::new(traj, &traj_params, loco_params.max_voltage_v);
    let mut runner = CmdRunner::new(Drivetrain::new(loco_params), sim);

    let mut archive = TmArchive::new(&session)
        .wrap_err("Failed to initialise the telemetry archive")?;

    runner.schedule(
        Box::new(follow),
        Some(duration_s + exec_params.timeout_margin_s)
    ).wrap_err("Failed to start the trajectory follower")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let dt_s = exec_params.cycle_period_s;
    let wall_start = chrono::Utc::now();
    let mut sim_time_s = 0.0;
    let mut num_cycles: u64 = 0;
    let mut next_log_s = 0.0;
    let mut outcomes: Vec<RunnerEvent> = Vec::new();
    let mut following = true;
    let mut final_turn = exec_params.final_heading_deg
        .map(|h| TurnToHeading::absolute(h, &cmd_params));

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- SIMULATION ----

        runner.actuator_mut().step(dt_s);
        sim_time_s += dt_s;
        let sensors = runner.actuator().sensor_data();

        // ---- CONTROL PROCESSING ----

        let event = runner.tick(dt_s, &sensors)
            .wrap_err("Control cycle failed")?;

        // ---- WRITE ARCHIVES ----

        archive.update(
            runner.drive().tm(sim_time_s),
            if following { runner.last_report().copied() } else { None }
        );
        if let Err(e) = archive.write() {
            warn!("Could not write archives: {}", e);
        }

        // ---- STATUS ----

        if sim_time_s >= next_log_s {
            let pose = runner.drive().pose();
            info!(
                "t = {:.2} s, pose = ({:.3} m, {:.3} m, {:.1} deg), output = ({:.3}, {:.3})",
                sim_time_s,
                pose.x_m,
                pose.y_m,
                pose.heading_deg(),
                runner.output().left,
                runner.output().right
            );
            next_log_s += exec_params.log_period_s;
        }

        num_cycles += 1;

        if runner.is_idle() {
            info!("Command ended: {:?}", event);
            outcomes.push(event);
            following = false;

            match final_turn.take() {
                Some(turn) => {
                    info!("Turning to the final heading");
                    runner.schedule(Box::new(turn), Some(exec_params.final_turn_timeout_s))
                        .wrap_err("Failed to start the final turn")?;
                },
                None => break
            }
        }

        // ---- CYCLE MANAGEMENT ----

        if exec_params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match Duration::from_secs_f64(dt_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - dt_s
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    let final_pose_est = runner.drive().pose();
    let final_pose_true = runner.actuator().true_pose();
    let final_report = runner.last_report().copied();

    info!("Command outcomes: {:?}", outcomes);
    info!("Final pose estimate: {:?}", final_pose_est);
    info!("Final true pose: {:?}", final_pose_true);
    info!("Final desired pose: {:?}", final_desired);
    if let Some(report) = final_report {
        info!(
            "Final tracking error: x = {:.4} m, y = {:.4} m, theta = {:.2} deg",
            report.e_x_m,
            report.e_y_m,
            report.e_theta_rad.to_degrees()
        );
    }

    match duration_to_seconds(chrono::Utc::now() - wall_start) {
        Some(wall_s) => info!(
            "Simulated {:.2} s in {} cycles, taking {:.3} s",
            sim_time_s, num_cycles, wall_s
        ),
        None => warn!("Could not compute the run time")
    }

    session.save("summary.json", &RunSummary {
        trajectory_path: traj_path.clone(),
        duration_s,
        sim_time_s,
        num_cycles,
        outcomes: outcomes.iter().map(|o| format!("{:?}", o)).collect(),
        final_pose_est,
        final_pose_true,
        final_desired,
        final_report,
    });

    info!("End of execution");

    Ok(())
}
