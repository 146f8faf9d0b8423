//! # Command runner
//!
//! The runner owns the drivetrain, the actuator and at most one active
//! command. The outer loop calls [`CmdRunner::tick`] once per cycle with the
//! cycle's sensor data. Within a tick:
//!
//! 1. The drivetrain integrates the sensor data into its pose estimate. Invalid
//!    data, or an invalid cycle time, aborts the active command.
//! 2. The active command is ticked.
//! 3. A command which is done, has failed or has timed out is ended.
//! 4. The drivetrain's output is written to the actuator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};

// Internal
use super::{CmdError, Command, StatusReport};
use crate::loc::SensorData;
use crate::loco_ctrl::{DriveActuator, DriveOutput, Drivetrain};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Runs commands against a drivetrain.
pub struct CmdRunner<A: DriveActuator> {
    drive: Drivetrain,

    actuator: A,

    active: Option<ActiveCmd>,

    /// Status report of the last trajectory following cycle
    last_report: Option<StatusReport>,
}

/// A scheduled command and its timing
struct ActiveCmd {
    cmd: Box<dyn Command>,

    /// Units: seconds
    timeout_s: Option<f64>,

    /// Units: seconds
    elapsed_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What happened to the active command during a tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunnerEvent {
    /// There is no active command
    Idle,

    /// The command is still running
    Running(&'static str),

    /// The command completed
    Finished(&'static str),

    /// The command exceeded its timeout and was interrupted
    TimedOut(&'static str),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: DriveActuator> CmdRunner<A> {
    /// Create a new runner with no active command.
    pub fn new(drive: Drivetrain, actuator: A) -> Self {
        Self {
            drive,
            actuator,
            active: None,
            last_report: None,
        }
    }

    /// Start a command, interrupting any currently active one.
    ///
    /// If the command fails to start the drivetrain is stopped and nothing is
    /// scheduled.
    pub fn schedule(
        &mut self,
        mut cmd: Box<dyn Command>,
        timeout_s: Option<f64>
    ) -> Result<(), CmdError> {
        if let Some(active) = self.active.as_ref() {
            warn!(
                "{} interrupted by newly scheduled {}",
                active.cmd.name(),
                cmd.name()
            );
            self.cancel();
        }

        if let Err(e) = cmd.start(&mut self.drive) {
            warn!("{} could not be started: {}", cmd.name(), e);
            cmd.end(&mut self.drive, true);
            self.write_output();
            return Err(e)
        }

        info!("{} scheduled with timeout {:?} s", cmd.name(), timeout_s);

        self.last_report = cmd.status_report();
        self.active = Some(ActiveCmd {
            cmd,
            timeout_s,
            elapsed_s: 0.0,
        });

        Ok(())
    }

    /// Interrupt the active command.
    ///
    /// The actuator is immediately commanded to zero.
    pub fn cancel(&mut self) {
        if let Some(mut active) = self.active.take() {
            info!("Cancelling {}", active.cmd.name());
            active.cmd.end(&mut self.drive, true);
        }

        self.drive.stop();
        self.write_output();
    }

    /// Execute one cycle, `dt_s` seconds after the previous one.
    pub fn tick(&mut self, dt_s: f64, sensors: &SensorData) -> Result<RunnerEvent, CmdError> {
        let res = self.run_cycle(dt_s, sensors);

        self.write_output();

        res
    }

    fn run_cycle(&mut self, dt_s: f64, sensors: &SensorData) -> Result<RunnerEvent, CmdError> {
        if !dt_s.is_finite() || dt_s < 0.0 {
            error!("Rejected cycle time: {} s", dt_s);
            self.abort();
            return Err(CmdError::InvalidCycleTime(dt_s))
        }

        if let Err(e) = self.drive.periodic(sensors) {
            error!("Rejected sensor data: {}", e);
            self.abort();
            return Err(e.into())
        }

        let mut active = match self.active.take() {
            Some(a) => a,
            None => return Ok(RunnerEvent::Idle)
        };
        let name = active.cmd.name();

        if let Err(e) = active.cmd.tick(dt_s, &mut self.drive) {
            error!("{} failed: {}", name, e);
            active.cmd.end(&mut self.drive, true);
            return Err(e)
        }
        active.elapsed_s += dt_s;

        if let Some(report) = active.cmd.status_report() {
            self.last_report = Some(report);
        }

        if active.cmd.is_done() {
            active.cmd.end(&mut self.drive, false);
            return Ok(RunnerEvent::Finished(name))
        }

        match active.timeout_s {
            Some(t) if active.elapsed_s >= t => {
                warn!("{} timed out after {:.2} s", name, active.elapsed_s);
                active.cmd.end(&mut self.drive, true);
                Ok(RunnerEvent::TimedOut(name))
            },
            _ => {
                self.active = Some(active);
                Ok(RunnerEvent::Running(name))
            }
        }
    }

    /// End the active command as interrupted and stop the drivetrain.
    fn abort(&mut self) {
        if let Some(mut active) = self.active.take() {
            error!("Aborting {}", active.cmd.name());
            active.cmd.end(&mut self.drive, true);
        }
        self.drive.stop();
    }

    fn write_output(&mut self) {
        self.actuator.set_output(self.drive.output());
    }

    /// True if no command is active.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Name of the active command.
    pub fn active_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.cmd.name())
    }

    /// Status report of the most recent trajectory following cycle.
    pub fn last_report(&self) -> Option<&StatusReport> {
        self.last_report.as_ref()
    }

    pub fn drive(&self) -> &Drivetrain {
        &self.drive
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// The output last written to the actuator.
    pub fn output(&self) -> DriveOutput {
        self.drive.output()
    }
}
