//! # Drivetrain telemetry
//!
//! Per-cycle records of the drivetrain and the trajectory follower, and the
//! archive which writes them out as CSV.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::cmd::StatusReport;
use util::archive::{ArchiveError, Archived, Archiver};
use util::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry of the drivetrain for a single cycle.
///
/// Flat so that it can be archived as CSV.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct DriveTm {
    /// Units: seconds
    pub time_s: f64,

    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Counter-clockwise positive heading
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Last commanded left duty
    pub left_output: f64,

    /// Last commanded right duty
    pub right_output: f64,
}

/// Archive of the drivetrain telemetry and trajectory status reports.
pub struct TmArchive {
    arch_drive: Archiver,
    arch_traj: Archiver,

    drive_tm: DriveTm,

    /// Report of this cycle, if a trajectory is being followed
    report: Option<StatusReport>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TmArchive {
    /// Create the archive files inside the session's archive directory.
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self::from_archivers(
            Archiver::from_path(session, "drive_tm.csv")?,
            Archiver::from_path(session, "traj_ctrl_status.csv")?
        ))
    }

    pub fn from_archivers(arch_drive: Archiver, arch_traj: Archiver) -> Self {
        Self {
            arch_drive,
            arch_traj,
            drive_tm: DriveTm::default(),
            report: None,
        }
    }

    /// Set the data to write on the next call to `write`.
    pub fn update(&mut self, drive_tm: DriveTm, report: Option<StatusReport>) {
        self.drive_tm = drive_tm;
        self.report = report;
    }
}

impl Archived for TmArchive {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_drive.serialise(self.drive_tm)?;

        if let Some(report) = self.report {
            self.arch_traj.serialise(report)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_write() {
        let dir = std::env::temp_dir();
        let pid = std::process::id();
        let drive_path = dir.join(format!("drive_lib_tm_test_write_drive_{}.csv", pid));
        let traj_path = dir.join(format!("drive_lib_tm_test_write_traj_{}.csv", pid));

        let mut arch = TmArchive::from_archivers(
            Archiver::from_file(File::create(&drive_path).unwrap()),
            Archiver::from_file(File::create(&traj_path).unwrap())
        );

        arch.update(DriveTm { time_s: 0.5, left_output: 0.25, ..Default::default() }, None);
        arch.write().unwrap();
        arch.update(
            DriveTm { time_s: 1.0, ..Default::default() },
            Some(StatusReport { time_s: 1.0, e_y_m: 0.1, ..Default::default() })
        );
        arch.write().unwrap();

        let drive = std::fs::read_to_string(&drive_path).unwrap();
        let lines: Vec<&str> = drive.lines().collect();
        assert_eq!(lines[0], "time_s,x_m,y_m,heading_deg,left_output,right_output");
        assert_eq!(lines[1], "0.5,0.0,0.0,0.0,0.25,0.0");
        assert_eq!(lines.len(), 3);

        // Only cycles with a report are written to the trajectory archive
        let traj = std::fs::read_to_string(&traj_path).unwrap();
        let lines: Vec<&str> = traj.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("time_s,e_x_m,e_y_m,e_theta_rad,"));
        assert!(lines[1].starts_with("1.0,0.0,0.1,"));

        std::fs::remove_file(drive_path).ok();
        std::fs::remove_file(traj_path).ok();
    }
}
