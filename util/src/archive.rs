//! CSV archiving of cyclic data
//!
//! Each archive is a single CSV file inside the session's archive directory,
//! with one row written per call to [`Archiver::serialise`]. Records must be
//! flat structs, nested structs are not supported by the CSV writer.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    FileCreateError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised with a file")]
    NotInitialised
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a timestamped csv.
///
/// Implementors own one `Archiver` per archived quantity, created in their
/// `new` or `init` functions.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(ArchiveError::FileCreateError)?;
        }

        // Truncate any previous archive then open in append mode
        File::create(&session_path).map_err(ArchiveError::FileCreateError)?;
        let file = OpenOptions::new()
            .append(true)
            .open(session_path)
            .map_err(ArchiveError::FileCreateError)?;

        Ok(Self::from_file(file))
    }

    /// Create an archiver writing into an already opened file.
    pub fn from_file(file: File) -> Self {
        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Self {
            writer: Some(w)
        }
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            },
            None => Err(ArchiveError::NotInitialised)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        left: f64,
    }

    #[test]
    fn test_uninitialised_archiver() {
        let mut arch = Archiver::default();
        match arch.serialise(Row { time_s: 0.0, left: 0.0 }) {
            Err(ArchiveError::NotInitialised) => (),
            _ => panic!("Expected NotInitialised")
        }
    }

    #[test]
    fn test_archive_rows() {
        let path = std::env::temp_dir()
            .join(format!("util_archive_test_rows_{}.csv", std::process::id()));
        let file = File::create(&path).unwrap();
        let mut arch = Archiver::from_file(file);

        arch.serialise(Row { time_s: 0.0, left: 0.5 }).unwrap();
        arch.serialise(Row { time_s: 0.02, left: -0.25 }).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["time_s,left", "0.0,0.5", "0.02,-0.25"]);

        std::fs::remove_file(path).ok();
    }
}
