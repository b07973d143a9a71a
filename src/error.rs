use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop the table from being generated.
#[derive(Error, Debug)]
pub enum TableError {
    #[error(
        "a file named \"{}\" already exists, please choose a different filename or delete the existing file",
        .0.display()
    )]
    PathConflict(PathBuf),

    #[error("invalid ISO-8601 date or datetime \"{input}\": {reason}")]
    Parse { input: String, reason: String },

    #[error("invalid UTC offset \"{0}\", expected Z or ±HH:MM")]
    Offset(String),

    #[error("cannot compare {start} with {end}: only one of them has a UTC offset")]
    MixedOffsets { start: String, end: String },

    #[error("could not write the table: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    /// Exit status reported by the binary for errors raised after argument parsing.
    pub fn exit_code(&self) -> u8 {
        match self {
            TableError::Parse { .. } | TableError::Offset(_) | TableError::MixedOffsets { .. } => 2,
            TableError::PathConflict(_) | TableError::Io(_) => 1,
        }
    }
}
