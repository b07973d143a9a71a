use crate::error::TableError;
use crate::utils::*;
use chrono::prelude::*;
use chrono::Duration;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};
pub mod error;
pub mod hourly_table;
pub mod utils;

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
pub const HEADER: &str = "Date";
pub const LINE_TERMINATOR: &str = "\r\n";
pub const PROGRESS_EVERY_ROWS: usize = 100_000;

/// The hourly time series between two boundaries, start included and end excluded.
/// Both boundaries are kept as wall-clock times at the same offset (or both naive),
/// so rows can be produced and compared without further conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyTable {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl HourlyTable {
    /// Reconcile the two boundaries.
    /// An end with a different offset is moved to the offset of the start,
    /// which is also the offset used to write the rows.
    pub fn new(start: DateBoundary, end: DateBoundary) -> Result<HourlyTable, TableError> {
        let mixed = || TableError::MixedOffsets {
            start: start.to_string(),
            end: end.to_string(),
        };
        let end_local = match (start.offset, end.offset) {
            (None, None) => end.datetime,
            (Some(so), Some(_)) => end
                .to_fixed()
                .ok_or_else(|| TableError::Parse {
                    input: end.to_string(),
                    reason: "outside the supported date range once the offset is applied"
                        .to_owned(),
                })?
                .with_timezone(&so)
                .naive_local(),
            _ => return Err(mixed()),
        };
        Ok(HourlyTable {
            start: start.datetime,
            end: end_local,
            offset: start.offset,
        })
    }

    /// Lazy iterator over the row timestamps.
    pub fn iter(&self) -> HourlySteps {
        HourlySteps {
            current: Some(self.start),
            end: self.end,
            offset: self.offset,
        }
    }

    /// Number of rows, i.e., how many k >= 0 satisfy start + k hours < end.
    pub fn len(&self) -> usize {
        if self.start >= self.end {
            return 0;
        }
        let span = self.end - self.start;
        let full_hours = span.num_hours();
        let partial = span - Duration::hours(full_hours) > Duration::zero();
        (full_hours + partial as i64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Write the header and one row per hour, return the number of rows.
    pub fn write_csv<W>(&self, mut writer: W) -> Result<usize, TableError>
    where
        W: Write,
    {
        write!(writer, "{}{}", HEADER, LINE_TERMINATOR)?;
        let mut row_count = 0usize;
        for t in self.iter() {
            write!(writer, "{}{}", t, LINE_TERMINATOR)?;
            row_count += 1;
            if row_count % PROGRESS_EVERY_ROWS == 0 {
                debug!("written {} rows, last {}", row_count, t);
            }
        }
        writer.flush()?;
        Ok(row_count)
    }

    /// Write the table to a new csv file, never overwriting an existing one.
    pub fn to_csv<P>(&self, fout: P) -> Result<usize, TableError>
    where
        P: AsRef<Path>,
    {
        let file = create_new_file(fout.as_ref())?;
        self.write_csv(BufWriter::new(file))
    }
}

impl<'a> IntoIterator for &'a HourlyTable {
    type Item = DateBoundary;
    type IntoIter = HourlySteps;

    fn into_iter(self) -> HourlySteps {
        self.iter()
    }
}

/// Steps of one hour from the start while before the end.
/// Stops early if the next step falls outside the chrono calendar.
#[derive(Debug, Clone)]
pub struct HourlySteps {
    current: Option<NaiveDateTime>,
    end: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Iterator for HourlySteps {
    type Item = DateBoundary;

    fn next(&mut self) -> Option<DateBoundary> {
        let current = self.current.filter(|c| *c < self.end)?;
        self.current = current.checked_add_signed(Duration::hours(1));
        Some(DateBoundary {
            datetime: current,
            offset: self.offset,
        })
    }
}

/// Check once that the output does not exist, then create it.
/// create_new also catches a file appearing between the check and the open.
fn create_new_file(fout: &Path) -> Result<File, TableError> {
    if fout.exists() {
        return Err(TableError::PathConflict(fout.to_path_buf()));
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(fout)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => TableError::PathConflict(fout.to_path_buf()),
            _ => TableError::Io(e),
        })
}

/// Generate the csv table of hourly dates and return the number of rows.
pub fn generate<P>(fout: P, start: DateBoundary, end: DateBoundary) -> Result<usize, TableError>
where
    P: AsRef<Path>,
{
    let fout = fout.as_ref();
    let table = HourlyTable::new(start, end)?;
    let file = create_new_file(fout)?;
    info!(
        "Creating a table of dates between {} and {} called {}…",
        start,
        end,
        fout.display()
    );
    let row_count = table.write_csv(BufWriter::new(file))?;
    info!("Completed. Created {} rows.", row_count);
    Ok(row_count)
}
