use super::VERSION;
use crate::error::TableError;
use crate::utils::{parse_utc_offset, DateBoundary, DateParser};
use crate::HourlyTable;
use chrono::FixedOffset;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build the command for the hourly table generator.
pub fn cli() -> Command {
    let arg_csvout = Arg::new("output_file")
        .help("the output csv file, must not exist yet")
        .required(true)
        .value_parser(value_parser!(PathBuf));
    let arg_start = Arg::new("start_date")
        .help("the start date, included; e.g., 1900-01-01 or 1900-01-01T00:00:00")
        .required(true);
    let arg_end = Arg::new("end_date")
        .help("the end date, excluded; e.g., 2024-01-01 or 2024-01-01T00:00:00")
        .required(true);
    let arg_utc_offset = Arg::new("utc_offset")
        .help("UTC offset (±HH:MM) for the dates given without one")
        .long("utc-offset")
        .allow_hyphen_values(true)
        .num_args(1)
        .value_parser(parse_utc_offset);
    let arg_verbose = Arg::new("verbose")
        .help("print verbose information")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue);
    Command::new("hourly_table")
        .version(VERSION.unwrap_or("unknown"))
        .author("Luca Peruzzo")
        .about("cli app to generate a csv table of dates, one row per hour")
        .arg(arg_csvout)
        .arg(arg_start)
        .arg(arg_end)
        .arg(arg_utc_offset)
        .arg(arg_verbose)
}

/// Read the parsed arguments.
/// The dates are parsed here, rather than by clap,
/// because the assumed UTC offset is itself an argument.
pub fn read_matches(
    cli_args: &ArgMatches,
) -> Result<(PathBuf, DateBoundary, DateBoundary, bool), TableError> {
    // required arguments, always Some once clap accepted the command line
    let csvout: PathBuf = cli_args
        .get_one::<PathBuf>("output_file")
        .cloned()
        .unwrap_or_default();
    let start_str = cli_args
        .get_one::<String>("start_date")
        .map(String::as_str)
        .unwrap_or_default();
    let end_str = cli_args
        .get_one::<String>("end_date")
        .map(String::as_str)
        .unwrap_or_default();
    let utc_offset: Option<FixedOffset> = cli_args.get_one::<FixedOffset>("utc_offset").copied();
    let verbose = cli_args.get_flag("verbose");

    let parser = DateParser::new(utc_offset);
    let start = parser.parse(start_str)?;
    let end = parser.parse(end_str)?;
    HourlyTable::new(start, end)?;

    Ok((csvout, start, end, verbose))
}

/// Takes the CLI arguments: output file, start and end dates, verbosity.
/// Invalid dates are reported as usage errors and terminate the process.
pub fn parse_cli() -> (PathBuf, DateBoundary, DateBoundary, bool) {
    let mut cmd = cli();
    let cli_args = cmd.get_matches_mut();
    match read_matches(&cli_args) {
        Ok(parsed) => parsed,
        Err(e) => {
            let kind = match e {
                TableError::MixedOffsets { .. } => ErrorKind::ArgumentConflict,
                _ => ErrorKind::ValueValidation,
            };
            cmd.error(kind, e).exit()
        }
    }
}

/// Log to stderr so that the diagnostics never mix with data.
/// RUST_LOG is honoured unless verbose asks for debug.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(args: &[&str]) -> Result<(PathBuf, DateBoundary, DateBoundary, bool), TableError> {
        let cli_args = cli()
            .try_get_matches_from(std::iter::once("hourly_table").chain(args.iter().copied()))
            .unwrap();
        read_matches(&cli_args)
    }

    #[test]
    fn positional_arguments() {
        let (csvout, start, end, verbose) =
            read(&["out.csv", "1900-01-01", "1900-01-02T00:00:00"]).unwrap();
        assert_eq!(csvout, PathBuf::from("out.csv"));
        assert_eq!(start.to_string(), "1900-01-01 00:00:00");
        assert_eq!(end.to_string(), "1900-01-02 00:00:00");
        assert!(!verbose);
    }

    #[test]
    fn utc_offset_applies_to_naive_dates() {
        let (_, start, end, verbose) = read(&[
            "-v",
            "--utc-offset",
            "-08:00",
            "out.csv",
            "2024-01-01",
            "2024-01-01T12:00Z",
        ])
        .unwrap();
        assert!(verbose);
        assert_eq!(start.offset, FixedOffset::west_opt(8 * 3600));
        assert_eq!(end.offset, FixedOffset::east_opt(0));
    }

    #[test]
    fn bad_dates_are_errors() {
        let res = read(&["out.csv", "not-a-date", "2024-01-01"]);
        assert!(matches!(res, Err(TableError::Parse { .. })));
        let res = read(&["out.csv", "2024-01-01", "2024-01-01T00:00Z"]);
        assert!(matches!(res, Err(TableError::MixedOffsets { .. })));
    }

    #[test]
    fn missing_and_invalid_arguments_are_usage_errors() {
        let err = cli()
            .try_get_matches_from(["hourly_table", "out.csv", "2024-01-01"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        let err = cli()
            .try_get_matches_from(["hourly_table", "--utc-offset", "8", "o.csv", "2024-01-01", "2024-01-02"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn command_is_well_formed() {
        cli().debug_assert();
    }
}
