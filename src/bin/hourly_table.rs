use hourly_table::generate;
use hourly_table::hourly_table::{init_logging, parse_cli};
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    let (csvout, start, end, verbose) = parse_cli();
    init_logging(verbose);

    debug!("csvout {:?}", csvout);
    debug!("start {:?}", start);
    debug!("end {:?}", end);

    match generate(&csvout, start, end) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
