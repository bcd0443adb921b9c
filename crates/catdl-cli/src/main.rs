use catdl_core::{interrupt, logging, CatalogError};

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }
    interrupt::install_sigint_handler();

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args() {
        if matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::Interrupted)) {
            eprintln!("\ncatdl: interrupted");
            std::process::exit(130);
        }
        eprintln!("catdl error: {:#}", err);
        std::process::exit(1);
    }
}
