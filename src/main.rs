use anyhow::Result;
use std::process;
use log::error;
use srctidy::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    // Files are processed one at a time; the runtime only drives child process I/O
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run(&args, &config_manager))?;
    Ok(())
}
