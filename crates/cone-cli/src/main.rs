//! `conec`: the Cone compiler driver binary.

mod args;
mod driver;
mod ir_print;

use args::{CliArgs, ColorChoice};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const EXIT_BAD_OPTIONS: u8 = 4;

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return ExitCode::from(EXIT_BAD_OPTIONS);
        }
    };

    init_tracing(args.verbose);
    match args.color {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {}
    }

    match driver::run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::from(driver::EXIT_ERRORS)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
        .init();
}
