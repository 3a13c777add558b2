// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use form_tracker::cli::args::{Cli, Commands};
use form_tracker::cli::track::run_tracking;
use form_tracker::error;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Track(args) => {
            if let Err(e) = run_tracking(args) {
                error!("{e}");
                process::exit(1);
            }
        }
    }
}
