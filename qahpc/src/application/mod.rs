pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use qahpc_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::PrepareSamples(args) => handlers::handle_prepare_samples(args),
        Commands::Run(args) => handlers::handle_run(args),
    }
}
