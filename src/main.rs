use clap::Parser;
use station_aggregator::cli::{run, Cli};
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}
