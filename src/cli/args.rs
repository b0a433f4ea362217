use crate::utils::constants::{DEFAULT_INPUT_FILE, DEFAULT_TABLE_SLOTS, PROFILE_ENV};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "station-aggregator")]
#[command(about = "Per-station min/mean/max over large <station>;<measurement> files")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Input measurements file", default_value = DEFAULT_INPUT_FILE)]
    pub input: PathBuf,

    #[arg(short, long, default_value_t = num_cpus::get(), help = "Worker threads (one partition each)")]
    pub workers: usize,

    #[arg(short, long, default_value = "text", help = "Output format: text or json")]
    pub format: String,

    #[arg(long, help = "Keep merged table order instead of sorting by station name")]
    pub unsorted: bool,

    #[arg(long, help = "Back station-name arenas with huge pages (fails if unavailable)")]
    pub huge_pages: bool,

    #[arg(long, default_value_t = DEFAULT_TABLE_SLOTS, help = "Initial hash slots per partition")]
    pub table_slots: usize,

    #[arg(long, help = "Show a progress bar on stderr")]
    pub progress: bool,

    #[arg(
        long,
        env = PROFILE_ENV,
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Report stage timings and write <executable>.timings.json"
    )]
    pub profile: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
