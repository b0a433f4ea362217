use crate::cli::args::Cli;
use crate::error::{ProcessingError, Result};
use crate::processors::{AllocationMode, ParallelProcessor};
use crate::readers::MappedInput;
use crate::utils::progress::ProgressReporter;
use crate::utils::timings::StageTimings;
use crate::writers::ReportWriter;
use std::io::{self, BufWriter};
use std::time::Instant;
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(&cli)?;

    // Reject a bad format before touching the input
    let writer = ReportWriter::new()
        .with_format(&cli.format)?
        .with_sorted(!cli.unsorted);
    debug!("Writing {:?} report", writer.format());

    let allocation = if cli.huge_pages {
        AllocationMode::HugePages
    } else {
        AllocationMode::Heap
    };
    let processor = ParallelProcessor::new(cli.workers)
        .with_table_slots(cli.table_slots)
        .with_allocation(allocation);

    let mut timings = StageTimings::new(&cli.input, processor.max_workers());
    if cli.profile {
        info!("Profiling enabled");
    }

    info!("Reading records from {}", cli.input.display());
    let started = Instant::now();
    let input = MappedInput::open(&cli.input)?;
    timings.input_bytes = input.len();
    timings.record("map", started.elapsed());

    let progress = if cli.progress {
        ProgressReporter::new(processor.max_workers() as u64, "Aggregating...", false)
    } else {
        ProgressReporter::silent()
    };

    let (results, phases) = processor.process_with_progress(input.data(), Some(&progress))?;
    timings.record("aggregate", phases.aggregate);
    timings.record("merge", phases.merge);
    drop(progress);

    // Results own their station names, so the mapping can go now
    input.close()?;

    let started = Instant::now();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writer.write_report(&results, &mut out)?;
    timings.record("report", started.elapsed());

    debug!(
        "Key arenas hold {} bytes of station names in {} reserved bytes",
        results.arena().used_bytes(),
        results.arena().reserved_bytes()
    );

    if cli.profile {
        eprintln!("{}", timings.summary());
        let artifact = StageTimings::default_artifact_path()?;
        timings.write_artifact(&artifact)?;
        info!("Profiling done, timings written to {}", artifact.display());
    }

    Ok(())
}

/// Set up structured logging on stderr, or in `--log-file` when given
fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = cli.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("station_aggregator={}", log_level)));

    let result = if let Some(ref path) = cli.log_file {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| ProcessingError::Config(format!("Failed to initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
