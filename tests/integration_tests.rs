use pretty_assertions::assert_eq;
use station_aggregator::models::DecimalLookupTable;
use station_aggregator::processors::{AllocationMode, ParallelProcessor, StationTable};
use station_aggregator::readers::{partition_slices, MappedInput};
use station_aggregator::writers::ReportWriter;
use station_aggregator::Result;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

const STATIONS: &[&str] = &[
    "Hamburg",
    "Bulawayo",
    "Palembang",
    "St. John's",
    "Cracow",
    "Bridgetown",
    "Istanbul",
    "Roseau",
    "Conakry",
    "Zürich",
    "Ağrı",
    "Petropavlovsk-Kamchatsky",
];

/// Deterministic measurement file, no RNG dependency
fn generate_measurements(records: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut out = Vec::new();
    for _ in 0..records {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let station = STATIONS[(state >> 33) as usize % STATIONS.len()];
        let tenths = ((state >> 13) % 1999) as i64 - 999;
        let sign = if tenths < 0 { "-" } else { "" };
        writeln!(
            out,
            "{};{}{}.{}",
            station,
            sign,
            tenths.abs() / 10,
            tenths.abs() % 10
        )
        .unwrap();
    }
    out
}

/// Straightforward reference: str parsing and f64 mean, rounded half away from zero
fn naive_report(data: &[u8]) -> String {
    let text = std::str::from_utf8(data).unwrap();
    let mut stations: BTreeMap<&[u8], (i64, i64, i64, i64)> = BTreeMap::new();
    for line in text.lines() {
        let (name, value) = line.split_once(';').unwrap();
        let tenths = (value.parse::<f64>().unwrap() * 10.0).round() as i64;
        let entry = stations
            .entry(name.as_bytes())
            .or_insert((i64::MAX, i64::MIN, 0, 0));
        entry.0 = entry.0.min(tenths);
        entry.1 = entry.1.max(tenths);
        entry.2 += tenths;
        entry.3 += 1;
    }

    let fmt = |v: i64| {
        let sign = if v < 0 { "-" } else { "" };
        format!("{}{}.{}", sign, v.abs() / 10, v.abs() % 10)
    };

    let mut out = String::new();
    for (name, (min, max, sum, count)) in stations {
        let mean = ((sum.abs() as f64 / count as f64) + 0.5).floor() as i64 * sum.signum();
        out.push_str(&format!(
            "{};{};{};{}\n",
            std::str::from_utf8(name).unwrap(),
            fmt(max),
            fmt(min),
            fmt(mean)
        ));
    }
    out
}

fn run_pipeline(data: &[u8], workers: usize) -> Result<String> {
    let results = ParallelProcessor::new(workers).process(data)?;
    let output = ReportWriter::new().render(&results)?;
    Ok(String::from_utf8(output).unwrap())
}

fn write_temp(data: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_end_to_end_example_from_file() -> Result<()> {
    let file = write_temp(b"A;10.0\nB;-3.5\nA;20.5\n")?;
    let input = MappedInput::open(file.path())?;

    let output = run_pipeline(input.data(), 1)?;
    input.close()?;

    assert_eq!(output, "A;20.5;10.0;15.3\nB;-3.5;-3.5;-3.5\n");
    Ok(())
}

#[test]
fn test_empty_file_produces_no_output() -> Result<()> {
    let file = write_temp(b"")?;
    let input = MappedInput::open(file.path())?;

    let output = run_pipeline(input.data(), 4)?;
    input.close()?;

    assert_eq!(output, "");
    Ok(())
}

#[test]
fn test_partition_count_does_not_affect_output() -> Result<()> {
    let data = generate_measurements(20_000);
    let single = run_pipeline(&data, 1)?;
    let four = run_pipeline(&data, 4)?;
    let many = run_pipeline(&data, 33)?;

    assert_eq!(single, four);
    assert_eq!(single, many);
    Ok(())
}

#[test]
fn test_matches_naive_implementation() -> Result<()> {
    let data = generate_measurements(50_000);
    assert_eq!(run_pipeline(&data, 8)?, naive_report(&data));
    Ok(())
}

#[test]
fn test_missing_trailing_newline() -> Result<()> {
    let mut data = generate_measurements(1_000);
    data.pop();
    assert_eq!(run_pipeline(&data, 5)?, naive_report(&data));
    Ok(())
}

#[test]
fn test_manual_partition_merge_equals_pipeline() -> Result<()> {
    let data = generate_measurements(10_000);
    let lookup = DecimalLookupTable::build();

    let mut partials = partition_slices(&data, 6)
        .into_iter()
        .map(|slice| StationTable::aggregate_partition(slice, &lookup, 16, AllocationMode::Heap))
        .collect::<Result<Vec<_>>>()?;
    partials.reverse();

    let mut merged = StationTable::new(AllocationMode::Heap)?;
    for partial in partials {
        merged.merge_from(partial)?;
    }

    let manual = String::from_utf8(ReportWriter::new().render(&merged)?).unwrap();
    assert_eq!(manual, run_pipeline(&data, 3)?);
    assert_eq!(merged.total_records(), 10_000);
    Ok(())
}

#[test]
fn test_missing_input_is_an_error() {
    assert!(MappedInput::open(std::path::Path::new("no/such/measurements.txt")).is_err());
}
