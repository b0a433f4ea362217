use crate::error::{ProcessingError, Result};
use crate::models::decimal::{format_tenths, to_display_float, wide_to_display_float};
use crate::models::StationStats;
use crate::processors::StationTable;
use crate::utils::constants::FIELD_SEPARATOR;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `<name>;<max>;<min>;<mean>` per line
    #[default]
    Text,
    Json,
}

/// One station as emitted in JSON reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub name: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: u64,
}

impl StationSummary {
    pub fn new(name: &[u8], stats: &StationStats) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            min: to_display_float(stats.min),
            mean: wide_to_display_float(stats.mean_tenths()),
            max: to_display_float(stats.max),
            count: stats.count,
        }
    }
}

pub struct ReportWriter {
    format: ReportFormat,
    sorted: bool,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            format: ReportFormat::Text,
            sorted: true,
        }
    }

    pub fn with_format(mut self, format: &str) -> Result<Self> {
        self.format = match format.to_lowercase().as_str() {
            "text" | "txt" => ReportFormat::Text,
            "json" => ReportFormat::Json,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported output format: {}",
                    format
                )))
            }
        };
        Ok(self)
    }

    /// Sort stations by name bytes (the default) or keep table order.
    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Write every station of `table` to `out`. Empty tables write nothing in
    /// text format and `[]` in JSON.
    pub fn write_report<W: Write>(&self, table: &StationTable, out: &mut W) -> Result<()> {
        let stations: Vec<(&[u8], &StationStats)> = if self.sorted {
            table.sorted()
        } else {
            table.iter().collect()
        };

        match self.format {
            ReportFormat::Text => {
                for (name, stats) in stations {
                    Self::write_line(out, name, stats)?;
                }
            }
            ReportFormat::Json => {
                let summaries: Vec<StationSummary> = stations
                    .into_iter()
                    .map(|(name, stats)| StationSummary::new(name, stats))
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &summaries)?;
                writeln!(out)?;
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Names are written as raw bytes.
    fn write_line<W: Write>(out: &mut W, name: &[u8], stats: &StationStats) -> Result<()> {
        let separator = FIELD_SEPARATOR as char;
        out.write_all(name)?;
        writeln!(
            out,
            "{sep}{max}{sep}{min}{sep}{mean}",
            sep = separator,
            max = format_tenths(stats.max as i64),
            min = format_tenths(stats.min as i64),
            mean = format_tenths(stats.mean_tenths()),
        )?;
        Ok(())
    }

    pub fn render(&self, table: &StationTable) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_report(table, &mut buf)?;
        Ok(buf)
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
