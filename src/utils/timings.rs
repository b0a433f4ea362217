use crate::error::Result;
use crate::utils::constants::TIMINGS_SUFFIX;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-stage wall-clock timings captured when profiling is enabled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageTimings {
    pub input: String,
    pub workers: usize,
    pub input_bytes: usize,
    pub stages: Vec<StageTiming>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub millis: f64,
}

impl StageTimings {
    pub fn new(input: &Path, workers: usize) -> Self {
        Self {
            input: input.display().to_string(),
            workers,
            ..Default::default()
        }
    }

    pub fn record(&mut self, stage: &'static str, elapsed: Duration) {
        self.stages.push(StageTiming {
            stage,
            millis: elapsed.as_secs_f64() * 1000.0,
        });
    }

    pub fn total_millis(&self) -> f64 {
        self.stages.iter().map(|s| s.millis).sum()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Stage timings for {} ({} bytes, {} workers):",
            self.input, self.input_bytes, self.workers
        )];
        for stage in &self.stages {
            lines.push(format!("  {:<10} {:>10.2} ms", stage.stage, stage.millis));
        }
        lines.push(format!("  {:<10} {:>10.2} ms", "total", self.total_millis()));
        lines.join("\n")
    }

    /// `<executable>.timings.json`, next to the running binary.
    pub fn default_artifact_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let mut name = exe.into_os_string();
        name.push(TIMINGS_SUFFIX);
        Ok(PathBuf::from(name))
    }

    pub fn write_artifact(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
