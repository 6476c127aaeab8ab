//! Experiment loggers
//!
//! Metric sinks the harness writes into during training. The save
//! directory is forwarded from the config; it is created lazily on the
//! first write, never at assembly time.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Trait for experiment loggers.
pub trait ExperimentLogger: Send {
    /// Record metric values for a step.
    fn log_metrics(&mut self, step: usize, metrics: &[(&str, f64)]) -> Result<()>;

    /// Root directory this logger writes under.
    fn save_dir(&self) -> &Path;

    /// Logger name; also the subdirectory metrics land in.
    fn name(&self) -> &str;
}

/// Appends metrics as `step,name,value` rows to
/// `<save_dir>/<name>/metrics.csv`.
#[derive(Debug, Clone)]
pub struct CsvLogger {
    name: String,
    save_dir: PathBuf,
}

impl CsvLogger {
    pub fn new(name: &str, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            save_dir: save_dir.into(),
        }
    }

    /// Path of the metrics file.
    pub fn metrics_file(&self) -> PathBuf {
        self.save_dir.join(&self.name).join("metrics.csv")
    }
}

impl ExperimentLogger for CsvLogger {
    fn log_metrics(&mut self, step: usize, metrics: &[(&str, f64)]) -> Result<()> {
        let path = self.metrics_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "step,name,value")?;
        }
        for (name, value) in metrics {
            writeln!(file, "{},{},{}", step, name, value)?;
        }
        Ok(())
    }

    fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_csv_logger_appends_rows() {
        let dir = tempdir().unwrap();
        let mut logger = CsvLogger::new("csv", dir.path());

        logger.log_metrics(1, &[("loss", 0.5)]).unwrap();
        logger
            .log_metrics(2, &[("loss", 0.4), ("lr", 1e-6)])
            .unwrap();

        let contents = fs::read_to_string(logger.metrics_file()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "step,name,value");
        assert_eq!(lines[1], "1,loss,0.5");
        assert_eq!(lines[2], "2,loss,0.4");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_logger_single_header() {
        let dir = tempdir().unwrap();
        let mut logger = CsvLogger::new("csv", dir.path());

        logger.log_metrics(1, &[("loss", 0.5)]).unwrap();
        logger.log_metrics(2, &[("loss", 0.4)]).unwrap();

        let contents = fs::read_to_string(logger.metrics_file()).unwrap();
        let headers = contents
            .lines()
            .filter(|line| *line == "step,name,value")
            .count();
        assert_eq!(headers, 1);
    }

    #[test]
    fn test_save_dir_not_created_at_construction() {
        let dir = tempdir().unwrap();
        let logger = CsvLogger::new("csv", dir.path().join("run"));

        assert!(!logger.save_dir().exists());
    }
}
