// src/sink.rs

//! Persisting the samples of a run.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::sample::MeasurementSample;

/// Receives the full, ordered sample sequence of one run.
pub trait ResultSink {
    type Error;

    fn write_samples(&mut self, samples: &[MeasurementSample]) -> Result<(), Self::Error>;
}

/// Keeps samples in memory.
impl ResultSink for Vec<MeasurementSample> {
    type Error = std::convert::Infallible;

    fn write_samples(&mut self, samples: &[MeasurementSample]) -> Result<(), Self::Error> {
        self.clear();
        self.extend_from_slice(samples);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes a run as CSV, replacing the destination file.
///
/// Columns are `Frequency ID, Real Part, Imaginary Part`, followed by
/// `Timestamp` and/or `Current Range` when any sample carries them.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the whole table in memory.
    pub fn render(samples: &[MeasurementSample]) -> Result<Vec<u8>, SinkError> {
        let with_timestamp = samples.iter().any(|s| s.timestamp.is_some());
        let with_range = samples.iter().any(|s| s.current_range.is_some());

        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Frequency ID", "Real Part", "Imaginary Part"];
        if with_timestamp {
            header.push("Timestamp");
        }
        if with_range {
            header.push("Current Range");
        }
        writer.write_record(&header)?;

        for s in samples {
            let mut row = vec![s.frequency_id.to_string(), s.real.to_string(), s.imag.to_string()];
            if with_timestamp {
                row.push(s.timestamp.map(|t| t.to_string()).unwrap_or_default());
            }
            if with_range {
                row.push(s.current_range.map(|r| r.to_string()).unwrap_or_default());
            }
            writer.write_record(&row)?;
        }

        writer.into_inner().map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl ResultSink for CsvSink {
    type Error = SinkError;

    /// The file is written in one go, so a failed render leaves the previous
    /// contents untouched instead of a header with no rows.
    fn write_samples(&mut self, samples: &[MeasurementSample]) -> Result<(), Self::Error> {
        let table = Self::render(samples)?;
        fs::write(&self.path, table)?;
        info!("Wrote {} samples to '{}'", samples.len(), self.path.display());
        Ok(())
    }
}
