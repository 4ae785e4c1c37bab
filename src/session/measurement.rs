// src/session/measurement.rs

use std::sync::atomic::AtomicBool;

use log::{info, warn};

use super::Session;
use crate::common::{
    command::Command,
    error::Isx3Error,
    sample::MeasurementSample,
    transport::Transport,
};
use crate::stream::{AcquisitionPlan, RunSummary};

/// Samples of one run, in arrival order, with how the run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub samples: Vec<MeasurementSample>,
    pub summary: RunSummary,
}

impl<T: Transport> Session<T> {
    pub fn start_measurement(&mut self, cycles: u16) -> Result<(), Isx3Error<T::Error>> {
        self.execute(&Command::StartMeasurement { cycles })
    }

    pub fn stop_measurement(&mut self) -> Result<(), Isx3Error<T::Error>> {
        self.execute(&Command::StopMeasurement)
    }

    /// Reads `points × cycles` frames of an already started measurement.
    ///
    /// Does not send the stop command.
    pub fn acquire(&mut self, cycles: u16, cancel: &AtomicBool) -> Result<Acquisition, Isx3Error<T::Error>> {
        let sweep = self.sweep.ok_or(Isx3Error::NoSweep)?;
        let plan = AcquisitionPlan {
            max_consecutive_failures: self.config.max_consecutive_failures,
            ..AcquisitionPlan::new(sweep.points_per_cycle(), cycles, self.config.iteration_policy)
        };

        self.reader.reset();
        let mut samples = Vec::with_capacity(plan.iterations as usize);
        let summary = self
            .reader
            .run(&mut self.transport, &plan, cancel, |s| samples.push(s))?;

        info!(
            "Run finished ({:?}): {} of {} samples, {} dropped",
            summary.stop, summary.collected, plan.iterations, summary.dropped
        );
        Ok(Acquisition { samples, summary })
    }

    /// Starts a measurement, acquires it and stops it again.
    ///
    /// The stop command is sent even when the acquisition fails. A failing
    /// stop is only logged: it never discards a finished run, nor does it
    /// replace the acquisition error.
    pub fn measure(&mut self, cycles: u16, cancel: &AtomicBool) -> Result<Acquisition, Isx3Error<T::Error>> {
        if self.sweep.is_none() {
            return Err(Isx3Error::NoSweep);
        }
        self.start_measurement(cycles)?;
        let acquisition = self.acquire(cycles, cancel);
        let stopped = self.stop_measurement();
        if let Err(e) = stopped {
            warn!("Stop measurement failed: {}", e);
        }
        acquisition
    }
}
