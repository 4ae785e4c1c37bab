// src/stream/acquisition.rs

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use super::reader::StreamReader;
use super::IterationPolicy;
use crate::common::{
    error::Isx3Error,
    sample::MeasurementSample,
    timing::DEFAULT_MAX_CONSECUTIVE_FAILURES,
    transport::Transport,
};

/// How many frames a run expects and what to do when one is lost.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AcquisitionPlan {
    /// `point_count × cycle_count`.
    pub iterations: u32,
    pub policy: IterationPolicy,
    /// Only consulted under [`IterationPolicy::DropAndRetry`].
    pub max_consecutive_failures: u32,
}

impl AcquisitionPlan {
    pub fn new(points_per_cycle: u32, cycles: u16, policy: IterationPolicy) -> Self {
        AcquisitionPlan {
            iterations: points_per_cycle.saturating_mul(u32::from(cycles)),
            policy,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// Every iteration slot was used.
    Completed,
    /// The cancellation flag was raised.
    Cancelled,
    /// Too many frames in a row were dropped under the retry policy.
    FailureLimit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub collected: u32,
    pub dropped: u32,
    pub stop: StopReason,
}

impl StreamReader {
    /// Drives the reader through one acquisition run.
    ///
    /// Every decoded sample is handed to `on_sample` in arrival order.
    /// `cancel` is checked after each completed or dropped frame, never in
    /// the middle of one. Recoverable protocol errors are logged and counted;
    /// a transport error aborts the run. The stop command is the caller's job.
    pub fn run<T, F>(
        &mut self,
        transport: &mut T,
        plan: &AcquisitionPlan,
        cancel: &AtomicBool,
        mut on_sample: F,
    ) -> Result<RunSummary, Isx3Error<T::Error>>
    where
        T: Transport,
        F: FnMut(MeasurementSample),
    {
        let mut slot = 0u32;
        let mut collected = 0u32;
        let mut dropped = 0u32;
        let mut consecutive_failures = 0u32;

        let stop = loop {
            if slot >= plan.iterations {
                break StopReason::Completed;
            }

            match self.next_sample(transport) {
                Ok(sample) => {
                    on_sample(sample);
                    collected += 1;
                    consecutive_failures = 0;
                    slot += 1;
                }
                Err(e) if e.is_recoverable() => {
                    dropped += 1;
                    consecutive_failures += 1;
                    warn!("Frame dropped at slot {}/{}: {}", slot + 1, plan.iterations, e);
                    match plan.policy {
                        IterationPolicy::DropAndAdvance => slot += 1,
                        IterationPolicy::DropAndRetry => {
                            if consecutive_failures > plan.max_consecutive_failures {
                                warn!(
                                    "Giving up after {} consecutive dropped frames",
                                    consecutive_failures
                                );
                                break StopReason::FailureLimit;
                            }
                        }
                    }
                }
                Err(e) => return Err(e),
            }

            if cancel.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }
        };

        debug!(
            "Acquisition finished: {:?}, {} collected, {} dropped, {} of {} slots",
            stop, collected, dropped, slot, plan.iterations
        );
        Ok(RunSummary {
            collected,
            dropped,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::sample::{tests::frame_bytes, MeasurementFrameType};
    use crate::common::transport::mock::MockTransport;
    use core::time::Duration;
    use std::vec::Vec;

    fn basic(id: u16) -> heapless::Vec<u8, 19> {
        frame_bytes(MeasurementFrameType::Basic, id, 0, 0, id as f32, 0.0)
    }

    fn plan(iterations: u32, policy: IterationPolicy) -> AcquisitionPlan {
        AcquisitionPlan {
            iterations,
            policy,
            max_consecutive_failures: 3,
        }
    }

    fn run(mock: &mut MockTransport, plan: &AcquisitionPlan) -> (RunSummary, Vec<MeasurementSample>) {
        let mut reader = StreamReader::new(Duration::from_millis(5));
        let mut samples = Vec::new();
        let cancel = AtomicBool::new(false);
        let summary = reader
            .run(mock, plan, &cancel, |s| samples.push(s))
            .unwrap();
        (summary, samples)
    }

    #[test]
    fn test_plan_iterations() {
        let plan = AcquisitionPlan::new(60, 20, IterationPolicy::default());
        assert_eq!(plan.iterations, 1200);
        assert_eq!(plan.policy, IterationPolicy::DropAndAdvance);
    }

    #[test]
    fn test_full_run_in_order() {
        let mut mock = MockTransport::new();
        for id in 0..6 {
            mock.stage_read_data(&basic(id));
        }
        let (summary, samples) = run(&mut mock, &plan(6, IterationPolicy::DropAndAdvance));

        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(summary.collected, 6);
        let ids: Vec<u16> = samples.iter().map(|s| s.frequency_id).collect();
        assert_eq!(ids, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_drop_and_advance_under_collects() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&basic(0))
            .stage_read_data(&[0xB8, 0x0C]) // unknown type
            .stage_read_data(&basic(1))
            .stage_read_data(&basic(2));
        let (summary, samples) = run(&mut mock, &plan(3, IterationPolicy::DropAndAdvance));

        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(summary.collected, 2);
        assert_eq!(summary.dropped, 1);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].frequency_id, 1);
    }

    #[test]
    fn test_drop_and_retry_collects_all() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&basic(0))
            .stage_read_data(&[0xB8, 0x0C])
            .stage_silence()
            .stage_read_data(&basic(1))
            .stage_read_data(&basic(2));
        let (summary, samples) = run(&mut mock, &plan(3, IterationPolicy::DropAndRetry));

        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(summary.collected, 3);
        assert_eq!(summary.dropped, 2);
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_drop_and_retry_gives_up() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&basic(0));
        let (summary, samples) = run(&mut mock, &plan(5, IterationPolicy::DropAndRetry));

        assert_eq!(summary.stop, StopReason::FailureLimit);
        assert_eq!(samples.len(), 1);
        assert_eq!(summary.dropped, 4);
    }

    #[test]
    fn test_cancel_checked_between_frames() {
        let mut mock = MockTransport::new();
        for id in 0..4 {
            mock.stage_read_data(&basic(id));
        }
        let mut reader = StreamReader::new(Duration::from_millis(5));
        let cancel = AtomicBool::new(false);
        let mut seen = 0;
        let summary = reader
            .run(&mut mock, &plan(4, IterationPolicy::DropAndAdvance), &cancel, |_| {
                seen += 1;
                if seen == 2 {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.collected, 2);
    }

    #[test]
    fn test_zero_iterations_reads_nothing() {
        let mut mock = MockTransport::new();
        let (summary, _) = run(&mut mock, &plan(0, IterationPolicy::DropAndAdvance));
        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(mock.reads, 0);
    }
}
