// src/stream/reader.rs

//! Frame synchronization over the live measurement stream.
//!
//! The reader keeps a small receive queue that it refills from the transport
//! in chunks, then walks it with an explicit state machine:
//!
//! `ScanningForStart -> ReadingHeader -> ReadingBody -> ScanningForStart`
//!
//! The measurement token `0xB8` is not escaped inside payloads, so a float or
//! timestamp byte can look like a frame start. A false start is caught by the
//! closing-token check; the reader then rescans the candidate body instead of
//! skipping it, which lets it lock back onto the real frame boundary.

use core::time::Duration;

use heapless::Deque;
use log::{trace, warn};

use crate::common::{
    error::{Isx3Error, ProtocolError},
    frame::ControlToken,
    sample::{decode_measurement_frame, MeasurementFrameType, MeasurementSample, MAX_MEASUREMENT_FRAME_LEN},
    transport::Transport,
};

/// Capacity of the receive queue.
pub const RX_QUEUE_LEN: usize = 256;
/// Most bytes requested from the transport per refill.
const READ_CHUNK: usize = 64;

const TOKEN: u8 = ControlToken::Measurement as u8;

/// Where the reader is within the current frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScanState {
    /// Discarding bytes until the measurement token shows up.
    ScanningForStart,
    /// Token seen, waiting for the frame type byte.
    ReadingHeader,
    /// Type known, waiting for the rest of the frame.
    ReadingBody(MeasurementFrameType),
}

/// Extracts measurement samples from the byte stream.
#[derive(Debug)]
pub struct StreamReader {
    state: ScanState,
    rx: Deque<u8, RX_QUEUE_LEN>,
    read_timeout: Duration,
    discarded: usize,
}

impl StreamReader {
    pub fn new(read_timeout: Duration) -> Self {
        StreamReader {
            state: ScanState::ScanningForStart,
            rx: Deque::new(),
            read_timeout,
            discarded: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Bytes thrown away while hunting for frame starts.
    #[inline]
    pub fn discarded_bytes(&self) -> usize {
        self.discarded
    }

    /// Drops buffered bytes and restarts the scan.
    pub fn reset(&mut self) {
        self.rx.clear();
        self.state = ScanState::ScanningForStart;
    }

    /// Reads until one frame decodes or a frame-level error occurs.
    ///
    /// Protocol errors leave the reader in `ScanningForStart`, ready for the
    /// next call. Transport errors are returned as `Io` and are not recoverable.
    pub fn next_sample<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<MeasurementSample, Isx3Error<T::Error>> {
        loop {
            match self.state {
                ScanState::ScanningForStart => {
                    if !self.fill(transport, 1)? {
                        return Err(ProtocolError::Timeout.into());
                    }
                    while let Some(byte) = self.rx.pop_front() {
                        if byte == TOKEN {
                            self.state = ScanState::ReadingHeader;
                            break;
                        }
                        trace!("Skipping byte {:#04x} while scanning for frame start", byte);
                        self.discarded += 1;
                    }
                }
                ScanState::ReadingHeader => {
                    if !self.fill(transport, 1)? {
                        self.state = ScanState::ScanningForStart;
                        return Err(ProtocolError::TruncatedFrame { expected: 2, got: 1 }.into());
                    }
                    let Some(type_byte) = self.rx.pop_front() else {
                        continue;
                    };
                    if type_byte == TOKEN {
                        // Closing token of a lost frame followed by a real start.
                        self.discarded += 1;
                        continue;
                    }
                    match MeasurementFrameType::from_u8(type_byte) {
                        Some(frame_type) => self.state = ScanState::ReadingBody(frame_type),
                        None => {
                            self.discarded += 2;
                            self.state = ScanState::ScanningForStart;
                            return Err(ProtocolError::UnknownFrameType(type_byte).into());
                        }
                    }
                }
                ScanState::ReadingBody(frame_type) => {
                    return self.read_body(transport, frame_type);
                }
            }
        }
    }

    fn read_body<T: Transport>(
        &mut self,
        transport: &mut T,
        frame_type: MeasurementFrameType,
    ) -> Result<MeasurementSample, Isx3Error<T::Error>> {
        self.state = ScanState::ScanningForStart;

        let frame_len = frame_type.frame_len();
        let remaining = frame_len - 2;
        if !self.fill(transport, remaining)? {
            let got = 2 + self.rx.len();
            self.discarded += got;
            self.rx.clear();
            warn!(
                "Dropping truncated {:?} frame ({} of {} bytes)",
                frame_type, got, frame_len
            );
            return Err(ProtocolError::TruncatedFrame {
                expected: frame_len,
                got,
            }
            .into());
        }

        let mut frame = [0u8; MAX_MEASUREMENT_FRAME_LEN];
        frame[0] = TOKEN;
        frame[1] = frame_type as u8;
        for (slot, byte) in frame[2..frame_len].iter_mut().zip(self.rx.iter()) {
            *slot = *byte;
        }

        match decode_measurement_frame(&frame[..frame_len]) {
            Ok(sample) => {
                for _ in 0..remaining {
                    self.rx.pop_front();
                }
                Ok(sample)
            }
            Err(e) => {
                // Leave the body queued so a real start token inside it is found.
                self.discarded += 2;
                warn!("Dropping {:?} frame: {}", frame_type, e);
                Err(e.into())
            }
        }
    }

    /// Refills the queue until it holds `needed` bytes.
    ///
    /// Returns `Ok(false)` if a read delivered nothing before the timeout.
    fn fill<T: Transport>(&mut self, transport: &mut T, needed: usize) -> Result<bool, Isx3Error<T::Error>> {
        let mut chunk = [0u8; READ_CHUNK];
        while self.rx.len() < needed {
            let room = (RX_QUEUE_LEN - self.rx.len()).min(READ_CHUNK);
            let n = transport
                .read(&mut chunk[..room], self.read_timeout)
                .map_err(Isx3Error::Io)?;
            if n == 0 {
                return Ok(false);
            }
            for &byte in &chunk[..n] {
                // Cannot overflow: `room` bounds the read.
                let _ = self.rx.push_back(byte);
            }
        }
        Ok(true)
    }
}
