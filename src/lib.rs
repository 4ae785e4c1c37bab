// src/lib.rs

//! Driver for the Sciospec ISX-3 impedance spectroscopy serial protocol.
//!
//! The frame codec ([`common`]) and the measurement stream reader ([`stream`])
//! build without `std`. The `std` feature adds the blocking [`Session`], the
//! serial transport and the CSV result sink.
//!
//! ```no_run
//! # #[cfg(feature = "std")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::atomic::AtomicBool;
//! use isx3::sink::{CsvSink, ResultSink};
//! use isx3::{Scale, Session, SessionConfig, SweepParameters};
//!
//! let mut session = Session::connect("/dev/ttyACM0", SessionConfig::default())?;
//! session.setup_sweep(&SweepParameters {
//!     start_frequency_hz: 1000.0,
//!     stop_frequency_hz: 10_000_000.0,
//!     point_count: 60.0,
//!     scale: Scale::Log,
//!     precision: 1.0,
//!     amplitude: 0.1,
//! })?;
//!
//! let run = session.measure(20, &AtomicBool::new(false))?;
//! CsvSink::new("impedance.csv").write_samples(&run.samples)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```

#![cfg_attr(not(feature = "std"), no_std)] // Codec and stream reader build without std

#[cfg(all(test, not(feature = "std")))]
extern crate std; // Test mocks use std collections

pub mod common;
pub mod stream;

#[cfg(feature = "std")]
pub mod serial;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod sink;

// Re-export key types for convenience
pub use common::{
    FrontendMode, FrontendSettings, InvalidParameter, Isx3Error, MeasurementSample,
    ProtocolError, Scale, SweepParameters, Transport,
};
pub use stream::{IterationPolicy, StreamReader};

#[cfg(feature = "std")]
pub use session::{Session, SessionConfig};
