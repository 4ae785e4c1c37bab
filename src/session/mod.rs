// src/session/mod.rs

//! Blocking, half-duplex session with one instrument.
//!
//! A [`Session`] owns the transport exclusively and carries everything that
//! outlives a single command: configuration and the active sweep.

mod config;
mod frontend;
mod io_helpers;
mod measurement;

pub use config::{ConfigError, SessionConfig};
pub use frontend::ChannelReport;
pub use measurement::Acquisition;

use crate::common::{
    command::Command,
    error::Isx3Error,
    settings::FrontendSettings,
    sweep::SweepParameters,
    transport::Transport,
};
use crate::stream::StreamReader;

/// Represents a connected ISX-3 for SYNCHRONOUS operations.
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    sweep: Option<SweepParameters>,
    reader: StreamReader,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let reader = StreamReader::new(config.read_timeout());
        Session {
            transport,
            config,
            sweep: None,
            reader,
        }
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The sweep set up by the last successful [`Session::setup_sweep`].
    #[inline]
    pub fn sweep(&self) -> Option<&SweepParameters> {
        self.sweep.as_ref()
    }

    /// Gives the transport back, e.g. to close the port.
    pub fn into_transport(self) -> T {
        self.transport
    }

    // --- Public Blocking Methods ---

    pub fn clear_stack(&mut self) -> Result<(), Isx3Error<T::Error>> {
        self.execute(&Command::ClearStack)
    }

    /// Clears the command stack, then applies `settings`.
    ///
    /// Both frames are encoded before anything is written.
    pub fn set_frontend(&mut self, settings: &FrontendSettings) -> Result<(), Isx3Error<T::Error>> {
        let command = Command::SetFrontend(settings.clone());
        command.encode()?;
        self.execute(&Command::ClearStack)?;
        self.execute(&command)
    }

    /// Resets the setup and programs a new frequency sweep.
    ///
    /// The sweep is remembered for later acquisitions only once it was sent.
    pub fn setup_sweep(&mut self, params: &SweepParameters) -> Result<(), Isx3Error<T::Error>> {
        let command = Command::SetupSweep(*params);
        command.encode()?;
        self.execute(&Command::ResetSetup)?;
        self.execute(&command)?;
        self.sweep = Some(*params);
        Ok(())
    }
}
