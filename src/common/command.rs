// src/common/command.rs

//! ISX-3 command frames.
//!
//! Every command encodes into a [`FrameBuffer`]. Encoding validates first and
//! only then writes bytes, so an invalid parameter never yields a partial frame.

use core::fmt;

use super::error::InvalidParameter;
use super::frame::{ControlToken, FrameBuffer, FrameWriter};
use super::settings::FrontendSettings;
use super::sweep::SweepParameters;

/// Clear-stack payload: three `0xFF` bytes on the set-frontend token.
const CLEAR_STACK_PAYLOAD: [u8; 3] = [0xFF, 0xFF, 0xFF];
/// Get-frontend selector asking for the channel count.
const CHANNEL_COUNT_SELECTOR: [u8; 2] = [0x02, 0x00];
/// Setup reset operation byte.
const OP_RESET_SETUP: u8 = 0x01;
const OP_MEASUREMENT_START: u8 = 0x01;
const OP_MEASUREMENT_STOP: u8 = 0x00;

/// Represents an ISX-3 command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Flushes any pending device command stack (`B0 03 FF FF FF B0`).
    ClearStack,
    /// Sets mode, ranges and channel wiring.
    SetFrontend(FrontendSettings),
    /// Asks for the number of configured frontend channels.
    GetChannelCount,
    /// Asks for the configuration block of one channel (1-based).
    GetChannel(u8),
    /// Resets the sweep setup (`86 01 01 86`).
    ResetSetup,
    /// Adds a frequency list to the setup.
    SetupSweep(SweepParameters),
    /// Starts a measurement of `cycles` sweep repetitions.
    StartMeasurement { cycles: u16 },
    /// Stops a running measurement.
    StopMeasurement,
}

impl Command {
    /// Encodes the command into its wire frame.
    pub fn encode(&self) -> Result<FrameBuffer, InvalidParameter> {
        match self {
            Command::ClearStack => Ok(build_clear_stack()),
            Command::SetFrontend(settings) => build_set_frontend(settings),
            Command::GetChannelCount => {
                let mut w = FrameWriter::new(ControlToken::GetFrontend);
                w.extend(&CHANNEL_COUNT_SELECTOR);
                Ok(w.finish())
            }
            Command::GetChannel(channel) => {
                if *channel == 0 {
                    return Err(InvalidParameter::ChannelIndex);
                }
                let mut w = FrameWriter::new(ControlToken::GetFrontend);
                w.push(*channel);
                Ok(w.finish())
            }
            Command::ResetSetup => {
                let mut w = FrameWriter::new(ControlToken::SetupReset);
                w.push(OP_RESET_SETUP);
                Ok(w.finish())
            }
            Command::SetupSweep(params) => params.encode(),
            Command::StartMeasurement { cycles } => {
                if *cycles == 0 {
                    return Err(InvalidParameter::CycleCount);
                }
                let mut w = FrameWriter::new(ControlToken::Measurement);
                w.push(OP_MEASUREMENT_START);
                w.push_u16(*cycles);
                Ok(w.finish())
            }
            Command::StopMeasurement => {
                let mut w = FrameWriter::new(ControlToken::Measurement);
                w.push(OP_MEASUREMENT_STOP);
                Ok(w.finish())
            }
        }
    }

    /// Whether the instrument answers this command with a system message.
    ///
    /// Get-frontend queries answer with a data block instead.
    pub fn expects_ack(&self) -> bool {
        !matches!(self, Command::GetChannelCount | Command::GetChannel(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ClearStack => write!(f, "clear stack"),
            Command::SetFrontend(s) => write!(f, "set frontend ({:?})", s.mode),
            Command::GetChannelCount => write!(f, "get channel count"),
            Command::GetChannel(ch) => write!(f, "get channel {}", ch),
            Command::ResetSetup => write!(f, "reset setup"),
            Command::SetupSweep(p) => write!(
                f,
                "setup sweep {}..{} Hz x{}",
                p.start_frequency_hz, p.stop_frequency_hz, p.point_count
            ),
            Command::StartMeasurement { cycles } => write!(f, "start measurement ({} cycles)", cycles),
            Command::StopMeasurement => write!(f, "stop measurement"),
        }
    }
}

/// Builds the fixed clear-stack frame.
pub fn build_clear_stack() -> FrameBuffer {
    let mut w = FrameWriter::new(ControlToken::SetFrontend);
    w.extend(&CLEAR_STACK_PAYLOAD);
    w.finish()
}

/// Builds a set-frontend frame; the length byte is `3 + 3 * arity`.
pub fn build_set_frontend(settings: &FrontendSettings) -> Result<FrameBuffer, InvalidParameter> {
    settings.validate()?;
    let mut w = FrameWriter::new(ControlToken::SetFrontend);
    settings.write_body(&mut w);
    Ok(w.finish())
}
