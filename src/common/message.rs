// src/common/message.rs

//! System messages (`18 01 <code> 18`) sent by the instrument after every command.

use super::error::ProtocolError;
use super::frame::ControlToken;
use core::fmt;

/// Length of a system message frame on the wire.
pub const SYSTEM_MESSAGE_LEN: usize = 4;

/// Decoded system message code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SystemMessage {
    /// Frame-not-acknowledge: incorrect syntax.
    FrameNotAcknowledged,
    /// Communication timeout, less data than expected.
    CommunicationTimeout,
    /// Wake-up message, system boot ready.
    WakeUp,
    /// Valid TCP client-socket connection.
    TcpSocket,
    /// Command has not been executed.
    NotExecuted,
    /// Command could not be recognized.
    NotRecognized,
    /// Command has been executed successfully.
    CommandAcknowledged,
    /// System is operational and ready to receive data.
    SystemReady,
    /// DC current on the W-ports exceeds the configured current range.
    Overcurrent,
    /// DC voltage between R and WS exceeds the configured voltage range.
    Overvoltage,
    Other(u8),
}

impl SystemMessage {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x01 => SystemMessage::FrameNotAcknowledged,
            0x02 => SystemMessage::CommunicationTimeout,
            0x04 => SystemMessage::WakeUp,
            0x11 => SystemMessage::TcpSocket,
            0x81 => SystemMessage::NotExecuted,
            0x82 => SystemMessage::NotRecognized,
            0x83 => SystemMessage::CommandAcknowledged,
            0x84 => SystemMessage::SystemReady,
            0x90 => SystemMessage::Overcurrent,
            0x91 => SystemMessage::Overvoltage,
            other => SystemMessage::Other(other),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            SystemMessage::FrameNotAcknowledged => 0x01,
            SystemMessage::CommunicationTimeout => 0x02,
            SystemMessage::WakeUp => 0x04,
            SystemMessage::TcpSocket => 0x11,
            SystemMessage::NotExecuted => 0x81,
            SystemMessage::NotRecognized => 0x82,
            SystemMessage::CommandAcknowledged => 0x83,
            SystemMessage::SystemReady => 0x84,
            SystemMessage::Overcurrent => 0x90,
            SystemMessage::Overvoltage => 0x91,
            SystemMessage::Other(code) => *code,
        }
    }

    /// Parses one complete system message frame.
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < SYSTEM_MESSAGE_LEN {
            return Err(ProtocolError::ShortRead {
                expected: SYSTEM_MESSAGE_LEN,
                got: bytes.len(),
            });
        }
        let token = ControlToken::SystemMessage.as_u8();
        for idx in [0, 3] {
            if bytes[idx] != token {
                return Err(ProtocolError::UnexpectedByte {
                    expected: token,
                    found: bytes[idx],
                });
            }
        }
        if bytes[1] != 0x01 {
            return Err(ProtocolError::UnexpectedByte {
                expected: 0x01,
                found: bytes[1],
            });
        }
        Ok(Self::from_code(bytes[2]))
    }
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemMessage::FrameNotAcknowledged => write!(f, "frame not acknowledged (incorrect syntax)"),
            SystemMessage::CommunicationTimeout => write!(f, "communication timeout (less data than expected)"),
            SystemMessage::WakeUp => write!(f, "wake-up, system boot ready"),
            SystemMessage::TcpSocket => write!(f, "valid TCP client-socket connection"),
            SystemMessage::NotExecuted => write!(f, "command has not been executed"),
            SystemMessage::NotRecognized => write!(f, "command could not be recognized"),
            SystemMessage::CommandAcknowledged => write!(f, "command executed successfully"),
            SystemMessage::SystemReady => write!(f, "system ready"),
            SystemMessage::Overcurrent => write!(f, "overcurrent detected"),
            SystemMessage::Overvoltage => write!(f, "overvoltage detected"),
            SystemMessage::Other(code) => write!(f, "system message {:#04x}", code),
        }
    }
}

/// Validates the acknowledge the instrument sends after a command.
///
/// Only the first four bytes are examined.
pub fn parse_ack(bytes: &[u8]) -> Result<(), ProtocolError> {
    match SystemMessage::parse(bytes)? {
        SystemMessage::CommandAcknowledged => Ok(()),
        other => Err(ProtocolError::Rejected(other)),
    }
}
