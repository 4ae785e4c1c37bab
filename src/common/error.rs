// src/common/error.rs

use super::message::SystemMessage;
use super::settings::FrontendMode;

/// Wire-level failures. All of them are recoverable inside the measurement
/// loop: the affected frame is dropped and the reader resynchronizes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// No byte arrived within the read timeout.
    #[error("Timed out waiting for data")]
    Timeout,

    /// Discriminator / mode byte does not name a known frame layout, or the
    /// declared length does not fit that layout.
    #[error("Unknown frame type: {0:#04x}")]
    UnknownFrameType(u8),

    /// The stream stalled in the middle of a frame.
    #[error("Truncated frame: expected {expected} bytes, got {got}")]
    TruncatedFrame { expected: usize, got: usize },

    /// Fewer bytes than a complete reply arrived before the timeout.
    #[error("Short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    /// A framing byte (control token or length) had the wrong value.
    #[error("Unexpected byte: expected {expected:#04x}, found {found:#04x}")]
    UnexpectedByte { expected: u8, found: u8 },

    /// The reply contained no control-token delimited block.
    #[error("No framed block found in response")]
    MissingFrame,

    /// The device answered with a system message other than an acknowledge.
    #[error("Device rejected command: {0}")]
    Rejected(SystemMessage),
}

/// A command could not be built from the given values. Nothing is sent.
#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum InvalidParameter {
    #[error("{mode:?} wiring needs {expected} channels, got {got}")]
    ChannelCount {
        mode: FrontendMode,
        expected: usize,
        got: usize,
    },

    #[error("Unknown frontend mode code: {0:#04x}")]
    UnknownMode(u8),

    #[error("Unknown sweep scale code: {0:#04x}")]
    UnknownScale(u8),

    #[error("Sweep field '{0}' is not a finite number")]
    NonFinite(&'static str),

    #[error("Sweep point count must be a whole number of at least 1, got {0}")]
    PointCount(f32),

    #[error("Cycle count must be at least 1")]
    CycleCount,

    #[error("Channel index must be at least 1")]
    ChannelIndex,
}

/// Session-level error, generic over the transport's I/O error type.
#[derive(Debug, thiserror::Error)]
pub enum Isx3Error<E = ()>
where
    E: core::fmt::Debug, // Needed for the Io(E) format string
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),

    /// A measurement was requested before any frequency sweep was set up.
    #[error("No frequency sweep configured for this session")]
    NoSweep,
}

impl<E: core::fmt::Debug> Isx3Error<E> {
    /// Returns `true` for errors the acquisition loop may drop and resynchronize past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Isx3Error::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_converts() {
        let err: Isx3Error<()> = ProtocolError::Timeout.into();
        assert!(matches!(err, Isx3Error::Protocol(ProtocolError::Timeout)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_and_parameter_errors_are_fatal() {
        let io: Isx3Error<&str> = Isx3Error::Io("port gone");
        assert!(!io.is_recoverable());
        let param: Isx3Error<()> = InvalidParameter::CycleCount.into();
        assert!(!param.is_recoverable());
    }
}
