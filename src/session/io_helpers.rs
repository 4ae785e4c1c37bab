// src/session/io_helpers.rs

use log::{debug, warn};
use std::time::{Duration, Instant};

use super::Session;
use crate::common::{
    command::Command,
    error::{Isx3Error, ProtocolError},
    message::{parse_ack, SYSTEM_MESSAGE_LEN},
    timing::REPLY_READ_LEN,
    transport::Transport,
};

// Implementation block for request/response helpers
impl<T: Transport> Session<T> {
    /// Encodes, sends and (when the command has one) checks the acknowledge.
    pub(super) fn execute(&mut self, command: &Command) -> Result<(), Isx3Error<T::Error>> {
        self.send(command)?;
        if command.expects_ack() {
            self.check_ack(command)?;
        }
        Ok(())
    }

    /// Encodes and writes one command. Nothing is written if encoding fails.
    pub(super) fn send(&mut self, command: &Command) -> Result<(), Isx3Error<T::Error>> {
        let frame = command.encode()?;
        self.transport.reset_input_buffer().map_err(Isx3Error::Io)?;
        debug!("-> {}: {:02X?}", command, frame.as_slice());
        self.transport.write(&frame).map_err(Isx3Error::Io)
    }

    /// Reads the system message following `command`.
    ///
    /// A missing or negative acknowledge only logs a warning unless
    /// `strict_acks` is configured.
    fn check_ack(&mut self, command: &Command) -> Result<(), Isx3Error<T::Error>> {
        let timeout = self.config.ack_timeout();
        let reply = self.read_reply(SYSTEM_MESSAGE_LEN, timeout, |bytes| {
            bytes.len() >= SYSTEM_MESSAGE_LEN
        })?;
        match parse_ack(&reply) {
            Ok(()) => {
                debug!("<- acknowledge for {}", command);
                Ok(())
            }
            Err(e) if self.config.strict_acks => Err(e.into()),
            Err(e) => {
                warn!("No valid acknowledge for {}: {}", command, e);
                Ok(())
            }
        }
    }

    /// Collects reply bytes until `complete` holds, `max_len` bytes arrived,
    /// or a read times out with nothing delivered.
    ///
    /// The overall wait is bounded by `timeout` as well, so a device that
    /// keeps trickling bytes cannot hold the session.
    pub(super) fn read_reply(
        &mut self,
        max_len: usize,
        timeout: Duration,
        complete: impl Fn(&[u8]) -> bool,
    ) -> Result<Vec<u8>, Isx3Error<T::Error>> {
        let deadline = Instant::now() + timeout;
        let mut reply = Vec::with_capacity(max_len);
        let mut chunk = [0u8; REPLY_READ_LEN];

        while reply.len() < max_len && !complete(&reply) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let want = (max_len - reply.len()).min(chunk.len());
            let n = self
                .transport
                .read(&mut chunk[..want], remaining)
                .map_err(Isx3Error::Io)?;
            if n == 0 {
                break;
            }
            reply.extend_from_slice(&chunk[..n]);
        }

        debug!("<- {:02X?}", reply);
        Ok(reply)
    }

    /// Sends a query and decodes its data reply.
    pub(super) fn query<R>(
        &mut self,
        command: &Command,
        complete: impl Fn(&[u8]) -> bool,
        decode: impl Fn(&[u8]) -> Result<R, ProtocolError>,
    ) -> Result<R, Isx3Error<T::Error>> {
        self.send(command)?;
        let timeout = self.config.read_timeout();
        let reply = self.read_reply(REPLY_READ_LEN, timeout, complete)?;
        Ok(decode(&reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::transport::mock::{MockCommError, MockTransport};
    use crate::session::SessionConfig;

    fn session(mock: MockTransport) -> Session<MockTransport> {
        Session::new(mock, SessionConfig::default())
    }

    #[test]
    fn test_execute_with_ack() {
        let mut mock = MockTransport::new();
        mock.stage_ack();
        let mut session = session(mock);
        session.execute(&Command::ClearStack).unwrap();

        let mock = session.into_transport();
        assert_eq!(mock.written_flat(), [0xB0, 0x03, 0xFF, 0xFF, 0xFF, 0xB0]);
        assert_eq!(mock.resets, 1);
    }

    #[test]
    fn test_ack_split_over_reads() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&[0x18, 0x01]).stage_read_data(&[0x83, 0x18]);
        let mut session = Session::new(
            mock,
            SessionConfig {
                strict_acks: true,
                ..SessionConfig::default()
            },
        );
        assert!(session.execute(&Command::ResetSetup).is_ok());
    }

    #[test]
    fn test_missing_ack_is_lenient_by_default() {
        let mut session = session(MockTransport::new());
        assert!(session.execute(&Command::ClearStack).is_ok());
    }

    #[test]
    fn test_missing_ack_strict() {
        let mut session = Session::new(
            MockTransport::new(),
            SessionConfig {
                strict_acks: true,
                ..SessionConfig::default()
            },
        );
        assert!(matches!(
            session.execute(&Command::ClearStack),
            Err(Isx3Error::Protocol(ProtocolError::ShortRead { expected: 4, got: 0 }))
        ));
    }

    #[test]
    fn test_nak_strict() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&[0x18, 0x01, 0x81, 0x18]);
        let mut session = Session::new(
            mock,
            SessionConfig {
                strict_acks: true,
                ..SessionConfig::default()
            },
        );
        assert!(matches!(
            session.execute(&Command::StopMeasurement),
            Err(Isx3Error::Protocol(ProtocolError::Rejected(_)))
        ));
    }

    #[test]
    fn test_invalid_command_writes_nothing() {
        let mut session = session(MockTransport::new());
        assert!(matches!(
            session.execute(&Command::StartMeasurement { cycles: 0 }),
            Err(Isx3Error::InvalidParameter(_))
        ));
        let mock = session.into_transport();
        assert!(mock.written.is_empty());
        assert_eq!(mock.resets, 0);
    }

    #[test]
    fn test_write_failure_is_io() {
        let mut mock = MockTransport::new();
        mock.fail_writes = true;
        let mut session = session(mock);
        assert!(matches!(
            session.execute(&Command::ClearStack),
            Err(Isx3Error::Io(MockCommError))
        ));
    }

    #[test]
    fn test_read_reply_stops_when_complete() {
        let mut mock = MockTransport::new();
        mock.stage_read_data(&[0xAA, 0xBB]).stage_read_data(&[0xCC]);
        let mut session = session(mock);
        let reply = session
            .read_reply(32, Duration::from_millis(50), |b| b.len() >= 2)
            .unwrap();
        assert_eq!(reply, [0xAA, 0xBB]);
    }
}
