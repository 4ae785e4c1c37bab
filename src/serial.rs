// src/serial.rs

//! Serial transport for the ISX-3 USB virtual COM port.

use log::{info, warn};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

use crate::common::{timing, transport::Transport};
use crate::session::{Session, SessionConfig};

/// Opening the connection failed. Fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Serial port {0} is not available")]
    PortUnavailable(String),

    #[error("Serial port error: {0}")]
    Open(#[from] serialport::Error),
}

/// Checks whether `name` is among the serial ports the OS reports.
pub fn is_port_available(name: &str) -> bool {
    match serialport::available_ports() {
        Ok(ports) => ports.iter().any(|p| p.port_name == name),
        Err(e) => {
            warn!("Could not enumerate serial ports: {}", e);
            false
        }
    }
}

/// Serial transport for UART communication
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM0" or "COM3")
    /// * `baud_rate` - Baud rate (the ISX-3 uses 9600)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, ConnectError> {
        if !is_port_available(path) {
            return Err(ConnectError::PortUnavailable(path.to_string()));
        }

        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timing::DEFAULT_READ_TIMEOUT)
            .open()?;

        info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport {
            port,
            timeout: timing::DEFAULT_READ_TIMEOUT,
        })
    }

    /// Name of the underlying port, if the OS reports one.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Transport for SerialTransport {
    type Error = io::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        if timeout != self.timeout {
            self.port.set_timeout(timeout)?;
            self.timeout = timeout;
        }
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn reset_input_buffer(&mut self) -> Result<(), Self::Error> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl Session<SerialTransport> {
    /// Opens `path` with the configured baud rate and wraps it in a session.
    pub fn connect(path: &str, config: SessionConfig) -> Result<Self, ConnectError> {
        let transport = SerialTransport::open(path, config.baud_rate)?;
        Ok(Session::new(transport, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_port_is_unavailable() {
        let err = SerialTransport::open("/dev/isx3-does-not-exist", 9600).unwrap_err();
        assert!(matches!(err, ConnectError::PortUnavailable(ref p) if p == "/dev/isx3-does-not-exist"));
    }
}
