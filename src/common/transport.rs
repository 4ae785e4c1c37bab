// src/common/transport.rs

use core::fmt::Debug;
use core::time::Duration;

/// Abstraction for the half-duplex byte link to the instrument.
///
/// Implementations own the physical connection; opening it is their business.
pub trait Transport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Writes all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads up to `buf.len()` bytes, returning how many arrived.
    ///
    /// Returns `Ok(0)` when nothing arrived within `timeout`. Must never block
    /// longer than `timeout`.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;

    /// Discards any bytes received but not yet read.
    fn reset_input_buffer(&mut self) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error> {
        (**self).read(buf, timeout)
    }

    fn reset_input_buffer(&mut self) -> Result<(), Self::Error> {
        (**self).reset_input_buffer()
    }
}
