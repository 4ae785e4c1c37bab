// src/common/sample.rs

//! Measurement data frames and the samples decoded from them.
//!
//! Data frames arrive on the measurement token (`0xB8`). The byte after the
//! opening token doubles as the frame type and fixes the total frame length.

use super::error::ProtocolError;
use super::frame::ControlToken;

/// Longest measurement frame on the wire.
pub const MAX_MEASUREMENT_FRAME_LEN: usize = 19;

/// The four measurement frame shapes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum MeasurementFrameType {
    /// Frequency id, real, imaginary.
    Basic = 0x0A,
    /// Adds the current range used for the point.
    WithRange = 0x0B,
    /// Adds a device timestamp.
    WithTimestamp = 0x0E,
    /// Adds timestamp and current range; carries one trailing reserved byte.
    WithTimestampAndRange = 0x0F,
}

impl MeasurementFrameType {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0A => Some(MeasurementFrameType::Basic),
            0x0B => Some(MeasurementFrameType::WithRange),
            0x0E => Some(MeasurementFrameType::WithTimestamp),
            0x0F => Some(MeasurementFrameType::WithTimestampAndRange),
            _ => None,
        }
    }

    /// Total frame length, both control tokens included.
    pub const fn frame_len(self) -> usize {
        match self {
            MeasurementFrameType::Basic => 13,
            MeasurementFrameType::WithRange => 14,
            MeasurementFrameType::WithTimestamp => 17,
            MeasurementFrameType::WithTimestampAndRange => 19,
        }
    }

    #[inline]
    const fn has_timestamp(self) -> bool {
        matches!(
            self,
            MeasurementFrameType::WithTimestamp | MeasurementFrameType::WithTimestampAndRange
        )
    }

    #[inline]
    const fn has_current_range(self) -> bool {
        matches!(
            self,
            MeasurementFrameType::WithRange | MeasurementFrameType::WithTimestampAndRange
        )
    }
}

/// One decoded frequency-domain measurement point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeasurementSample {
    pub frequency_id: u16,
    pub real: f32,
    pub imag: f32,
    pub timestamp: Option<u32>,
    pub current_range: Option<u8>,
}

/// Big-endian cursor over a frame body.
struct BodyCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BodyCursor<'a> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_be_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_be_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_be_bytes(self.take())
    }
}

/// Decodes one complete measurement frame, tokens included.
///
/// `bytes` must be exactly one frame: a short buffer is a `TruncatedFrame`,
/// an unknown type byte is `UnknownFrameType`, and a wrong opening or closing
/// byte is `UnexpectedByte`.
pub fn decode_measurement_frame(bytes: &[u8]) -> Result<MeasurementSample, ProtocolError> {
    let token = ControlToken::Measurement.as_u8();
    match bytes.first() {
        None => {
            return Err(ProtocolError::TruncatedFrame { expected: 2, got: 0 });
        }
        Some(&first) if first != token => {
            return Err(ProtocolError::UnexpectedByte {
                expected: token,
                found: first,
            });
        }
        Some(_) => {}
    }
    let type_byte = *bytes
        .get(1)
        .ok_or(ProtocolError::TruncatedFrame { expected: 2, got: bytes.len() })?;
    let frame_type =
        MeasurementFrameType::from_u8(type_byte).ok_or(ProtocolError::UnknownFrameType(type_byte))?;

    let expected = frame_type.frame_len();
    if bytes.len() < expected {
        return Err(ProtocolError::TruncatedFrame {
            expected,
            got: bytes.len(),
        });
    }
    let closing = bytes[expected - 1];
    if closing != token {
        return Err(ProtocolError::UnexpectedByte {
            expected: token,
            found: closing,
        });
    }

    let mut cur = BodyCursor { bytes, pos: 2 };
    let frequency_id = cur.u16();
    let timestamp = frame_type.has_timestamp().then(|| cur.u32());
    let current_range = frame_type.has_current_range().then(|| cur.u8());
    let real = cur.f32();
    let imag = cur.f32();

    Ok(MeasurementSample {
        frequency_id,
        real,
        imag,
        timestamp,
        current_range,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a measurement frame of the given type from field values.
    pub(crate) fn frame_bytes(
        frame_type: MeasurementFrameType,
        frequency_id: u16,
        timestamp: u32,
        current_range: u8,
        real: f32,
        imag: f32,
    ) -> heapless::Vec<u8, MAX_MEASUREMENT_FRAME_LEN> {
        let mut v = heapless::Vec::new();
        v.push(0xB8).unwrap();
        v.push(frame_type as u8).unwrap();
        v.extend_from_slice(&frequency_id.to_be_bytes()).unwrap();
        if frame_type.has_timestamp() {
            v.extend_from_slice(&timestamp.to_be_bytes()).unwrap();
        }
        if frame_type.has_current_range() {
            v.push(current_range).unwrap();
        }
        v.extend_from_slice(&real.to_be_bytes()).unwrap();
        v.extend_from_slice(&imag.to_be_bytes()).unwrap();
        while v.len() < frame_type.frame_len() - 1 {
            v.push(0x00).unwrap();
        }
        v.push(0xB8).unwrap();
        v
    }

    const ALL_TYPES: [MeasurementFrameType; 4] = [
        MeasurementFrameType::Basic,
        MeasurementFrameType::WithRange,
        MeasurementFrameType::WithTimestamp,
        MeasurementFrameType::WithTimestampAndRange,
    ];

    #[test]
    fn test_decode_each_type() {
        for frame_type in ALL_TYPES {
            let bytes = frame_bytes(frame_type, 0x0102, 0xDEAD_BEEF, 3, 12.5, -7.75);
            assert_eq!(bytes.len(), frame_type.frame_len());

            let sample = decode_measurement_frame(&bytes).unwrap();
            assert_eq!(sample.frequency_id, 0x0102);
            assert_eq!(sample.real, 12.5);
            assert_eq!(sample.imag, -7.75);
            assert_eq!(
                sample.timestamp,
                frame_type.has_timestamp().then_some(0xDEAD_BEEF)
            );
            assert_eq!(
                sample.current_range,
                frame_type.has_current_range().then_some(3)
            );
        }
    }

    #[test]
    fn test_decode_one_byte_short() {
        for frame_type in ALL_TYPES {
            let bytes = frame_bytes(frame_type, 1, 0, 0, 1.0, 1.0);
            let short = &bytes[..bytes.len() - 1];
            assert_eq!(
                decode_measurement_frame(short),
                Err(ProtocolError::TruncatedFrame {
                    expected: frame_type.frame_len(),
                    got: frame_type.frame_len() - 1,
                })
            );
        }
    }

    #[test]
    fn test_decode_timestamp_and_range_literal() {
        let bytes = [
            0xB8, 0x0F, //
            0x00, 0x07, // frequency id 7
            0x00, 0x01, 0xE2, 0x40, // timestamp 123456
            0x02, // current range
            0x3F, 0xC0, 0x00, 0x00, // 1.5
            0xBE, 0x80, 0x00, 0x00, // -0.25
            0x00, // reserved
            0xB8,
        ];
        assert_eq!(
            decode_measurement_frame(&bytes),
            Ok(MeasurementSample {
                frequency_id: 7,
                timestamp: Some(123456),
                current_range: Some(2),
                real: 1.5,
                imag: -0.25,
            })
        );
    }

    #[test]
    fn test_decode_bad_tokens() {
        let mut bytes = frame_bytes(MeasurementFrameType::Basic, 1, 0, 0, 1.0, 2.0);
        let last = bytes.len() - 1;
        bytes[last] = 0x00;
        assert_eq!(
            decode_measurement_frame(&bytes),
            Err(ProtocolError::UnexpectedByte { expected: 0xB8, found: 0x00 })
        );
        bytes[0] = 0x18;
        assert_eq!(
            decode_measurement_frame(&bytes),
            Err(ProtocolError::UnexpectedByte { expected: 0xB8, found: 0x18 })
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(
            decode_measurement_frame(&[0xB8, 0x0C, 0x00]),
            Err(ProtocolError::UnknownFrameType(0x0C))
        );
    }
}
