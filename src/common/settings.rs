// src/common/settings.rs

//! Frontend (wiring mode, ranges, channel) settings and their frame layout.
//!
//! Set and get frames share one body layout:
//! `mode current voltage [channel ext_hi ext_lo] x arity`.

use super::error::{InvalidParameter, ProtocolError};
use super::frame::{find_frame, ControlToken, FrameWriter};
use core::convert::TryFrom;

/// Upper bound on channel slots (four-point wiring).
pub const MAX_CHANNELS: usize = 4;

/// Bytes before the channel slots: mode, current range, voltage range.
const HEADER_LEN: usize = 3;
/// Bytes per channel slot: channel code and a big-endian u16 extension.
const SLOT_LEN: usize = 3;

/// Electrode wiring of the measurement frontend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum FrontendMode {
    TwoPoint = 0x01,
    ThreePoint = 0x02,
    FourPoint = 0x03,
}

impl FrontendMode {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Number of channel slots the mode carries.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            FrontendMode::TwoPoint => 2,
            FrontendMode::ThreePoint => 3,
            FrontendMode::FourPoint => 4,
        }
    }

    /// Body length (everything between the length byte and the closing token).
    #[inline]
    pub const fn body_len(self) -> usize {
        HEADER_LEN + SLOT_LEN * self.arity()
    }
}

impl TryFrom<u8> for FrontendMode {
    type Error = InvalidParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(FrontendMode::TwoPoint),
            0x02 => Ok(FrontendMode::ThreePoint),
            0x03 => Ok(FrontendMode::FourPoint),
            other => Err(InvalidParameter::UnknownMode(other)),
        }
    }
}

/// One channel slot of a frontend configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ChannelSetting {
    pub channel_code: u8,
    pub extension: u16,
}

impl ChannelSetting {
    pub const fn new(channel_code: u8, extension: u16) -> Self {
        ChannelSetting { channel_code, extension }
    }
}

pub type ChannelList = heapless::Vec<ChannelSetting, MAX_CHANNELS>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FrontendSettings {
    pub mode: FrontendMode,
    pub current_range: u8,
    pub voltage_range: u8,
    pub channels: ChannelList,
}

impl FrontendSettings {
    /// Builds settings, checking that the channel count matches the mode.
    pub fn new(
        mode: FrontendMode,
        current_range: u8,
        voltage_range: u8,
        channels: &[ChannelSetting],
    ) -> Result<Self, InvalidParameter> {
        let mismatch = InvalidParameter::ChannelCount {
            mode,
            expected: mode.arity(),
            got: channels.len(),
        };
        if channels.len() != mode.arity() {
            return Err(mismatch);
        }
        let channels = ChannelList::from_slice(channels).map_err(|_| mismatch)?;
        Ok(FrontendSettings {
            mode,
            current_range,
            voltage_range,
            channels,
        })
    }

    /// Fields are public, so commands re-check the arity before encoding.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        if self.channels.len() == self.mode.arity() {
            Ok(())
        } else {
            Err(InvalidParameter::ChannelCount {
                mode: self.mode,
                expected: self.mode.arity(),
                got: self.channels.len(),
            })
        }
    }

    pub(crate) fn write_body(&self, w: &mut FrameWriter) {
        w.push(self.mode.code());
        w.push(self.current_range);
        w.push(self.voltage_range);
        for slot in &self.channels {
            w.push(slot.channel_code);
            w.push_u16(slot.extension);
        }
    }

    fn from_body(body: &[u8]) -> Result<Self, ProtocolError> {
        if body.len() < HEADER_LEN {
            return Err(ProtocolError::TruncatedFrame {
                expected: HEADER_LEN,
                got: body.len(),
            });
        }
        let mode = FrontendMode::try_from(body[0])
            .map_err(|_| ProtocolError::UnknownFrameType(body[0]))?;
        if body.len() != mode.body_len() {
            return Err(ProtocolError::UnknownFrameType(body[0]));
        }

        let mut channels = ChannelList::new();
        for slot in body[HEADER_LEN..].chunks_exact(SLOT_LEN) {
            // Capacity is MAX_CHANNELS and the length check bounds the slot count.
            let _ = channels.push(ChannelSetting {
                channel_code: slot[0],
                extension: u16::from_be_bytes([slot[1], slot[2]]),
            });
        }

        Ok(FrontendSettings {
            mode,
            current_range: body[1],
            voltage_range: body[2],
            channels,
        })
    }
}

#[inline]
fn is_frontend_token(b: u8) -> bool {
    b == ControlToken::SetFrontend.as_u8() || b == ControlToken::GetFrontend.as_u8()
}

/// Decodes the first frontend settings block found in `bytes`.
///
/// Leading noise (acknowledges, stale bytes) is skipped. Both the set (`B0`)
/// and get (`B1`) families are accepted as long as the closing token matches.
pub fn decode_settings_frame(bytes: &[u8]) -> Result<FrontendSettings, ProtocolError> {
    let frame = find_frame(bytes, is_frontend_token).ok_or(ProtocolError::MissingFrame)?;
    FrontendSettings::from_body(&frame[2..frame.len() - 1])
}

/// Decodes the channel-count reply `B1 01 <count> B1`.
pub fn decode_channel_count(bytes: &[u8]) -> Result<u8, ProtocolError> {
    let token = ControlToken::GetFrontend.as_u8();
    let frame = find_frame(bytes, |b| b == token).ok_or(ProtocolError::MissingFrame)?;
    match frame {
        [_, 0x01, count, _] => Ok(*count),
        _ => Err(ProtocolError::UnexpectedByte {
            expected: 0x01,
            found: frame[1],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::build_set_frontend;

    fn four_point() -> FrontendSettings {
        FrontendSettings::new(
            FrontendMode::FourPoint,
            0x01,
            0x00,
            &[
                ChannelSetting::new(0x01, 0x0000),
                ChannelSetting::new(0x02, 0x0102),
                ChannelSetting::new(0x03, 0xBEEF),
                ChannelSetting::new(0x04, 0xFFFF),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_checks_arity() {
        let err = FrontendSettings::new(
            FrontendMode::ThreePoint,
            0,
            0,
            &[ChannelSetting::new(1, 0), ChannelSetting::new(2, 0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidParameter::ChannelCount {
                mode: FrontendMode::ThreePoint,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn test_four_point_round_trip() {
        let settings = four_point();
        let encoded = build_set_frontend(&settings).unwrap();
        assert_eq!(decode_settings_frame(&encoded).unwrap(), settings);
    }

    #[test]
    fn test_decode_get_family_with_leading_ack() {
        let bytes = [
            0x18, 0x01, 0x83, 0x18, // acknowledge
            0xB1, 0x09, 0x01, 0x02, 0x03, 0x05, 0x00, 0x10, 0x06, 0x00, 0x20, 0xB1,
        ];
        let settings = decode_settings_frame(&bytes).unwrap();
        assert_eq!(settings.mode, FrontendMode::TwoPoint);
        assert_eq!(settings.current_range, 0x02);
        assert_eq!(settings.voltage_range, 0x03);
        assert_eq!(
            settings.channels.as_slice(),
            &[ChannelSetting::new(0x05, 0x0010), ChannelSetting::new(0x06, 0x0020)]
        );
    }

    #[test]
    fn test_decode_three_point() {
        let bytes = [
            0xB1, 0x0C, 0x02, 0x00, 0x01, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x03, 0x00, 0x00,
            0xB1,
        ];
        let settings = decode_settings_frame(&bytes).unwrap();
        assert_eq!(settings.mode, FrontendMode::ThreePoint);
        assert_eq!(settings.channels.len(), 3);
    }

    #[test]
    fn test_decode_unknown_mode() {
        let bytes = [0xB1, 0x09, 0x07, 0x02, 0x03, 0x05, 0x00, 0x10, 0x06, 0x00, 0x20, 0xB1];
        assert_eq!(
            decode_settings_frame(&bytes),
            Err(ProtocolError::UnknownFrameType(0x07))
        );
    }

    #[test]
    fn test_decode_length_mismatch() {
        // Claims two-point but carries three slots.
        let bytes = [
            0xB1, 0x0C, 0x01, 0x00, 0x01, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00, 0x03, 0x00, 0x00,
            0xB1,
        ];
        assert_eq!(
            decode_settings_frame(&bytes),
            Err(ProtocolError::UnknownFrameType(0x01))
        );
    }

    #[test]
    fn test_decode_missing_frame() {
        assert_eq!(
            decode_settings_frame(&[0x18, 0x01, 0x83, 0x18]),
            Err(ProtocolError::MissingFrame)
        );
        assert_eq!(decode_settings_frame(&[]), Err(ProtocolError::MissingFrame));
    }

    #[test]
    fn test_channel_count() {
        assert_eq!(decode_channel_count(&[0xB1, 0x01, 0x04, 0xB1]), Ok(4));
        assert_eq!(
            decode_channel_count(&[0xB1, 0x02, 0x04, 0x00, 0xB1]),
            Err(ProtocolError::UnexpectedByte { expected: 0x01, found: 0x02 })
        );
        assert_eq!(decode_channel_count(&[0x00]), Err(ProtocolError::MissingFrame));
    }
}
