// src/common/sweep.rs

use super::error::InvalidParameter;
use super::frame::{ControlToken, FrameBuffer, FrameWriter};
use core::convert::TryFrom;

/// Operation byte of the sweep setup frame: add frequency list.
pub const OP_ADD_FREQUENCY_LIST: u8 = 0x03;

/// Frequency point spacing of a sweep.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Scale {
    Linear = 0x00,
    #[default]
    Log = 0x01,
}

impl Scale {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Scale {
    type Error = InvalidParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Scale::Linear),
            0x01 => Ok(Scale::Log),
            other => Err(InvalidParameter::UnknownScale(other)),
        }
    }
}

/// Frequency sweep of one measurement run.
///
/// The instrument takes the point count as a float, hence `point_count: f32`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepParameters {
    pub start_frequency_hz: f32,
    pub stop_frequency_hz: f32,
    pub point_count: f32,
    pub scale: Scale,
    pub precision: f32,
    pub amplitude: f32,
}

impl SweepParameters {
    /// Rejects values the instrument cannot make sense of.
    ///
    /// `stop > start` is left to the caller; the device does not enforce it either.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        let fields = [
            ("start_frequency_hz", self.start_frequency_hz),
            ("stop_frequency_hz", self.stop_frequency_hz),
            ("point_count", self.point_count),
            ("precision", self.precision),
            ("amplitude", self.amplitude),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(InvalidParameter::NonFinite(name));
            }
        }
        if self.point_count < 1.0 || (self.point_count as u32) as f32 != self.point_count {
            return Err(InvalidParameter::PointCount(self.point_count));
        }
        Ok(())
    }

    /// Number of frames the device emits per sweep cycle.
    ///
    /// Exact for any sweep that passed [`SweepParameters::validate`].
    pub fn points_per_cycle(&self) -> u32 {
        self.point_count as u32
    }

    /// Serializes the sweep into a `B6` setup frame.
    ///
    /// Wire order is start, stop, count, scale, precision, amplitude, all
    /// floats big-endian IEEE-754 single precision.
    pub fn encode(&self) -> Result<FrameBuffer, InvalidParameter> {
        self.validate()?;

        let mut w = FrameWriter::new(ControlToken::SweepSetup);
        w.push(OP_ADD_FREQUENCY_LIST);
        w.push_f32(self.start_frequency_hz);
        w.push_f32(self.stop_frequency_hz);
        w.push_f32(self.point_count);
        w.push(self.scale.code());
        w.push_f32(self.precision);
        w.push_f32(self.amplitude);
        Ok(w.finish())
    }
}
