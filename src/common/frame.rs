// src/common/frame.rs

//! Control-token framing shared by every command family.
//!
//! A frame is `CT LE <body> CT`: the same control token opens and closes it and
//! `LE` counts the body bytes. Get-frontend requests are the one family whose
//! length field claims one byte more than the body carries.

use arrayvec::ArrayVec;

/// Largest command frame the crate ever builds (sweep setup is 25 bytes).
pub const MAX_FRAME_LEN: usize = 32;

/// Fixed-capacity buffer holding one encoded command frame.
pub type FrameBuffer = ArrayVec<u8, MAX_FRAME_LEN>;

/// Control tokens of the ISX-3 command families.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ControlToken {
    /// Set frontend settings / clear command stack.
    SetFrontend = 0xB0,
    /// Get frontend settings.
    GetFrontend = 0xB1,
    /// Frequency sweep setup.
    SweepSetup = 0xB6,
    /// Measurement start/stop and measurement data frames.
    Measurement = 0xB8,
    /// Setup reset.
    SetupReset = 0x86,
    /// System messages (acknowledge, not-acknowledge, status).
    SystemMessage = 0x18,
}

impl ControlToken {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0xB0 => Some(ControlToken::SetFrontend),
            0xB1 => Some(ControlToken::GetFrontend),
            0xB6 => Some(ControlToken::SweepSetup),
            0xB8 => Some(ControlToken::Measurement),
            0x86 => Some(ControlToken::SetupReset),
            0x18 => Some(ControlToken::SystemMessage),
            _ => None,
        }
    }

    /// Extra count the length field carries on outgoing frames of this family.
    #[inline]
    pub const fn length_bias(self) -> u8 {
        match self {
            ControlToken::GetFrontend => 1,
            _ => 0,
        }
    }
}

/// Incremental builder for one outgoing frame.
///
/// The length byte is filled in by [`FrameWriter::finish`], so the declared
/// length always matches the bytes written.
#[derive(Debug)]
pub struct FrameWriter {
    token: ControlToken,
    buf: FrameBuffer,
}

impl FrameWriter {
    pub fn new(token: ControlToken) -> Self {
        let mut buf = FrameBuffer::new();
        buf.push(token.as_u8());
        buf.push(0); // length, patched in finish()
        FrameWriter { token, buf }
    }

    /// Appends one body byte.
    ///
    /// # Panics
    ///
    /// Panics if the frame would exceed [`MAX_FRAME_LEN`]; no ISX-3 command does.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    pub fn push_f32(&mut self, value: f32) {
        self.extend(&value.to_be_bytes());
    }

    pub fn push_u16(&mut self, value: u16) {
        self.extend(&value.to_be_bytes());
    }

    /// Patches the length field and appends the closing token.
    pub fn finish(mut self) -> FrameBuffer {
        let body_len = (self.buf.len() - 2) as u8;
        self.buf[1] = body_len + self.token.length_bias();
        self.buf.push(self.token.as_u8());
        self.buf
    }
}

/// Finds the first `CT LE <LE bytes> CT` block whose token satisfies `accept`.
///
/// Returns the whole frame, both tokens included. Candidates whose closing
/// token does not match are skipped and the scan resumes one byte later.
pub fn find_frame(bytes: &[u8], accept: impl Fn(u8) -> bool) -> Option<&[u8]> {
    let mut i = 0;
    while i + 2 < bytes.len() {
        let token = bytes[i];
        if accept(token) {
            let end = i + 2 + bytes[i + 1] as usize;
            if end < bytes.len() && bytes[end] == token {
                return Some(&bytes[i..=end]);
            }
        }
        i += 1;
    }
    None
}
