// src/common/timing.rs

use core::time::Duration;

// === Serial line (USB virtual COM port, 8N1, no flow control) ===

/// Baud rate of the ISX-3 full-speed USB link.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// === Request/response ===

/// How long a single read may wait for its first byte.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// How long to wait for the system message after a command.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Bytes requested per read when collecting a query reply.
pub const REPLY_READ_LEN: usize = 32;

// === Acquisition ===

/// Consecutive dropped frames tolerated under the retry policy before a run ends.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 32;
