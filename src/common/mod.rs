// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod error;
pub mod frame;
pub mod message;
pub mod sample;
pub mod settings;
pub mod sweep;
pub mod timing;
pub mod transport;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{build_clear_stack, build_set_frontend, Command};

// From error.rs
pub use error::{InvalidParameter, Isx3Error, ProtocolError};

// From frame.rs
pub use frame::{ControlToken, FrameBuffer};

// From message.rs
pub use message::{parse_ack, SystemMessage};

// From sample.rs
pub use sample::{decode_measurement_frame, MeasurementFrameType, MeasurementSample};

// From settings.rs
pub use settings::{decode_settings_frame, ChannelSetting, FrontendMode, FrontendSettings};

// From sweep.rs
pub use sweep::{Scale, SweepParameters};

// From transport.rs
pub use transport::Transport;
