// src/session/frontend.rs

use log::{info, warn};

use super::Session;
use crate::common::{
    command::Command,
    error::{Isx3Error, ProtocolError},
    frame::{find_frame, ControlToken},
    settings::{decode_channel_count, decode_settings_frame, FrontendSettings},
    transport::Transport,
};

/// Outcome of querying one frontend channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    /// 1-based channel index.
    pub channel: u8,
    pub result: Result<FrontendSettings, ProtocolError>,
}

fn has_get_frame(bytes: &[u8]) -> bool {
    let token = ControlToken::GetFrontend.as_u8();
    find_frame(bytes, |b| b == token).is_some()
}

impl<T: Transport> Session<T> {
    /// Reads the configuration of every frontend channel.
    ///
    /// Asks for the channel count first, then queries channels `1..=count`
    /// one by one. A channel whose reply holds no valid block is reported in
    /// its [`ChannelReport`] and the remaining channels are still queried.
    pub fn read_frontend_settings(&mut self) -> Result<Vec<ChannelReport>, Isx3Error<T::Error>> {
        let count = self.query(&Command::GetChannelCount, has_get_frame, decode_channel_count)?;
        info!("Instrument reports {} frontend channel(s)", count);

        let mut reports = Vec::with_capacity(count as usize);
        for channel in 1..=count {
            let result = match self.query(&Command::GetChannel(channel), has_get_frame, decode_settings_frame) {
                Ok(settings) => Ok(settings),
                Err(Isx3Error::Protocol(e)) => {
                    warn!("Channel {}: no valid settings block: {}", channel, e);
                    Err(e)
                }
                Err(other) => return Err(other),
            };
            reports.push(ChannelReport { channel, result });
        }
        Ok(reports)
    }
}
