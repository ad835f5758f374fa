use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::shrink::{ShrinkError, Shrinker, Shrunk};

/// Waveform data for a single scope channel, as stored in `channel_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub time_step: f64,
    pub y_values: Vec<f64>,
}

/// Reads a JSON array of channels.
pub fn read_channels<R: Read>(reader: R) -> Result<Vec<Channel>, Error> {
    let channels: Vec<Channel> = serde_json::from_reader(reader)?;
    log::debug!("read {} channels", channels.len());
    Ok(channels)
}

/// Shrinks every channel with the default settings. Each channel is handled
/// on its own, so one bad channel doesn't prevent the others from shrinking.
pub fn generate_thumbnail(channels: &[Channel]) -> Vec<Result<Shrunk, ShrinkError>> {
    let shrinker = Shrinker::default();
    channels
        .iter()
        .map(|ch| shrinker.shrink(&ch.y_values, ch.time_step))
        .collect()
}

/// Lightweight preview of a capture, one shrunk waveform per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub channels: Vec<Shrunk>,
}

impl Thumbnail {
    /// Fails on the first channel that can't be shrunk.
    pub fn from_channels(shrinker: &Shrinker, channels: &[Channel]) -> Result<Self, Error> {
        let channels = channels
            .iter()
            .enumerate()
            .map(|(index, ch)| {
                shrinker
                    .shrink(&ch.y_values, ch.time_step)
                    .map_err(|source| Error::Channel { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Thumbnail { channels })
    }
}
