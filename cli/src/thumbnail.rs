use clap::Args;
use eyre::Result;
use waveup::{Mode, Shrinker, Thumbnail, DEFAULT_LIMIT};

use crate::io::{read_channels, write_output};

#[derive(Args, Debug)]
pub struct Opts {
    /// Channel data file (JSON array of {time_step, y_values})
    #[clap(long, default_value = "stdin")]
    pub channel_data: String,

    /// Output file
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Decimation mode (normal)
    #[clap(long, default_value = "normal")]
    pub mode: Mode,

    /// Maximum number of points per channel
    #[clap(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

pub async fn thumbnail(opts: &Opts) -> Result<()> {
    let shrinker = Shrinker::new(opts.mode, opts.limit)?;
    log::debug!(
        "thumbnail mode {} limit {}",
        shrinker.mode(),
        shrinker.limit()
    );
    let channels = read_channels(&opts.channel_data).await?;
    let thumbnail = Thumbnail::from_channels(&shrinker, &channels)?;

    let mut buf = serde_json::to_vec(&thumbnail)?;
    buf.push(b'\n');
    write_output(&opts.output, &buf).await
}
