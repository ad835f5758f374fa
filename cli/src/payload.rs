use clap::Args;
use eyre::Result;
use waveup::{ResultData, Shrinker, Thumbnail};

use crate::io::{read_channels, write_output};

#[derive(Args, Debug)]
pub struct PayloadOpts {
    /// Channel data file (JSON array of {time_step, y_values})
    #[clap(long, default_value = "channel_data.json")]
    pub channel_data: String,

    /// Where to write the result document
    #[clap(long, default_value = "sample_result.json")]
    pub output: String,

    /// Attach a precomputed thumbnail instead of letting the server build one
    #[clap(long, default_value_t = false)]
    pub thumbnail: bool,
}

#[derive(Args, Debug)]
pub struct Opts {
    #[command(flatten)]
    pub payload: PayloadOpts,
}

pub async fn payload(opts: &Opts) -> Result<()> {
    write_payload(&opts.payload).await?;
    Ok(())
}

/// Builds the sample result document, writes it to the output file and
/// returns the bytes written.
pub async fn write_payload(opts: &PayloadOpts) -> Result<Vec<u8>> {
    let channels = read_channels(&opts.channel_data).await?;

    let thumbnail = if opts.thumbnail {
        Some(Thumbnail::from_channels(&Shrinker::default(), &channels)?)
    } else {
        None
    };
    let data = ResultData::sample(&channels, thumbnail.as_ref())?.to_vec()?;

    write_output(&opts.output, &data).await?;
    log::info!("wrote {} bytes to {}", data.len(), opts.output);

    Ok(data)
}
