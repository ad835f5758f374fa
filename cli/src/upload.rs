use clap::Args;
use duration_string::DurationString;
use eyre::Result;
use hyper::Uri;
use std::path::Path;
use waveup::{UploadConfig, Uploader, DEFAULT_BASE_URL};

use crate::payload::{write_payload, PayloadOpts};

#[derive(Args, Debug)]
pub struct Opts {
    #[command(flatten)]
    pub payload: PayloadOpts,

    /// Base URL of the results platform
    #[clap(long, env = "WAVEUP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Uri,

    /// API token sent in the Auth-Token header
    #[clap(long, env = "WAVEUP_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: String,

    /// Upload timeout [0 = none]
    #[clap(long, default_value = "30s")]
    pub timeout: DurationString,
}

pub async fn upload(opts: &Opts) -> Result<()> {
    let data = write_payload(&opts.payload).await?;

    let filename = Path::new(&opts.payload.output)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(&opts.payload.output);

    let uploader = Uploader::new(UploadConfig {
        base_url: opts.base_url.clone(),
        auth_token: opts.auth_token.clone(),
        timeout: opts.timeout.clone().into(),
    });
    let res = uploader.upload(filename, data).await?;

    println!(
        "The link to the results for the command_id {} is {}",
        res.command_id(),
        res.results_link()
    );
    Ok(())
}
