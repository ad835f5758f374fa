mod io;
mod payload;
mod thumbnail;
mod upload;

use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(
    name = "waveup",
    about = "Upload oscilloscope captures and waveform thumbnails to a results platform"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shrink channel waveforms into a thumbnail
    Thumbnail(thumbnail::Opts),
    /// Write the result document without uploading it
    Payload(payload::Opts),
    /// Write the result document and upload it
    Upload(upload::Opts),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Thumbnail(opts) => thumbnail::thumbnail(&opts).await,
        Command::Payload(opts) => payload::payload(&opts).await,
        Command::Upload(opts) => upload::upload(&opts).await,
    }
}
