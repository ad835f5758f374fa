use eyre::{Result, WrapErr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use waveup::Channel;

/// Parses a channel data document from `name`, or from standard input when
/// `name` is `stdin`.
pub async fn read_channels(name: &str) -> Result<Vec<Channel>> {
    let buf = match name {
        "stdin" => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
        _ => tokio::fs::read(name)
            .await
            .wrap_err_with(|| format!("reading {}", name))?,
    };
    waveup::read_channels(buf.as_slice()).wrap_err_with(|| format!("parsing {}", name))
}

/// Writes `data` to `name`, or to standard output when `name` is `stdout`.
pub async fn write_output(name: &str, data: &[u8]) -> Result<()> {
    match name {
        "stdout" => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(data).await?;
            stdout.flush().await?;
        }
        _ => tokio::fs::write(name, data)
            .await
            .wrap_err_with(|| format!("writing {}", name))?,
    }
    Ok(())
}
