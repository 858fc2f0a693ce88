use std::path::Path;

use futures_util::StreamExt;
use reqwest::Response;
use sha1::{Digest, Sha1};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Error;
use crate::util::progress_bar::progress_callback;

pub fn ensure_success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::Status {
            url: response.url().to_string(),
            status,
        })
    }
}

/// Streams `url` into `path` chunk by chunk, overwriting any existing file, and returns the
/// hex-encoded SHA-1 of what was written. A partially written file is removed on failure.
pub async fn download_to_file(http_client: &reqwest::Client, url: &str, path: &Path) -> Result<String, Error> {
    let response = ensure_success(http_client.get(url).send().await?)?;
    let length = response.content_length();
    debug!(url, ?length, path = %path.display(), "streaming download");

    let fname = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cb = length.map(|length| progress_callback(fname, length));

    match stream_to_file(response, path, &cb).await {
        Ok(sha1sum) => Ok(sha1sum),
        Err(err) => {
            let _ = fs::remove_file(path).await;
            Err(err)
        }
    }
}

async fn stream_to_file(response: Response, path: &Path, cb: &Option<Box<dyn Fn(u64)>>) -> Result<String, Error> {
    let mut file = File::create(path).await?;
    let mut hasher = Sha1::new();
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        if let Some(cb) = cb {
            cb(downloaded);
        }
    }
    file.flush().await?;
    Ok(hex::encode(hasher.finalize()))
}
