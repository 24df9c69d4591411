//! Image materialization: fetch, normalize to JPEG, write atomically
//!
//! The site serves mixed encodings (WebP, PNG, paletted GIF frames). Every
//! image is decoded, forced to RGB, and re-encoded as baseline JPEG so the
//! archive holds exactly one format. Decode and re-encode are CPU-bound and
//! run on the blocking pool — inline they would stall the async scheduler.

use crate::fetch::{with_retry, Attempt, Outcome, RetryPolicy};
use image::{DynamicImage, ImageOutputFormat};
use reqwest::{Client, StatusCode};
use std::io::Cursor;
use std::path::{Path, PathBuf};

const JPEG_QUALITY: u8 = 90;

/// Terminal classification of one materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The normalized file is on disk at the target path
    Success,

    /// The source returned 404; terminal, never retried
    NotFound,

    /// Retries exhausted (transport, bad status, or decode failure)
    Failed,
}

/// Downloads images and writes normalized JPEG files
///
/// Idempotence is the caller's job: the caller checks the target path and
/// skips the call entirely when the file already exists.
#[derive(Debug, Clone)]
pub struct ImageMaterializer {
    client: Client,
    policy: RetryPolicy,
}

impl ImageMaterializer {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches `url`, normalizes it to JPEG, and writes it to `target`
    ///
    /// One retry policy covers the whole attempt: a decode or write failure
    /// consumes an attempt just like a transport error, since a truncated
    /// body decodes no better the second time unless re-fetched. Never
    /// panics or returns an error past this boundary.
    pub async fn materialize(&self, url: &str, target: &Path) -> DownloadOutcome {
        let client = self.client.clone();
        let source = url.to_string();
        let target = target.to_path_buf();

        let outcome = with_retry(&self.policy, || {
            let client = client.clone();
            let source = source.clone();
            let target = target.clone();
            async move { attempt_materialize(client, source, target).await }
        })
        .await;

        match outcome {
            Outcome::Done(()) => DownloadOutcome::Success,
            Outcome::NotFound => DownloadOutcome::NotFound,
            Outcome::Failed(reason) => {
                tracing::warn!("Image download failed for {}: {}", url, reason);
                DownloadOutcome::Failed
            }
        }
    }
}

/// One full fetch-decode-write attempt
async fn attempt_materialize(client: Client, url: String, target: PathBuf) -> Attempt<()> {
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => return Attempt::Retry(e.to_string()),
    };

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Attempt::NotFound;
    }
    if !status.is_success() {
        return Attempt::Retry(format!("HTTP {}", status.as_u16()));
    }

    let body = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => return Attempt::Retry(format!("body read failed: {}", e)),
    };

    let encoded = match tokio::task::spawn_blocking(move || transcode_to_jpeg(&body)).await {
        Ok(Ok(jpeg)) => jpeg,
        Ok(Err(e)) => return Attempt::Retry(format!("transcode failed: {}", e)),
        Err(e) => return Attempt::Retry(format!("transcode task panicked: {}", e)),
    };

    // Atomic write: stage next to the target, then rename into place, so an
    // interrupted run never leaves a half-written file the resume check
    // would mistake for a finished one.
    let staging = target.with_extension("part");
    if let Err(e) = tokio::fs::write(&staging, &encoded).await {
        return Attempt::Retry(format!("write failed: {}", e));
    }
    if let Err(e) = tokio::fs::rename(&staging, &target).await {
        return Attempt::Retry(format!("rename failed: {}", e));
    }

    Attempt::Done(())
}

/// Decodes any supported encoding and re-encodes as RGB JPEG
fn transcode_to_jpeg(bytes: &[u8]) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;

    // Paletted, grayscale, and alpha-channel sources all normalize to RGB8,
    // which is the only color type the JPEG encoder needs to see.
    let normalized = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut encoded = Vec::new();
    normalized.write_to(
        &mut Cursor::new(&mut encoded),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;
    Ok(encoded)
}
