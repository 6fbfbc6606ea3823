use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::{header, Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::TransferError;

pub const PROBE_URL: &str = "https://www.google.com";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Downloader {
    client: Client,
    multi_progress: MultiProgress,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("bdl/0.1.0")
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        let multi_progress = MultiProgress::new();
        // Draw to stderr so progress survives stdout redirection.
        multi_progress.set_draw_target(ProgressDrawTarget::stderr_with_hz(5));

        Self {
            client,
            multi_progress,
        }
    }

    /// Cheap reachability gate: one short-timeout GET, success status only.
    /// No retries, no side effects.
    pub async fn is_reachable(&self) -> bool {
        self.probe(PROBE_URL).await
    }

    pub async fn probe(&self, url: &str) -> bool {
        match self.client.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Downloads `url` to `filepath`, resuming from the existing file length
    /// via a byte-range request. Repeated calls never shrink the file or
    /// rewrite bytes already on disk: each call either completes the file,
    /// skips it when already complete, or leaves a larger partial file for the
    /// next attempt.
    pub async fn download_resumable(
        &self,
        url: &str,
        filepath: &Path,
    ) -> Result<(), TransferError> {
        let existing = match fs::metadata(filepath).await {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };

        // HEAD for the total size; servers that block HEAD just leave the
        // total unknown.
        let total = self.head_total(url).await;

        if let Some(total) = total {
            if existing == total {
                self.finish_skipped(filepath, existing);
                return Ok(());
            }
            if existing > total {
                // Local file is longer than the remote resource; resuming
                // would append garbage.
                return Err(TransferError::RangeNotSatisfied { offset: existing });
            }
        }

        let resp = self
            .client
            .get(url)
            .header(header::RANGE, format!("bytes={}-", existing))
            .send()
            .await
            .map_err(TransferError::Http)?;

        let status = resp.status();
        if existing > 0 {
            if status == StatusCode::RANGE_NOT_SATISFIABLE {
                // A 416 whose Content-Range total equals the local length just
                // means the file is already complete; anything else is a
                // genuine resume refusal the caller may answer with a fresh
                // transfer.
                if content_range_total(&resp) == Some(existing) {
                    self.finish_skipped(filepath, existing);
                    return Ok(());
                }
                return Err(TransferError::RangeNotSatisfied { offset: existing });
            }
            if status != StatusCode::PARTIAL_CONTENT {
                if status.is_success() {
                    // Server ignored the range and is sending the full body.
                    return Err(TransferError::RangeNotSatisfied { offset: existing });
                }
                return Err(TransferError::HttpStatus(status.as_u16()));
            }
            if let Some(start) = content_range_start(&resp) {
                if start != existing {
                    return Err(TransferError::RangeNotSatisfied { offset: existing });
                }
            }
        } else if !status.is_success() {
            return Err(TransferError::HttpStatus(status.as_u16()));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(filepath)
            .await?;

        let written = self
            .stream_body(resp, file, total.unwrap_or(0), existing, filepath)
            .await?;

        if let Some(total) = total {
            if written != total {
                return Err(TransferError::Incomplete {
                    expected: total,
                    received: written,
                });
            }
        }
        Ok(())
    }

    /// Non-resumable variant for servers known not to support byte ranges:
    /// always starts from offset 0 and overwrites.
    pub async fn download_fresh(&self, url: &str, filepath: &Path) -> Result<(), TransferError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransferError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::HttpStatus(status.as_u16()));
        }

        let total = resp.content_length().unwrap_or(0);
        let file = File::create(filepath).await?;
        let written = self.stream_body(resp, file, total, 0, filepath).await?;

        if total > 0 && written != total {
            return Err(TransferError::Incomplete {
                expected: total,
                received: written,
            });
        }
        Ok(())
    }

    async fn head_total(&self, url: &str) -> Option<u64> {
        match self.client.head(url).send().await {
            Ok(resp) => resp.content_length().filter(|len| *len > 0),
            Err(_) => None,
        }
    }

    async fn stream_body(
        &self,
        resp: reqwest::Response,
        mut file: File,
        total: u64,
        initial: u64,
        filepath: &Path,
    ) -> Result<u64, TransferError> {
        let name = filepath
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let pb = self.add_bar(total, initial, &name);

        let mut written = initial;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    pb.abandon_with_message(format!("Interrupted {}", name));
                    return Err(TransferError::Interrupted(e));
                }
            };
            if chunk.is_empty() {
                continue;
            }
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;

        pb.finish_with_message(format!("Completed   {}", name));
        Ok(written)
    }

    fn add_bar(&self, total: u64, pos: u64, name: &str) -> ProgressBar {
        let pb = self.multi_progress.add(ProgressBar::new(total));
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes:>12}/{total_bytes:<12} {bytes_per_sec:>12} {eta:>4} {msg}")
            .unwrap()
            .progress_chars("=>-"));
        pb.set_message(format!("Downloading {}", name));
        pb.set_position(pos);
        pb
    }

    fn finish_skipped(&self, filepath: &Path, size: u64) {
        let pb = self.multi_progress.add(ProgressBar::new(size));
        pb.set_style(ProgressStyle::default_bar().template("{msg}").unwrap());
        pb.finish_with_message(format!(
            "Skipped     {} (already complete)",
            filepath.file_name().unwrap_or_default().to_string_lossy()
        ));
    }
}

/// Start offset of a `Content-Range: bytes <start>-<end>/<total>` header.
fn content_range_start(resp: &reqwest::Response) -> Option<u64> {
    let value = resp.headers().get(header::CONTENT_RANGE)?.to_str().ok()?;
    parse_content_range_start(value)
}

fn parse_content_range_start(value: &str) -> Option<u64> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (range, _total) = rest.split_once('/')?;
    let (start, _end) = range.split_once('-')?;
    start.trim().parse().ok()
}

/// Total length of a `Content-Range` header, including the unsatisfied-range
/// form `bytes */<total>` sent with 416 responses.
fn content_range_total(resp: &reqwest::Response) -> Option<u64> {
    let value = resp.headers().get(header::CONTENT_RANGE)?.to_str().ok()?;
    parse_content_range_total(value)
}

fn parse_content_range_total(value: &str) -> Option<u64> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (_range, total) = rest.split_once('/')?;
    total.trim().parse().ok()
}
