pub mod manifest;

use anyhow::{bail, Result};

use crate::error::TransferError;
use crate::subtitles::Cue;

/// One progressive stream variant (muxed audio+video) for a video.
#[derive(Debug, Clone)]
pub struct StreamVariant {
    pub resolution: u32,
    pub size_bytes: u64,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct VideoMeta {
    pub title: String,
    pub duration_seconds: u64,
    pub variants: Vec<StreamVariant>,
}

/// Ordered video URLs of a playlist. Currently only the manifest provider is
/// wired in; platform scrapers plug in here later.
pub async fn fetch_playlist(provider: &str, playlist_url: &str) -> Result<Vec<String>> {
    match provider.to_lowercase().as_str() {
        "manifest" => manifest::fetch_playlist(playlist_url).await,
        _ => bail!("unsupported provider: {}", provider),
    }
}

/// Title, duration and available progressive variants for one video. Failures
/// surface as `Extraction` so the retry supervisor treats them as transient.
pub async fn fetch_video(provider: &str, video_url: &str) -> Result<VideoMeta, TransferError> {
    match provider.to_lowercase().as_str() {
        "manifest" => manifest::fetch_video(video_url).await,
        other => Err(TransferError::Extraction(format!(
            "unsupported provider: {}",
            other
        ))),
    }
}

/// Ordered cue track for a video; `translate` selects a translated track over
/// the source language.
pub async fn fetch_transcript(
    provider: &str,
    video_url: &str,
    translate: Option<&str>,
) -> Result<Vec<Cue>, TransferError> {
    match provider.to_lowercase().as_str() {
        "manifest" => manifest::fetch_transcript(video_url, translate).await,
        other => Err(TransferError::Extraction(format!(
            "unsupported provider: {}",
            other
        ))),
    }
}
