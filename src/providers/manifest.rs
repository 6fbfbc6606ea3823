//! JSON-manifest provider: playlists, video metadata and transcripts served
//! as plain JSON documents over HTTP.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{StreamVariant, VideoMeta};
use crate::error::TransferError;
use crate::subtitles::Cue;

#[derive(Deserialize)]
struct PlaylistResponse {
    entries: Vec<PlaylistEntry>,
}

#[derive(Deserialize)]
struct PlaylistEntry {
    url: String,
}

#[derive(Deserialize)]
struct VideoResponse {
    title: String,
    duration: u64,
    streams: Vec<StreamEntry>,
}

#[derive(Deserialize)]
struct StreamEntry {
    resolution: u32,
    size: u64,
    url: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    cues: Vec<CueEntry>,
}

#[derive(Deserialize)]
struct CueEntry {
    start: f64,
    duration: f64,
    text: String,
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("bdl/0.1.0")
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub async fn fetch_playlist(playlist_url: &str) -> Result<Vec<String>> {
    let resp = client()
        .get(playlist_url)
        .send()
        .await
        .context("playlist manifest request failed")?;
    if !resp.status().is_success() {
        bail!("playlist manifest returned HTTP {}", resp.status());
    }
    let body = resp.text().await.context("failed to read playlist manifest")?;
    let parsed: PlaylistResponse =
        serde_json::from_str(&body).context("failed to parse playlist manifest JSON")?;
    if parsed.entries.is_empty() {
        bail!("playlist manifest has no entries");
    }
    Ok(parsed.entries.into_iter().map(|e| e.url).collect())
}

pub async fn fetch_video(video_url: &str) -> Result<VideoMeta, TransferError> {
    let resp = client()
        .get(video_url)
        .send()
        .await
        .map_err(|e| TransferError::Extraction(format!("video manifest request failed: {}", e)))?;
    if !resp.status().is_success() {
        return Err(TransferError::Extraction(format!(
            "video manifest returned HTTP {}",
            resp.status()
        )));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| TransferError::Extraction(format!("failed to read video manifest: {}", e)))?;
    let parsed: VideoResponse = serde_json::from_str(&body)
        .map_err(|e| TransferError::Extraction(format!("bad video manifest JSON: {}", e)))?;

    Ok(VideoMeta {
        title: parsed.title,
        duration_seconds: parsed.duration,
        variants: parsed
            .streams
            .into_iter()
            .map(|s| StreamVariant {
                resolution: s.resolution,
                size_bytes: s.size,
                url: s.url,
            })
            .collect(),
    })
}

pub async fn fetch_transcript(
    video_url: &str,
    translate: Option<&str>,
) -> Result<Vec<Cue>, TransferError> {
    let url = match translate {
        Some(lang) => format!("{}/transcript?translate={}", video_url.trim_end_matches('/'), lang),
        None => format!("{}/transcript", video_url.trim_end_matches('/')),
    };
    let resp = client()
        .get(&url)
        .send()
        .await
        .map_err(|e| TransferError::Extraction(format!("transcript request failed: {}", e)))?;
    if !resp.status().is_success() {
        return Err(TransferError::Extraction(format!(
            "transcript endpoint returned HTTP {}",
            resp.status()
        )));
    }
    let body = resp
        .text()
        .await
        .map_err(|e| TransferError::Extraction(format!("failed to read transcript: {}", e)))?;
    let parsed: TranscriptResponse = serde_json::from_str(&body)
        .map_err(|e| TransferError::Extraction(format!("bad transcript JSON: {}", e)))?;

    Ok(parsed
        .cues
        .into_iter()
        .map(|c| Cue {
            start_seconds: c.start,
            duration_seconds: c.duration,
            text: c.text,
        })
        .collect())
}
