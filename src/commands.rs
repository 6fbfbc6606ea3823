use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use std::path::Path;
use tokio::fs;

use crate::cli::ResumeMode;
use crate::downloader::Downloader;
use crate::error::TransferError;
use crate::playlist::{self, TransferItem};
use crate::providers;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::schedule;
use crate::subtitles;
use crate::utils;

/// Downloads the batch persisted in the links/names file pair: schedule gate,
/// connectivity gate, then the items strictly in list order.
pub async fn run_batch(
    links: &Path,
    names: &Path,
    dir: &Path,
    at: Option<NaiveTime>,
    policy: &RetryPolicy,
    mode: ResumeMode,
    probe_url: Option<&str>,
) -> Result<()> {
    let items = playlist::read_lists(links, names)?;
    run_items(items, dir, at, policy, mode, probe_url).await
}

/// One-item batch for a direct URL; the name comes from the URL path.
pub async fn run_single(
    url: &str,
    dir: &Path,
    at: Option<NaiveTime>,
    policy: &RetryPolicy,
    mode: ResumeMode,
    probe_url: Option<&str>,
) -> Result<()> {
    let items = vec![TransferItem {
        name: utils::filename_from_url(url)?,
        url: url.to_string(),
    }];
    run_items(items, dir, at, policy, mode, probe_url).await
}

async fn run_items(
    items: Vec<TransferItem>,
    dir: &Path,
    at: Option<NaiveTime>,
    policy: &RetryPolicy,
    mode: ResumeMode,
    probe_url: Option<&str>,
) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .context("failed to create download directory")?;
    }

    if let Some(target) = at {
        println!("Batch scheduled for {}", target.format("%H:%M"));
        schedule::await_time_of_day(target).await;
    }

    let downloader = Downloader::new();
    let reachable = match probe_url {
        Some(url) => downloader.probe(url).await,
        None => downloader.is_reachable().await,
    };
    if !reachable {
        return Err(TransferError::Unreachable.into());
    }

    let mut failed = 0usize;
    for (i, item) in items.iter().enumerate() {
        let dest = dir.join(&item.name);
        let result = run_with_retry(policy, &item.name, || {
            download_one(&downloader, &item.url, &dest, mode)
        })
        .await;
        match result {
            Ok(()) => println!("{}: {}", i + 1, item.name),
            Err(e) => {
                eprintln!("giving up on {}: {}", item.name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} items failed permanently", failed, items.len());
    }
    Ok(())
}

async fn download_one(
    downloader: &Downloader,
    url: &str,
    dest: &Path,
    mode: ResumeMode,
) -> Result<(), TransferError> {
    match mode {
        ResumeMode::Fresh => downloader.download_fresh(url, dest).await,
        ResumeMode::Auto => match downloader.download_resumable(url, dest).await {
            Err(TransferError::RangeNotSatisfied { offset }) => {
                eprintln!(
                    "resume from byte {} refused for {:?}, restarting from zero",
                    offset,
                    dest.file_name().unwrap_or_default()
                );
                downloader.download_fresh(url, dest).await
            }
            other => other,
        },
    }
}

/// Resolves a playlist into an ordered batch and persists it as the two
/// order-aligned list files. Extraction failures are retried per policy;
/// entries with no variant inside the size budget are skipped with a report
/// instead of looping forever.
pub async fn resolve_playlist(
    provider: &str,
    playlist_url: &str,
    links: &Path,
    names: &Path,
    policy: &RetryPolicy,
) -> Result<Vec<TransferItem>> {
    let entries = providers::fetch_playlist(provider, playlist_url).await?;

    let mut items = Vec::with_capacity(entries.len());
    for (i, entry_url) in entries.iter().enumerate() {
        let index = i + 1;
        let label = format!("playlist entry {:02}", index);
        let meta = match run_with_retry(policy, &label, || {
            providers::fetch_video(provider, entry_url)
        })
        .await
        {
            Ok(meta) => meta,
            Err(e) => {
                eprintln!("skipping {}: {}", label, e);
                continue;
            }
        };
        let variant = match playlist::select_variant(&meta) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("skipping {}: {}", label, e);
                continue;
            }
        };
        let item = TransferItem {
            name: playlist::display_name(index, &meta.title),
            url: variant.url.clone(),
        };
        println!("{} {}", item.name, item.url);
        items.push(item);
    }

    if items.is_empty() {
        bail!("playlist produced no downloadable items");
    }
    playlist::write_lists(&items, links, names)?;
    println!("wrote {} entries to {:?} / {:?}", items.len(), links, names);
    Ok(items)
}

/// Fetches the source and translated cue tracks for a video and writes one
/// bilingual caption file next to the media file.
pub async fn write_subtitles(
    provider: &str,
    video_url: &str,
    lang: &str,
    media_path: &Path,
) -> Result<()> {
    let original = providers::fetch_transcript(provider, video_url, None).await?;
    let translated = providers::fetch_transcript(provider, video_url, Some(lang)).await?;

    let srt = subtitles::render_bilingual(&original, &translated)?;
    let out = subtitles::srt_path_for(media_path);
    fs::write(&out, srt)
        .await
        .with_context(|| format!("failed to write caption file {:?}", out))?;
    println!("wrote {} bilingual cues to {:?}", original.len(), out);
    Ok(())
}
