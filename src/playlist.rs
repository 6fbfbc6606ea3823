use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::error::TransferError;
use crate::providers::{StreamVariant, VideoMeta};
use crate::utils::sanitize_filename;

/// Heuristic cap on variant size, per video-second. Variants at or above
/// 6 MiB/s are treated as oversized or miscoded and passed over.
pub const SIZE_CAP_PER_SECOND: u64 = 6 * 1024 * 1024;

/// One batch entry: display name and direct source URL. The destination path
/// is the download directory joined with the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    pub name: String,
    pub url: String,
}

/// Picks the largest-resolution progressive variant whose size fits the
/// per-second budget, falling through to the next-highest resolution when the
/// best one is oversized.
pub fn select_variant(meta: &VideoMeta) -> Result<&StreamVariant, TransferError> {
    let budget = meta.duration_seconds.saturating_mul(SIZE_CAP_PER_SECOND);
    let mut candidates: Vec<&StreamVariant> = meta.variants.iter().collect();
    candidates.sort_by(|a, b| b.resolution.cmp(&a.resolution));
    candidates
        .into_iter()
        .find(|v| v.size_bytes < budget)
        .ok_or_else(|| TransferError::NoEligibleVariant {
            title: meta.title.clone(),
        })
}

/// `NN_title.mp4` with a two-digit zero-padded 1-based playlist index, so the
/// persisted order survives external re-sorting.
pub fn display_name(index: usize, title: &str) -> String {
    format!("{:02}_{}.mp4", index, sanitize_filename(title))
}

/// Persists the batch as two order-aligned line lists: line i of the links
/// file corresponds to line i of the names file.
pub fn write_lists(items: &[TransferItem], links_path: &Path, names_path: &Path) -> Result<()> {
    let links: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    fs::write(links_path, links.join("\n") + "\n")
        .with_context(|| format!("failed to write links file {:?}", links_path))?;
    fs::write(names_path, names.join("\n") + "\n")
        .with_context(|| format!("failed to write names file {:?}", names_path))?;
    Ok(())
}

pub fn read_lists(links_path: &Path, names_path: &Path) -> Result<Vec<TransferItem>> {
    let links = read_lines(links_path)?;
    let names = read_lines(names_path)?;
    if links.len() != names.len() {
        bail!(
            "links/names line counts differ: {} links vs {} names",
            links.len(),
            names.len()
        );
    }
    Ok(links
        .into_iter()
        .zip(names)
        .map(|(url, name)| TransferItem { name, url })
        .collect())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to open list file {:?}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
