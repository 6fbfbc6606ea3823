use std::path::{Path, PathBuf};

use crate::error::TransferError;

/// One timed caption unit as returned by the transcript collaborator.
#[derive(Debug, Clone)]
pub struct Cue {
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub text: String,
}

/// Renders two aligned cue tracks into one bilingual SRT document: per cue a
/// 1-based index line, a `start --> end` timing line, the original text, the
/// translated text, and a blank separator.
///
/// Both tracks must have the same length; a mismatch fails fast instead of
/// silently truncating to the shorter track. Temporal alignment cue-by-cue is
/// the caller's precondition and is not re-checked here.
pub fn render_bilingual(original: &[Cue], translated: &[Cue]) -> Result<String, TransferError> {
    if original.len() != translated.len() {
        return Err(TransferError::MismatchedCaptionTracks {
            original: original.len(),
            translated: translated.len(),
        });
    }

    let mut out = String::new();
    for (i, (o, t)) in original.iter().zip(translated).enumerate() {
        let start = format_timestamp(o.start_seconds);
        let end = format_timestamp(o.start_seconds + o.duration_seconds);
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n{}\n\n",
            i + 1,
            start,
            end,
            clean_text(&o.text),
            clean_text(&t.text)
        ));
    }
    Ok(out)
}

/// `HH:MM:SS,mmm`, zero-padded. Hours are not wrapped at 24; offsets past a
/// day print as 25:00:00,000 and so on.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Caption path next to the media file, extension swapped for `.srt`.
pub fn srt_path_for(media_path: &Path) -> PathBuf {
    media_path.with_extension("srt")
}

fn clean_text(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}
