use anyhow::Result;
use url::Url;

const FALLBACK_FILENAME: &str = "download.bin";

pub fn filename_from_url(url_str: &str) -> Result<String> {
    let url = Url::parse(url_str)?;

    if let Some(segments) = url.path_segments() {
        if let Some(filename) = segments.last() {
            if !filename.is_empty() {
                return Ok(sanitize_filename(filename));
            }
        }
    }

    Ok(FALLBACK_FILENAME.to_string())
}

/// Strips characters a filesystem may reject while keeping everything else,
/// Unicode titles included.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['\\', '/', ':', '?', '"', '<', '>', '|', '*'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_comes_from_last_path_segment() {
        assert_eq!(
            filename_from_url("https://host/a/b/video.mp4").unwrap(),
            "video.mp4"
        );
        assert_eq!(filename_from_url("https://host/").unwrap(), FALLBACK_FILENAME);
    }

    #[test]
    fn sanitize_keeps_unicode_and_drops_separators() {
        assert_eq!(sanitize_filename("a/b:c?d"), "abcd");
        assert_eq!(sanitize_filename("قسمت اول"), "قسمت اول");
    }
}
