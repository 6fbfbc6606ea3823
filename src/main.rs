use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use bdl::cli::ResumeMode;
use bdl::retry::RetryPolicy;
use bdl::{commands, schedule};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Single URL to download (optional; the list files are ignored when given)
    #[arg(index = 1)]
    url: Option<String>,

    /// Path to the links file (one source URL per line)
    #[arg(short = 'l', long = "links-file", default_value = "links.txt")]
    links_file: PathBuf,

    /// Path to the names file, order-aligned with the links file
    #[arg(short = 'n', long = "names-file", default_value = "names.txt")]
    names_file: PathBuf,

    /// Directory to save downloaded files
    #[arg(short = 'd', long = "download-dir", default_value = "downloads")]
    download_dir: PathBuf,

    /// Defer the batch until this local time of day (HH:MM, same day only)
    #[arg(long = "at")]
    at: Option<String>,

    /// Resolve this playlist URL into the links/names files, then download
    #[arg(short = 'p', long = "playlist")]
    playlist: Option<String>,

    /// Provider used for playlist and transcript extraction
    #[arg(short = 'P', long, default_value = "manifest")]
    provider: String,

    /// Fetch a bilingual subtitle track for this video URL and exit
    #[arg(long = "subs", requires = "media_file")]
    subs: Option<String>,

    /// Media file the caption path is derived from (extension becomes .srt)
    #[arg(long = "media-file")]
    media_file: Option<PathBuf>,

    /// Target language for the translated caption track
    #[arg(long = "sub-lang", default_value = "fa")]
    sub_lang: String,

    /// Maximum attempts per item (default: retry transient failures forever)
    #[arg(long = "max-attempts")]
    max_attempts: Option<u32>,

    /// Delay between retry attempts, in milliseconds
    #[arg(long = "retry-delay-ms", default_value_t = 500)]
    retry_delay_ms: u64,

    /// Resume behavior for partial files
    #[arg(long = "resume-mode", value_enum, default_value = "auto")]
    resume_mode: ResumeMode,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let policy = RetryPolicy {
        max_attempts: args.max_attempts,
        delay: Duration::from_millis(args.retry_delay_ms),
    };
    let at = args
        .at
        .as_deref()
        .map(schedule::parse_time_of_day)
        .transpose()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if let (Some(video_url), Some(media)) = (&args.subs, &args.media_file) {
            return commands::write_subtitles(&args.provider, video_url, &args.sub_lang, media)
                .await;
        }

        if let Some(playlist_url) = &args.playlist {
            commands::resolve_playlist(
                &args.provider,
                playlist_url,
                &args.links_file,
                &args.names_file,
                &policy,
            )
            .await?;
        }

        if let Some(url) = &args.url {
            commands::run_single(url, &args.download_dir, at, &policy, args.resume_mode, None)
                .await
        } else {
            commands::run_batch(
                &args.links_file,
                &args.names_file,
                &args.download_dir,
                at,
                &policy,
                args.resume_mode,
                None,
            )
            .await
        }
    })
}
