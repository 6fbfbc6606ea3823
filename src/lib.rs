pub mod cli;
pub mod commands;
pub mod downloader;
pub mod error;
pub mod playlist;
pub mod providers;
pub mod retry;
pub mod schedule;
pub mod subtitles;
pub mod utils;
