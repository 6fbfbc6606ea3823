use thiserror::Error;

/// Everything that can go wrong while acquiring one batch item, tagged so the
/// retry supervisor can tell transient failures from permanent ones.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("probe endpoint unreachable")]
    Unreachable,

    /// Server rejected or ignored the resume byte-range. Appending the body
    /// would corrupt the partial file, so the transfer fails instead; the
    /// caller may fall back to a fresh (truncating) transfer.
    #[error("server did not honor resume from byte {offset}")]
    RangeNotSatisfied { offset: u64 },

    /// Network failure mid-stream. The partial file is left in place so a
    /// later call resumes from the new length.
    #[error("transfer interrupted: {0}")]
    Interrupted(#[source] reqwest::Error),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    /// Stream ended early without an error (server closed the connection).
    #[error("incomplete transfer: expected {expected} bytes, got {received}")]
    Incomplete { expected: u64, received: u64 },

    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("no stream variant within size budget for \"{title}\"")]
    NoEligibleVariant { title: String },

    #[error("caption tracks differ in length: {original} original vs {translated} translated cues")]
    MismatchedCaptionTracks { original: usize, translated: usize },
}

impl TransferError {
    pub fn is_transient(&self) -> bool {
        match self {
            TransferError::Interrupted(_) | TransferError::Incomplete { .. } => true,
            TransferError::HttpStatus(code) => matches!(*code, 408 | 429 | 500..=599),
            TransferError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TransferError::Extraction(_) => true,
            TransferError::Unreachable
            | TransferError::RangeNotSatisfied { .. }
            | TransferError::Io(_)
            | TransferError::NoEligibleVariant { .. }
            | TransferError::MismatchedCaptionTracks { .. } => false,
        }
    }
}

impl crate::retry::Retryable for TransferError {
    fn is_transient(&self) -> bool {
        TransferError::is_transient(self)
    }
}
