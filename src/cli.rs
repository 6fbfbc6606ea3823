use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ResumeMode {
    /// Resume from the existing partial file; fall back to a fresh transfer
    /// when the server rejects the byte range.
    Auto,
    /// Always start from byte zero, overwriting any partial file.
    Fresh,
}
