//! Output sink errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("no DualSense controller found")]
    DeviceNotFound,

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output sink is not connected")]
    NotConnected,
}

pub type OutputResult<T> = Result<T, OutputError>;
