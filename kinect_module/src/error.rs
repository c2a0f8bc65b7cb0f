//! Error types for the Kinect module

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KinectError>;

#[derive(Debug, Error)]
pub enum KinectError {
    /// The companion executable is not where the config says it is
    #[error("Companion executable not found at {path:?}")]
    ExecutableNotFound { path: PathBuf },

    #[error("Failed to spawn companion {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The producer never created the region within the retry window
    #[error("Shared memory '{name}' not found after {attempts} attempt(s)")]
    ChannelNotFound { name: String, attempts: u32 },

    /// Any other OS failure while opening. Not retried.
    #[error("Failed to open shared memory '{name}': {source}")]
    ChannelOpen {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Shared memory '{name}' is {actual} bytes, expected at least {expected}")]
    RegionTooSmall {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read face state: {0}")]
    ReadFailure(String),

    #[error("Shared memory '{name}' is not connected")]
    NotConnected { name: String },

    #[error("Failed to start poll thread: {0}")]
    PollThread(#[source] io::Error),

    #[error("Invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl KinectError {
    /// Only a missing region is worth waiting for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KinectError::ChannelNotFound { .. })
    }

    /// Groups size mismatches with the other non-retryable open failures.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            KinectError::ChannelOpen { .. } | KinectError::RegionTooSmall { .. }
        )
    }
}
