use crate::error::{KinectError, Result};
use crate::handshake::{RetryPolicy, DEFAULT_CONNECT_ATTEMPTS};
use crate::mapping::ShapeWriteMode;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "kinect_module.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KinectConfig {
    /// Name of the region the companion creates
    pub channel_name: String,

    pub companion_path: PathBuf,
    pub companion_args: Vec<String>,
    /// Turn off when the companion is started some other way
    pub launch_companion: bool,

    pub connect_attempts: u32,
    pub connect_retry_ms: u64,
    pub poll_interval_ms: u64,

    #[serde(alias = "write_mode")]
    pub shape_write_mode: ShapeWriteMode,
}

fn default_channel_name() -> String {
    "KinectFaceTracking.FaceState".to_string()
}

fn default_companion_path() -> PathBuf {
    PathBuf::from("KinectFaceTracking").join("KinectFaceTracking.exe")
}

fn default_connect_retry_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    10
}

impl Default for KinectConfig {
    fn default() -> Self {
        Self {
            channel_name: default_channel_name(),
            companion_path: default_companion_path(),
            companion_args: Vec::new(),
            launch_companion: true,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_retry_ms: default_connect_retry_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            shape_write_mode: ShapeWriteMode::default(),
        }
    }
}

impl KinectConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.connect_attempts,
            delay: Duration::from_millis(self.connect_retry_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn from_json(path: &Path, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| KinectError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            info!("Loading config from {:?}", path);
            let content = fs::read_to_string(path)?;
            Ok(Self::from_json(path, &content)?)
        } else {
            info!("Config not found. Creating default at {:?}", path);
            let config = Self::default();
            fs::write(path, serde_json::to_string_pretty(&config)?)?;
            Ok(config)
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }
}
