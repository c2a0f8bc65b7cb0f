//! The Kinect companion executable: it owns the sensor and creates the
//! shared region. We only start it and kill it.

use crate::error::{KinectError, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

pub struct CompanionProcess {
    path: PathBuf,
    child: Option<Child>,
}

impl CompanionProcess {
    pub fn locate(path: &Path) -> Result<PathBuf> {
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(KinectError::ExecutableNotFound {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn launch(path: &Path, args: &[String]) -> Result<Self> {
        let path = Self::locate(path)?;
        let child = Command::new(&path)
            .args(args)
            .spawn()
            .map_err(|source| KinectError::Spawn {
                path: path.clone(),
                source,
            })?;

        info!("Started companion {:?} (pid {})", path, child.id());
        Ok(Self {
            path,
            child: Some(child),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Kills and reaps the child. Safe to call repeatedly.
    pub fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(e) = child.kill() {
            // Already exited on its own
            warn!("Failed to kill companion {:?}: {}", self.path, e);
        }
        let _ = child.wait();
        info!("Companion {:?} terminated", self.path);
    }
}

impl Drop for CompanionProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}
