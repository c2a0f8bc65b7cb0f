//! The shared channel carrying one [`FaceState`] between the companion and
//! this module.
//!
//! There is no lock, sequence counter or ack. A read may observe a record the
//! producer is halfway through writing; with the update rate involved the
//! worst case is one frame of mixed old/new action units, which is tolerated.

use crate::error::{KinectError, Result};
use crate::face_state::{FaceState, FACE_STATE_SIZE};
use crate::handshake::{retry_open, RetryPolicy};
use crate::shm::Region;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Uninitialized,
    Connecting,
    Connected,
    Closed,
}

pub struct SharedChannel {
    name: String,
    state: ChannelState,
    region: Option<Region>,
}

impl SharedChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ChannelState::Uninitialized,
            region: None,
        }
    }

    /// Producer side: allocates a zeroed region sized for one record.
    pub fn create(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let region = Region::create(&name, FACE_STATE_SIZE)?;
        info!("Created shared memory '{}' ({} bytes)", name, region.len());
        Ok(Self {
            name,
            state: ChannelState::Connected,
            region: Some(region),
        })
    }

    /// Consumer side: opens the region the producer created, retrying while
    /// it does not exist yet. A failed handshake leaves the channel closed.
    pub fn open_existing(&mut self, policy: &RetryPolicy) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = ChannelState::Connecting;
        let name = self.name.clone();
        match retry_open(&name, policy, || Region::open(&name, FACE_STATE_SIZE)) {
            Ok(region) => {
                info!("Successfully connected to shared memory: {}", self.name);
                self.region = Some(region);
                self.state = ChannelState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = ChannelState::Closed;
                Err(e)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ChannelState::Connected && self.region.is_some()
    }

    /// Copies the current record out of shared memory.
    pub fn read(&self) -> Result<FaceState> {
        let region = self.region.as_ref().ok_or_else(|| {
            KinectError::ReadFailure(format!("'{}' is not connected", self.name))
        })?;

        let mut buf = [0u8; FACE_STATE_SIZE];
        region.read_into(&mut buf);
        FaceState::from_bytes(&buf)
    }

    pub fn write(&mut self, state: &FaceState) -> Result<()> {
        let region = self.region.as_mut().ok_or_else(|| KinectError::NotConnected {
            name: self.name.clone(),
        })?;
        region.write_from(&state.to_bytes());
        Ok(())
    }

    /// Releases the mapping. Safe to call on a channel that never connected
    /// and safe to call more than once.
    pub fn close(&mut self) {
        if let Some(region) = self.region.take() {
            drop(region);
            debug!("Released shared memory '{}'", self.name);
        }
        self.state = ChannelState::Closed;
    }
}

impl Drop for SharedChannel {
    fn drop(&mut self) {
        self.close();
    }
}
