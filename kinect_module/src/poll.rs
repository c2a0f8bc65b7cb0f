//! Background loop that reads the channel and feeds the mapper.
//!
//! Cadence is a plain sleep, so expect jitter. Cancellation is checked once
//! per tick; a tick in progress always runs to completion.

use crate::channel::SharedChannel;
use crate::error::{KinectError, Result};
use crate::face_state::FaceState;
use crate::mapping::map_face_state;
use crate::sink::BlendshapeSink;
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct PollLoop {
    token: CancellationToken,
    handle: Option<JoinHandle<Option<FaceState>>>,
}

impl PollLoop {
    /// Takes ownership of the channel; it is written back to and released
    /// by the poll thread when the loop stops.
    pub fn spawn<S: BlendshapeSink>(
        channel: SharedChannel,
        sink: S,
        period: Duration,
    ) -> Result<Self> {
        let token = CancellationToken::new();
        let thread_token = token.clone();

        let handle = thread::Builder::new()
            .name("kinect-poll".to_string())
            .spawn(move || run(channel, sink, period, thread_token))
            .map_err(KinectError::PollThread)?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the loop and waits for it to write back and close. Returns
    /// the state that was written back, if any frame was ever read.
    pub fn stop(&mut self) -> Option<FaceState> {
        self.token.cancel();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(last) => last,
            Err(_) => {
                warn!("Poll thread panicked during shutdown");
                None
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<S: BlendshapeSink>(
    mut channel: SharedChannel,
    mut sink: S,
    period: Duration,
    token: CancellationToken,
) -> Option<FaceState> {
    info!("Polling '{}' every {:?}", channel.name(), period);
    let mut last: Option<FaceState> = None;

    while !token.is_cancelled() {
        tick(&channel, &mut sink, &mut last);
        thread::sleep(period);
    }

    // Leave the region in a defined state for whoever connects next.
    if let Some(state) = &last {
        if let Err(e) = channel.write(state) {
            warn!("Write-back to '{}' failed: {}", channel.name(), e);
        }
    }
    channel.close();
    debug!("Poll loop for '{}' stopped", channel.name());
    last
}

/// One poll: read, map, publish. A failed read skips the tick.
pub fn tick<S: BlendshapeSink + ?Sized>(
    channel: &SharedChannel,
    sink: &mut S,
    last: &mut Option<FaceState>,
) {
    if !channel.is_connected() {
        return;
    }

    match channel.read() {
        Ok(state) => {
            trace!("{:?}", state);
            sink.publish(&map_face_state(&state));
            *last = Some(state);
        }
        Err(e) => warn!("Skipping tick: {}", e),
    }
}
