//! Stands in for the Kinect companion: creates the shared region and keeps
//! writing a slowly cycling face so the module can be exercised without a
//! sensor attached.

use anyhow::Result;
use kinect_module::{FaceState, KinectConfig, SharedChannel};
use log::{debug, info};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

fn synthetic_face(t: f32) -> FaceState {
    let slow = (t * 0.5).sin();
    let fast = (t * 1.3).sin();
    FaceState {
        brow_raiser: 0.5 * slow,
        brow_lower: (0.4 * -slow).max(0.0),
        jaw_lower: 0.5 + 0.5 * fast,
        lip_stretcher: 0.3 * (t * 0.7).cos(),
        lip_corner_depressor: -0.2 * fast,
        lip_raiser: 0.25 * (t * 0.9).sin(),
    }
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let config = KinectConfig::load_or_default(Path::new(kinect_module::config::CONFIG_FILE));
    let name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.channel_name.clone());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut channel = SharedChannel::create(name.clone())?;
    info!("Writing synthetic face data to '{}'", name);

    let start = Instant::now();
    let mut frames: u64 = 0;
    while running.load(Ordering::SeqCst) {
        let state = synthetic_face(start.elapsed().as_secs_f32());
        channel.write(&state)?;
        frames += 1;
        if frames % 100 == 0 {
            debug!("frame {}: {:?}", frames, state);
        }
        thread::sleep(FRAME_INTERVAL);
    }

    channel.close();
    info!("Wrote {} frames", frames);
    Ok(())
}
