pub mod channel;
pub mod companion;
pub mod config;
pub mod error;
pub mod face_state;
pub mod handshake;
pub mod kinect;
pub mod mapping;
pub mod poll;
pub mod shm;
pub mod sink;

pub use channel::{ChannelState, SharedChannel};
pub use config::KinectConfig;
pub use error::{KinectError, Result};
pub use face_state::{FaceState, FACE_STATE_SIZE};
pub use handshake::RetryPolicy;
pub use kinect::KinectModule;
pub use mapping::{map_face_state, BlendshapeSet, ShapeWriteMode};
pub use poll::{CancellationToken, PollLoop};
pub use sink::{BlendshapeSink, SharedTrackingData};

use api::TrackingModule;

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_module() -> Box<dyn TrackingModule> {
    Box::new(KinectModule::new())
}
