use api::LegacyExpressions as E;
use kinect_module::poll::tick;
use kinect_module::{
    BlendshapeSet, BlendshapeSink, FaceState, PollLoop, RetryPolicy, ShapeWriteMode,
    SharedChannel, SharedTrackingData,
};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn unique_name(tag: &str) -> String {
    format!("kinect_poll_{}_{}", std::process::id(), tag)
}

fn connect(name: &str) -> SharedChannel {
    let mut channel = SharedChannel::new(name);
    channel.open_existing(&RetryPolicy::default()).unwrap();
    channel
}

/// Records every published set.
#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<BlendshapeSet>>>);

impl RecordingSink {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    fn last(&self) -> Option<BlendshapeSet> {
        self.0.lock().unwrap().last().cloned()
    }
}

impl BlendshapeSink for RecordingSink {
    fn publish(&mut self, set: &BlendshapeSet) {
        self.0.lock().unwrap().push(set.clone());
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn test_tick_is_noop_when_disconnected() {
    let channel = SharedChannel::new(unique_name("disconnected"));
    let mut sink = RecordingSink::default();
    let mut last = None;

    tick(&channel, &mut sink, &mut last);

    assert_eq!(sink.count(), 0);
    assert!(last.is_none());
}

#[test]
fn test_tick_publishes_mapped_state() {
    let name = unique_name("single_tick");
    let mut producer = SharedChannel::create(name.clone()).unwrap();
    let state = FaceState {
        jaw_lower: 0.7,
        ..Default::default()
    };
    producer.write(&state).unwrap();

    let channel = connect(&name);
    let mut sink = RecordingSink::default();
    let mut last = None;
    tick(&channel, &mut sink, &mut last);

    assert_eq!(last, Some(state));
    assert_eq!(sink.last().unwrap().get(E::JawOpen), Some(0.7));
}

#[test]
fn test_loop_tracks_producer_and_stops() {
    let _ = env_logger::builder().is_test(true).try_init();

    let name = unique_name("loop");
    let mut producer = SharedChannel::create(name.clone()).unwrap();
    let shared = SharedTrackingData::new(ShapeWriteMode::Reset);

    let mut poll = PollLoop::spawn(connect(&name), shared.clone(), Duration::from_millis(5)).unwrap();
    assert!(poll.is_running());

    producer
        .write(&FaceState {
            brow_raiser: 0.5,
            jaw_lower: 0.6,
            ..Default::default()
        })
        .unwrap();
    assert!(wait_for(|| shared.snapshot().weight(E::JawOpen) == 0.6));
    assert_eq!(shared.snapshot().weight(E::EyeWidenCombined), 0.5);

    let token = poll.token();
    let written_back = poll.stop();
    assert!(token.is_cancelled());
    assert!(!poll.is_running());
    assert_eq!(written_back.map(|s| s.jaw_lower), Some(0.6));

    // Second stop is harmless
    assert!(poll.stop().is_none());
}

#[test]
fn test_shutdown_writes_back_last_known_state() {
    let name = unique_name("write_back");
    let mut producer = SharedChannel::create(name.clone()).unwrap();
    let state = FaceState {
        lip_raiser: -0.4,
        lip_corner_depressor: 0.3,
        ..Default::default()
    };
    producer.write(&state).unwrap();

    let sink = RecordingSink::default();
    let mut poll = PollLoop::spawn(connect(&name), sink.clone(), Duration::from_millis(5)).unwrap();
    assert!(wait_for(|| sink.count() > 0));

    let last = poll.stop().unwrap();
    assert_eq!(last, state);
    assert_eq!(producer.read().unwrap(), state);
}

#[test]
fn test_cancel_token_ends_loop_within_a_tick() {
    let name = unique_name("cancel");
    let _producer = SharedChannel::create(name.clone()).unwrap();
    let sink = RecordingSink::default();
    let mut poll = PollLoop::spawn(connect(&name), sink.clone(), Duration::from_millis(20)).unwrap();
    assert!(wait_for(|| sink.count() > 0));

    poll.token().cancel();
    assert!(wait_for(|| !poll.is_running()));
    let published = sink.count();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(sink.count(), published);

    poll.stop();
}

#[test]
fn test_carry_over_sink_keeps_previous_branch() {
    let name = unique_name("carry_over");
    let mut producer = SharedChannel::create(name.clone()).unwrap();
    let shared = SharedTrackingData::new(ShapeWriteMode::CarryOver);
    let mut poll = PollLoop::spawn(connect(&name), shared.clone(), Duration::from_millis(5)).unwrap();

    producer
        .write(&FaceState {
            lip_raiser: 0.5,
            ..Default::default()
        })
        .unwrap();
    assert!(wait_for(|| shared.snapshot().weight(E::MouthUpperLeft) == 0.5));

    producer
        .write(&FaceState {
            lip_raiser: -0.25,
            ..Default::default()
        })
        .unwrap();
    assert!(wait_for(|| shared.snapshot().weight(E::MouthLowerLeft) == 0.25));
    assert_eq!(shared.snapshot().weight(E::MouthUpperLeft), 0.5);

    poll.stop();
}
