use crate::mapping::{BlendshapeSet, ShapeWriteMode};
use api::LegacyTrackingData;
use std::sync::{Arc, PoisonError, RwLock};

/// Receives the mapped weights once per tick.
pub trait BlendshapeSink: Send + 'static {
    fn publish(&mut self, set: &BlendshapeSet);
}

/// Tracking data shared between the poll thread and the host's update call.
#[derive(Clone, Default)]
pub struct SharedTrackingData {
    data: Arc<RwLock<LegacyTrackingData>>,
    mode: ShapeWriteMode,
}

impl SharedTrackingData {
    pub fn new(mode: ShapeWriteMode) -> Self {
        Self {
            data: Arc::new(RwLock::new(LegacyTrackingData::default())),
            mode,
        }
    }

    pub fn mode(&self) -> ShapeWriteMode {
        self.mode
    }

    pub fn snapshot(&self) -> LegacyTrackingData {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn copy_into(&self, target: &mut LegacyTrackingData) {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        target.clone_from(&*data);
    }
}

impl BlendshapeSink for SharedTrackingData {
    fn publish(&mut self, set: &BlendshapeSet) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        set.apply(&mut data, self.mode);
    }
}
