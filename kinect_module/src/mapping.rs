use crate::face_state::FaceState;
use api::{LegacyExpressions, LegacyTrackingData};
use serde::{Deserialize, Serialize};

/// Jaw movement at or below this is treated as noise.
pub const JAW_OPEN_DEAD_ZONE: f32 = 0.2;
/// Stretcher-minus-depressor must exceed this to read as a smile.
pub const SMILE_DELTA_THRESHOLD: f32 = 0.1;
/// Brow raiser must be below this for a negative delta to read as sad.
pub const SAD_BROW_THRESHOLD: f32 = -0.3;
pub const MOUTH_CORNER_SCALE: f32 = 0.25;

/// The Kinect solver has no eye-closure unit, so openness is pinned.
pub const EYE_OPENNESS: f32 = 1.0;

/// What to do with shapes a tick did not write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ShapeWriteMode {
    /// Zero every shape the current tick left alone.
    #[default]
    #[serde(alias = "reset")]
    Reset,
    /// Leave untouched shapes at whatever the host last held.
    #[serde(alias = "carry_over", alias = "carryover")]
    CarryOver,
}

/// One tick's worth of mapped weights. `None` means the branch that ran did
/// not write that shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendshapeSet {
    pub eye_openness: f32,
    weights: [Option<f32>; LegacyExpressions::Max as usize],
}

impl Default for BlendshapeSet {
    fn default() -> Self {
        Self {
            eye_openness: EYE_OPENNESS,
            weights: [None; LegacyExpressions::Max as usize],
        }
    }
}

impl BlendshapeSet {
    pub fn get(&self, expr: LegacyExpressions) -> Option<f32> {
        self.weights.get(expr as usize).copied().flatten()
    }

    pub fn is_written(&self, expr: LegacyExpressions) -> bool {
        self.get(expr).is_some()
    }

    /// Shapes written this tick, in index order.
    pub fn written(&self) -> impl Iterator<Item = (LegacyExpressions, f32)> + '_ {
        LegacyExpressions::ALL
            .iter()
            .filter_map(move |&e| self.get(e).map(|w| (e, w)))
    }

    fn set(&mut self, expr: LegacyExpressions, weight: f32) {
        if let Some(slot) = self.weights.get_mut(expr as usize) {
            *slot = Some(weight);
        }
    }

    fn set_pair(&mut self, left: LegacyExpressions, right: LegacyExpressions, weight: f32) {
        self.set(left, weight);
        self.set(right, weight);
    }

    pub fn apply(&self, data: &mut LegacyTrackingData, mode: ShapeWriteMode) {
        data.eye.left.openness = self.eye_openness;
        data.eye.right.openness = self.eye_openness;
        data.eye.combined.openness = self.eye_openness;

        for &expr in LegacyExpressions::ALL.iter() {
            match (self.get(expr), mode) {
                (Some(weight), _) => data.set_weight(expr, weight),
                (None, ShapeWriteMode::Reset) => data.set_weight(expr, 0.0),
                (None, ShapeWriteMode::CarryOver) => {}
            }
        }
    }
}

/// Maps raw Kinect action units onto legacy blendshapes. Stateless; every
/// tick is evaluated from scratch.
pub fn map_face_state(state: &FaceState) -> BlendshapeSet {
    use LegacyExpressions::*;

    let mut set = BlendshapeSet::default();

    // Brows stand in for the eye lids
    set.set_pair(EyeWidenLeft, EyeWidenRight, state.brow_raiser);
    set.set(EyeWidenCombined, state.brow_raiser);
    set.set_pair(EyeSqueezeLeft, EyeSqueezeRight, state.brow_lower);
    set.set(EyeSqueezeCombined, state.brow_lower);

    let jaw = if state.jaw_lower > JAW_OPEN_DEAD_ZONE {
        state.jaw_lower
    } else {
        0.0
    };
    set.set(JawOpen, jaw);

    let lcd = state.lip_corner_depressor;
    let delta = state.lip_stretcher - lcd;

    // Smile and sad are independent; the thresholds never overlap anyway.
    let smile = if delta > SMILE_DELTA_THRESHOLD && lcd < 0.0 {
        delta.min(1.0) * MOUTH_CORNER_SCALE
    } else {
        0.0
    };
    set.set_pair(MouthSmileLeft, MouthSmileRight, smile);

    let sad = if delta < 0.0 && state.brow_raiser < SAD_BROW_THRESHOLD {
        -lcd * MOUTH_CORNER_SCALE
    } else {
        0.0
    };
    set.set_pair(MouthSadLeft, MouthSadRight, sad);

    if state.lip_raiser >= 0.0 {
        set.set_pair(MouthUpperLeft, MouthUpperRight, state.lip_raiser);
    } else {
        set.set_pair(MouthLowerLeft, MouthLowerRight, state.lip_raiser.abs());
    }

    if lcd >= 0.0 {
        set.set_pair(MouthUpperUpLeft, MouthUpperUpRight, lcd);
    } else {
        set.set_pair(MouthLowerDownLeft, MouthLowerDownRight, lcd.abs());
    }

    set
}
