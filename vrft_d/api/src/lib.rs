use anyhow::Result;
use serde::{Deserialize, Serialize};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacySingleEyeData {
    pub openness: f32,
}

impl Default for LegacySingleEyeData {
    fn default() -> Self {
        Self { openness: 1.0 }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyEyeData {
    pub left: LegacySingleEyeData,
    pub right: LegacySingleEyeData,
    pub combined: LegacySingleEyeData,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionShape {
    pub weight: f32,
}

/// Host-side tracking state. Modules write into it every frame; shapes a
/// module does not touch keep whatever value they held before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTrackingData {
    pub eye: LegacyEyeData,
    pub shapes: Vec<ExpressionShape>,
}

impl Default for LegacyTrackingData {
    fn default() -> Self {
        Self {
            eye: LegacyEyeData::default(),
            shapes: vec![ExpressionShape::default(); LegacyExpressions::Max as usize],
        }
    }
}

impl LegacyTrackingData {
    pub fn weight(&self, expr: LegacyExpressions) -> f32 {
        self.shapes
            .get(expr as usize)
            .map(|s| s.weight)
            .unwrap_or_default()
    }

    pub fn set_weight(&mut self, expr: LegacyExpressions, weight: f32) {
        if let Some(shape) = self.shapes.get_mut(expr as usize) {
            shape.weight = weight;
        }
    }

    /// Named view of every shape, in index order.
    pub fn named_weights(&self) -> Vec<(&'static str, f32)> {
        LegacyExpressions::ALL
            .iter()
            .map(|&e| (e.name(), self.weight(e)))
            .collect()
    }
}

/// SRanipal v1 style shapes the host still accepts from legacy modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LegacyExpressions {
    // Eye Expressions
    EyeWidenLeft = 0,
    EyeWidenRight,
    EyeWidenCombined,
    EyeSqueezeLeft,
    EyeSqueezeRight,
    EyeSqueezeCombined,

    // Jaw
    JawOpen,

    // Smile / Sad
    MouthSmileLeft,
    MouthSmileRight,
    MouthSadLeft,
    MouthSadRight,

    // Mouth Direction group
    MouthUpperLeft,
    MouthUpperRight,
    MouthLowerLeft,
    MouthLowerRight,

    // Upper lip raiser / lower lip depressor
    MouthUpperUpLeft,
    MouthUpperUpRight,
    MouthLowerDownLeft,
    MouthLowerDownRight,

    Max,
}

impl LegacyExpressions {
    pub const ALL: [LegacyExpressions; LegacyExpressions::Max as usize] = [
        Self::EyeWidenLeft,
        Self::EyeWidenRight,
        Self::EyeWidenCombined,
        Self::EyeSqueezeLeft,
        Self::EyeSqueezeRight,
        Self::EyeSqueezeCombined,
        Self::JawOpen,
        Self::MouthSmileLeft,
        Self::MouthSmileRight,
        Self::MouthSadLeft,
        Self::MouthSadRight,
        Self::MouthUpperLeft,
        Self::MouthUpperRight,
        Self::MouthLowerLeft,
        Self::MouthLowerRight,
        Self::MouthUpperUpLeft,
        Self::MouthUpperUpRight,
        Self::MouthLowerDownLeft,
        Self::MouthLowerDownRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::EyeWidenLeft => "EyeWidenLeft",
            Self::EyeWidenRight => "EyeWidenRight",
            Self::EyeWidenCombined => "EyeWidenCombined",
            Self::EyeSqueezeLeft => "EyeSqueezeLeft",
            Self::EyeSqueezeRight => "EyeSqueezeRight",
            Self::EyeSqueezeCombined => "EyeSqueezeCombined",
            Self::JawOpen => "JawOpen",
            Self::MouthSmileLeft => "MouthSmileLeft",
            Self::MouthSmileRight => "MouthSmileRight",
            Self::MouthSadLeft => "MouthSadLeft",
            Self::MouthSadRight => "MouthSadRight",
            Self::MouthUpperLeft => "MouthUpperLeft",
            Self::MouthUpperRight => "MouthUpperRight",
            Self::MouthLowerLeft => "MouthLowerLeft",
            Self::MouthLowerRight => "MouthLowerRight",
            Self::MouthUpperUpLeft => "MouthUpperUpLeft",
            Self::MouthUpperUpRight => "MouthUpperUpRight",
            Self::MouthLowerDownLeft => "MouthLowerDownLeft",
            Self::MouthLowerDownRight => "MouthLowerDownRight",
            Self::Max => "Max",
        }
    }
}

impl TryFrom<usize> for LegacyExpressions {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(value).copied().ok_or(())
    }
}

/// What a module managed to bring up during initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCapabilities {
    pub eye: bool,
    pub lip: bool,
}

impl ModuleCapabilities {
    pub fn enabled() -> Self {
        Self {
            eye: true,
            lip: true,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.eye || self.lip
    }
}

/// log level for module logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

/// logger callback for modules
pub type LogCallback = extern "C" fn(level: LogLevel, target: *const i8, message: *const i8);

/// Logger interface for modules
#[derive(Clone)]
pub struct ModuleLogger {
    callback: LogCallback,
    module_name: String,
}

impl ModuleLogger {
    pub fn new(callback: LogCallback, module_name: String) -> Self {
        Self {
            callback,
            module_name,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        let target = to_c_string(&self.module_name);
        let msg = to_c_string(message);
        (self.callback)(level, target.as_ptr().cast(), msg.as_ptr().cast());
    }
}

// Interior NULs would truncate the message on the host side anyway.
fn to_c_string(s: &str) -> std::ffi::CString {
    let bytes: Vec<u8> = s.bytes().filter(|&b| b != 0).collect();
    std::ffi::CString::new(bytes).unwrap_or_default()
}

pub trait TrackingModule {
    /// Brings the module up. Failures are reported as disabled capabilities,
    /// never as errors.
    fn initialize(&mut self, logger: ModuleLogger) -> ModuleCapabilities;
    fn update(&mut self, data: &mut LegacyTrackingData) -> Result<()>;
    fn unload(&mut self);
}
