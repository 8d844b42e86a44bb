//! Engine configuration surface.
//!
//! The engine trusts these values: ranges are enforced by whoever edits them,
//! and out-of-range inputs only produce the documented boundary behaviours.
//! Defaults are identities, so a default config leaves clips untouched.

use serde::{Deserialize, Serialize};

use crate::classify::{BodyPart, EnergyPart};
use crate::curves::CurveOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Global time divisor applied after energy scaling.
    pub timescale: f32,
    /// Per-axis rotation scale factors.
    pub rotations: AxisScale,
    pub energy: EnergyConfig,
    pub delays: DelayConfig,
    pub curve: CurveConfig,
    pub space: SpaceConfig,
    /// Zero the root position channel while set.
    pub lock_position: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timescale: 1.0,
            rotations: AxisScale::default(),
            energy: EnergyConfig::default(),
            delays: DelayConfig::default(),
            curve: CurveConfig::default(),
            space: SpaceConfig::default(),
            lock_position: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(s: &str) -> Result<Self, crate::error::TransformError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Energy factor for a region.
    pub fn energy_factor(&self, part: EnergyPart) -> f32 {
        match part {
            EnergyPart::Upper => self.energy.upper,
            EnergyPart::Lower => self.energy.lower,
        }
    }

    /// Delay parameter for a delay-partition key.
    pub fn delay_param(&self, part: BodyPart) -> f32 {
        match part {
            BodyPart::Head | BodyPart::Body => self.delays.body,
            BodyPart::LeftArm | BodyPart::LeftLeg => self.delays.left,
            BodyPart::RightArm | BodyPart::RightLeg => self.delays.right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisScale {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for AxisScale {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl AxisScale {
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0 && self.z == 1.0
    }

    #[inline]
    pub fn as_array(&self) -> [f64; 3] {
        [self.x as f64, self.y as f64, self.z as f64]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub upper: f32,
    pub lower: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            upper: 1.0,
            lower: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub left: f32,
    pub right: f32,
    pub body: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisToggle {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Default for AxisToggle {
    fn default() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }
}

impl AxisToggle {
    #[inline]
    pub fn as_array(&self) -> [bool; 3] {
        [self.x, self.y, self.z]
    }
}

/// Which curve-partition regions receive the curve transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurveParts {
    pub head: bool,
    pub body: bool,
    pub left_arm: bool,
    pub right_arm: bool,
    pub left_leg: bool,
    pub right_leg: bool,
}

impl Default for CurveParts {
    fn default() -> Self {
        Self {
            head: true,
            body: true,
            left_arm: true,
            right_arm: true,
            left_leg: true,
            right_leg: true,
        }
    }
}

impl CurveParts {
    pub fn enabled(&self, part: BodyPart) -> bool {
        match part {
            BodyPart::Head => self.head,
            BodyPart::Body => self.body,
            BodyPart::LeftArm => self.left_arm,
            BodyPart::RightArm => self.right_arm,
            BodyPart::LeftLeg => self.left_leg,
            BodyPart::RightLeg => self.right_leg,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Registry name of the transform (`lowpass`, `gaussian`, `capMin`, ...).
    pub equation: String,
    pub threshold: Option<f64>,
    pub axes: AxisToggle,
    pub parts: CurveParts,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            equation: "lowpass".to_string(),
            threshold: None,
            axes: AxisToggle::default(),
            parts: CurveParts::default(),
        }
    }
}

impl CurveConfig {
    pub fn options(&self) -> CurveOptions {
        CurveOptions {
            threshold: self.threshold,
        }
    }
}

/// Valley-delay parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpaceConfig {
    /// Seconds added per valley; `0` disables the pass.
    pub delay: f32,
    /// Motion threshold in `[0, 1]`; also sets the padding stride.
    pub threshold: f64,
    /// Intervals must be longer than this many frames to count as valleys.
    pub min_window: usize,
    /// Moving-average window applied to the motion series (`<= 1` disables).
    pub window_size: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            delay: 0.0,
            threshold: 0.9,
            min_window: 5,
            window_size: 1,
        }
    }
}
