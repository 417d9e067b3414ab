//! Tunable geometry and timing constants.

use thiserror::Error;

/// Geometry, timing and gesture parameters for a cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    /// Edge length of one sub-cube.
    pub block_size: f32,
    /// Multiplier on `block_size` for the distance between lattice points.
    pub layout_factor: f32,
    /// Duration of the assembly and reset animations.
    pub assembly_duration_ms: f64,
    /// How far a grabbed layer is pushed out, relative to its resting offset.
    pub lift_ratio: f32,
    pub lift_duration_ms: f64,
    /// Duration of the snap back onto a 90 degree angle after release.
    pub settle_duration_ms: f64,
    /// Layer radians per radian of pointer travel around the cube center.
    pub drag_sensitivity: f32,
    /// Animate blocks in from the origin when the cube is created.
    pub animate_assembly: bool,
    /// Highlight the layer under the pointer while idle.
    pub hover_highlight: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            block_size: 0.1,
            layout_factor: 1.0,
            assembly_duration_ms: 1000.0,
            lift_ratio: 1.3,
            lift_duration_ms: 250.0,
            settle_duration_ms: 250.0,
            drag_sensitivity: 3.0,
            animate_assembly: true,
            hover_highlight: true,
        }
    }
}

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("block size must be positive and finite, got {0}")]
    BlockSize(f32),
    #[error("layout factor must be positive and finite, got {0}")]
    LayoutFactor(f32),
    #[error("lift ratio must be non-negative and finite, got {0}")]
    LiftRatio(f32),
    #[error("{name} must be non-negative and finite, got {value}")]
    Duration { name: &'static str, value: f64 },
    #[error("drag sensitivity must be non-zero and finite, got {0}")]
    DragSensitivity(f32),
}

impl CubeConfig {
    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        if !(self.layout_factor.is_finite() && self.layout_factor > 0.0) {
            return Err(ConfigError::LayoutFactor(self.layout_factor));
        }
        if !(self.lift_ratio.is_finite() && self.lift_ratio >= 0.0) {
            return Err(ConfigError::LiftRatio(self.lift_ratio));
        }
        for (name, value) in [
            ("assembly duration", self.assembly_duration_ms),
            ("lift duration", self.lift_duration_ms),
            ("settle duration", self.settle_duration_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Duration { name, value });
            }
        }
        if !self.drag_sensitivity.is_finite() || self.drag_sensitivity == 0.0 {
            return Err(ConfigError::DragSensitivity(self.drag_sensitivity));
        }
        Ok(())
    }

    /// Distance between neighbouring lattice points.
    pub fn spacing(&self) -> f32 {
        self.block_size * self.layout_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(CubeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = CubeConfig {
            block_size: 0.0,
            ..CubeConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::BlockSize(0.0)));

        let bad = CubeConfig {
            settle_duration_ms: -1.0,
            ..CubeConfig::default()
        };
        assert_eq!(
            bad.validate(),
            Err(ConfigError::Duration {
                name: "settle duration",
                value: -1.0
            })
        );

        let bad = CubeConfig {
            drag_sensitivity: f32::NAN,
            ..CubeConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::DragSensitivity(_))));
    }

    #[test]
    fn test_error_message_names_field() {
        let err = ConfigError::Duration {
            name: "lift duration",
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "lift duration must be non-negative and finite, got inf");
    }
}
