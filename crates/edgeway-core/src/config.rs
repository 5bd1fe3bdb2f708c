//! Editor configuration.
//!
//! Configuration is fixed for the lifetime of a controller; changing it
//! means building a new one.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::snap::SnapMode;

/// Default grid spacing on both axes.
pub const DEFAULT_SNAP_GRID: f64 = 10.0;

/// Snap and alignment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Grid spacing on the x axis.
    pub x_snap_grid: f64,
    /// Grid spacing on the y axis.
    pub y_snap_grid: f64,
    /// Distance on x within which a vertical guide appears.
    /// Should be a multiple of `x_snap_grid`.
    pub alignment_x_tolerance: f64,
    /// Distance on y within which a horizontal guide appears.
    /// Should be a multiple of `y_snap_grid`.
    pub alignment_y_tolerance: f64,
    /// Which kinds of snapping apply while dragging nodes.
    pub snap_mode: SnapMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            x_snap_grid: DEFAULT_SNAP_GRID,
            y_snap_grid: DEFAULT_SNAP_GRID,
            alignment_x_tolerance: DEFAULT_SNAP_GRID * 2.0,
            alignment_y_tolerance: DEFAULT_SNAP_GRID * 2.0,
            snap_mode: SnapMode::All,
        }
    }
}

impl Configuration {
    /// Parse and validate configuration from JSON.
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that grid spacing is positive and tolerances are non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grids = [("x_snap_grid", self.x_snap_grid), ("y_snap_grid", self.y_snap_grid)];
        for (field, value) in grids {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("grid spacing must be positive, got {value}"),
                });
            }
        }
        for (field, value) in [
            ("alignment_x_tolerance", self.alignment_x_tolerance),
            ("alignment_y_tolerance", self.alignment_y_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("tolerance must be non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Grid spacing as a vector.
    pub fn grid(&self) -> Vec2 {
        Vec2::new(self.x_snap_grid, self.y_snap_grid)
    }

    /// Alignment tolerance as a vector.
    pub fn alignment_tolerance(&self) -> Vec2 {
        Vec2::new(self.alignment_x_tolerance, self.alignment_y_tolerance)
    }
}
