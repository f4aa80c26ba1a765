use crate::{
    error::GridError,
    render::Instance,
    types::{ElementId, Rgba},
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bytes the frame driver holds per element between initialize and teardown:
/// origin, offset, scale, color, frame instance and two partition slots.
pub const BYTES_PER_ELEMENT: usize = 3 * size_of::<Vec3>()
    + size_of::<Rgba>()
    + size_of::<Instance>()
    + 2 * size_of::<ElementId>();

/// How the per-element stages of a tick are executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    /// Fork-join over a rayon thread pool.
    Parallel,
    /// One sequential pass per stage on the calling thread.
    Sequential,
}

/// Configuration for the grid, the noise motion and the selection styling.
///
/// `edge_size` is signed so that a host-supplied negative value can be
/// rejected by [`Config::validate`] instead of wrapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub edge_size: i32,
    pub spacing: f32,
    pub amplitude: f32,
    pub frequencies: Vec3,
    pub highlight_scale: f32,
    pub highlight_color: Rgba,
    pub normal_scale: f32,
    pub normal_color: Rgba,
    pub selection_enabled: bool,
    pub schedule: Schedule,
    /// Minimum number of consecutive indices handled by one parallel task.
    pub batch_size: usize,
    /// Worker count; `None` uses the available parallelism.
    pub num_threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edge_size: 10,
            spacing: 5.0,
            amplitude: 2.0,
            frequencies: Vec3::new(0.3, 0.5, 0.7),
            highlight_scale: 1.5,
            highlight_color: Rgba::GREEN,
            normal_scale: 1.0,
            normal_color: Rgba::WHITE,
            selection_enabled: true,
            schedule: Schedule::Parallel,
            batch_size: 1,
            num_threads: None,
        }
    }
}

impl Config {
    /// Parses a JSON configuration; missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks every field and returns the element count `edge_size³`.
    ///
    /// The element count must fit in `usize`, and the buffers allocated for
    /// it (see [`BYTES_PER_ELEMENT`]) must fit in `isize::MAX` bytes, which is
    /// the largest allocation Rust allows.
    ///
    /// ### Returns
    /// - `Ok(len)` with the number of elements.
    /// - `Err(GridError::InvalidConfiguration)` naming the first bad field.
    pub fn validate(&self) -> Result<usize, GridError> {
        if self.edge_size < 0 {
            return Err(GridError::InvalidConfiguration(format!(
                "edge_size must be non-negative, got {}",
                self.edge_size
            )));
        }
        let len = (self.edge_size as usize)
            .checked_pow(3)
            .ok_or_else(|| {
                GridError::InvalidConfiguration(format!(
                    "edge_size {} overflows the element count",
                    self.edge_size
                ))
            })?;
        // Buffer bytes must stay within the largest allowed allocation.
        len.checked_mul(BYTES_PER_ELEMENT)
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| {
                GridError::InvalidConfiguration(format!(
                    "edge_size {} needs more memory than can be addressed",
                    self.edge_size
                ))
            })?;

        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(GridError::InvalidConfiguration(format!(
                "spacing must be finite and positive, got {}",
                self.spacing
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(GridError::InvalidConfiguration(
                "amplitude must be finite".to_string(),
            ));
        }
        if !self.frequencies.is_finite() {
            return Err(GridError::InvalidConfiguration(
                "frequencies must be finite".to_string(),
            ));
        }
        if !self.highlight_scale.is_finite() || !self.normal_scale.is_finite() {
            return Err(GridError::InvalidConfiguration(
                "scales must be finite".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(GridError::InvalidConfiguration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(GridError::InvalidConfiguration(
                "num_threads must be at least 1".to_string(),
            ));
        }

        Ok(len)
    }
}
