//! Output handed to the rendering collaborator once per tick.

use crate::types::{ElementId, Rgba};
use glam::{Mat4, Quat, Vec3};

/// Per-element draw record: final position, color and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub index: ElementId,
    pub position: Vec3,
    pub color: Rgba,
    pub scale: Vec3,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            index: 0,
            position: Vec3::ZERO,
            color: Rgba::WHITE,
            scale: Vec3::ONE,
        }
    }
}

impl Instance {
    /// Translation-scale matrix with identity rotation, for instanced draws.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }
}

/// Receives the frame at the end of every tick.
///
/// `frame` always holds one instance per element, in element index order.
pub trait RenderSink {
    fn present(&mut self, frame: &[Instance]);
}

/// Sink that keeps a copy of the most recent frame.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames_presented: u64,
    pub last_frame: Vec<Instance>,
}

impl RenderSink for FrameRecorder {
    fn present(&mut self, frame: &[Instance]) {
        self.frames_presented += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame);
    }
}
