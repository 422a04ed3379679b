//! Per-frame draw recording
//!
//! Draws are issued in immediate-mode style (set uniforms, draw, set
//! uniforms, draw) but a wgpu render pass wants every buffer written before it
//! is encoded. [`FrameRecorder`] bridges the two: uniform writes update a
//! [`UniformState`], and every draw snapshots the current object block. The
//! engine then uploads all snapshots at once and replays the draws with
//! dynamic offsets.

use crate::gfx::bridge::{UniformSink, UniformValue};
use crate::gfx::geometry::PrimitiveKind;

use super::uniforms::{ObjectUniform, SceneUniform, UniformState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedDraw {
    pub kind: PrimitiveKind,
    pub uniform: ObjectUniform,
}

#[derive(Debug, Default)]
pub struct FrameRecorder {
    state: UniformState,
    draws: Vec<RecordedDraw>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous frame's draws. Uniform state carries over, the
    /// same way GL program state outlives a frame.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    pub fn record_draw(&mut self, kind: PrimitiveKind) {
        self.draws.push(RecordedDraw {
            kind,
            uniform: self.state.object,
        });
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn object_uniforms(&self) -> Vec<ObjectUniform> {
        self.draws.iter().map(|draw| draw.uniform).collect()
    }

    pub fn scene_uniform(&self) -> SceneUniform {
        self.state.scene_uniform()
    }

    pub fn state(&self) -> &UniformState {
        &self.state
    }
}

impl UniformSink for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.state.set_uniform(name, value);
    }
}
