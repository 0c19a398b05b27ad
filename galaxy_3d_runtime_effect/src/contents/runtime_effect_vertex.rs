/// Built-in vertex stage shared by every runtime effect
///
/// Runtime effects only provide a fragment stage. They are paired with this
/// vertex stage, which the backend library compiles ahead of time.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::graphics_device::{ShaderStageIoSlot, VertexFormat};

/// Entry point of the built-in vertex function
pub const RUNTIME_EFFECT_VERTEX_ENTRY_POINT: &str = "runtime_effect_vertex_main";

/// Uniform block name of `VertInfo`
pub const VERT_INFO_SLOT_NAME: &str = "VertInfo";

/// Binding of `VertInfo` in the vertex stage
pub const VERT_INFO_BINDING: u32 = 0;

/// Declared inputs of the built-in vertex function
pub const RUNTIME_EFFECT_VERTEX_STAGE_INPUTS: &[ShaderStageIoSlot] = &[
    ShaderStageIoSlot { name: "position", location: 0, format: VertexFormat::Float32x2 },
];

/// Vertex stage uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertInfo {
    /// Column-major model-view-projection matrix
    pub mvp: [[f32; 4]; 4],
}

impl VertInfo {
    pub fn new(mvp: Mat4) -> Self {
        Self { mvp: mvp.to_cols_array_2d() }
    }
}
