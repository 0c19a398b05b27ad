/// Geometry collaborator: turns an entity into vertex data for one draw

use glam::Mat4;
use crate::error::Result;
use crate::graphics_device::{PrimitiveType, RenderPass, VertexBufferBinding};
use crate::contents::{Entity, GraphicsContext};

/// Vertex data and placement produced for one draw
#[derive(Clone)]
pub struct GeometryResult {
    /// Topology of `vertex_buffer`
    pub primitive_type: PrimitiveType,
    /// Vertex (and index) buffers
    pub vertex_buffer: VertexBufferBinding,
    /// Model-view-projection transform for the vertex stage
    pub transform: Mat4,
    /// Set when the vertices may overlap and coverage must be counted once
    pub prevent_overdraw: bool,
}

/// Source of vertex data (paths, rectangles, strokes...)
///
/// Tessellation itself lives outside this crate.
pub trait Geometry: Send + Sync {
    /// Produce vertices for `entity`, staging any data into the pass transients
    fn position_buffer(
        &self,
        context: &GraphicsContext,
        entity: &Entity,
        pass: &mut dyn RenderPass,
    ) -> Result<GeometryResult>;
}
