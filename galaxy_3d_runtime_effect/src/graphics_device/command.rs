/// Draw commands and the resource slots they bind

use std::collections::BTreeMap;
use std::sync::Arc;
use crate::graphics_device::{
    BufferView, IndexType, Pipeline, Sampler, ShaderStage, Texture, VertexBufferBinding,
};

// ===== SLOTS =====

/// Uniform buffer slot of a shader stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderUniformSlot {
    /// Uniform block name in the shader
    pub name: String,
    /// Buffer binding index
    pub binding: u32,
}

/// Combined texture + sampler slot of a shader stage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampledImageSlot {
    /// Sampler uniform name in the shader
    pub name: String,
    /// Texture binding index
    pub texture_index: u32,
    /// Sampler binding index
    pub sampler_index: u32,
}

/// A uniform buffer range bound to a slot
#[derive(Debug, Clone)]
pub struct BoundBuffer {
    pub slot: ShaderUniformSlot,
    /// Range inside the pass transients buffer
    pub view: BufferView,
}

/// A texture and sampler bound to a slot
#[derive(Clone)]
pub struct BoundSampledImage {
    pub slot: SampledImageSlot,
    pub texture: Arc<dyn Texture>,
    pub sampler: Arc<dyn Sampler>,
}

/// Resources bound for one shader stage, keyed by binding index
#[derive(Clone, Default)]
pub struct StageResources {
    pub buffers: BTreeMap<u32, BoundBuffer>,
    pub sampled_images: BTreeMap<u32, BoundSampledImage>,
}

impl StageResources {
    /// Buffer bound at `binding`
    pub fn buffer(&self, binding: u32) -> Option<&BoundBuffer> {
        self.buffers.get(&binding)
    }

    /// Sampled image bound at `texture_index`
    pub fn sampled_image(&self, texture_index: u32) -> Option<&BoundSampledImage> {
        self.sampled_images.get(&texture_index)
    }
}

// ===== COMMAND =====

/// One draw: pipeline, vertex data, per-stage resources and stencil reference
#[derive(Clone)]
pub struct Command {
    /// Debug label
    pub label: String,
    /// Pipeline to draw with
    pub pipeline: Option<Arc<dyn Pipeline>>,
    /// Stencil reference value
    pub stencil_reference: u32,
    /// Vertex and index buffers
    pub vertex_bindings: Option<VertexBufferBinding>,
    /// Vertex stage resources
    pub vertex_resources: StageResources,
    /// Fragment stage resources
    pub fragment_resources: StageResources,
}

impl Command {
    /// Create an empty command
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            pipeline: None,
            stencil_reference: 0,
            vertex_bindings: None,
            vertex_resources: StageResources::default(),
            fragment_resources: StageResources::default(),
        }
    }

    /// Attach vertex (and index) buffers
    ///
    /// Returns false if an index type is declared without an index buffer.
    pub fn bind_vertices(&mut self, bindings: VertexBufferBinding) -> bool {
        if bindings.index_type != IndexType::None && bindings.index_buffer.is_none() {
            return false;
        }
        self.vertex_bindings = Some(bindings);
        true
    }

    /// Bind a uniform buffer range to a stage slot
    ///
    /// Returns false for stages a draw command cannot address.
    pub fn bind_buffer(&mut self, stage: ShaderStage, slot: ShaderUniformSlot, view: BufferView) -> bool {
        let Some(resources) = self.stage_resources_mut(stage) else {
            return false;
        };
        resources.buffers.insert(slot.binding, BoundBuffer { slot, view });
        true
    }

    /// Bind a texture and sampler to a stage slot
    pub fn bind_sampled_image(
        &mut self,
        stage: ShaderStage,
        slot: SampledImageSlot,
        texture: Arc<dyn Texture>,
        sampler: Arc<dyn Sampler>,
    ) -> bool {
        let Some(resources) = self.stage_resources_mut(stage) else {
            return false;
        };
        resources.sampled_images.insert(slot.texture_index, BoundSampledImage { slot, texture, sampler });
        true
    }

    /// Resources bound for `stage`
    pub fn stage_resources(&self, stage: ShaderStage) -> Option<&StageResources> {
        match stage {
            ShaderStage::Vertex => Some(&self.vertex_resources),
            ShaderStage::Fragment => Some(&self.fragment_resources),
            ShaderStage::Compute => None,
        }
    }

    /// Whether the command has everything needed to draw
    pub fn is_valid(&self) -> bool {
        self.pipeline.is_some() && self.vertex_bindings.is_some()
    }

    fn stage_resources_mut(&mut self, stage: ShaderStage) -> Option<&mut StageResources> {
        match stage {
            ShaderStage::Vertex => Some(&mut self.vertex_resources),
            ShaderStage::Fragment => Some(&mut self.fragment_resources),
            ShaderStage::Compute => None,
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
