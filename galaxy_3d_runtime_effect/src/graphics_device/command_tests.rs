//! Unit tests for command.rs
//!
//! Tests per-stage binding tables and vertex binding validation.

use std::sync::Arc;
use crate::graphics_device::{
    Buffer, BufferView, Command, IndexType, Sampler, SampledImageSlot, SamplerDescriptor, ShaderStage,
    ShaderUniformSlot, Texture, VertexBufferBinding,
};
use crate::graphics_device::mock_graphics_device::{MockBuffer, MockSampler, MockTexture};

fn uniform_slot(name: &str, binding: u32) -> ShaderUniformSlot {
    ShaderUniformSlot { name: name.to_string(), binding }
}

fn vertices(index_type: IndexType, with_index_buffer: bool) -> VertexBufferBinding {
    VertexBufferBinding {
        vertex_buffer: Arc::new(MockBuffer { name: "vb".to_string(), size: 32 }),
        vertex_view: BufferView { offset: 0, length: 32 },
        index_buffer: with_index_buffer
            .then(|| Arc::new(MockBuffer { name: "ib".to_string(), size: 12 }) as Arc<dyn Buffer>),
        index_type,
        vertex_count: 4,
    }
}

#[test]
fn test_new_command_is_empty() {
    let command = Command::new("draw");
    assert_eq!(command.label, "draw");
    assert!(command.pipeline.is_none());
    assert_eq!(command.stencil_reference, 0);
    assert!(!command.is_valid());
}

#[test]
fn test_bind_buffer_per_stage() {
    let mut command = Command::new("draw");
    let view = BufferView { offset: 16, length: 64 };

    assert!(command.bind_buffer(ShaderStage::Vertex, uniform_slot("VertInfo", 0), view));
    assert!(command.bind_buffer(ShaderStage::Fragment, uniform_slot("u_time", 0), view));
    assert!(command.bind_buffer(ShaderStage::Fragment, uniform_slot("u_size", 2), view));

    assert_eq!(command.vertex_resources.buffers.len(), 1);
    assert_eq!(command.fragment_resources.buffers.len(), 2);
    assert_eq!(command.fragment_resources.buffer(2).unwrap().slot.name, "u_size");
    assert!(command.fragment_resources.buffer(1).is_none());
}

#[test]
fn test_compute_stage_rejected() {
    let mut command = Command::new("draw");
    assert!(!command.bind_buffer(ShaderStage::Compute, uniform_slot("x", 0), BufferView::default()));
    assert!(command.stage_resources(ShaderStage::Compute).is_none());
}

#[test]
fn test_bind_sampled_image() {
    let mut command = Command::new("draw");
    let texture: Arc<dyn Texture> = Arc::new(MockTexture::new("noise", 64, 64));
    let sampler: Arc<dyn Sampler> = Arc::new(MockSampler { descriptor: SamplerDescriptor::default() });
    let slot = SampledImageSlot { name: "u_noise".to_string(), texture_index: 1, sampler_index: 1 };

    assert!(command.bind_sampled_image(ShaderStage::Fragment, slot, texture, sampler));

    let fragment = command.stage_resources(ShaderStage::Fragment).unwrap();
    let bound = fragment.sampled_image(1).unwrap();
    assert_eq!(bound.slot.name, "u_noise");
    assert_eq!(bound.texture.label(), "noise");
    assert!(fragment.sampled_image(0).is_none());
}

#[test]
fn test_bind_vertices_requires_index_buffer_for_indexed_draws() {
    let mut command = Command::new("draw");
    assert!(!command.bind_vertices(vertices(IndexType::U16, false)));
    assert!(command.vertex_bindings.is_none());

    assert!(command.bind_vertices(vertices(IndexType::U16, true)));
    assert!(command.bind_vertices(vertices(IndexType::None, false)));
    assert_eq!(command.vertex_bindings.as_ref().unwrap().vertex_count, 4);
}
