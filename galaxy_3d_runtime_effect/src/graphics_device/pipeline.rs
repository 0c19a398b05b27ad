/// Pipeline trait and pipeline descriptor
///
/// A `PipelineDescriptor` is a plain value: two descriptors with equal fields
/// hash and compare equal, which makes it usable directly as a cache key.
/// Shader functions inside it compare by identity.

use std::collections::BTreeMap;
use std::sync::Arc;
use bitflags::bitflags;
use crate::graphics_device::{ShaderFunction, ShaderFunctionRef, ShaderStage, ShaderStageIoSlot};

// ===== FORMATS =====

/// Attachment pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Unknown,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    B8G8R8A8Unorm,
    S8Uint,
    D24UnormS8Uint,
    D32FloatS8Uint,
}

impl PixelFormat {
    /// Whether the format carries a stencil component
    pub fn has_stencil(&self) -> bool {
        matches!(self, PixelFormat::S8Uint | PixelFormat::D24UnormS8Uint | PixelFormat::D32FloatS8Uint)
    }
}

/// Multisample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCount {
    /// 1 sample (no multisampling)
    Count1,
    /// 4 samples
    Count4,
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Triangle,
    TriangleStrip,
    Line,
    LineStrip,
    Point,
}

// ===== DEPTH/STENCIL ENUMS =====

/// Comparison function for stencil tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never pass
    Never,
    /// Always pass
    Always,
    /// Pass if reference < stored value
    Less,
    /// Pass if reference == stored value
    Equal,
    /// Pass if reference <= stored value
    LessEqual,
    /// Pass if reference > stored value
    Greater,
    /// Pass if reference != stored value
    NotEqual,
    /// Pass if reference >= stored value
    GreaterEqual,
}

/// Stencil operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOperation {
    /// Keep current value
    Keep,
    /// Set to zero
    Zero,
    /// Replace with reference value
    SetToReferenceValue,
    /// Increment and clamp to max
    IncrementClamp,
    /// Decrement and clamp to zero
    DecrementClamp,
    /// Bitwise invert
    Invert,
    /// Increment and wrap around
    IncrementWrap,
    /// Decrement and wrap around
    DecrementWrap,
}

// ===== COLOR BLEND =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SourceAlpha,
    OneMinusSourceAlpha,
    DestinationAlpha,
    OneMinusDestinationAlpha,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// result = src * srcFactor + dst * dstFactor
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
    /// result = dst * dstFactor - src * srcFactor
    ReverseSubtract,
}

bitflags! {
    /// Color channels written by an attachment
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const RED = 0b0001;
        const GREEN = 0b0010;
        const BLUE = 0b0100;
        const ALPHA = 0b1000;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

// ===== ATTACHMENTS =====

/// Color attachment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorAttachmentDescriptor {
    pub format: PixelFormat,
    pub blending_enabled: bool,
    pub src_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOperation,
    pub dst_color_blend_factor: BlendFactor,
    pub src_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOperation,
    pub dst_alpha_blend_factor: BlendFactor,
    pub write_mask: ColorWriteMask,
}

impl ColorAttachmentDescriptor {
    /// Attachment with the given format and blending toggle, source-over factors
    pub fn new(format: PixelFormat, blending_enabled: bool) -> Self {
        Self {
            format,
            blending_enabled,
            ..Self::default()
        }
    }
}

impl Default for ColorAttachmentDescriptor {
    fn default() -> Self {
        Self {
            format: PixelFormat::Unknown,
            blending_enabled: false,
            src_color_blend_factor: BlendFactor::SourceAlpha,
            color_blend_op: BlendOperation::Add,
            dst_color_blend_factor: BlendFactor::OneMinusSourceAlpha,
            src_alpha_blend_factor: BlendFactor::One,
            alpha_blend_op: BlendOperation::Add,
            dst_alpha_blend_factor: BlendFactor::OneMinusSourceAlpha,
            write_mask: ColorWriteMask::ALL,
        }
    }
}

/// Stencil state for one face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilAttachmentDescriptor {
    /// Comparison against the stencil reference
    pub stencil_compare: CompareFunction,
    /// Action when the stencil test fails
    pub stencil_failure: StencilOperation,
    /// Action when the stencil test passes but depth fails
    pub depth_failure: StencilOperation,
    /// Action when both tests pass
    pub depth_stencil_pass: StencilOperation,
    /// Bits read for the comparison
    pub read_mask: u32,
    /// Bits written
    pub write_mask: u32,
}

impl Default for StencilAttachmentDescriptor {
    fn default() -> Self {
        Self {
            stencil_compare: CompareFunction::Always,
            stencil_failure: StencilOperation::Keep,
            depth_failure: StencilOperation::Keep,
            depth_stencil_pass: StencilOperation::Keep,
            read_mask: !0,
            write_mask: !0,
        }
    }
}

// ===== VERTEX DESCRIPTOR =====

/// Interleaved single-buffer vertex layout derived from stage inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexDescriptor {
    inputs: Vec<ShaderStageIoSlot>,
    stride: u32,
}

impl VertexDescriptor {
    /// Create an empty vertex descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the declared inputs of a vertex stage
    ///
    /// Inputs are ordered by location and packed back to back. Returns
    /// false (leaving the descriptor untouched) if two inputs share a location.
    pub fn set_stage_inputs(&mut self, inputs: &[ShaderStageIoSlot]) -> bool {
        let mut sorted = inputs.to_vec();
        sorted.sort_by_key(|slot| slot.location);
        if sorted.windows(2).any(|pair| pair[0].location == pair[1].location) {
            return false;
        }

        self.stride = sorted.iter().map(|slot| slot.format.size_bytes()).sum();
        self.inputs = sorted;
        true
    }

    /// Inputs ordered by location
    pub fn inputs(&self) -> &[ShaderStageIoSlot] {
        &self.inputs
    }

    /// Bytes between consecutive vertices
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset of the input at `location`
    pub fn offset_of(&self, location: u32) -> Option<u32> {
        let mut offset = 0;
        for slot in &self.inputs {
            if slot.location == location {
                return Some(offset);
            }
            offset += slot.format.size_bytes();
        }
        None
    }
}

// ===== PIPELINE DESCRIPTOR =====

/// Full shader + fixed-function state of a graphics pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineDescriptor {
    /// Debug label
    pub label: String,
    /// Vertex stage function
    pub vertex_function: Option<ShaderFunctionRef>,
    /// Fragment stage function
    pub fragment_function: Option<ShaderFunctionRef>,
    /// Vertex buffer layout
    pub vertex_descriptor: Option<VertexDescriptor>,
    /// Color attachments by index
    pub color_attachments: BTreeMap<usize, ColorAttachmentDescriptor>,
    /// Stencil state for front faces
    pub front_stencil: Option<StencilAttachmentDescriptor>,
    /// Stencil state for back faces
    pub back_stencil: Option<StencilAttachmentDescriptor>,
    /// Stencil attachment format
    pub stencil_format: PixelFormat,
    /// Multisample count
    pub sample_count: SampleCount,
    /// Primitive topology
    pub primitive_type: PrimitiveType,
}

impl PipelineDescriptor {
    /// Create an empty descriptor with a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertex_function: None,
            fragment_function: None,
            vertex_descriptor: None,
            color_attachments: BTreeMap::new(),
            front_stencil: None,
            back_stencil: None,
            stencil_format: PixelFormat::Unknown,
            sample_count: SampleCount::Count1,
            primitive_type: PrimitiveType::Triangle,
        }
    }

    /// Attach a shader function to the slot matching its stage
    ///
    /// Returns false for compute functions, which have no place in a
    /// graphics pipeline.
    pub fn add_stage_entrypoint(&mut self, function: Arc<dyn ShaderFunction>) -> bool {
        match function.stage() {
            ShaderStage::Vertex => self.vertex_function = Some(function.into()),
            ShaderStage::Fragment => self.fragment_function = Some(function.into()),
            ShaderStage::Compute => return false,
        }
        true
    }

    /// Set the vertex layout
    pub fn set_vertex_descriptor(&mut self, descriptor: VertexDescriptor) {
        self.vertex_descriptor = Some(descriptor);
    }

    /// Set the color attachment at `index`
    pub fn set_color_attachment(&mut self, index: usize, descriptor: ColorAttachmentDescriptor) {
        self.color_attachments.insert(index, descriptor);
    }

    /// Color attachment at `index`
    pub fn color_attachment(&self, index: usize) -> Option<&ColorAttachmentDescriptor> {
        self.color_attachments.get(&index)
    }

    /// Use the same stencil state for both faces
    pub fn set_stencil_attachment_descriptors(&mut self, descriptor: StencilAttachmentDescriptor) {
        self.front_stencil = Some(descriptor);
        self.back_stencil = Some(descriptor);
    }

    /// Set the stencil attachment format
    pub fn set_stencil_pixel_format(&mut self, format: PixelFormat) {
        self.stencil_format = format;
    }

    /// Whether either stage function is `function`
    pub fn references(&self, function: &Arc<dyn ShaderFunction>) -> bool {
        self.vertex_function.as_ref().is_some_and(|f| f.is(function))
            || self.fragment_function.as_ref().is_some_and(|f| f.is(function))
    }
}

// ===== PIPELINE TRAIT =====

/// Pipeline resource trait
///
/// Implemented by backend-specific pipeline types. Immutable once built.
pub trait Pipeline: Send + Sync {
    /// Descriptor this pipeline was built from
    fn descriptor(&self) -> &PipelineDescriptor;
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
