/// GraphicsContext - shared rendering state for contents objects
///
/// Holds the backend device and compiler together with the caches built on
/// top of them. One context lives as long as the device; contents objects
/// borrow it for each draw.

use std::sync::Arc;
use crate::contents::{BlendMode, ClipRestore, Entity};
use crate::graphics_device::{
    BlendFactor, BlendOperation, ColorAttachmentDescriptor, CompareFunction, GraphicsDevice,
    PipelineDescriptor, PixelFormat, PrimitiveType, RenderPass, SampleCount, SamplerCache,
    SamplerLibrary, ShaderCompiler, StencilAttachmentDescriptor, StencilOperation,
};
use crate::runtime_stage::{PipelineCache, ShaderFunctionRegistry};

// ============================================================================
// Config
// ============================================================================

/// Context-wide rendering configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Debug label of the context
    pub label: String,
    /// Format of color attachment 0 in built pipelines
    pub color_format: PixelFormat,
    /// Stencil attachment format in built pipelines
    pub stencil_format: PixelFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label: "Galaxy3D Context".to_string(),
            color_format: PixelFormat::B8G8R8A8Unorm,
            stencil_format: PixelFormat::S8Uint,
        }
    }
}

// ============================================================================
// GraphicsContext
// ============================================================================

/// Device, compiler, and the caches shared by every draw
pub struct GraphicsContext {
    device: Arc<dyn GraphicsDevice>,
    shader_functions: ShaderFunctionRegistry,
    pipelines: PipelineCache,
    samplers: Arc<dyn SamplerLibrary>,
    clip_restore: Arc<dyn ClipRestore>,
    config: Config,
}

impl GraphicsContext {
    /// Create a context with a device-backed sampler cache
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        compiler: Arc<dyn ShaderCompiler>,
        clip_restore: Arc<dyn ClipRestore>,
        config: Config,
    ) -> Self {
        let samplers: Arc<dyn SamplerLibrary> = Arc::new(SamplerCache::new(device.clone()));
        crate::engine_info!(
            "galaxy3d::GraphicsContext",
            "Created context '{}' (color {:?}, stencil {:?})",
            config.label,
            config.color_format,
            config.stencil_format
        );

        Self {
            device,
            shader_functions: ShaderFunctionRegistry::new(compiler),
            pipelines: PipelineCache::new(),
            samplers,
            clip_restore,
            config,
        }
    }

    /// Replace the sampler library
    pub fn with_sampler_library(mut self, samplers: Arc<dyn SamplerLibrary>) -> Self {
        self.samplers = samplers;
        self
    }

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// Registry of compiled runtime shader functions
    pub fn shader_functions(&self) -> &ShaderFunctionRegistry {
        &self.shader_functions
    }

    /// Pipeline cache
    pub fn pipelines(&self) -> &PipelineCache {
        &self.pipelines
    }

    pub fn sampler_library(&self) -> &Arc<dyn SamplerLibrary> {
        &self.samplers
    }

    /// Contents that reset stencil coverage after an overdraw-protected draw
    pub fn clip_restore(&self) -> &Arc<dyn ClipRestore> {
        &self.clip_restore
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ============================================================================
// PipelineOptions
// ============================================================================

/// Per-draw pipeline state derived from the pass and the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineOptions {
    pub sample_count: SampleCount,
    pub blend_mode: BlendMode,
    pub stencil_compare: CompareFunction,
    pub stencil_operation: StencilOperation,
    pub primitive_type: PrimitiveType,
}

impl PipelineOptions {
    /// Defaults for drawing `entity` into `pass`
    pub fn from_pass_and_entity(pass: &dyn RenderPass, entity: &Entity) -> Self {
        Self {
            sample_count: pass.render_target().sample_count,
            blend_mode: entity.blend_mode(),
            stencil_compare: CompareFunction::GreaterEqual,
            stencil_operation: StencilOperation::Keep,
            primitive_type: PrimitiveType::Triangle,
        }
    }

    /// Write these options into `descriptor`
    ///
    /// Expects color attachment 0 to be present; its format is kept and its
    /// blend equation is replaced.
    pub fn apply_to_descriptor(&self, descriptor: &mut PipelineDescriptor) {
        descriptor.sample_count = self.sample_count;
        descriptor.primitive_type = self.primitive_type;

        if let Some(color0) = descriptor.color_attachments.get_mut(&0) {
            apply_blend_mode(color0, self.blend_mode);
        }

        descriptor.set_stencil_attachment_descriptors(StencilAttachmentDescriptor {
            stencil_compare: self.stencil_compare,
            depth_stencil_pass: self.stencil_operation,
            ..StencilAttachmentDescriptor::default()
        });
    }
}

fn apply_blend_mode(color: &mut ColorAttachmentDescriptor, blend_mode: BlendMode) {
    use BlendFactor::*;

    let (src, dst) = match blend_mode {
        BlendMode::Clear => (Zero, Zero),
        BlendMode::Source => (One, Zero),
        BlendMode::Destination => (Zero, One),
        BlendMode::SourceOver => (One, OneMinusSourceAlpha),
        BlendMode::DestinationOver => (OneMinusDestinationAlpha, One),
        BlendMode::SourceIn => (DestinationAlpha, Zero),
        BlendMode::DestinationIn => (Zero, SourceAlpha),
        BlendMode::SourceOut => (OneMinusDestinationAlpha, Zero),
        BlendMode::DestinationOut => (Zero, OneMinusSourceAlpha),
        BlendMode::Plus => (One, One),
    };

    color.src_color_blend_factor = src;
    color.dst_color_blend_factor = dst;
    color.src_alpha_blend_factor = src;
    color.dst_alpha_blend_factor = dst;
    color.color_blend_op = BlendOperation::Add;
    color.alpha_blend_op = BlendOperation::Add;
}

#[cfg(test)]
#[path = "content_context_tests.rs"]
mod tests;
