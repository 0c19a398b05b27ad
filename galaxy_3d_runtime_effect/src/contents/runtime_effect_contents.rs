/// RuntimeEffectContents - draws geometry shaded by a runtime stage
///
/// Each `render` call resolves the stage's fragment function, builds (or
/// reuses) a pipeline for it, binds the stage's uniforms and textures, and
/// records one draw command. Geometry that may overlap itself is drawn with
/// overdraw protection and followed by a clip restore.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::graphics_device::{
    ColorAttachmentDescriptor, Command, PipelineDescriptor, RenderPass, ShaderStage,
    ShaderUniformSlot, VertexDescriptor,
};
use crate::runtime_stage::{ResourceBinder, RuntimeStage, TextureInput};
use crate::contents::{
    ClipOverdrawGuard, Entity, Geometry, GraphicsContext, PipelineOptions, VertInfo,
    RUNTIME_EFFECT_VERTEX_ENTRY_POINT, VERT_INFO_BINDING, VERT_INFO_SLOT_NAME,
};

/// Label of pipelines built for runtime stages
pub const RUNTIME_STAGE_PIPELINE_LABEL: &str = "Runtime Stage";

/// Label of recorded draw commands
pub const RUNTIME_EFFECT_COMMAND_LABEL: &str = "RuntimeEffectContents";

/// Contents shaded by a runtime-loaded fragment stage
pub struct RuntimeEffectContents {
    runtime_stage: Option<Arc<RuntimeStage>>,
    uniform_data: Arc<[u8]>,
    texture_inputs: Vec<TextureInput>,
    geometry: Option<Arc<dyn Geometry>>,
}

impl Default for RuntimeEffectContents {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeEffectContents {
    /// Create empty contents (needs a stage and geometry before drawing)
    pub fn new() -> Self {
        Self {
            runtime_stage: None,
            uniform_data: Arc::from(Vec::new()),
            texture_inputs: Vec::new(),
            geometry: None,
        }
    }

    pub fn set_runtime_stage(&mut self, runtime_stage: Arc<RuntimeStage>) {
        self.runtime_stage = Some(runtime_stage);
    }

    /// Float uniform values, packed at 4-byte locations
    pub fn set_uniform_data(&mut self, uniform_data: impl Into<Arc<[u8]>>) {
        self.uniform_data = uniform_data.into();
    }

    /// Textures for the stage's sampled images, in layout order
    pub fn set_texture_inputs(&mut self, texture_inputs: Vec<TextureInput>) {
        self.texture_inputs = texture_inputs;
    }

    pub fn set_geometry(&mut self, geometry: Arc<dyn Geometry>) {
        self.geometry = Some(geometry);
    }

    pub fn runtime_stage(&self) -> Option<&Arc<RuntimeStage>> {
        self.runtime_stage.as_ref()
    }

    /// Record the draw into `pass`
    ///
    /// Returns false if the draw could not be recorded; the reason is logged.
    /// A draw whose uniforms were cut short at an unsupported kind is still
    /// recorded and reports true. Otherwise the clip restore decides.
    pub fn render(&self, context: &GraphicsContext, entity: &Entity, pass: &mut dyn RenderPass) -> bool {
        match self.try_render(context, entity, pass) {
            Ok(restored) => restored,
            Err(e) => {
                crate::engine_error!("galaxy3d::RuntimeEffectContents", "Failed to render runtime effect: {}", e);
                false
            }
        }
    }

    fn try_render(&self, context: &GraphicsContext, entity: &Entity, pass: &mut dyn RenderPass) -> Result<bool> {
        let Some(runtime_stage) = self.runtime_stage.as_ref() else {
            return Err(Error::InvalidResource("No runtime stage set".to_string()));
        };
        let Some(geometry) = self.geometry.as_ref() else {
            return Err(Error::InvalidResource("No geometry set".to_string()));
        };

        // ========== Fragment function ==========

        let fragment_function = context
            .shader_functions()
            .resolve(runtime_stage, context.pipelines())?;

        // ========== Geometry ==========

        let geometry_result = geometry.position_buffer(context, entity, pass)?;
        let guard = ClipOverdrawGuard::new(&geometry_result);

        // ========== Pipeline ==========

        let vertex_function = context
            .shader_functions()
            .function(RUNTIME_EFFECT_VERTEX_ENTRY_POINT, ShaderStage::Vertex)
            .ok_or_else(|| Error::ShaderFunctionMissing(RUNTIME_EFFECT_VERTEX_ENTRY_POINT.to_string()))?;

        let mut descriptor = PipelineDescriptor::new(RUNTIME_STAGE_PIPELINE_LABEL);
        descriptor.add_stage_entrypoint(vertex_function.clone());
        descriptor.add_stage_entrypoint(fragment_function.clone());

        let mut vertex_descriptor = VertexDescriptor::new();
        if vertex_descriptor.set_stage_inputs(vertex_function.stage_inputs()) {
            descriptor.set_vertex_descriptor(vertex_descriptor);
        } else {
            crate::engine_warn!(
                "galaxy3d::RuntimeEffectContents",
                "Failed to set stage inputs for runtime effect pipeline"
            );
        }

        let config = context.config();
        descriptor.set_color_attachment(0, ColorAttachmentDescriptor::new(config.color_format, true));
        descriptor.set_stencil_pixel_format(config.stencil_format);

        let mut options = PipelineOptions::from_pass_and_entity(pass, entity);
        options.primitive_type = geometry_result.primitive_type;
        guard.configure(&mut options);
        options.apply_to_descriptor(&mut descriptor);

        let pipeline = context.pipelines().get_or_build(&descriptor, context.device().as_ref())?;
        if !context.shader_functions().retain_if_current(&fragment_function, context.pipelines()) {
            return Err(Error::ShaderFunctionMissing(format!(
                "'{}' was re-registered during the draw",
                runtime_stage.entry_point()
            )));
        }

        // ========== Command ==========

        let mut command = Command::new(RUNTIME_EFFECT_COMMAND_LABEL);
        command.pipeline = Some(pipeline);
        command.stencil_reference = entity.stencil_depth();
        if !command.bind_vertices(geometry_result.vertex_buffer.clone()) {
            return Err(Error::InvalidResource("Geometry produced unusable vertex bindings".to_string()));
        }

        let min_alignment = context.device().min_uniform_alignment();
        let vert_info = VertInfo::new(geometry_result.transform);
        let view = pass.transients_buffer().emplace_uniform(&vert_info, min_alignment)?;
        command.bind_buffer(
            ShaderStage::Vertex,
            ShaderUniformSlot {
                name: VERT_INFO_SLOT_NAME.to_string(),
                binding: VERT_INFO_BINDING,
            },
            view,
        );

        // ========== Fragment resources ==========

        let mut binder = ResourceBinder::new(
            context.sampler_library().as_ref(),
            min_alignment,
            &self.texture_inputs,
            &self.uniform_data,
        );
        let truncated = match binder.bind(&mut command, pass.transients_buffer(), runtime_stage.uniforms()) {
            Ok(()) => false,
            Err(Error::UnsupportedUniformType(name)) => {
                // Remaining uniforms stay unbound; the draw is still recorded
                crate::engine_error!(
                    "galaxy3d::RuntimeEffectContents",
                    "Unsupported uniform type for '{}' in runtime stage '{}' ({} of {} uniforms bound)",
                    name,
                    runtime_stage.entry_point(),
                    binder.entries_processed(),
                    runtime_stage.uniforms().len()
                );
                true
            }
            Err(e) => return Err(e),
        };

        // ========== Submit ==========

        if !pass.add_command(command) {
            return Err(Error::BackendError("Render pass rejected runtime effect command".to_string()));
        }

        // A truncated draw reports success once recorded
        let restored = guard.restore(context, entity, pass);
        Ok(restored || truncated)
    }
}

#[cfg(test)]
#[path = "runtime_effect_contents_tests.rs"]
mod tests;
