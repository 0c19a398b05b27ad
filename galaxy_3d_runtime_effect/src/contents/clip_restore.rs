/// Overdraw protection through the stencil buffer
///
/// Geometry whose triangles may overlap (e.g. self-intersecting strokes) is
/// drawn with an Equal / IncrementClamp stencil so every pixel is covered
/// once. The increment leaves the stencil one level too deep, so a clip
/// restore draw follows to bring it back to the entity's depth.

use crate::contents::{Entity, GeometryResult, GraphicsContext, PipelineOptions};
use crate::graphics_device::{CompareFunction, RenderPass, StencilOperation};

/// Contents that restore the stencil buffer to an entity's clip depth
pub trait ClipRestore: Send + Sync {
    /// Record the restore draw(s) into `pass`
    fn render(&self, context: &GraphicsContext, entity: &Entity, pass: &mut dyn RenderPass) -> bool;
}

/// Overdraw handling for a single draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipOverdrawGuard {
    active: bool,
}

impl ClipOverdrawGuard {
    /// Guard for the given geometry
    pub fn new(geometry: &GeometryResult) -> Self {
        Self { active: geometry.prevent_overdraw }
    }

    /// Whether the draw needs overdraw protection
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Override the stencil state when active
    pub fn configure(&self, options: &mut PipelineOptions) {
        if self.active {
            options.stencil_compare = CompareFunction::Equal;
            options.stencil_operation = StencilOperation::IncrementClamp;
        }
    }

    /// Run the clip restore once when active
    ///
    /// Returns the restore result, or true when inactive.
    pub fn restore(&self, context: &GraphicsContext, entity: &Entity, pass: &mut dyn RenderPass) -> bool {
        if !self.active {
            return true;
        }

        crate::engine_trace!(
            "galaxy3d::ClipOverdrawGuard",
            "Restoring stencil to depth {}",
            entity.stencil_depth()
        );
        context.clip_restore().render(context, entity, pass)
    }
}

#[cfg(test)]
#[path = "clip_restore_tests.rs"]
mod tests;
