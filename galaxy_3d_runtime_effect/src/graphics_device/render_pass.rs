/// Render pass interface: the command sink a draw records into

use crate::graphics_device::{Command, PixelFormat, SampleCount, TransientBuffer};

/// Attachment formats of the pass being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetInfo {
    /// Format of color attachment 0
    pub color_format: PixelFormat,
    /// Format of the stencil attachment (`Unknown` when absent)
    pub stencil_format: PixelFormat,
    /// Multisample count of the attachments
    pub sample_count: SampleCount,
}

impl RenderTargetInfo {
    /// Single-sampled target with the given formats
    pub fn new(color_format: PixelFormat, stencil_format: PixelFormat) -> Self {
        Self {
            color_format,
            stencil_format,
            sample_count: SampleCount::Count1,
        }
    }

    /// Whether the target has a stencil attachment
    pub fn has_stencil(&self) -> bool {
        self.stencil_format.has_stencil()
    }
}

/// A render pass being recorded
///
/// Owned by a single thread for the duration of recording.
pub trait RenderPass {
    /// Attachment formats of this pass
    fn render_target(&self) -> &RenderTargetInfo;

    /// Per-pass arena for uniform and vertex data
    fn transients_buffer(&mut self) -> &mut TransientBuffer;

    /// Record a draw
    ///
    /// Returns false if the pass rejects the command (e.g. incomplete).
    fn add_command(&mut self, command: Command) -> bool;
}
