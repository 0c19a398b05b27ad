/// Entity: the transform, clip depth and blend mode a contents object draws with

use glam::Mat4;

/// Porter-Duff compositing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    Clear,
    Source,
    Destination,
    #[default]
    SourceOver,
    DestinationOver,
    SourceIn,
    DestinationIn,
    SourceOut,
    DestinationOut,
    Plus,
}

/// Per-draw placement state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    transform: Mat4,
    stencil_depth: u32,
    blend_mode: BlendMode,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Identity transform, depth 0, source-over
    pub fn new() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            stencil_depth: 0,
            blend_mode: BlendMode::SourceOver,
        }
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Clip nesting depth, used as the stencil reference value
    pub fn stencil_depth(&self) -> u32 {
        self.stencil_depth
    }

    pub fn set_stencil_depth(&mut self, depth: u32) {
        self.stencil_depth = depth;
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.blend_mode = blend_mode;
    }
}
