/*!
# Galaxy 3D Runtime Effects

Draws geometry shaded by shaders that only become known at runtime.

A runtime stage (compiled code, entry point and uniform layout delivered as
data) is registered with the backend compiler on first use, turned into a
cached graphics pipeline, and bound to a draw command together with its
uniforms and textures.

## Architecture

- **ShaderFunctionRegistry**: registers runtime stages with the backend
  compiler once, and again after a hot reload marks them dirty
- **PipelineCache**: immutable pipelines keyed by their full descriptor
- **ResourceBinder**: binds a runtime uniform layout onto a draw command
- **RuntimeEffectContents**: assembles and records the draw
- **ClipOverdrawGuard**: stencil-based overdraw protection for overlapping geometry

Backends implement `GraphicsDevice`, `ShaderCompiler` and `RenderPass`;
tessellation and clip restore are supplied through `Geometry` and `ClipRestore`.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod runtime_stage;
pub mod contents;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging facade
    pub use crate::engine::Engine;

    // Shared rendering state
    pub use crate::contents::{Config, GraphicsContext};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend traits and draw data
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Runtime stages and their caches
    pub mod runtime {
        pub use crate::runtime_stage::*;
    }

    // Drawable contents
    pub mod contents {
        pub use crate::contents::*;
    }
}

// Re-export math library at crate root
pub use glam;
