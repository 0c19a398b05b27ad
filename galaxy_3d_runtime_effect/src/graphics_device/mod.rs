/// Graphics device module - backend traits and the data a draw is built from

// Module declarations
pub mod graphics_device;
pub mod shader;
pub mod pipeline;
pub mod texture;
pub mod buffer;
pub mod command;
pub mod render_pass;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use shader::*;
pub use pipeline::*;
pub use texture::*;
pub use buffer::*;
pub use command::*;
pub use render_pass::*;

// Mock backend for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
