/// Contents module - drawable contents and the context they render with

pub mod entity;
pub mod geometry;
pub mod content_context;
pub mod clip_restore;
pub mod runtime_effect_vertex;
pub mod runtime_effect_contents;

pub use entity::*;
pub use geometry::*;
pub use content_context::*;
pub use clip_restore::*;
pub use runtime_effect_vertex::*;
pub use runtime_effect_contents::*;
