/// Runtime stage module - runtime shaders, their compiled functions and pipelines

pub mod runtime_stage;
pub mod shader_function_registry;
pub mod pipeline_cache;
pub mod resource_binder;

pub use runtime_stage::*;
pub use shader_function_registry::*;
pub use pipeline_cache::*;
pub use resource_binder::*;
