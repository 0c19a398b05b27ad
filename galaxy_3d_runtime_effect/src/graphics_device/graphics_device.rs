/// GraphicsDevice trait - backend resource factory

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Pipeline, PipelineDescriptor, Sampler, SamplerDescriptor};

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Backend resource factory
///
/// Implemented by backend-specific devices. Creation calls may run on any
/// thread; results are shared through the pipeline and sampler caches.
pub trait GraphicsDevice: Send + Sync {
    /// Build a pipeline from a complete descriptor
    ///
    /// # Returns
    ///
    /// The pipeline, or `Error::PipelineCreationFailed` if the backend
    /// rejects the descriptor.
    fn create_pipeline(&self, descriptor: &PipelineDescriptor) -> Result<Arc<dyn Pipeline>>;

    /// Create a sampler
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<Arc<dyn Sampler>>;

    /// Minimum offset alignment for uniform buffer bindings, in bytes
    fn min_uniform_alignment(&self) -> usize;
}
