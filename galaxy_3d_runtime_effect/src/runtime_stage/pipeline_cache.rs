/// PipelineCache - immutable pipelines keyed by their full descriptor
///
/// A pipeline is built once per distinct descriptor and then shared. Entries
/// are never mutated; they are only looked up, built, or evicted whole (when
/// a shader function they reference is replaced).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::graphics_device::{GraphicsDevice, Pipeline, PipelineDescriptor, ShaderFunction};

/// Cache statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineCacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Pipelines successfully built
    pub builds: u64,
    /// Pipelines removed by `evict_referencing`
    pub evictions: u64,
}

/// Descriptor-keyed pipeline cache
pub struct PipelineCache {
    pipelines: RwLock<FxHashMap<PipelineDescriptor, Arc<dyn Pipeline>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    evictions: AtomicU64,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            pipelines: RwLock::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the pipeline for `descriptor`, building it on first request
    ///
    /// A backend rejection yields `Error::PipelineCreationFailed` and leaves
    /// nothing in the cache.
    pub fn get_or_build(
        &self,
        descriptor: &PipelineDescriptor,
        device: &dyn GraphicsDevice,
    ) -> Result<Arc<dyn Pipeline>> {
        {
            let pipelines = self.pipelines.read().map_err(|_| poisoned())?;
            if let Some(pipeline) = pipelines.get(descriptor) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(pipeline.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let mut pipelines = self.pipelines.write().map_err(|_| poisoned())?;

        // Built by another caller while we waited for the write lock
        if let Some(pipeline) = pipelines.get(descriptor) {
            return Ok(pipeline.clone());
        }

        let pipeline = device.create_pipeline(descriptor).map_err(|e| {
            crate::engine_error!(
                "galaxy3d::PipelineCache",
                "Failed to build pipeline '{}': {}",
                descriptor.label,
                e
            );
            Error::PipelineCreationFailed(descriptor.label.clone())
        })?;

        pipelines.insert(descriptor.clone(), pipeline.clone());
        self.builds.fetch_add(1, Ordering::Relaxed);
        crate::engine_debug!(
            "galaxy3d::PipelineCache",
            "Built pipeline '{}' ({} cached)",
            descriptor.label,
            pipelines.len()
        );

        Ok(pipeline)
    }

    /// Remove every pipeline whose vertex or fragment function is `function`
    ///
    /// Returns the number of pipelines removed.
    pub fn evict_referencing(&self, function: &Arc<dyn ShaderFunction>) -> usize {
        let Ok(mut pipelines) = self.pipelines.write() else {
            return 0;
        };

        let before = pipelines.len();
        pipelines.retain(|descriptor, _| !descriptor.references(function));
        let removed = before - pipelines.len();

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            crate::engine_debug!(
                "galaxy3d::PipelineCache",
                "Evicted {} pipeline(s) using '{}'",
                removed,
                function.entry_point()
            );
        }
        removed
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> PipelineCacheStats {
        PipelineCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Number of cached pipelines
    pub fn len(&self) -> usize {
        self.pipelines.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached pipeline (counters are kept)
    pub fn clear(&self) {
        if let Ok(mut pipelines) = self.pipelines.write() {
            pipelines.clear();
        }
    }
}

fn poisoned() -> Error {
    crate::engine_err!("galaxy3d::PipelineCache", "Pipeline cache lock poisoned")
}

#[cfg(test)]
#[path = "pipeline_cache_tests.rs"]
mod tests;
