/// Texture and sampler resources, plus the shared sampler cache
///
/// Samplers are tiny immutable objects: a handful of descriptors cover most
/// draws, so they are created on first use and reused for every later
/// request with an equal descriptor.

use std::sync::{Arc, RwLock};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;

// ===== TEXTURE =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types. The runtime effect path
/// only ever binds existing textures.
pub trait Texture: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Size in texels (width, height)
    fn size(&self) -> (u32, u32);
}

// ===== SAMPLER DESCRIPTOR =====

/// Texel filter for minification/magnification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinMagFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear interpolation
    Linear,
}

/// Filter between mip levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipFilter {
    /// Always sample the base level
    Base,
    /// Nearest mip level
    Nearest,
    /// Interpolate between mip levels
    Linear,
}

/// Behavior outside the [0, 1] coordinate range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerAddressMode {
    ClampToEdge,
    Repeat,
    Mirror,
    Decal,
}

/// Full sampler state, used as the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDescriptor {
    pub min_filter: MinMagFilter,
    pub mag_filter: MinMagFilter,
    pub mip_filter: MipFilter,
    /// Address mode along U
    pub width_address_mode: SamplerAddressMode,
    /// Address mode along V
    pub height_address_mode: SamplerAddressMode,
    /// Address mode along W
    pub depth_address_mode: SamplerAddressMode,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            min_filter: MinMagFilter::Nearest,
            mag_filter: MinMagFilter::Nearest,
            mip_filter: MipFilter::Nearest,
            width_address_mode: SamplerAddressMode::ClampToEdge,
            height_address_mode: SamplerAddressMode::ClampToEdge,
            depth_address_mode: SamplerAddressMode::ClampToEdge,
        }
    }
}

impl SamplerDescriptor {
    /// Linear filtering with clamped coordinates
    pub fn linear_clamp() -> Self {
        Self {
            min_filter: MinMagFilter::Linear,
            mag_filter: MinMagFilter::Linear,
            mip_filter: MipFilter::Linear,
            ..Self::default()
        }
    }

    /// Linear filtering with repeating coordinates
    pub fn linear_repeat() -> Self {
        Self {
            width_address_mode: SamplerAddressMode::Repeat,
            height_address_mode: SamplerAddressMode::Repeat,
            depth_address_mode: SamplerAddressMode::Repeat,
            ..Self::linear_clamp()
        }
    }
}

// ===== SAMPLER =====

/// Sampler resource trait
pub trait Sampler: Send + Sync {
    /// Descriptor this sampler was created from
    fn descriptor(&self) -> &SamplerDescriptor;
}

/// Source of samplers for a given descriptor
pub trait SamplerLibrary: Send + Sync {
    /// Return a sampler matching `descriptor`, creating it if needed
    fn get_sampler(&self, descriptor: &SamplerDescriptor) -> Result<Arc<dyn Sampler>>;
}

// ===== SAMPLER CACHE =====

/// Device-backed sampler library that creates each descriptor once
pub struct SamplerCache {
    device: Arc<dyn GraphicsDevice>,
    samplers: RwLock<FxHashMap<SamplerDescriptor, Arc<dyn Sampler>>>,
}

impl SamplerCache {
    /// Create an empty cache over `device`
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            samplers: RwLock::new(FxHashMap::default()),
        }
    }

    /// Number of distinct samplers created so far
    pub fn len(&self) -> usize {
        self.samplers.read().map(|s| s.len()).unwrap_or(0)
    }

    /// True if no sampler has been created
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SamplerLibrary for SamplerCache {
    fn get_sampler(&self, descriptor: &SamplerDescriptor) -> Result<Arc<dyn Sampler>> {
        if let Ok(samplers) = self.samplers.read() {
            if let Some(sampler) = samplers.get(descriptor) {
                return Ok(sampler.clone());
            }
        }

        let mut samplers = self.samplers.write()
            .map_err(|_| crate::engine_err!("galaxy3d::SamplerCache", "Sampler cache lock poisoned"))?;

        // Another thread may have created it between the two locks
        if let Some(sampler) = samplers.get(descriptor) {
            return Ok(sampler.clone());
        }

        let sampler = self.device.create_sampler(descriptor)?;
        samplers.insert(*descriptor, sampler.clone());
        crate::engine_debug!("galaxy3d::SamplerCache", "Created sampler {:?}", descriptor);
        Ok(sampler)
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
