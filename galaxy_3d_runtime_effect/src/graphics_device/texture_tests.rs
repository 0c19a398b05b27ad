//! Unit tests for texture.rs
//!
//! Tests SamplerDescriptor presets and SamplerCache reuse.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use crate::error::Error;
use crate::graphics_device::{
    MinMagFilter, MipFilter, SamplerAddressMode, SamplerCache, SamplerDescriptor, SamplerLibrary,
};
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

// ============================================================================
// SAMPLER DESCRIPTOR TESTS
// ============================================================================

#[test]
fn test_sampler_descriptor_default_is_nearest_clamp() {
    let desc = SamplerDescriptor::default();
    assert_eq!(desc.min_filter, MinMagFilter::Nearest);
    assert_eq!(desc.mag_filter, MinMagFilter::Nearest);
    assert_eq!(desc.width_address_mode, SamplerAddressMode::ClampToEdge);
}

#[test]
fn test_sampler_descriptor_presets() {
    let clamp = SamplerDescriptor::linear_clamp();
    assert_eq!(clamp.min_filter, MinMagFilter::Linear);
    assert_eq!(clamp.mip_filter, MipFilter::Linear);
    assert_eq!(clamp.height_address_mode, SamplerAddressMode::ClampToEdge);

    let repeat = SamplerDescriptor::linear_repeat();
    assert_eq!(repeat.mag_filter, MinMagFilter::Linear);
    assert_eq!(repeat.width_address_mode, SamplerAddressMode::Repeat);
    assert_eq!(repeat.depth_address_mode, SamplerAddressMode::Repeat);
    assert_ne!(clamp, repeat);
}

// ============================================================================
// SAMPLER CACHE TESTS
// ============================================================================

#[test]
fn test_sampler_cache_creates_each_descriptor_once() {
    let device = Arc::new(MockGraphicsDevice::new());
    let cache = SamplerCache::new(device.clone());
    assert!(cache.is_empty());

    let a = cache.get_sampler(&SamplerDescriptor::linear_clamp()).unwrap();
    let b = cache.get_sampler(&SamplerDescriptor::linear_clamp()).unwrap();
    let c = cache.get_sampler(&SamplerDescriptor::linear_repeat()).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(device.sampler_count(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(*c.descriptor(), SamplerDescriptor::linear_repeat());
}

#[test]
fn test_sampler_cache_propagates_device_failure() {
    let device = Arc::new(MockGraphicsDevice::new());
    device.fail_samplers.store(true, Ordering::SeqCst);
    let cache = SamplerCache::new(device.clone());

    let result = cache.get_sampler(&SamplerDescriptor::default());
    assert!(matches!(result, Err(Error::BackendError(_))));
    assert!(cache.is_empty());
}
