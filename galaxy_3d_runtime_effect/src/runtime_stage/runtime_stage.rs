/// Runtime stage: a shader delivered as data, with its uniform layout
///
/// The code, entry point and uniforms of a runtime stage are only known once
/// the application loads them. The stage is shared with the renderer through
/// an `Arc`; the renderer only reads it, apart from clearing the dirty flag
/// once the code has been (re)registered with the backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use crate::graphics_device::{SamplerDescriptor, ShaderStage, Texture};

// ===== UNIFORM LAYOUT =====

/// Kind of a runtime uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeUniformType {
    SampledImage,
    Float,
    Boolean,
    SignedByte,
    UnsignedByte,
    SignedShort,
    UnsignedShort,
    SignedInt,
    UnsignedInt,
    SignedInt64,
    UnsignedInt64,
    HalfFloat,
    Double,
}

/// Matrix shape of a uniform (1x1 for scalars, 1xN for vectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeUniformDimensions {
    pub rows: u32,
    pub cols: u32,
}

impl RuntimeUniformDimensions {
    /// Single scalar
    pub const SCALAR: Self = Self { rows: 1, cols: 1 };

    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }
}

/// One entry of a runtime stage's uniform layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeUniformDescription {
    /// Uniform name in the shader
    pub name: String,
    /// Index into the uniform data blob, in 4-byte units
    pub location: usize,
    /// Uniform kind
    pub kind: RuntimeUniformType,
    /// Matrix shape
    pub dimensions: RuntimeUniformDimensions,
    /// Bits per component
    pub bit_width: usize,
    /// Array length, `None` for non-array uniforms
    pub array_elements: Option<usize>,
}

impl RuntimeUniformDescription {
    /// Byte size of the uniform's value
    ///
    /// `rows * cols * bit_width / 8`, times the array length when present
    /// and non-zero. `None` if the layout describes a size that overflows.
    pub fn size_in_bytes(&self) -> Option<usize> {
        let element = (self.dimensions.rows as usize)
            .checked_mul(self.dimensions.cols as usize)?
            .checked_mul(self.bit_width)?
            / 8;
        match self.array_elements {
            Some(count) if count > 0 => element.checked_mul(count),
            _ => Some(element),
        }
    }
}

// ===== TEXTURE INPUT =====

/// Texture bound to a sampled-image uniform, in layout order
#[derive(Clone)]
pub struct TextureInput {
    pub texture: Arc<dyn Texture>,
    pub sampler_descriptor: SamplerDescriptor,
}

// ===== RUNTIME STAGE =====

/// Runtime-loaded shader code and its uniform layout
pub struct RuntimeStage {
    entry_point: String,
    stage: ShaderStage,
    code: Arc<[u8]>,
    uniforms: Vec<RuntimeUniformDescription>,
    dirty: AtomicBool,
}

impl RuntimeStage {
    /// Create a stage
    ///
    /// A new stage is dirty: it has never been registered with a backend.
    pub fn new(
        entry_point: impl Into<String>,
        stage: ShaderStage,
        code: impl Into<Arc<[u8]>>,
        uniforms: Vec<RuntimeUniformDescription>,
    ) -> Self {
        Self {
            entry_point: entry_point.into(),
            stage,
            code: code.into(),
            uniforms,
            dirty: AtomicBool::new(true),
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Stage the code is registered for
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Compiled code blob
    pub fn code(&self) -> &Arc<[u8]> {
        &self.code
    }

    /// Uniform layout, in declaration order
    pub fn uniforms(&self) -> &[RuntimeUniformDescription] {
        &self.uniforms
    }

    /// Whether the code changed since it was last registered
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Flag the code as changed (hot reload)
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub(crate) fn set_clean(&self) {
        self.dirty.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for RuntimeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeStage")
            .field("entry_point", &self.entry_point)
            .field("stage", &self.stage)
            .field("code_len", &self.code.len())
            .field("uniforms", &self.uniforms.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
#[path = "runtime_stage_tests.rs"]
mod tests;
