/// Shader stages, compiled shader functions, and the backend compiler interface

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment/Pixel shader
    Fragment,
    /// Compute shader
    Compute,
}

// ===== SHADER FUNCTION =====

/// Compiled shader function resource trait
///
/// One compiled entry point in one stage. Implemented by backend-specific
/// types; the runtime only compares functions by identity.
pub trait ShaderFunction: Send + Sync {
    /// Entry point name this function was registered under
    fn entry_point(&self) -> &str;

    /// Stage this function runs in
    fn stage(&self) -> ShaderStage;

    /// Declared vertex inputs (empty for non-vertex stages)
    fn stage_inputs(&self) -> &[ShaderStageIoSlot] {
        &[]
    }
}

/// Shared handle to a shader function with identity semantics
///
/// Two handles are equal when they point at the same backend object, which
/// lets pipeline descriptors embed functions and still be hashed.
#[derive(Clone)]
pub struct ShaderFunctionRef(Arc<dyn ShaderFunction>);

impl ShaderFunctionRef {
    /// Wrap a backend function
    pub fn new(function: Arc<dyn ShaderFunction>) -> Self {
        Self(function)
    }

    /// Underlying backend function
    pub fn function(&self) -> &Arc<dyn ShaderFunction> {
        &self.0
    }

    /// Whether this handle points at `function`
    pub fn is(&self, function: &Arc<dyn ShaderFunction>) -> bool {
        Arc::ptr_eq(&self.0, function)
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl From<Arc<dyn ShaderFunction>> for ShaderFunctionRef {
    fn from(function: Arc<dyn ShaderFunction>) -> Self {
        Self::new(function)
    }
}

impl PartialEq for ShaderFunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for ShaderFunctionRef {}

impl Hash for ShaderFunctionRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for ShaderFunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderFunctionRef")
            .field("entry_point", &self.0.entry_point())
            .field("stage", &self.0.stage())
            .finish()
    }
}

// ===== STAGE INPUTS =====

/// Format of a vertex stage input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    /// Size in bytes of one element
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// A declared input of a vertex stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderStageIoSlot {
    /// Input name in the shader
    pub name: &'static str,
    /// `layout(location = N)`
    pub location: u32,
    /// Element format
    pub format: VertexFormat,
}

// ===== BACKEND COMPILER =====

/// Completion callback handed to `ShaderCompiler::register_function`
///
/// Receives `true` once the function is registered, `false` on failure.
/// May be invoked from any thread.
pub type RegistrationCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Backend shader compiler / library
///
/// Registration is asynchronous: the backend may compile on a worker thread
/// and reports through the callback.
pub trait ShaderCompiler: Send + Sync {
    /// Compile and register `code` as `entry_point` for `stage`
    fn register_function(
        &self,
        entry_point: &str,
        stage: ShaderStage,
        code: Arc<[u8]>,
        on_complete: RegistrationCallback,
    );

    /// Remove a registered function (no-op when absent)
    fn unregister_function(&self, entry_point: &str, stage: ShaderStage);

    /// Fetch a registered function
    fn get_function(&self, entry_point: &str, stage: ShaderStage) -> Option<Arc<dyn ShaderFunction>>;
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
