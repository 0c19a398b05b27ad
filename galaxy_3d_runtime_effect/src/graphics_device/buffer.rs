/// Buffer trait, vertex bindings, and the per-pass transient arena

use std::sync::Arc;
use bytemuck::Pod;
use crate::error::Result;

// ===== BUFFER =====

/// GPU buffer resource trait
pub trait Buffer: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Size in bytes
    fn size(&self) -> usize;
}

/// Byte range inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferView {
    /// Start offset in bytes
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl BufferView {
    /// One past the last byte
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Index element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// No index buffer; vertices are drawn in order
    None,
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index (0 when unindexed)
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::None => 0,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Vertex (and optional index) buffers consumed by one draw
#[derive(Clone)]
pub struct VertexBufferBinding {
    /// Interleaved vertex data
    pub vertex_buffer: Arc<dyn Buffer>,
    /// Range of the vertex buffer used by the draw
    pub vertex_view: BufferView,
    /// Index data, when `index_type` is not `None`
    pub index_buffer: Option<Arc<dyn Buffer>>,
    /// Index element type
    pub index_type: IndexType,
    /// Number of vertices (or indices) to draw
    pub vertex_count: u32,
}

// ===== TRANSIENT BUFFER =====

/// Host-side arena for per-frame uniform and vertex data
///
/// Every `emplace` appends at the next offset satisfying the requested
/// alignment, zero-filling the gap. Once sealed (handed to the GPU) the
/// arena refuses writes until `reset`.
#[derive(Debug, Clone)]
pub struct TransientBuffer {
    label: String,
    data: Vec<u8>,
    min_alignment: usize,
    sealed: bool,
}

impl TransientBuffer {
    /// Create an empty arena
    ///
    /// `min_alignment` is the device's minimum uniform offset alignment and
    /// applies on top of every per-call alignment.
    pub fn new(label: impl Into<String>, min_alignment: usize) -> Self {
        Self {
            label: label.into(),
            data: Vec::new(),
            min_alignment: min_alignment.max(1),
            sealed: false,
        }
    }

    /// Append `bytes` at an offset aligned to `alignment`
    pub fn emplace(&mut self, bytes: &[u8], alignment: usize) -> Result<BufferView> {
        if self.sealed {
            crate::engine_bail!(
                "galaxy3d::TransientBuffer",
                "Cannot write {} bytes to sealed transient buffer '{}'",
                bytes.len(),
                self.label
            );
        }

        let alignment = alignment.max(self.min_alignment);
        let offset = self.data.len().div_ceil(alignment) * alignment;
        self.data.resize(offset, 0);
        self.data.extend_from_slice(bytes);

        Ok(BufferView { offset, length: bytes.len() })
    }

    /// Append a plain-old-data value
    pub fn emplace_uniform<T: Pod>(&mut self, value: &T, alignment: usize) -> Result<BufferView> {
        self.emplace(bytemuck::bytes_of(value), alignment)
    }

    /// Bytes covered by `view`, if in range
    pub fn view(&self, view: BufferView) -> Option<&[u8]> {
        self.data.get(view.offset..view.end())
    }

    /// Whole arena contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Freeze the arena (no further writes)
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the arena is frozen
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Drop all contents and accept writes again
    pub fn reset(&mut self) {
        self.data.clear();
        self.sealed = false;
    }

    /// Bytes used, including alignment padding
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Debug label
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
