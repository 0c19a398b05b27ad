/// Mock backend for unit tests (no GPU required)
///
/// Provides a device, shader compiler, render pass, geometry and clip
/// restore that record what they were asked to do.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::contents::{
    ClipRestore, Config, Entity, Geometry, GeometryResult, GraphicsContext,
    RUNTIME_EFFECT_VERTEX_ENTRY_POINT, RUNTIME_EFFECT_VERTEX_STAGE_INPUTS,
};
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, BufferView, Command, GraphicsDevice, IndexType, Pipeline, PipelineDescriptor,
    PixelFormat, PrimitiveType, RegistrationCallback, RenderPass, RenderTargetInfo, Sampler,
    SamplerDescriptor, ShaderCompiler, ShaderFunction, ShaderStage, ShaderStageIoSlot, Texture,
    TransientBuffer, VertexBufferBinding,
};

// ============================================================================
// Mock Shader Function
// ============================================================================

#[derive(Debug)]
pub struct MockShaderFunction {
    pub entry_point: String,
    pub stage: ShaderStage,
    pub stage_inputs: Vec<ShaderStageIoSlot>,
}

impl MockShaderFunction {
    pub fn new(entry_point: &str, stage: ShaderStage) -> Self {
        Self {
            entry_point: entry_point.to_string(),
            stage,
            stage_inputs: Vec::new(),
        }
    }

    pub fn with_stage_inputs(mut self, inputs: &[ShaderStageIoSlot]) -> Self {
        self.stage_inputs = inputs.to_vec();
        self
    }
}

impl ShaderFunction for MockShaderFunction {
    fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn stage_inputs(&self) -> &[ShaderStageIoSlot] {
        &self.stage_inputs
    }
}

// ============================================================================
// Mock Shader Compiler
// ============================================================================

/// How the mock compiler answers `register_function`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCompileBehavior {
    /// Register the function and report success
    Succeed,
    /// Report failure
    Fail,
    /// Report success without registering anything
    SucceedWithoutFunction,
    /// Drop the callback without calling it
    DropCallback,
}

type FunctionTable = FxHashMap<(String, ShaderStage), Arc<dyn ShaderFunction>>;

/// Compiler that completes registration on a worker thread
pub struct MockShaderCompiler {
    functions: Mutex<FunctionTable>,
    behavior: Mutex<MockCompileBehavior>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockShaderCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockShaderCompiler {
    pub fn new() -> Self {
        Self {
            functions: Mutex::new(FxHashMap::default()),
            behavior: Mutex::new(MockCompileBehavior::Succeed),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Compiler with the built-in runtime effect vertex function preloaded
    pub fn with_runtime_effect_vertex() -> Self {
        let compiler = Self::new();
        compiler.preload(Arc::new(
            MockShaderFunction::new(RUNTIME_EFFECT_VERTEX_ENTRY_POINT, ShaderStage::Vertex)
                .with_stage_inputs(RUNTIME_EFFECT_VERTEX_STAGE_INPUTS),
        ));
        compiler
    }

    /// Make a function available without going through registration
    pub fn preload(&self, function: Arc<dyn ShaderFunction>) {
        let key = (function.entry_point().to_string(), function.stage());
        self.functions.lock().unwrap().insert(key, function);
    }

    pub fn set_behavior(&self, behavior: MockCompileBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// All register/unregister calls, e.g. `"register:ink:Fragment"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn register_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("register:")).count()
    }

    pub fn unregister_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("unregister:")).count()
    }
}

impl ShaderCompiler for MockShaderCompiler {
    fn register_function(
        &self,
        entry_point: &str,
        stage: ShaderStage,
        _code: Arc<[u8]>,
        on_complete: RegistrationCallback,
    ) {
        self.calls.lock().unwrap().push(format!("register:{}:{:?}", entry_point, stage));

        let behavior = *self.behavior.lock().unwrap();
        let registered = match behavior {
            MockCompileBehavior::Succeed => {
                let function: Arc<dyn ShaderFunction> = Arc::new(MockShaderFunction::new(entry_point, stage));
                self.functions.lock().unwrap().insert((entry_point.to_string(), stage), function);
                true
            }
            MockCompileBehavior::Fail => false,
            MockCompileBehavior::SucceedWithoutFunction => true,
            MockCompileBehavior::DropCallback => {
                drop(on_complete);
                return;
            }
        };

        thread::spawn(move || on_complete(registered));
    }

    fn unregister_function(&self, entry_point: &str, stage: ShaderStage) {
        self.calls.lock().unwrap().push(format!("unregister:{}:{:?}", entry_point, stage));
        self.functions.lock().unwrap().remove(&(entry_point.to_string(), stage));
    }

    fn get_function(&self, entry_point: &str, stage: ShaderStage) -> Option<Arc<dyn ShaderFunction>> {
        self.functions.lock().unwrap().get(&(entry_point.to_string(), stage)).cloned()
    }
}

// ============================================================================
// Mock Resources
// ============================================================================

pub struct MockPipeline {
    pub descriptor: PipelineDescriptor,
}

impl Pipeline for MockPipeline {
    fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }
}

pub struct MockSampler {
    pub descriptor: SamplerDescriptor,
}

impl Sampler for MockSampler {
    fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl MockTexture {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self { name: name.to_string(), width, height }
    }
}

impl Texture for MockTexture {
    fn label(&self) -> &str {
        &self.name
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    pub name: String,
    pub size: usize,
}

impl Buffer for MockBuffer {
    fn label(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    pub pipelines_created: Mutex<Vec<PipelineDescriptor>>,
    pub samplers_created: Mutex<Vec<SamplerDescriptor>>,
    pub fail_pipelines: AtomicBool,
    pub fail_samplers: AtomicBool,
    min_uniform_alignment: usize,
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::with_min_uniform_alignment(16)
    }

    pub fn with_min_uniform_alignment(min_uniform_alignment: usize) -> Self {
        Self {
            pipelines_created: Mutex::new(Vec::new()),
            samplers_created: Mutex::new(Vec::new()),
            fail_pipelines: AtomicBool::new(false),
            fail_samplers: AtomicBool::new(false),
            min_uniform_alignment,
        }
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines_created.lock().unwrap().len()
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers_created.lock().unwrap().len()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_pipeline(&self, descriptor: &PipelineDescriptor) -> Result<Arc<dyn Pipeline>> {
        if self.fail_pipelines.load(Ordering::SeqCst) {
            return Err(Error::PipelineCreationFailed(descriptor.label.clone()));
        }
        self.pipelines_created.lock().unwrap().push(descriptor.clone());
        Ok(Arc::new(MockPipeline { descriptor: descriptor.clone() }))
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<Arc<dyn Sampler>> {
        if self.fail_samplers.load(Ordering::SeqCst) {
            return Err(Error::BackendError("mock sampler failure".to_string()));
        }
        self.samplers_created.lock().unwrap().push(*descriptor);
        Ok(Arc::new(MockSampler { descriptor: *descriptor }))
    }

    fn min_uniform_alignment(&self) -> usize {
        self.min_uniform_alignment
    }
}

// ============================================================================
// Mock Render Pass
// ============================================================================

pub struct MockRenderPass {
    pub target: RenderTargetInfo,
    pub transients: TransientBuffer,
    pub commands: Vec<Command>,
    pub reject_commands: bool,
}

impl MockRenderPass {
    pub fn new(min_uniform_alignment: usize) -> Self {
        Self {
            target: RenderTargetInfo::new(PixelFormat::B8G8R8A8Unorm, PixelFormat::S8Uint),
            transients: TransientBuffer::new("mock transients", min_uniform_alignment),
            commands: Vec::new(),
            reject_commands: false,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.label.as_str()).collect()
    }
}

impl RenderPass for MockRenderPass {
    fn render_target(&self) -> &RenderTargetInfo {
        &self.target
    }

    fn transients_buffer(&mut self) -> &mut TransientBuffer {
        &mut self.transients
    }

    fn add_command(&mut self, command: Command) -> bool {
        if self.reject_commands {
            return false;
        }
        self.commands.push(command);
        true
    }
}

// ============================================================================
// Mock Geometry
// ============================================================================

/// Unit quad as a triangle strip
pub struct MockGeometry {
    pub prevent_overdraw: bool,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockGeometry {
    pub fn new(prevent_overdraw: bool) -> Self {
        Self { prevent_overdraw, fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { prevent_overdraw: false, fail: true, calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geometry for MockGeometry {
    fn position_buffer(
        &self,
        _context: &GraphicsContext,
        entity: &Entity,
        pass: &mut dyn RenderPass,
    ) -> Result<GeometryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::InvalidResource("mock geometry failure".to_string()));
        }

        let quad: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let view: BufferView = pass.transients_buffer().emplace(bytemuck::cast_slice(&quad[..]), 4)?;

        Ok(GeometryResult {
            primitive_type: PrimitiveType::TriangleStrip,
            vertex_buffer: VertexBufferBinding {
                vertex_buffer: Arc::new(MockBuffer { name: "quad".to_string(), size: view.length }),
                vertex_view: view,
                index_buffer: None,
                index_type: IndexType::None,
                vertex_count: 4,
            },
            transform: entity.transform(),
            prevent_overdraw: self.prevent_overdraw,
        })
    }
}

// ============================================================================
// Mock Clip Restore
// ============================================================================

/// Records one "ClipRestore" command per call
pub struct MockClipRestore {
    pub result: bool,
    pub depths: Mutex<Vec<u32>>,
}

impl Default for MockClipRestore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MockClipRestore {
    pub fn new(result: bool) -> Self {
        Self { result, depths: Mutex::new(Vec::new()) }
    }

    pub fn call_count(&self) -> usize {
        self.depths.lock().unwrap().len()
    }
}

impl ClipRestore for MockClipRestore {
    fn render(&self, _context: &GraphicsContext, entity: &Entity, pass: &mut dyn RenderPass) -> bool {
        self.depths.lock().unwrap().push(entity.stencil_depth());
        let mut command = Command::new("ClipRestore");
        command.stencil_reference = entity.stencil_depth();
        pass.add_command(command);
        self.result
    }
}

// ============================================================================
// Fixture
// ============================================================================

/// Context wired to fresh mocks, with handles kept for inspection
pub struct MockFixture {
    pub device: Arc<MockGraphicsDevice>,
    pub compiler: Arc<MockShaderCompiler>,
    pub clip_restore: Arc<MockClipRestore>,
    pub context: GraphicsContext,
}

impl MockFixture {
    pub fn new() -> Self {
        Self::with_device(MockGraphicsDevice::new())
    }

    pub fn with_device(device: MockGraphicsDevice) -> Self {
        let device = Arc::new(device);
        let compiler = Arc::new(MockShaderCompiler::with_runtime_effect_vertex());
        let clip_restore = Arc::new(MockClipRestore::default());
        let context = GraphicsContext::new(
            device.clone(),
            compiler.clone(),
            clip_restore.clone(),
            Config::default(),
        );
        Self { device, compiler, clip_restore, context }
    }

    /// Render pass matching the device alignment
    pub fn render_pass(&self) -> MockRenderPass {
        MockRenderPass::new(self.device.min_uniform_alignment())
    }
}

/// Identity-transform entity at the given clip depth
pub fn entity_at_depth(depth: u32) -> Entity {
    let mut entity = Entity::new();
    entity.set_transform(Mat4::IDENTITY);
    entity.set_stencil_depth(depth);
    entity
}
