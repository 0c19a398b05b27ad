/// ShaderFunctionRegistry - compiled runtime shader functions
///
/// Holds at most one function per (entry point, stage). A runtime stage is
/// registered with the backend compiler the first time it is drawn, and
/// again after it has been flagged dirty; in that case the old function and
/// every pipeline built from it are dropped first.
///
/// Backend registration completes through a callback that may fire on any
/// thread. The caller blocks on a one-shot channel until it does.

use std::sync::{mpsc, Arc, Mutex, RwLock};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::graphics_device::{ShaderCompiler, ShaderFunction, ShaderStage};
use crate::runtime_stage::{PipelineCache, RuntimeStage};

new_key_type! {
    /// Stable key of a registered shader function
    pub struct ShaderFunctionKey;
}

#[derive(Default)]
struct Entries {
    functions: SlotMap<ShaderFunctionKey, Arc<dyn ShaderFunction>>,
    by_name: FxHashMap<(String, ShaderStage), ShaderFunctionKey>,
}

impl Entries {
    fn get(&self, entry_point: &str, stage: ShaderStage) -> Option<Arc<dyn ShaderFunction>> {
        self.by_name
            .get(&(entry_point.to_string(), stage))
            .and_then(|key| self.functions.get(*key))
            .cloned()
    }

    fn insert(&mut self, entry_point: &str, stage: ShaderStage, function: Arc<dyn ShaderFunction>) {
        let name = (entry_point.to_string(), stage);
        if let Some(key) = self.by_name.get(&name) {
            if let Some(slot) = self.functions.get_mut(*key) {
                *slot = function;
                return;
            }
        }
        let key = self.functions.insert(function);
        self.by_name.insert(name, key);
    }

    fn remove(&mut self, entry_point: &str, stage: ShaderStage) {
        if let Some(key) = self.by_name.remove(&(entry_point.to_string(), stage)) {
            self.functions.remove(key);
        }
    }
}

/// Registry of shader functions compiled from runtime stages
pub struct ShaderFunctionRegistry {
    compiler: Arc<dyn ShaderCompiler>,
    entries: RwLock<Entries>,
    /// Serializes backend registration
    registration: Mutex<()>,
}

impl ShaderFunctionRegistry {
    /// Create an empty registry over a backend compiler
    pub fn new(compiler: Arc<dyn ShaderCompiler>) -> Self {
        Self {
            compiler,
            entries: RwLock::new(Entries::default()),
            registration: Mutex::new(()),
        }
    }

    /// Return the fragment function for `stage`, (re)registering it if needed
    ///
    /// # Errors
    ///
    /// * `Error::ShaderCompilationFailed` - the backend reported failure, or
    ///   dropped the completion callback
    /// * `Error::ShaderFunctionMissing` - registration succeeded but the
    ///   function cannot be fetched afterwards
    pub fn resolve(&self, stage: &RuntimeStage, pipelines: &PipelineCache) -> Result<Arc<dyn ShaderFunction>> {
        let entry_point = stage.entry_point();

        if !stage.is_dirty() {
            if let Some(function) = self.function(entry_point, ShaderStage::Fragment) {
                return Ok(function);
            }
        }

        let _registration = self.registration.lock().map_err(|_| {
            crate::engine_err!("galaxy3d::ShaderFunctionRegistry", "Registration lock poisoned")
        })?;

        if let Some(function) = self.function(entry_point, ShaderStage::Fragment) {
            // Another caller finished registering while we waited
            if !stage.is_dirty() {
                return Ok(function);
            }

            // Unpublish before evicting so a concurrent build from `function`
            // either lands before the eviction or fails `retain_if_current`
            self.compiler.unregister_function(entry_point, ShaderStage::Fragment);
            self.remove(entry_point, ShaderStage::Fragment)?;
            let evicted = pipelines.evict_referencing(&function);
            crate::engine_debug!(
                "galaxy3d::ShaderFunctionRegistry",
                "Dropped stale function '{}' and {} pipeline(s)",
                entry_point,
                evicted
            );
        }

        self.register(stage)
    }

    /// Look up a function without registering anything
    ///
    /// Consults this registry first, then the backend library.
    pub fn function(&self, entry_point: &str, stage: ShaderStage) -> Option<Arc<dyn ShaderFunction>> {
        if let Ok(entries) = self.entries.read() {
            if let Some(function) = entries.get(entry_point, stage) {
                return Some(function);
            }
        }
        self.compiler.get_function(entry_point, stage)
    }

    /// Check that `function` is still the one registered for its entry point
    ///
    /// A caller that resolved `function` may build a pipeline from it after
    /// another caller has re-registered the stage. When that happened, the
    /// pipelines built from `function` are evicted and `false` is returned.
    pub fn retain_if_current(&self, function: &Arc<dyn ShaderFunction>, pipelines: &PipelineCache) -> bool {
        let current = self
            .function(function.entry_point(), function.stage())
            .is_some_and(|registered| Arc::ptr_eq(&registered, function));
        if !current {
            let evicted = pipelines.evict_referencing(function);
            crate::engine_debug!(
                "galaxy3d::ShaderFunctionRegistry",
                "Function '{}' was replaced while in use, dropped {} pipeline(s)",
                function.entry_point(),
                evicted
            );
        }
        current
    }

    /// Number of functions held by this registry
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.functions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register(&self, stage: &RuntimeStage) -> Result<Arc<dyn ShaderFunction>> {
        let entry_point = stage.entry_point();
        let (sender, receiver) = mpsc::sync_channel::<bool>(1);

        self.compiler.register_function(
            entry_point,
            stage.stage(),
            stage.code().clone(),
            Box::new(move |registered| {
                let _ = sender.send(registered);
            }),
        );

        // A dropped callback disconnects the channel
        let registered = receiver.recv().unwrap_or(false);
        if !registered {
            crate::engine_error!(
                "galaxy3d::ShaderFunctionRegistry",
                "Failed to compile runtime stage '{}'",
                entry_point
            );
            return Err(Error::ShaderCompilationFailed(entry_point.to_string()));
        }

        let Some(function) = self.compiler.get_function(entry_point, ShaderStage::Fragment) else {
            crate::engine_error!(
                "galaxy3d::ShaderFunctionRegistry",
                "Runtime stage '{}' registered but its function could not be fetched",
                entry_point
            );
            return Err(Error::ShaderFunctionMissing(entry_point.to_string()));
        };

        self.entries
            .write()
            .map_err(|_| crate::engine_err!("galaxy3d::ShaderFunctionRegistry", "Registry lock poisoned"))?
            .insert(entry_point, ShaderStage::Fragment, function.clone());
        stage.set_clean();

        crate::engine_debug!("galaxy3d::ShaderFunctionRegistry", "Registered runtime stage '{}'", entry_point);
        Ok(function)
    }

    fn remove(&self, entry_point: &str, stage: ShaderStage) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| crate::engine_err!("galaxy3d::ShaderFunctionRegistry", "Registry lock poisoned"))?
            .remove(entry_point, stage);
        Ok(())
    }
}

#[cfg(test)]
#[path = "shader_function_registry_tests.rs"]
mod tests;
