/// ResourceBinder - binds a runtime uniform layout onto a draw command
///
/// Walks the layout once, in order. Float uniforms are copied from the
/// caller's uniform blob into the pass transients and bound as fragment
/// buffers. Sampled images take the next texture input and bind it with a
/// sampler from the sampler library.
///
/// Two counters assign slots. `buffer_index` advances after every entry,
/// whatever its kind, so images leave gaps in buffer slots. `sampler_index`
/// advances only after sampled images.

use crate::error::{Error, Result};
use crate::graphics_device::{
    Command, SampledImageSlot, SamplerLibrary, ShaderStage, ShaderUniformSlot, TransientBuffer,
};
use crate::runtime_stage::{RuntimeUniformDescription, RuntimeUniformType, TextureInput};

/// Float uniform values are packed at this stride in the uniform blob
const UNIFORM_LOCATION_STRIDE: usize = std::mem::size_of::<f32>();

/// Binds fragment resources for one draw
pub struct ResourceBinder<'a> {
    samplers: &'a dyn SamplerLibrary,
    min_uniform_alignment: usize,
    texture_inputs: &'a [TextureInput],
    uniform_data: &'a [u8],
    buffer_index: u32,
    sampler_index: u32,
    entries_processed: usize,
}

impl<'a> ResourceBinder<'a> {
    pub fn new(
        samplers: &'a dyn SamplerLibrary,
        min_uniform_alignment: usize,
        texture_inputs: &'a [TextureInput],
        uniform_data: &'a [u8],
    ) -> Self {
        Self {
            samplers,
            min_uniform_alignment,
            texture_inputs,
            uniform_data,
            buffer_index: 0,
            sampler_index: 0,
            entries_processed: 0,
        }
    }

    /// Bind every entry of `uniforms` onto `command`
    ///
    /// Stops at the first entry it cannot bind. An unsupported uniform kind
    /// yields `Error::UnsupportedUniformType`; entries before it stay bound.
    pub fn bind(
        &mut self,
        command: &mut Command,
        transients: &mut TransientBuffer,
        uniforms: &[RuntimeUniformDescription],
    ) -> Result<()> {
        for uniform in uniforms {
            match uniform.kind {
                RuntimeUniformType::SampledImage => self.bind_sampled_image(command, uniform)?,
                RuntimeUniformType::Float => self.bind_float(command, transients, uniform)?,
                RuntimeUniformType::Boolean
                | RuntimeUniformType::SignedByte
                | RuntimeUniformType::UnsignedByte
                | RuntimeUniformType::SignedShort
                | RuntimeUniformType::UnsignedShort
                | RuntimeUniformType::SignedInt
                | RuntimeUniformType::UnsignedInt
                | RuntimeUniformType::SignedInt64
                | RuntimeUniformType::UnsignedInt64
                | RuntimeUniformType::HalfFloat
                | RuntimeUniformType::Double => {
                    return Err(Error::UnsupportedUniformType(uniform.name.clone()));
                }
            }

            self.buffer_index += 1;
            self.entries_processed += 1;
        }
        Ok(())
    }

    /// Next fragment buffer slot
    pub fn buffer_index(&self) -> u32 {
        self.buffer_index
    }

    /// Next fragment sampler slot
    pub fn sampler_index(&self) -> u32 {
        self.sampler_index
    }

    /// Layout entries bound so far
    pub fn entries_processed(&self) -> usize {
        self.entries_processed
    }

    fn bind_sampled_image(&mut self, command: &mut Command, uniform: &RuntimeUniformDescription) -> Result<()> {
        let Some(input) = self.texture_inputs.get(self.sampler_index as usize) else {
            return Err(Error::InvalidResource(format!(
                "No texture input for sampled image '{}' (index {}, {} provided)",
                uniform.name,
                self.sampler_index,
                self.texture_inputs.len()
            )));
        };

        let sampler = self.samplers.get_sampler(&input.sampler_descriptor)?;
        let slot = SampledImageSlot {
            name: uniform.name.clone(),
            texture_index: self.sampler_index,
            sampler_index: self.sampler_index,
        };
        command.bind_sampled_image(ShaderStage::Fragment, slot, input.texture.clone(), sampler);

        self.sampler_index += 1;
        Ok(())
    }

    fn bind_float(
        &mut self,
        command: &mut Command,
        transients: &mut TransientBuffer,
        uniform: &RuntimeUniformDescription,
    ) -> Result<()> {
        let alignment = (uniform.bit_width / 8).max(self.min_uniform_alignment);
        let range = uniform.location.checked_mul(UNIFORM_LOCATION_STRIDE).and_then(|start| {
            uniform.size_in_bytes().and_then(|size| start.checked_add(size)).map(|end| (start, end))
        });
        let Some((start, end)) = range else {
            return Err(Error::InvalidResource(format!(
                "Uniform '{}' describes an out-of-range value (location {}, {}x{} x {} bits)",
                uniform.name,
                uniform.location,
                uniform.dimensions.rows,
                uniform.dimensions.cols,
                uniform.bit_width
            )));
        };

        let Some(bytes) = self.uniform_data.get(start..end) else {
            return Err(Error::InvalidResource(format!(
                "Uniform data too short for '{}': needs bytes {}..{}, have {}",
                uniform.name,
                start,
                end,
                self.uniform_data.len()
            )));
        };

        let view = transients.emplace(bytes, alignment)?;
        let slot = ShaderUniformSlot {
            name: uniform.name.clone(),
            binding: self.buffer_index,
        };
        command.bind_buffer(ShaderStage::Fragment, slot, view);
        Ok(())
    }
}

#[cfg(test)]
#[path = "resource_binder_tests.rs"]
mod tests;
