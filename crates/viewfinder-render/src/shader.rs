//! Shader management.

use crate::error::{RenderError, RenderResult};

/// WGSL for the stream quad: corners transformed by the crop-to-fill MVP,
/// texture coordinates remapped by the latched frame's transform.
pub const STREAM_QUAD_SHADER: &str = r#"
struct QuadUniforms {
    mvp: mat4x4<f32>,
    tex_transform: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> quad: QuadUniforms;
@group(0) @binding(1) var stream_texture: texture_2d<f32>;
@group(0) @binding(2) var stream_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coord: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = quad.mvp * vec4<f32>(input.position, 1.0);
    output.tex_coord = (quad.tex_transform * vec4<f32>(input.tex_coord, 0.0, 1.0)).xy;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(stream_texture, stream_sampler, input.tex_coord);
}
"#;

/// Builder for creating the engine's shader module.
///
/// Driver-side validation is the caller's concern: wrap [`Self::build_module`]
/// and the pipeline creation in a wgpu error scope to observe rejection.
pub struct ShaderBuilder {
    source: Option<String>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            label: None,
        }
    }

    /// Sets the shader source (WGSL).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the shader module.
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self
            .source
            .ok_or_else(|| RenderError::ShaderBuildFailed("missing shader source".into()))?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_without_source_is_rejected() {
        // No device needed: the missing-source check happens first, so a
        // builder with no source must already carry the error state.
        let builder = ShaderBuilder::new().with_label("empty");
        assert!(builder.source.is_none());
    }

    #[test]
    fn test_shader_declares_both_entry_points() {
        assert!(STREAM_QUAD_SHADER.contains("fn vs_main"));
        assert!(STREAM_QUAD_SHADER.contains("fn fs_main"));
    }
}
