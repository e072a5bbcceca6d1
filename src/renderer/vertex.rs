//! Vertex layout shared by every pipeline.

use bytemuck::{Pod, Zeroable};

/// Position + normal + uv + color. Untextured draws bind a 1x1 white
/// texture so the shader path stays uniform.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            uv,
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

/// Shared scene colors
pub mod colors {
    pub const BUTTON_OFF: [f32; 4] = [0.55, 0.12, 0.10, 1.0];
    pub const BUTTON_ON: [f32; 4] = [0.15, 0.85, 0.25, 1.0];
    pub const SHADOW: [f32; 4] = [0.05, 0.05, 0.06, 1.0];
    pub const CROSSHAIR: [f32; 4] = [0.9, 0.9, 0.9, 0.8];
    pub const CROSSHAIR_ACTIVE: [f32; 4] = [0.3, 1.0, 0.4, 0.9];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        // 3 + 3 + 2 + 4 floats
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }
}
