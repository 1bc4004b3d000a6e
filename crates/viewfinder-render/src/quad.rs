//! Screen-filling quad geometry.

use wgpu::util::DeviceExt;

/// Quad corners in model space, spanning the full clip square at z = 0.
const POSITIONS: [[f32; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
];

/// Unit texture coordinates, one per corner.
const TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

/// Corner order for the two triangles.
const INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

/// Position, texture-coordinate, and index buffers for the screen quad.
///
/// Created once per rendering-context lifetime; the geometry itself never
/// changes, all scaling happens in the vertex shader.
pub struct QuadBuffers {
    /// Corner positions.
    pub positions: wgpu::Buffer,
    /// Corner texture coordinates.
    pub tex_coords: wgpu::Buffer,
    /// Triangle indices (`u16`).
    pub indices: wgpu::Buffer,
}

impl QuadBuffers {
    /// Number of indices in the quad's index buffer.
    pub const INDEX_COUNT: u32 = INDICES.len() as u32;

    /// Uploads the quad geometry.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad positions"),
            contents: bytemuck::cast_slice(&POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad tex coords"),
            contents: bytemuck::cast_slice(&TEX_COORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad indices"),
            contents: bytemuck::cast_slice(&INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            positions,
            tex_coords,
            indices,
        }
    }

    /// Vertex buffer layouts for the two attribute streams.
    #[must_use]
    pub fn layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEX_COORD_ATTRIBUTES,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_reference_all_corners() {
        let mut seen = [false; 4];
        for &i in &INDICES {
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_triangles_wind_counter_clockwise() {
        for triangle in INDICES.chunks(3) {
            let [a, b, c] = [
                POSITIONS[triangle[0] as usize],
                POSITIONS[triangle[1] as usize],
                POSITIONS[triangle[2] as usize],
            ];
            let signed_area = (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]);
            assert!(signed_area > 0.0, "triangle {triangle:?} winds clockwise");
        }
    }

    #[test]
    fn test_tex_coords_span_unit_square() {
        assert!(TEX_COORDS.iter().all(|t| (0.0..=1.0).contains(&t[0])));
        assert!(TEX_COORDS.iter().all(|t| (0.0..=1.0).contains(&t[1])));
        assert!(TEX_COORDS.contains(&[0.0, 0.0]));
        assert!(TEX_COORDS.contains(&[1.0, 1.0]));
    }
}
