//! Geometry primitives with a two-phase lifecycle: an immutable CPU-side
//! mesh descriptor, and GPU buffers materialized on first setup. Realization
//! is idempotent and re-run whenever the rendering surface is recreated.

use bytemuck::cast_slice;
use wgpu::util::DeviceExt;

/// Vertex, texcoord and index data plus a draw topology. Positions are 2-D;
/// depth comes from the composed transform at draw time.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<[f32; 2]>,
    pub texcoords: Option<Vec<[f32; 2]>>,
    pub indices: Option<Vec<u16>>,
    pub topology: wgpu::PrimitiveTopology,
}

impl MeshData {
    /// Unit quad with texture coordinates, counter-clockwise winding.
    pub fn quad() -> Self {
        Self {
            vertices: vec![[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]],
            texcoords: Some(vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]),
            indices: Some(vec![0, 1, 3, 0, 3, 2]),
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    /// Unit disc: a center vertex plus a ring, fanned out as a triangle list.
    pub fn circle(segments: u16) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(segments as usize + 1);
        vertices.push([0.0, 0.0]);
        for i in 0..segments {
            let rad = (f32::from(i) / f32::from(segments)) * std::f32::consts::TAU;
            vertices.push([rad.cos(), rad.sin()]);
        }

        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 1..segments {
            indices.extend_from_slice(&[0, i, i + 1]);
        }
        indices.extend_from_slice(&[0, segments, 1]);

        Self {
            vertices,
            texcoords: None,
            indices: Some(indices),
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    /// Unit cross of two thin quads. `half_thickness` is the arm half-width
    /// relative to the unit arm length.
    pub fn cross(half_thickness: f32) -> Self {
        let t = half_thickness.clamp(0.001, 0.5);
        Self {
            vertices: vec![
                // horizontal arm
                [-1.0, -t],
                [1.0, -t],
                [-1.0, t],
                [1.0, t],
                // vertical arm
                [-t, -1.0],
                [t, -1.0],
                [-t, 1.0],
                [t, 1.0],
            ],
            texcoords: None,
            indices: Some(vec![0, 1, 3, 0, 3, 2, 4, 5, 7, 4, 7, 6]),
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

struct GpuBuffers {
    vertex: wgpu::Buffer,
    texcoord: Option<wgpu::Buffer>,
    index: Option<wgpu::Buffer>,
    index_count: u32,
}

/// A mesh descriptor together with its (possibly not yet realized) GPU
/// buffers.
pub struct Primitive {
    mesh: MeshData,
    gpu: Option<GpuBuffers>,
}

impl Primitive {
    pub fn new(mesh: MeshData) -> Self {
        Self { mesh, gpu: None }
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Replaces the mesh descriptor; buffers are rebuilt on the next
    /// `realize`.
    pub fn set_mesh(&mut self, mesh: MeshData) {
        self.mesh = mesh;
        self.gpu = None;
    }

    /// Creates the GPU buffers. Safe to call repeatedly; each call rebuilds
    /// the buffers, which is what surface recreation requires.
    pub fn realize(&mut self, device: &wgpu::Device, label: &str) {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertex-buffer")),
            contents: cast_slice(&self.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let texcoord = self.mesh.texcoords.as_ref().map(|uvs| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-texcoord-buffer")),
                contents: cast_slice(uvs),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        let (index, index_count) = match self.mesh.indices.as_ref() {
            Some(indices) => (
                Some(
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{label}-index-buffer")),
                        contents: cast_slice(indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                ),
                indices.len() as u32,
            ),
            None => (None, 0),
        };
        self.gpu = Some(GpuBuffers {
            vertex,
            texcoord,
            index,
            index_count,
        });
    }

    /// Issues the draw for this primitive. Pipeline and bind groups must be
    /// set by the caller; a primitive not yet realized draws nothing.
    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        rpass.set_vertex_buffer(0, gpu.vertex.slice(..));
        if let Some(texcoord) = gpu.texcoord.as_ref() {
            rpass.set_vertex_buffer(1, texcoord.slice(..));
        }
        match gpu.index.as_ref() {
            Some(index) => {
                rpass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
            None => rpass.draw(0..self.mesh.vertex_count(), 0..1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_matching_uv_and_index_ranges() {
        let quad = MeshData::quad();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.texcoords.as_ref().map(Vec::len), Some(4));
        let indices = quad.indices.expect("quad indices");
        assert_eq!(indices.len(), 6);
        assert!(indices.iter().all(|&i| (i as usize) < 4));
    }

    #[test]
    fn circle_fans_out_one_triangle_per_segment() {
        let circle = MeshData::circle(360);
        assert_eq!(circle.vertices.len(), 361);
        let indices = circle.indices.expect("circle indices");
        assert_eq!(indices.len(), 360 * 3);
        assert!(indices.iter().all(|&i| (i as usize) < 361));

        // Ring vertices stay on the unit circle.
        for v in &circle.vertices[1..] {
            let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_circle_is_promoted_to_a_triangle() {
        let circle = MeshData::circle(1);
        assert_eq!(circle.vertices.len(), 4);
    }

    #[test]
    fn cross_arms_honor_thickness() {
        let cross = MeshData::cross(0.02);
        assert_eq!(cross.vertices.len(), 8);
        assert_eq!(cross.indices.as_ref().map(Vec::len), Some(12));
        assert!(cross.vertices.iter().any(|v| (v[1].abs() - 0.02).abs() < 1e-6));
    }

    #[test]
    fn cross_thickness_is_clamped_to_sane_bounds() {
        let thin = MeshData::cross(0.0);
        assert!(thin.vertices.iter().any(|v| (v[1].abs() - 0.001).abs() < 1e-6));
        let fat = MeshData::cross(10.0);
        assert!(fat.vertices.iter().all(|v| v[0].abs() <= 1.0 && v[1].abs() <= 1.0));
    }
}
