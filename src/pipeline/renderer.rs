use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::{Vertex, VertexArray};
use crate::core::math::Vector3;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::queue::MeshId;

/// Drives the pipeline stages for one render target.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// sample_count: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    /// Resets color to `color` and depth to the far value.
    pub fn clear(&mut self, color: Vector3) {
        self.framebuffer.clear(color, f32::INFINITY);
    }

    /// Draws a flat triangle list; a trailing partial triangle is ignored.
    pub fn draw_mesh<S: Shader>(&self, vertices: &[Vertex], shader: &S) {
        for tri in vertices.chunks_exact(3) {
            let (pos0, var0) = shader.vertex(&tri[0]);
            let (pos1, var1) = shader.vertex(&tri[1]);
            let (pos2, var2) = shader.vertex(&tri[2]);

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
            );
        }
    }
}

/// Uploaded vertex data addressed by [`MeshId`]. Ids start at 1; 0 is never
/// handed out.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: Vec<Vec<Vertex>>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&mut self, vertices: VertexArray) -> MeshId {
        self.meshes.push(vertices.into_vec());
        MeshId(self.meshes.len() as u32)
    }

    pub fn get(&self, id: MeshId) -> Option<&[Vertex]> {
        if !id.is_valid() {
            return None;
        }
        let index = (id.0 - 1) as usize;
        self.meshes.get(index).map(Vec::as_slice)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::make_cube_mesh;

    struct Solid;

    impl Shader for Solid {
        type Varying = Vector3;

        fn vertex(&self, vertex: &Vertex) -> (crate::core::math::Vector4, Vector3) {
            // drop z so every triangle lands on the near half of the depth range
            let p = vertex.position;
            (crate::core::math::Vector4::new(p.x, p.y, 0.0, 1.0), Vector3::zeros())
        }

        fn fragment(&self, _varying: Vector3) -> Vector3 {
            Vector3::repeat(1.0)
        }
    }

    #[test]
    fn registry_ids_start_at_one() {
        let mut registry = MeshRegistry::new();
        assert!(registry.is_empty());
        let a = registry.upload(make_cube_mesh());
        let b = registry.upload(make_cube_mesh());
        assert_eq!((a, b), (MeshId(1), MeshId(2)));
        assert!(registry.get(MeshId::INVALID).is_none());
        assert!(registry.get(MeshId(3)).is_none());
        assert_eq!(registry.get(a).map(<[Vertex]>::len), Some(36));
    }

    #[test]
    fn clear_then_draw_writes_depth() {
        let mut renderer = Renderer::new(8, 8, 1);
        renderer.clear(Vector3::zeros());
        assert_eq!(renderer.framebuffer.depth_at(4, 4), Some(f32::INFINITY));

        renderer.rasterizer.set_cull_mode(crate::core::rasterizer::CullMode::None);
        let cube = make_cube_mesh();
        renderer.draw_mesh(cube.as_slice(), &Solid);
        // the unit cube covers the upper right quadrant of NDC
        assert_eq!(renderer.framebuffer.depth_at(6, 2), Some(0.5));
        assert_eq!(renderer.framebuffer.get_pixel(6, 2), Some(Vector3::repeat(1.0)));
        assert_eq!(renderer.framebuffer.depth_at(1, 6), Some(f32::INFINITY));
    }
}
