use crate::core::math::{Vector2, Vector3};
use log::error;

/// A single vertex in object space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vector3,
    /// Not necessarily unit length; shading normalizes.
    pub normal: Vector3,
    pub texcoord: Vector2,
}

impl Vertex {
    pub fn new(position: Vector3, normal: Vector3, texcoord: Vector2) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

/// Growable triangle list: every three consecutive vertices form one triangle.
///
/// Capacity starts at [`VertexArray::INITIAL_CAPACITY`] on the first append and
/// doubles whenever it is exhausted. Running out of host memory while growing
/// aborts the process.
#[derive(Debug, Clone, Default)]
pub struct VertexArray {
    data: Vec<Vertex>,
}

impl VertexArray {
    pub const INITIAL_CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn push(&mut self, vertex: Vertex) {
        if self.data.len() == self.data.capacity() {
            let additional = self.data.capacity().max(Self::INITIAL_CAPACITY);
            if let Err(e) = self.data.try_reserve_exact(additional) {
                error!(
                    "Out of memory growing vertex array to {} vertices: {}",
                    self.data.capacity() + additional,
                    e
                );
                std::process::abort();
            }
        }
        self.data.push(vertex);
    }

    /// Appends the three corners of a triangle sharing one normal.
    pub fn push_triangle(&mut self, corners: [Vector3; 3], normal: Vector3) {
        for position in corners {
            self.push(Vertex::new(position, normal, Vector2::zeros()));
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn triangle_count(&self) -> usize {
        self.data.len() / 3
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vertex> {
        self.data.iter()
    }

    pub fn triangles(&self) -> std::slice::ChunksExact<'_, Vertex> {
        self.data.chunks_exact(3)
    }

    pub fn into_vec(self) -> Vec<Vertex> {
        self.data
    }
}

impl FromIterator<Vertex> for VertexArray {
    fn from_iter<I: IntoIterator<Item = Vertex>>(iter: I) -> Self {
        let mut array = Self::new();
        for v in iter {
            array.push(v);
        }
        array
    }
}
