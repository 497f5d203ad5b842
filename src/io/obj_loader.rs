use crate::core::geometry::{Vertex, VertexArray};
use crate::core::math::{Vector2, Vector3};
use crate::io::AssetError;
use crate::scene::mesh::triangle_normal;
use log::{info, warn};
use std::path::Path;

/// Loads an OBJ file as a flat triangle list (three vertices per triangle,
/// no index buffer), merging all of its objects.
///
/// Faces are triangulated. Objects without normals get per-face normals.
pub fn load_obj(path: &Path) -> Result<VertexArray, AssetError> {
    info!("Loading OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // one index per vertex for position/normal/uv
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &load_options)?;

    let mut vertices = VertexArray::new();
    for model in &models {
        let mesh = &model.mesh;
        let has_normals = !mesh.normals.is_empty();
        let has_texcoords = !mesh.texcoords.is_empty();
        if !has_normals {
            warn!("Mesh '{}' has no normals, using face normals", model.name);
        }

        let position = |i: usize| {
            Vector3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            )
        };

        for tri in mesh.indices.chunks_exact(3) {
            let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let corners = idx.map(position);
            let face_normal = triangle_normal(corners[0], corners[1], corners[2])
                .normalize()
                .unwrap_or(Vector3::zeros());

            for (k, &i) in idx.iter().enumerate() {
                let normal = if has_normals {
                    Vector3::new(
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    )
                } else {
                    face_normal
                };
                let texcoord = if has_texcoords {
                    Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
                } else {
                    Vector2::zeros()
                };
                vertices.push(Vertex::new(corners[k], normal, texcoord));
            }
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }

    info!(
        "OBJ loaded: {} objects, {} triangles",
        models.len(),
        vertices.triangle_count()
    );
    Ok(vertices)
}
