use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

use crate::scene::MeshData;

/// Fixed geometric adjustments baked into a loaded model's geometry,
/// applied in order: translate, rotate about X, scale.
#[derive(Debug, Clone, Copy)]
pub struct MeshFixups {
    pub translate: Vec3,
    pub rotate_x: f32,
    pub scale: f32,
}

impl Default for MeshFixups {
    fn default() -> Self {
        Self {
            translate: Vec3::ZERO,
            rotate_x: 0.0,
            scale: 1.0,
        }
    }
}

impl MeshFixups {
    pub fn apply(&self, mesh: &mut MeshData) {
        if self.translate != Vec3::ZERO {
            mesh.translate(self.translate);
        }
        if self.rotate_x != 0.0 {
            mesh.rotate_x(self.rotate_x);
        }
        if self.scale != 1.0 {
            mesh.scale(self.scale);
        }
    }
}

/// Load a glTF file (.glb or .gltf with external payload) and clone out the
/// geometry of the node with the given name.
///
/// A missing name is an error, not a panic: assets are untrusted at
/// authoring time and the caller treats this as a recoverable load failure.
pub fn load_named_mesh(path: impl AsRef<Path>, name: &str) -> Result<MeshData> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF {:?}: {} scenes, {} nodes, {} meshes",
        path,
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let node = document
        .nodes()
        .find(|n| n.name() == Some(name) && n.mesh().is_some());

    let Some(node) = node else {
        bail!("Mesh node '{}' not found in {:?}", name, path);
    };

    // node presence with a mesh was just checked
    let mesh = node.mesh().unwrap();
    let data = extract_mesh(&mesh, &buffers, &Mat4::IDENTITY, name)?;
    if data.vertex_count() == 0 {
        bail!("Mesh node '{}' in {:?} has no geometry", name, path);
    }
    Ok(data)
}

/// Load every mesh in a glTF file, geometry transformed by its node's
/// global transform.
pub fn load_all_meshes(path: impl AsRef<Path>) -> Result<Vec<MeshData>> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .context(format!("Failed to load glTF file: {:?}", path))?;

    let mut meshes = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(&node, &Mat4::IDENTITY, &mut |mesh, transform| {
                let name = mesh.name().unwrap_or("unnamed").to_string();
                let data = extract_mesh(mesh, &buffers, transform, &name)?;
                if data.vertex_count() > 0 {
                    meshes.push(data);
                }
                Ok(())
            })?;
        }
    }

    if meshes.is_empty() {
        bail!("No geometry found in {:?}", path);
    }
    Ok(meshes)
}

/// Load a glTF file as flat-shaded scene content: every mesh paired with
/// its material's base color.
pub fn load_flat_scene(path: impl AsRef<Path>) -> Result<Vec<(MeshData, [f32; 4])>> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .context(format!("Failed to load glTF file: {:?}", path))?;

    let mut meshes = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(&node, &Mat4::IDENTITY, &mut |mesh, transform| {
                let name = mesh.name().unwrap_or("unnamed").to_string();
                let color = mesh
                    .primitives()
                    .next()
                    .map(|p| p.material().pbr_metallic_roughness().base_color_factor())
                    .unwrap_or([1.0, 1.0, 1.0, 1.0]);
                let data = extract_mesh(mesh, &buffers, transform, &name)?;
                if data.vertex_count() > 0 {
                    meshes.push((data, color));
                }
                Ok(())
            })?;
        }
    }

    if meshes.is_empty() {
        bail!("No geometry found in {:?}", path);
    }
    Ok(meshes)
}

/// Walk a node hierarchy depth-first, accumulating transforms.
fn collect_node(
    node: &gltf::Node,
    parent_transform: &Mat4,
    visit: &mut dyn FnMut(&gltf::Mesh, &Mat4) -> Result<()>,
) -> Result<()> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global = *parent_transform * local;

    if let Some(mesh) = node.mesh() {
        visit(&mesh, &global)?;
    }

    for child in node.children() {
        collect_node(&child, &global, visit)?;
    }

    Ok(())
}

/// Clone one mesh's primitives into a single `MeshData`, so the decode's
/// own buffers can drop afterwards.
fn extract_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    name: &str,
) -> Result<MeshData> {
    let mut data = MeshData::new(name);

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .context(format!("Mesh '{}' primitive has no positions", name))?;

        let base = data.positions.len() as u32;
        for pos in positions {
            let v = transform.transform_point3(Vec3::from_array(pos));
            data.positions.push(v.to_array());
        }

        if let Some(normals) = reader.read_normals() {
            for normal in normals {
                let n = transform.transform_vector3(Vec3::from_array(normal));
                data.normals.push(n.normalize_or_zero().to_array());
            }
        }

        if let Some(uvs) = reader.read_tex_coords(0) {
            for uv in uvs.into_f32() {
                data.uvs.push(uv);
            }
        }

        if let Some(indices) = reader.read_indices() {
            data.indices
                .extend(indices.into_u32().map(|i| base + i));
        } else {
            // Non-indexed primitive: treat as a plain triangle list
            let count = data.positions.len() as u32 - base;
            data.indices.extend((0..count).map(|i| base + i));
        }
    }

    Ok(data)
}
