use glam::Vec3;
use std::path::PathBuf;

use glass_sketch::loaders::gltf::{load_all_meshes, load_named_mesh, MeshFixups};

/// A one-triangle glTF document with its payload embedded as a data URI,
/// carrying a node named `mesh_0`.
const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0, "name": "mesh_0" }],
  "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
  "buffers": [{
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIA",
    "byteLength": 42
  }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

fn write_fixture(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("glass-sketch-model-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, TRIANGLE_GLTF).unwrap();
    path
}

#[cfg(test)]
mod model_tests {
    use super::*;

    #[test]
    fn test_named_mesh_is_found_and_cloned() {
        let path = write_fixture("named.gltf");

        let mesh = load_named_mesh(&path, "mesh_0").unwrap();

        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_named_mesh_is_a_recoverable_error() {
        let path = write_fixture("missing.gltf");

        let result = load_named_mesh(&path, "not_there");

        let error = format!("{:#}", result.unwrap_err());
        assert!(error.contains("not_there"), "error names the node: {}", error);
    }

    #[test]
    fn test_fixups_bake_into_loaded_geometry() {
        let path = write_fixture("fixups.gltf");

        let mut mesh = load_named_mesh(&path, "mesh_0").unwrap();
        MeshFixups {
            translate: Vec3::new(0.0, -1.0, 0.0),
            rotate_x: 0.0,
            scale: 2.0,
        }
        .apply(&mut mesh);

        // (0,0,0) -> (0,-1,0) -> (0,-2,0)
        assert_eq!(mesh.positions[0], [0.0, -2.0, 0.0]);
    }

    #[test]
    fn test_load_all_meshes_collects_the_scene() {
        let path = write_fixture("all.gltf");

        let meshes = load_all_meshes(&path).unwrap();

        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].name, "tri");
    }
}
