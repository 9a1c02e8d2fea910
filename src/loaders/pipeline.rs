use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::loaders::gltf::{self, MeshFixups};
use crate::loaders::hdr::{self, HdrImage};
use crate::loaders::svg::{self, DiagramMesh};
use crate::loaders::texture::{self, RgbaImage};
use crate::scene::MeshData;

/// A completed decode, ready to commit into the scene on the event-loop
/// thread.
pub enum DecodedAsset {
    /// A single named sub-mesh, fixups already baked in. Tracked by the
    /// rotation update once committed.
    Mesh(MeshData),
    /// Every mesh of a model file, fixups baked in. Tracked once committed.
    Meshes(Vec<MeshData>),
    /// A whole glTF scene committed flat-shaded, not tracked.
    FlatScene(Vec<(MeshData, [f32; 4])>),
    /// Tessellated SVG fill/stroke meshes for the diagram group.
    Diagram(Vec<DiagramMesh>),
    Environment(HdrImage),
    NormalMap(RgbaImage),
}

/// Outcome stream of the pipeline, drained between frames.
pub enum LoadEvent {
    /// Fractional completion, for feedback only.
    Progress { label: String, ratio: f32 },
    Loaded { label: String, asset: DecodedAsset },
    /// The scene stays untouched; there is no retry.
    Failed { label: String, error: String },
}

/// What to decode from a source path.
pub enum LoadKind {
    NamedMesh { node: String, fixups: MeshFixups },
    AllMeshes { fixups: MeshFixups },
    FlatScene,
    Diagram,
    Environment,
    NormalMap,
}

/// A fire-and-forget load: one in-flight attempt, no retry, no timeout,
/// no cancellation.
pub struct LoadRequest {
    pub label: String,
    pub path: PathBuf,
    pub kind: LoadKind,
}

impl LoadRequest {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>, kind: LoadKind) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            kind,
        }
    }
}

/// Issues decodes on worker threads and delivers their outcomes over a
/// channel. Completion may happen on any later tick, never synchronously
/// with `request`.
pub struct AssetLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub fn request(&self, request: LoadRequest) {
        let tx = self.tx.clone();
        let label = request.label.clone();
        log::info!("load: requested '{}' from {:?}", label, request.path);

        thread::spawn(move || {
            let _ = tx.send(LoadEvent::Progress {
                label: label.clone(),
                ratio: 0.0,
            });

            match decode(request) {
                Ok(asset) => {
                    let _ = tx.send(LoadEvent::Progress {
                        label: label.clone(),
                        ratio: 1.0,
                    });
                    let _ = tx.send(LoadEvent::Loaded { label, asset });
                }
                Err(error) => {
                    let _ = tx.send(LoadEvent::Failed {
                        label,
                        error: format!("{:#}", error),
                    });
                }
            }
        });
    }

    /// Take every event that has arrived so far. Non-blocking; the render
    /// loop never waits on loads.
    pub fn drain(&self) -> Vec<LoadEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(request: LoadRequest) -> Result<DecodedAsset> {
    match request.kind {
        LoadKind::NamedMesh { node, fixups } => {
            let mut mesh = gltf::load_named_mesh(&request.path, &node)?;
            fixups.apply(&mut mesh);
            Ok(DecodedAsset::Mesh(mesh))
        }
        LoadKind::AllMeshes { fixups } => {
            let mut meshes = gltf::load_all_meshes(&request.path)?;
            for mesh in &mut meshes {
                fixups.apply(mesh);
            }
            Ok(DecodedAsset::Meshes(meshes))
        }
        LoadKind::FlatScene => Ok(DecodedAsset::FlatScene(gltf::load_flat_scene(
            &request.path,
        )?)),
        LoadKind::Diagram => {
            let data = std::fs::read(&request.path)
                .context(format!("Failed to read SVG file: {:?}", request.path))?;
            Ok(DecodedAsset::Diagram(svg::parse_diagram(&data)?))
        }
        LoadKind::Environment => Ok(DecodedAsset::Environment(hdr::load_hdr(&request.path)?)),
        LoadKind::NormalMap => Ok(DecodedAsset::NormalMap(texture::load_texture(
            &request.path,
        )?)),
    }
}
