use anyhow::Result;
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use std::sync::Arc;
use winit::window::Window;

use crate::camera::{Camera, OrbitControls};
use crate::cli::Cli;
use crate::frame::FrameContext;
use crate::loaders::gltf::MeshFixups;
use crate::loaders::pipeline::{AssetLoader, DecodedAsset, LoadEvent, LoadKind, LoadRequest};
use crate::loaders::svg::DIAGRAM_SCALE;
use crate::panel::{ControlPanel, PanelChanges};
use crate::params::{BloomSettings, MaterialParams, MaterialUniform};
use crate::render::composer::Composer;
use crate::render::context::GpuContext;
use crate::render::material::SceneGlobals;
use crate::render::mesh::GpuMesh;
use crate::scene::{DiagramGroup, Scene, SceneObject, Shading, Transform};
use crate::update;

/// Device-pixel-ratio cap for the drawing surface.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Effective surface extent for a physical window size: undo the window's
/// scale factor, then reapply it capped at 2.
pub fn effective_extent(physical: (u32, u32), scale_factor: f64) -> (u32, u32) {
    let dpr = scale_factor.min(MAX_PIXEL_RATIO);
    let width = (physical.0 as f64 / scale_factor * dpr).round() as u32;
    let height = (physical.1 as f64 / scale_factor * dpr).round() as u32;
    (width.max(1), height.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Unloaded,
}

/// The sketch itself: owns the scene, the shared parameters and the whole
/// render stack, and answers the host's three events — resize, render,
/// unload.
pub struct Sketch {
    gpu: GpuContext,
    globals: SceneGlobals,
    composer: Composer,
    panel: ControlPanel,
    loader: AssetLoader,
    scene: Scene<GpuMesh>,
    camera: Camera,
    controls: OrbitControls,
    params: MaterialParams,
    pixel_ratio: f32,
    lifecycle: Lifecycle,
}

impl Sketch {
    pub async fn new(window: Arc<Window>, cli: &Cli) -> Result<Self> {
        let params = match &cli.params {
            Some(path) => MaterialParams::from_preset_file(path)?,
            None => MaterialParams::default(),
        };

        let gpu = GpuContext::new(window.clone(), !cli.no_vsync).await?;
        let globals = SceneGlobals::new(&gpu.device, &gpu.queue, &params);
        let composer = Composer::new(
            &gpu.device,
            &globals.layout,
            gpu.surface_format(),
            &BloomSettings::from_params(&params),
        );
        let panel = ControlPanel::new(&gpu.device, &window, gpu.surface_format(), !cli.no_ui);

        let camera = Camera::new();
        let mut controls = OrbitControls::new(&camera);
        controls.enabled = !params.enable_swooping_camera;

        let loader = AssetLoader::new();
        queue_asset_loads(&loader, &cli.assets);

        let mut sketch = Self {
            gpu,
            globals,
            composer,
            panel,
            loader,
            scene: Scene::new(),
            camera,
            controls,
            params,
            pixel_ratio: 1.0,
            lifecycle: Lifecycle::Running,
        };

        let size = window.inner_size();
        sketch.resize((size.width, size.height), window.scale_factor());

        log::info!("sketch initialized");
        Ok(sketch)
    }

    /// Recompute every viewport-dependent resource. The effective pixel
    /// ratio is capped at 2.
    pub fn resize(&mut self, physical: (u32, u32), scale_factor: f64) {
        if self.lifecycle == Lifecycle::Unloaded {
            return;
        }

        let (width, height) = effective_extent(physical, scale_factor);
        self.pixel_ratio = scale_factor.min(MAX_PIXEL_RATIO) as f32;

        self.gpu.resize(width, height);
        self.composer.resize(&self.gpu.device, width, height);
        self.camera.set_aspect(width, height);

        log::debug!(
            "resize: {}x{} (pixel ratio {:.2})",
            width,
            height,
            self.pixel_ratio
        );
    }

    /// Let the panel consume a window event first.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.panel.handle_event(window, event)
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Commit every load that has completed since the previous frame. The
    /// scene is valid with zero, some or all assets present.
    pub fn pump_loads(&mut self) {
        for event in self.loader.drain() {
            match event {
                LoadEvent::Progress { label, ratio } => {
                    log::info!("{} {:.0}% loaded", label, ratio * 100.0);
                }
                LoadEvent::Loaded { label, asset } => self.commit(label, asset),
                LoadEvent::Failed { label, error } => {
                    log::warn!("{}: load failed, skipping: {}", label, error);
                }
            }
        }
    }

    fn commit(&mut self, label: String, asset: DecodedAsset) {
        let device = &self.gpu.device;
        let model_layout = self.composer.model_layout();

        match asset {
            DecodedAsset::Mesh(data) => {
                let mesh = GpuMesh::upload(device, model_layout, &data);
                self.scene.add_object(SceneObject {
                    name: label,
                    mesh,
                    shading: Shading::Physical,
                    transform: Transform::identity(),
                    spins: true,
                });
            }
            DecodedAsset::Meshes(meshes) => {
                for data in meshes {
                    let mesh = GpuMesh::upload(device, model_layout, &data);
                    self.scene.add_object(SceneObject {
                        name: format!("{}/{}", label, data.name),
                        mesh,
                        shading: Shading::Physical,
                        transform: Transform::identity(),
                        spins: true,
                    });
                }
            }
            DecodedAsset::FlatScene(meshes) => {
                for (data, color) in meshes {
                    let mesh = GpuMesh::upload(device, model_layout, &data);
                    self.scene.add_object(SceneObject {
                        name: format!("{}/{}", label, data.name),
                        mesh,
                        shading: Shading::Flat { color },
                        transform: Transform::identity(),
                        spins: false,
                    });
                }
            }
            DecodedAsset::Diagram(meshes) => {
                let meshes = meshes
                    .into_iter()
                    .map(|m| (GpuMesh::upload(device, model_layout, &m.mesh), m.color))
                    .collect();
                let mut transform = Transform::identity();
                transform.scale = Vec3::splat(DIAGRAM_SCALE);
                self.scene.set_diagram(DiagramGroup {
                    name: label,
                    transform,
                    meshes,
                });
            }
            DecodedAsset::Environment(hdr) => {
                self.globals
                    .set_environment(&self.gpu.device, &self.gpu.queue, &hdr);
                log::info!("{}: environment bound", label);
            }
            DecodedAsset::NormalMap(img) => {
                self.globals
                    .set_normal_map(&self.gpu.device, &self.gpu.queue, &img);
                log::info!("{}: normal map bound", label);
            }
        }
    }

    /// Write panel edits through to the live GPU and behavior state, before
    /// this frame's passes are submitted.
    fn apply_changes(&mut self, changes: &PanelChanges) {
        if changes.material_changed {
            self.globals.write_material(
                &self.gpu.queue,
                &MaterialUniform::from_params(&self.params),
            );
        }
        if changes.bloom_changed {
            self.composer
                .bloom
                .write_settings(&self.gpu.queue, &BloomSettings::from_params(&self.params));
        }
        if changes.rotation_toggled {
            update::zero_rotations(self.scene.spinning_rotations());
        }
        match changes.swoop_toggled {
            Some(true) => {
                self.controls.enabled = false;
                self.controls.reset();
            }
            Some(false) => {
                // Adopt the swept pose so manual control resumes in place
                self.controls.sync_from(&self.camera);
                self.controls.enabled = true;
            }
            None => {}
        }
    }

    /// Advance one frame and draw it through the full pass chain.
    pub fn render(
        &mut self,
        window: &Window,
        frame: &FrameContext,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        if self.lifecycle == Lifecycle::Unloaded {
            return Ok(());
        }

        self.pump_loads();

        let (full_output, changes) = self.panel.run(window, &mut self.params);
        self.apply_changes(&changes);

        self.controls.update(&mut self.camera);
        if self.params.enable_rotation {
            update::advance_rotations(self.scene.spinning_rotations(), frame.delta);
        }
        if self.params.enable_swooping_camera {
            update::advance_swoop(&mut self.camera, frame.time);
        }
        self.globals
            .write_camera(&self.gpu.queue, &self.camera.to_uniform());

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.composer.render(
            &mut encoder,
            &self.gpu.queue,
            &view,
            &self.globals.bind_group,
            &self.scene,
        );

        if let Some(full_output) = full_output {
            self.panel.paint(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                window,
                &view,
                full_output,
                [self.gpu.config.width, self.gpu.config.height],
                self.pixel_ratio,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Release everything acquired. Safe to call more than once; only the
    /// first call has an effect.
    pub fn unload(&mut self) {
        if self.lifecycle == Lifecycle::Unloaded {
            return;
        }
        self.lifecycle = Lifecycle::Unloaded;

        self.scene.clear();
        self.composer.release_targets();
        log::info!("sketch unloaded");
    }
}

fn queue_asset_loads(loader: &AssetLoader, assets: &Path) {
    loader.request(LoadRequest::new(
        "fem_2_body_shell",
        assets.join("fem_2_body_shell.glb"),
        LoadKind::NamedMesh {
            node: "mesh_0".to_string(),
            fixups: MeshFixups {
                translate: Vec3::new(0.0, -68.0, 0.0),
                rotate_x: -FRAC_PI_2,
                scale: 1.0,
            },
        },
    ));

    loader.request(LoadRequest::new(
        "fem_2_head_shell",
        assets.join("fem_2_head_shell.gltf"),
        LoadKind::AllMeshes {
            fixups: MeshFixups::default(),
        },
    ));

    loader.request(LoadRequest::new(
        "diagram_plan",
        assets.join("diagram_plan.gltf"),
        LoadKind::FlatScene,
    ));

    loader.request(LoadRequest::new(
        "diagram_plan_svg",
        assets.join("diagram_plan.svg"),
        LoadKind::Diagram,
    ));

    loader.request(LoadRequest::new(
        "environment",
        assets.join("empty_warehouse_01_2k.hdr"),
        LoadKind::Environment,
    ));

    loader.request(LoadRequest::new(
        "normal_map",
        assets.join("normal.jpg"),
        LoadKind::NormalMap,
    ));
}
