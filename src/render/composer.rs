use crate::params::BloomSettings;
use crate::render::bloom::BloomPass;
use crate::render::mesh::GpuMesh;
use crate::render::scene_pass::ScenePass;
use crate::scene::Scene;

/// HDR format of the base scene render, consumed by the bloom chain.
pub const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The ordered pass chain: base scene render into an HDR target, then the
/// bloom passes compositing onto the output surface. There is no bare
/// render path; every frame goes through the full chain.
pub struct Composer {
    pub scene_pass: ScenePass,
    pub bloom: BloomPass,
    scene_color: Option<wgpu::TextureView>,
    depth: Option<wgpu::TextureView>,
}

impl Composer {
    pub fn new(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        settings: &BloomSettings,
    ) -> Self {
        Self {
            scene_pass: ScenePass::new(device, globals_layout, SCENE_FORMAT),
            bloom: BloomPass::new(device, settings, surface_format),
            scene_color: None,
            depth: None,
        }
    }

    /// Recreate the viewport-dependent targets and propagate the extent to
    /// the bloom chain.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let make = |label: &str, format| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        };

        let scene_color = make("Scene Color", SCENE_FORMAT);
        let depth = make("Scene Depth", DEPTH_FORMAT);

        self.bloom.resize(device, width, height, &scene_color);
        self.scene_color = Some(scene_color);
        self.depth = Some(depth);
    }

    /// Record the full chain for one frame.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        globals_bind_group: &wgpu::BindGroup,
        scene: &Scene<GpuMesh>,
    ) {
        let (Some(scene_color), Some(depth)) = (&self.scene_color, &self.depth) else {
            return;
        };

        self.scene_pass.draw(
            encoder,
            queue,
            scene_color,
            depth,
            globals_bind_group,
            scene,
        );
        self.bloom.render(encoder, surface_view);
    }

    pub fn model_layout(&self) -> &wgpu::BindGroupLayout {
        &self.scene_pass.model_layout
    }

    /// Drop the render targets. Part of teardown; safe to call twice.
    pub fn release_targets(&mut self) {
        self.scene_color = None;
        self.depth = None;
    }
}
