use wgpu::util::DeviceExt;

use crate::params::BloomSettings;

/// Number of blur octaves: each level halves the resolution and widens
/// the kernel.
pub const MIP_COUNT: usize = 5;
const KERNEL_RADII: [f32; MIP_COUNT] = [3.0, 5.0, 7.0, 9.0, 11.0];

const BLOOM_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    direction: [f32; 2],
    inv_size: [f32; 2],
    kernel_radius: f32,
    _pad: [f32; 3],
}

/// One recorded blur step: draw into `target` sampling the previous step.
struct BlurStep {
    bind_group: wgpu::BindGroup,
    target: wgpu::TextureView,
}

/// Bloom post-process: luminosity threshold at half resolution, a chain of
/// separable gaussian blurs, then a weighted composite over the scene.
///
/// Threshold, strength and radius are live-tunable through one settings
/// buffer shared by the threshold and composite shaders.
pub struct BloomPass {
    settings_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,

    threshold_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    // Resolution-dependent state, rebuilt by `resize`
    threshold_bind_group: Option<wgpu::BindGroup>,
    bright_view: Option<wgpu::TextureView>,
    blur_steps: Vec<BlurStep>,
    composite_bind_group: Option<wgpu::BindGroup>,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        settings: &BloomSettings,
        output_format: wgpu::TextureFormat,
    ) -> Self {
        let settings_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bloom Settings"),
            contents: bytemuck::cast_slice(&[*settings]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let threshold_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
            label: Some("bloom_threshold_layout"),
        });

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
            label: Some("bloom_blur_layout"),
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                texture_entry(5),
                sampler_entry(6),
                uniform_entry(7),
            ],
            label: Some("bloom_composite_layout"),
        });

        let threshold_pipeline = fullscreen_pipeline(
            device,
            "Bloom Threshold Pipeline",
            &threshold_layout,
            include_str!("shaders/bloom_threshold.wgsl"),
            BLOOM_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "Bloom Blur Pipeline",
            &blur_layout,
            include_str!("shaders/bloom_blur.wgsl"),
            BLOOM_FORMAT,
        );
        let composite_pipeline = fullscreen_pipeline(
            device,
            "Bloom Composite Pipeline",
            &composite_layout,
            include_str!("shaders/bloom_composite.wgsl"),
            output_format,
        );

        Self {
            settings_buffer,
            sampler,
            threshold_layout,
            blur_layout,
            composite_layout,
            threshold_pipeline,
            blur_pipeline,
            composite_pipeline,
            threshold_bind_group: None,
            bright_view: None,
            blur_steps: Vec::new(),
            composite_bind_group: None,
        }
    }

    /// Rebuild every resolution-dependent target and bind group.
    /// `scene_view` is the HDR scene color this pass reads.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        scene_view: &wgpu::TextureView,
    ) {
        let target = |label: &str, w: u32, h: u32| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: w.max(1),
                    height: h.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: BLOOM_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        };

        // Threshold extraction at half resolution
        let bright_view = target("Bloom Bright", width / 2, height / 2);
        self.threshold_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.threshold_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.settings_buffer.as_entire_binding(),
                },
            ],
            label: Some("bloom_threshold_bind_group"),
        }));

        self.blur_steps.clear();
        let mut mip_views = Vec::with_capacity(MIP_COUNT);
        let mut source = bright_view.clone();

        for (level, radius) in KERNEL_RADII.iter().enumerate() {
            let w = (width / 2) >> level;
            let h = (height / 2) >> level;
            let horizontal = target(&format!("Bloom Mip {} H", level), w, h);
            let vertical = target(&format!("Bloom Mip {} V", level), w, h);

            for (direction, src, dst) in [
                ([1.0_f32, 0.0], &source, &horizontal),
                ([0.0, 1.0_f32], &horizontal, &vertical),
            ] {
                let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Bloom Blur Uniform"),
                    contents: bytemuck::cast_slice(&[BlurUniform {
                        direction,
                        inv_size: [1.0 / w.max(1) as f32, 1.0 / h.max(1) as f32],
                        kernel_radius: *radius,
                        _pad: [0.0; 3],
                    }]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &self.blur_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(src),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: uniform.as_entire_binding(),
                        },
                    ],
                    label: Some("bloom_blur_bind_group"),
                });

                self.blur_steps.push(BlurStep {
                    bind_group,
                    target: dst.clone(),
                });
            }

            source = vertical.clone();
            mip_views.push(vertical);
        }

        self.composite_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&mip_views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&mip_views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&mip_views[2]),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&mip_views[3]),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&mip_views[4]),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: self.settings_buffer.as_entire_binding(),
                },
            ],
            label: Some("bloom_composite_bind_group"),
        }));
        self.bright_view = Some(bright_view);
    }

    /// Write-through for a panel edit of threshold/strength/radius.
    pub fn write_settings(&self, queue: &wgpu::Queue, settings: &BloomSettings) {
        queue.write_buffer(&self.settings_buffer, 0, bytemuck::cast_slice(&[*settings]));
    }

    /// Record threshold, blur chain and composite. The composite draws the
    /// scene plus bloom into `output_view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, output_view: &wgpu::TextureView) {
        let (Some(threshold_bind_group), Some(bright_view), Some(composite_bind_group)) = (
            &self.threshold_bind_group,
            &self.bright_view,
            &self.composite_bind_group,
        ) else {
            // resize has not run yet
            return;
        };

        fullscreen_draw(
            encoder,
            "Bloom Threshold",
            &self.threshold_pipeline,
            threshold_bind_group,
            bright_view,
        );

        for step in &self.blur_steps {
            fullscreen_draw(
                encoder,
                "Bloom Blur",
                &self.blur_pipeline,
                &step.bind_group,
                &step.target,
            );
        }

        fullscreen_draw(
            encoder,
            "Bloom Composite",
            &self.composite_pipeline,
            composite_bind_group,
            output_view,
        );
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader_source: &str,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

fn fullscreen_draw(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    target: &wgpu::TextureView,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
