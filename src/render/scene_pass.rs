use crate::render::mesh::{GpuMesh, Vertex};
use crate::scene::{Scene, Shading};

/// Base scene render into the HDR target: physical objects first, then the
/// flat diagram geometry (double-sided, alpha-blended, depth-read-only).
pub struct ScenePass {
    physical_pipeline: wgpu::RenderPipeline,
    flat_pipeline: wgpu::RenderPipeline,
    pub model_layout: wgpu::BindGroupLayout,
}

/// Clear color 0x1f1e1c in linear space.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0137,
    g: 0.0130,
    b: 0.0116,
    a: 1.0,
};

impl ScenePass {
    pub fn new(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("model_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[globals_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let physical_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Physical Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/physical.wgsl").into()),
        });

        let flat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flat Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flat.wgsl").into()),
        });

        let physical_pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Physical Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &physical_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &physical_shader,
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
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        // Diagram meshes blend over the scene without writing depth
        let flat_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Flat Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &flat_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &flat_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self {
            physical_pipeline,
            flat_pipeline,
            model_layout,
        }
    }

    /// Write per-draw uniforms and record the base scene pass.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        globals_bind_group: &wgpu::BindGroup,
        scene: &Scene<GpuMesh>,
    ) {
        for object in &scene.objects {
            let color = match object.shading {
                Shading::Physical => [1.0, 1.0, 1.0, 1.0],
                Shading::Flat { color } => color,
            };
            object
                .mesh
                .write_model(queue, object.transform.matrix(), color);
        }
        if let Some(diagram) = &scene.diagram {
            let group_matrix = diagram.transform.matrix();
            for (mesh, color) in &diagram.meshes {
                mesh.write_model(queue, group_matrix, *color);
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_bind_group(0, globals_bind_group, &[]);

        pass.set_pipeline(&self.physical_pipeline);
        for object in &scene.objects {
            if object.shading == Shading::Physical {
                draw_mesh(&mut pass, &object.mesh);
            }
        }

        pass.set_pipeline(&self.flat_pipeline);
        for object in &scene.objects {
            if matches!(object.shading, Shading::Flat { .. }) {
                draw_mesh(&mut pass, &object.mesh);
            }
        }
        if let Some(diagram) = &scene.diagram {
            for (mesh, _) in &diagram.meshes {
                draw_mesh(&mut pass, mesh);
            }
        }
    }
}

fn draw_mesh<'a>(pass: &mut wgpu::RenderPass<'a>, mesh: &'a GpuMesh) {
    pass.set_bind_group(1, &mesh.model_bind_group, &[]);
    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
}
