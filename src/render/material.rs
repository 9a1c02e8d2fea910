use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::loaders::hdr::HdrImage;
use crate::loaders::texture::RgbaImage;
use crate::params::{MaterialParams, MaterialUniform};

/// Frame-global GPU state shared by every object using the physical
/// material: camera, the single material uniform, the equirectangular
/// environment and the normal map.
///
/// Textures start as 1x1 placeholders and are swapped in when their loads
/// complete; the bind group is rebuilt on swap.
pub struct SceneGlobals {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    env_texture: wgpu::Texture,
    normal_texture: wgpu::Texture,
    env_sampler: wgpu::Sampler,
    normal_sampler: wgpu::Sampler,
}

impl SceneGlobals {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, params: &MaterialParams) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                position: [0.0, 0.0, 5.0],
                _pad: 0.0,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[MaterialUniform::from_params(params)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let env_texture = placeholder_env(device, queue);
        let normal_texture = placeholder_normal(device, queue);

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Repeat wrapping so normalRepeat can tile the map
        let normal_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("globals_bind_group_layout"),
        });

        let bind_group = Self::build_bind_group(
            device,
            &layout,
            &camera_buffer,
            &material_buffer,
            &env_texture,
            &normal_texture,
            &env_sampler,
            &normal_sampler,
        );

        Self {
            layout,
            bind_group,
            camera_buffer,
            material_buffer,
            env_texture,
            normal_texture,
            env_sampler,
            normal_sampler,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        material_buffer: &wgpu::Buffer,
        env_texture: &wgpu::Texture,
        normal_texture: &wgpu::Texture,
        env_sampler: &wgpu::Sampler,
        normal_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let env_view = env_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let normal_view = normal_texture.create_view(&wgpu::TextureViewDescriptor::default());

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&env_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(env_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(normal_sampler),
                },
            ],
            label: Some("globals_bind_group"),
        })
    }

    fn rebuild(&mut self, device: &wgpu::Device) {
        self.bind_group = Self::build_bind_group(
            device,
            &self.layout,
            &self.camera_buffer,
            &self.material_buffer,
            &self.env_texture,
            &self.normal_texture,
            &self.env_sampler,
            &self.normal_sampler,
        );
    }

    /// Swap in the loaded equirectangular environment.
    pub fn set_environment(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, hdr: &HdrImage) {
        self.env_texture = upload_texture(
            device,
            queue,
            "Environment Map",
            wgpu::TextureFormat::Rgba32Float,
            hdr.width,
            hdr.height,
            bytemuck::cast_slice(&hdr.pixels),
            16,
        );
        self.rebuild(device);
    }

    /// Swap in the loaded normal map.
    pub fn set_normal_map(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, img: &RgbaImage) {
        self.normal_texture = upload_texture(
            device,
            queue,
            "Normal Map",
            wgpu::TextureFormat::Rgba8Unorm,
            img.width,
            img.height,
            &img.pixels,
            4,
        );
        self.rebuild(device);
    }

    pub fn write_camera(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Write-through for a panel edit; the frame submitted after this call
    /// renders with the new values.
    pub fn write_material(&self, queue: &wgpu::Queue, uniform: &MaterialUniform) {
        queue.write_buffer(&self.material_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }
}

#[allow(clippy::too_many_arguments)]
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    pixels: &[u8],
    bytes_per_pixel: u32,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * bytes_per_pixel),
            rows_per_image: Some(height),
        },
        size,
    );

    texture
}

fn placeholder_env(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
    // Dim gray until the HDR finishes loading
    let pixel: [f32; 4] = [0.05, 0.05, 0.05, 1.0];
    upload_texture(
        device,
        queue,
        "Environment Placeholder",
        wgpu::TextureFormat::Rgba32Float,
        1,
        1,
        bytemuck::cast_slice(&pixel),
        16,
    )
}

fn placeholder_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
    // Flat +Z normal
    let pixel: [u8; 4] = [128, 128, 255, 255];
    upload_texture(
        device,
        queue,
        "Normal Placeholder",
        wgpu::TextureFormat::Rgba8Unorm,
        1,
        1,
        &pixel,
        4,
    )
}
