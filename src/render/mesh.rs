use wgpu::util::DeviceExt;

use crate::scene::MeshData;

/// Interleaved vertex for both the physical and the flat pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-draw data in GPU layout: model matrix plus the flat color (unused by
/// the physical pipeline).
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Uploaded geometry plus its per-draw uniform and bind group.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    pub fn upload(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        data: &MeshData,
    ) -> Self {
        let vertices = interleave(data);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Uniform"),
            contents: bytemuck::cast_slice(&[ModelUniform {
                model: glam::Mat4::IDENTITY.to_cols_array_2d(),
                color: [1.0, 1.0, 1.0, 1.0],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            model_buffer,
            model_bind_group,
        }
    }

    pub fn write_model(&self, queue: &wgpu::Queue, model: glam::Mat4, color: [f32; 4]) {
        queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&[ModelUniform {
                model: model.to_cols_array_2d(),
                color,
            }]),
        );
    }
}

fn interleave(data: &MeshData) -> Vec<Vertex> {
    let fallback_normal = [0.0, 0.0, 1.0];
    data.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: data.normals.get(i).copied().unwrap_or(fallback_normal),
            uv: data.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_pads_missing_attributes() {
        let mut data = MeshData::new("m");
        data.positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        data.normals = vec![[0.0, 1.0, 0.0]];

        let vertices = interleave(&data);

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].uv, [0.0, 0.0]);
    }
}
