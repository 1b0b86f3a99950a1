//! Vertex buffer layouts for the backends that read lines through the input assembler

use line_geometry::Vertex;

const VEC4_SIZE: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;

/// One `Vertex` per shader invocation: GL lines and CPU quads.
pub const fn line_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
        // pos_width
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x4,
        },
        // color
        wgpu::VertexAttribute {
            offset: VEC4_SIZE,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}

/// Both endpoints of a segment per instance, read straight out of the line buffer.
pub const fn segment_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: VEC4_SIZE,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: VEC4_SIZE * 2,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x4,
        },
        wgpu::VertexAttribute {
            offset: VEC4_SIZE * 3,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    wgpu::VertexBufferLayout {
        array_stride: 2 * std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: ATTRIBUTES,
    }
}

/// The 4-corner template quad shared by every instance.
pub const fn template_quad_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x2,
    }];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}
