use crate::{
    error::Result,
    packing::{LineData, PALETTE_SIZE},
    panel::PanelUniforms,
    pipelines::{COLOR_FORMAT, DEPTH_FORMAT},
    webgpu::{
        BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindingResource, Buffer,
        BufferDescriptor, BufferUsage, Device, Queue, Texture, TextureDescriptor, TextureUsage,
        TextureView, COPY_BYTES_PER_ROW_ALIGNMENT,
    },
};

/// Static data and uniforms of one line layer.
#[derive(Debug)]
pub struct LineBuffers {
    vertices: Buffer,
    panel: Buffer,
    palette: Texture,
    bind_group: BindGroup,
}

impl LineBuffers {
    pub fn new(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        data: &LineData,
    ) -> Result<Self> {
        let vertices = device.create_buffer(BufferDescriptor {
            label: Some("line vertex buffer".into()),
            size: (std::mem::size_of_val(data.vertices.as_slice())).max(16),
            usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
        })?;
        if !data.vertices.is_empty() {
            queue.write_buffer(&vertices, 0, &data.vertices)?;
        }

        let panel = device.create_buffer(BufferDescriptor {
            label: Some("panel uniform buffer".into()),
            size: std::mem::size_of::<PanelUniforms>(),
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        })?;

        let palette = device.create_texture(TextureDescriptor {
            label: Some("line palette".into()),
            size: [PALETTE_SIZE as u32, 1],
            format: COLOR_FORMAT,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        })?;
        queue.write_texture_rgba8(&palette, &data.palette)?;
        let palette_view = palette.create_view()?;

        let bind_group = device.create_bind_group(BindGroupDescriptor {
            label: Some("line layer bind group".into()),
            layout,
            entries: vec![
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Buffer(&panel),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&palette_view),
                },
            ],
        });

        Ok(Self {
            vertices,
            panel,
            palette,
            bind_group,
        })
    }

    pub fn vertices(&self) -> &Buffer {
        &self.vertices
    }

    pub fn bind_group(&self) -> &BindGroup {
        &self.bind_group
    }

    pub fn write_panel(&self, queue: &Queue, uniforms: &PanelUniforms) -> Result<()> {
        queue.write_buffer_single(&self.panel, 0, uniforms)
    }

    pub fn destroy(&self) {
        self.vertices.destroy();
        self.panel.destroy();
        self.palette.destroy();
    }
}

/// Persistent color and depth targets of one line layer.
#[derive(Debug)]
pub struct RenderTargets {
    color: Texture,
    color_view: TextureView,
    depth: Texture,
    depth_view: TextureView,
}

impl RenderTargets {
    pub fn new(device: &Device, [width, height]: [u32; 2]) -> Result<Self> {
        let color = device.create_texture(TextureDescriptor {
            label: Some("line color target".into()),
            size: [width, height],
            format: COLOR_FORMAT,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
        })?;
        let depth = device.create_texture(TextureDescriptor {
            label: Some("line depth target".into()),
            size: [width, height],
            format: DEPTH_FORMAT,
            usage: TextureUsage::RENDER_ATTACHMENT,
        })?;

        Ok(Self {
            color_view: color.create_view()?,
            color,
            depth_view: depth.create_view()?,
            depth,
        })
    }

    pub fn color(&self) -> &Texture {
        &self.color
    }

    pub fn color_view(&self) -> &TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    pub fn destroy(&self) {
        self.color.destroy();
        self.depth.destroy();
    }
}

/// Creates the buffer a single picked texel is copied into.
pub fn pick_read_buffer(device: &Device) -> Result<Buffer> {
    device.create_buffer(BufferDescriptor {
        label: Some("pick read buffer".into()),
        size: COPY_BYTES_PER_ROW_ALIGNMENT as usize,
        usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
    })
}
