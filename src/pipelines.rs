use crate::{
    error::Result,
    lines::LayerKind,
    packing::{GPU_DIMENSION_COUNT, VEC4_ATTRIBUTE_COUNT},
    webgpu::*,
};

/// Format of the color targets of every line layer.
pub const COLOR_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Format of the depth targets of every line layer.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Pipelines of one line layer.
#[derive(Debug)]
pub struct LinePipelines {
    pub layout: BindGroupLayout,
    pub draw_lines: RenderPipeline,
    pub clear_panel: RenderPipeline,
}

impl LinePipelines {
    pub fn new(device: &Device, kind: LayerKind, alpha_blending: bool) -> Result<Self> {
        let layout = device.create_bind_group_layout(BindGroupLayoutDescriptor {
            label: Some("line layer bind group layout".into()),
            entries: vec![
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStage::VERTEX,
                    resource: BindGroupLayoutEntryResource::UniformBuffer,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStage::VERTEX,
                    resource: BindGroupLayoutEntryResource::Texture,
                },
            ],
        })?;
        let pipeline_layout = device.create_pipeline_layout(&[&layout]);
        let empty_layout = device.create_pipeline_layout(&[]);

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("lines shader".into()),
            code: include_str!("./shaders/lines.wgsl").into(),
        });

        let draw_lines = Self::init_draw_lines_pipeline(
            device,
            &pipeline_layout,
            &module,
            kind,
            alpha_blending,
        )?;
        let clear_panel = Self::init_clear_panel_pipeline(device, &empty_layout, &module)?;

        Ok(Self {
            layout,
            draw_lines,
            clear_panel,
        })
    }

    fn init_draw_lines_pipeline(
        device: &Device,
        layout: &PipelineLayout,
        module: &ShaderModule,
        kind: LayerKind,
        alpha_blending: bool,
    ) -> Result<RenderPipeline> {
        let fragment_entry_point = match kind {
            LayerKind::Pick => "fs_pick",
            LayerKind::Context | LayerKind::Focus => "fs_main",
        };

        // Blended layers draw in submission order, the others keep the
        // nearest line.
        let (blend, depth_write_enabled, depth_compare) = if alpha_blending {
            let blend = BlendState {
                color: BlendComponent {
                    src_factor: BlendFactor::SrcAlpha,
                    dst_factor: BlendFactor::OneMinusSrcAlpha,
                },
                alpha: BlendComponent {
                    src_factor: BlendFactor::One,
                    dst_factor: BlendFactor::One,
                },
            };
            (Some(blend), false, CompareFunction::Always)
        } else {
            (None, true, CompareFunction::Less)
        };

        device.create_render_pipeline(RenderPipelineDescriptor {
            label: Some(format!("{kind:?} line render pipeline").into()),
            layout,
            vertex: VertexState {
                entry_point: "vs_main",
                module,
                buffers: vec![VertexBufferLayout {
                    array_stride: GPU_DIMENSION_COUNT * std::mem::size_of::<f32>(),
                    vec4_attribute_count: VEC4_ATTRIBUTE_COUNT as u32,
                }],
            },
            fragment: FragmentState {
                entry_point: fragment_entry_point,
                module,
                format: COLOR_FORMAT,
                blend,
            },
            topology: PrimitiveTopology::LineList,
            depth_stencil: DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled,
                depth_compare,
            },
        })
    }

    fn init_clear_panel_pipeline(
        device: &Device,
        layout: &PipelineLayout,
        module: &ShaderModule,
    ) -> Result<RenderPipeline> {
        device.create_render_pipeline(RenderPipelineDescriptor {
            label: Some("clear panel render pipeline".into()),
            layout,
            vertex: VertexState {
                entry_point: "vs_clear",
                module,
                buffers: Vec::new(),
            },
            fragment: FragmentState {
                entry_point: "fs_clear",
                module,
                format: COLOR_FORMAT,
                blend: None,
            },
            topology: PrimitiveTopology::TriangleList,
            depth_stencil: DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Always,
            },
        })
    }
}
