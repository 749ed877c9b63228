//! Thin wrappers over the WebGPU bindings of `web_sys`.
use std::{
    borrow::Cow,
    ops::{BitAnd, BitOr, BitOrAssign},
};

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{
    error::{Error, Result},
    wgsl::HostSharable,
};

/// Wrapper of a [`web_sys::GpuDevice`].
#[derive(Debug, Clone)]
pub struct Device {
    device: web_sys::GpuDevice,
}

impl Device {
    /// Requests a device from the default adapter of the browser.
    pub async fn request() -> Result<Self> {
        let window = web_sys::window().ok_or(Error::NoWindow)?;
        let gpu = window.navigator().gpu();
        if gpu.is_falsy() {
            return Err(Error::NoGpu);
        }

        let adapter = JsFuture::from(gpu.request_adapter())
            .await
            .map_err(|e| Error::Adapter(format!("{e:?}")))?;
        if adapter.is_falsy() {
            return Err(Error::Adapter("no adapter available".into()));
        }
        let adapter = adapter.unchecked_into::<web_sys::GpuAdapter>();

        let device = JsFuture::from(adapter.request_device())
            .await
            .map_err(|e| Error::Device(format!("{e:?}")))?;
        if device.is_falsy() {
            return Err(Error::Device("no device available".into()));
        }

        Ok(Self {
            device: device.unchecked_into(),
        })
    }

    pub fn queue(&self) -> Queue {
        Queue {
            queue: self.device.queue(),
        }
    }

    pub fn create_buffer(&self, descriptor: BufferDescriptor<'_>) -> Result<Buffer> {
        let buffer = self
            .device
            .create_buffer(&descriptor.into())
            .map_err(Error::gpu)?;

        Ok(Buffer { buffer })
    }

    pub fn create_texture(&self, descriptor: TextureDescriptor<'_>) -> Result<Texture> {
        let [width, height] = descriptor.size;
        let texture = self
            .device
            .create_texture(&descriptor.into())
            .map_err(Error::gpu)?;

        Ok(Texture {
            texture,
            width,
            height,
        })
    }

    pub fn create_shader_module(&self, descriptor: ShaderModuleDescriptor<'_>) -> ShaderModule {
        ShaderModule {
            module: self.device.create_shader_module(&descriptor.into()),
        }
    }

    pub fn create_bind_group_layout(
        &self,
        descriptor: BindGroupLayoutDescriptor<'_>,
    ) -> Result<BindGroupLayout> {
        let layout = self
            .device
            .create_bind_group_layout(&descriptor.into())
            .map_err(Error::gpu)?;

        Ok(BindGroupLayout { layout })
    }

    pub fn create_pipeline_layout(&self, layouts: &[&BindGroupLayout]) -> PipelineLayout {
        let layouts = layouts
            .iter()
            .map(|l| JsValue::from(&l.layout))
            .collect::<js_sys::Array>();
        let descriptor = web_sys::GpuPipelineLayoutDescriptor::new(&layouts);

        PipelineLayout {
            layout: self.device.create_pipeline_layout(&descriptor),
        }
    }

    pub fn create_render_pipeline(
        &self,
        descriptor: RenderPipelineDescriptor<'_>,
    ) -> Result<RenderPipeline> {
        let pipeline = self
            .device
            .create_render_pipeline(&descriptor.into())
            .map_err(Error::gpu)?;

        Ok(RenderPipeline { pipeline })
    }

    pub fn create_bind_group(&self, descriptor: BindGroupDescriptor<'_>) -> BindGroup {
        BindGroup {
            group: self.device.create_bind_group(&descriptor.into()),
        }
    }

    pub fn create_command_encoder(&self) -> CommandEncoder {
        CommandEncoder {
            encoder: self.device.create_command_encoder(),
        }
    }
}

/// Wrapper of a [`web_sys::GpuQueue`].
#[derive(Debug, Clone)]
pub struct Queue {
    queue: web_sys::GpuQueue,
}

impl Queue {
    pub fn write_buffer<T: HostSharable>(
        &self,
        buffer: &Buffer,
        buffer_offset: u32,
        data: &[T],
    ) -> Result<()> {
        let data_offset = data.as_ptr() as usize;
        let data_size = std::mem::size_of_val(data);

        // Host sharable types may contain padding, which must not be read
        // through a `&[u8]`. The wasm memory is addressable from the JS side
        // instead, so the queue copies the bytes straight out of it.
        let memory = wasm_bindgen::memory().unchecked_into::<js_sys::WebAssembly::Memory>();
        let memory_data = memory.buffer().unchecked_into::<js_sys::ArrayBuffer>();
        let view = js_sys::DataView::new(&memory_data, data_offset, data_size);

        self.queue
            .write_buffer_with_u32_and_buffer_source(&buffer.buffer, buffer_offset, &view)
            .map_err(Error::gpu)
    }

    pub fn write_buffer_single<T: HostSharable>(
        &self,
        buffer: &Buffer,
        buffer_offset: u32,
        data: &T,
    ) -> Result<()> {
        self.write_buffer(buffer, buffer_offset, std::slice::from_ref(data))
    }

    /// Writes tightly packed rgba8 rows into a 2d texture.
    pub fn write_texture_rgba8(&self, texture: &Texture, data: &[[u8; 4]]) -> Result<()> {
        let destination = web_sys::GpuTexelCopyTextureInfo::new(&texture.texture);
        let layout = web_sys::GpuTexelCopyBufferLayout::new();
        layout.set_bytes_per_row(texture.width * 4);
        layout.set_rows_per_image(texture.height);

        let bytes = data.iter().flatten().copied().collect::<Vec<u8>>();
        let bytes = js_sys::Uint8Array::from(bytes.as_slice());
        self.queue
            .write_texture_with_buffer_source_and_gpu_extent_3d_dict(
                &destination,
                &bytes,
                &layout,
                &extent(texture.width, texture.height),
            )
            .map_err(Error::gpu)
    }

    pub fn submit(&self, command_buffers: impl IntoIterator<Item = CommandBuffer>) {
        let buffers = command_buffers
            .into_iter()
            .map(|b| JsValue::from(b.buffer))
            .collect::<js_sys::Array>();
        self.queue.submit(&buffers);
    }
}

fn extent(width: u32, height: u32) -> web_sys::GpuExtent3dDict {
    let extent = web_sys::GpuExtent3dDict::new(width);
    extent.set_height(height);
    extent
}

fn origin(x: u32, y: u32) -> JsValue {
    let object: ObjectExt = js_sys::Object::new().unchecked_into();
    object.set("x".into(), x.into());
    object.set("y".into(), y.into());
    object.into()
}

/// Wrapper of a [`web_sys::GpuBuffer`].
#[derive(Debug, Clone)]
pub struct Buffer {
    buffer: web_sys::GpuBuffer,
}

impl Buffer {
    /// Maps the buffer for reading and copies its contents.
    pub async fn read(&self) -> Result<Vec<u8>> {
        JsFuture::from(self.buffer.map_async(MapMode::READ.val))
            .await
            .map_err(Error::gpu)?;

        let range = self.buffer.get_mapped_range();
        let bytes = range.map(|range| js_sys::Uint8Array::new(&range).to_vec());
        self.buffer.unmap();
        bytes.map_err(Error::gpu)
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

/// Wrapper of a [`web_sys::GpuTexture`].
#[derive(Debug, Clone)]
pub struct Texture {
    texture: web_sys::GpuTexture,
    width: u32,
    height: u32,
}

impl Texture {
    /// Wraps the current texture of a configured canvas.
    pub fn current(context: &web_sys::GpuCanvasContext) -> Result<Self> {
        let texture = context.get_current_texture().map_err(Error::gpu)?;
        Ok(Self {
            width: texture.width(),
            height: texture.height(),
            texture,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn create_view(&self) -> Result<TextureView> {
        let view = self.texture.create_view().map_err(Error::gpu)?;
        Ok(TextureView { view })
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Wrapper of a [`web_sys::GpuTextureView`].
#[derive(Debug, Clone)]
pub struct TextureView {
    view: web_sys::GpuTextureView,
}

/// Wrapper of a [`web_sys::GpuShaderModule`].
#[derive(Debug, Clone)]
pub struct ShaderModule {
    module: web_sys::GpuShaderModule,
}

/// Wrapper of a [`web_sys::GpuBindGroupLayout`].
#[derive(Debug, Clone)]
pub struct BindGroupLayout {
    layout: web_sys::GpuBindGroupLayout,
}

/// Wrapper of a [`web_sys::GpuPipelineLayout`].
#[derive(Debug, Clone)]
pub struct PipelineLayout {
    layout: web_sys::GpuPipelineLayout,
}

/// Wrapper of a [`web_sys::GpuRenderPipeline`].
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    pipeline: web_sys::GpuRenderPipeline,
}

/// Wrapper of a [`web_sys::GpuBindGroup`].
#[derive(Debug, Clone)]
pub struct BindGroup {
    group: web_sys::GpuBindGroup,
}

/// Wrapper of a [`web_sys::GpuCommandBuffer`].
#[derive(Debug)]
pub struct CommandBuffer {
    buffer: web_sys::GpuCommandBuffer,
}

/// Wrapper of a [`web_sys::GpuCommandEncoder`].
#[derive(Debug)]
pub struct CommandEncoder {
    encoder: web_sys::GpuCommandEncoder,
}

impl CommandEncoder {
    pub fn begin_render_pass(
        &self,
        descriptor: RenderPassDescriptor<'_>,
    ) -> Result<RenderPassEncoder> {
        let pass = self
            .encoder
            .begin_render_pass(&descriptor.into())
            .map_err(Error::gpu)?;

        Ok(RenderPassEncoder { pass })
    }

    /// Copies the whole of `source` into `destination`.
    pub fn copy_texture_to_texture(&self, source: &Texture, destination: &Texture) -> Result<()> {
        let width = source.width.min(destination.width);
        let height = source.height.min(destination.height);
        self.encoder
            .copy_texture_to_texture_with_gpu_extent_3d_dict(
                &web_sys::GpuTexelCopyTextureInfo::new(&source.texture),
                &web_sys::GpuTexelCopyTextureInfo::new(&destination.texture),
                &extent(width, height),
            )
            .map_err(Error::gpu)
    }

    /// Copies one texel at `[x, y]` to the start of `destination`.
    pub fn copy_texel_to_buffer(
        &self,
        source: &Texture,
        [x, y]: [u32; 2],
        destination: &Buffer,
    ) -> Result<()> {
        let source = web_sys::GpuTexelCopyTextureInfo::new(&source.texture);
        source.set_origin(&origin(x, y));

        let destination = web_sys::GpuTexelCopyBufferInfo::new(&destination.buffer);
        destination.set_bytes_per_row(COPY_BYTES_PER_ROW_ALIGNMENT);

        self.encoder
            .copy_texture_to_buffer_with_gpu_extent_3d_dict(&source, &destination, &extent(1, 1))
            .map_err(Error::gpu)
    }

    pub fn finish(self) -> CommandBuffer {
        CommandBuffer {
            buffer: self.encoder.finish(),
        }
    }
}

/// Row alignment required by buffer copies.
pub const COPY_BYTES_PER_ROW_ALIGNMENT: u32 = 256;

/// Wrapper of a [`web_sys::GpuRenderPassEncoder`].
#[derive(Debug)]
pub struct RenderPassEncoder {
    pass: web_sys::GpuRenderPassEncoder,
}

impl RenderPassEncoder {
    pub fn set_pipeline(&self, pipeline: &RenderPipeline) {
        self.pass.set_pipeline(&pipeline.pipeline);
    }

    pub fn set_bind_group(&self, index: u32, group: &BindGroup) {
        self.pass.set_bind_group(index, Some(&group.group));
    }

    pub fn set_vertex_buffer(&self, slot: u32, buffer: &Buffer) {
        self.pass.set_vertex_buffer(slot, Some(&buffer.buffer));
    }

    pub fn set_scissor_rect(&self, x: u32, y: u32, width: u32, height: u32) {
        self.pass.set_scissor_rect(x, y, width, height);
    }

    pub fn draw(&self, vertex_count: u32, first_vertex: u32) {
        self.pass
            .draw_with_instance_count_and_first_vertex(vertex_count, 1, first_vertex);
    }

    pub fn end(self) {
        self.pass.end();
    }
}

/// Possible buffer usages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferUsage {
    val: u32,
}

impl BufferUsage {
    pub const MAP_READ: BufferUsage = BufferUsage {
        val: web_sys::gpu_buffer_usage::MAP_READ,
    };
    pub const COPY_DST: BufferUsage = BufferUsage {
        val: web_sys::gpu_buffer_usage::COPY_DST,
    };
    pub const VERTEX: BufferUsage = BufferUsage {
        val: web_sys::gpu_buffer_usage::VERTEX,
    };
    pub const UNIFORM: BufferUsage = BufferUsage {
        val: web_sys::gpu_buffer_usage::UNIFORM,
    };
}

/// Possible texture usages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUsage {
    val: u32,
}

impl TextureUsage {
    pub const COPY_SRC: TextureUsage = TextureUsage {
        val: web_sys::gpu_texture_usage::COPY_SRC,
    };
    pub const COPY_DST: TextureUsage = TextureUsage {
        val: web_sys::gpu_texture_usage::COPY_DST,
    };
    pub const TEXTURE_BINDING: TextureUsage = TextureUsage {
        val: web_sys::gpu_texture_usage::TEXTURE_BINDING,
    };
    pub const RENDER_ATTACHMENT: TextureUsage = TextureUsage {
        val: web_sys::gpu_texture_usage::RENDER_ATTACHMENT,
    };
}

/// Possible shader stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderStage {
    val: u32,
}

impl ShaderStage {
    pub const VERTEX: ShaderStage = ShaderStage {
        val: web_sys::gpu_shader_stage::VERTEX,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MapMode {
    val: u32,
}

impl MapMode {
    const READ: MapMode = MapMode {
        val: web_sys::gpu_map_mode::READ,
    };
}

macro_rules! impl_bit_ops {
    ($($t:ty),*) => {
        $(
            impl BitAnd for $t {
                type Output = Self;

                fn bitand(self, rhs: Self) -> Self::Output {
                    Self {
                        val: self.val & rhs.val,
                    }
                }
            }

            impl BitOr for $t {
                type Output = Self;

                fn bitor(self, rhs: Self) -> Self::Output {
                    Self {
                        val: self.val | rhs.val,
                    }
                }
            }

            impl BitOrAssign for $t {
                fn bitor_assign(&mut self, rhs: Self) {
                    self.val |= rhs.val;
                }
            }
        )*
    };
}

impl_bit_ops!(BufferUsage, TextureUsage, ShaderStage);

/// Texture formats used by the line layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Depth32Float,
}

impl From<TextureFormat> for web_sys::GpuTextureFormat {
    fn from(value: TextureFormat) -> Self {
        match value {
            TextureFormat::Rgba8Unorm => web_sys::GpuTextureFormat::Rgba8unorm,
            TextureFormat::Depth32Float => web_sys::GpuTextureFormat::Depth32float,
        }
    }
}

/// Representation of a [`web_sys::GpuBufferDescriptor`].
#[derive(Debug)]
pub struct BufferDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub size: usize,
    pub usage: BufferUsage,
}

impl<'a> From<BufferDescriptor<'a>> for web_sys::GpuBufferDescriptor {
    fn from(value: BufferDescriptor<'a>) -> Self {
        let descriptor = web_sys::GpuBufferDescriptor::new(value.size as f64, value.usage.val);
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a 2d [`web_sys::GpuTextureDescriptor`].
#[derive(Debug)]
pub struct TextureDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub size: [u32; 2],
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl<'a> From<TextureDescriptor<'a>> for web_sys::GpuTextureDescriptor {
    fn from(value: TextureDescriptor<'a>) -> Self {
        let [width, height] = value.size;
        let descriptor = web_sys::GpuTextureDescriptor::new(
            value.format.into(),
            &extent(width.max(1), height.max(1)),
            value.usage.val,
        );
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a [`web_sys::GpuShaderModuleDescriptor`].
#[derive(Debug)]
pub struct ShaderModuleDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub code: Cow<'a, str>,
}

impl<'a> From<ShaderModuleDescriptor<'a>> for web_sys::GpuShaderModuleDescriptor {
    fn from(value: ShaderModuleDescriptor<'a>) -> Self {
        let descriptor = web_sys::GpuShaderModuleDescriptor::new(&value.code);
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a [`web_sys::GpuBindGroupLayoutDescriptor`].
#[derive(Debug)]
pub struct BindGroupLayoutDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub entries: Vec<BindGroupLayoutEntry>,
}

impl<'a> From<BindGroupLayoutDescriptor<'a>> for web_sys::GpuBindGroupLayoutDescriptor {
    fn from(value: BindGroupLayoutDescriptor<'a>) -> Self {
        let entries = value
            .entries
            .into_iter()
            .map(|e| JsValue::from(web_sys::GpuBindGroupLayoutEntry::from(e)))
            .collect::<js_sys::Array>();

        let descriptor = web_sys::GpuBindGroupLayoutDescriptor::new(&entries);
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a [`web_sys::GpuBindGroupLayoutEntry`].
#[derive(Debug)]
pub struct BindGroupLayoutEntry {
    pub binding: u32,
    pub visibility: ShaderStage,
    pub resource: BindGroupLayoutEntryResource,
}

/// Possible resources of a [`BindGroupLayoutEntry`].
#[derive(Debug)]
pub enum BindGroupLayoutEntryResource {
    UniformBuffer,
    /// A non filterable float texture read with `textureLoad`.
    Texture,
}

impl From<BindGroupLayoutEntry> for web_sys::GpuBindGroupLayoutEntry {
    fn from(value: BindGroupLayoutEntry) -> Self {
        let entry = web_sys::GpuBindGroupLayoutEntry::new(value.binding, value.visibility.val);
        match value.resource {
            BindGroupLayoutEntryResource::UniformBuffer => {
                let layout = web_sys::GpuBufferBindingLayout::new();
                layout.set_type(web_sys::GpuBufferBindingType::Uniform);
                entry.set_buffer(&layout);
            }
            BindGroupLayoutEntryResource::Texture => {
                let layout = web_sys::GpuTextureBindingLayout::new();
                layout.set_sample_type(web_sys::GpuTextureSampleType::UnfilterableFloat);
                layout.set_view_dimension(web_sys::GpuTextureViewDimension::N2d);
                entry.set_texture(&layout);
            }
        }
        entry
    }
}

/// Representation of a [`web_sys::GpuBindGroupDescriptor`].
#[derive(Debug)]
pub struct BindGroupDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub layout: &'a BindGroupLayout,
    pub entries: Vec<BindGroupEntry<'a>>,
}

/// Representation of a [`web_sys::GpuBindGroupEntry`].
#[derive(Debug)]
pub struct BindGroupEntry<'a> {
    pub binding: u32,
    pub resource: BindingResource<'a>,
}

/// Possible resources of a [`BindGroupEntry`].
#[derive(Debug)]
pub enum BindingResource<'a> {
    Buffer(&'a Buffer),
    TextureView(&'a TextureView),
}

impl<'a> From<BindGroupDescriptor<'a>> for web_sys::GpuBindGroupDescriptor {
    fn from(value: BindGroupDescriptor<'a>) -> Self {
        let entries = value
            .entries
            .into_iter()
            .map(|e| {
                let resource: JsValue = match e.resource {
                    BindingResource::Buffer(b) => {
                        web_sys::GpuBufferBinding::new(&b.buffer).into()
                    }
                    BindingResource::TextureView(v) => v.view.clone().into(),
                };
                JsValue::from(web_sys::GpuBindGroupEntry::new(e.binding, &resource))
            })
            .collect::<js_sys::Array>();

        let descriptor = web_sys::GpuBindGroupDescriptor::new(&entries, &value.layout.layout);
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a [`web_sys::GpuRenderPipelineDescriptor`].
#[derive(Debug)]
pub struct RenderPipelineDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub layout: &'a PipelineLayout,
    pub vertex: VertexState<'a>,
    pub fragment: FragmentState<'a>,
    pub topology: PrimitiveTopology,
    pub depth_stencil: DepthStencilState,
}

impl<'a> From<RenderPipelineDescriptor<'a>> for web_sys::GpuRenderPipelineDescriptor {
    fn from(value: RenderPipelineDescriptor<'a>) -> Self {
        let vertex = js_sys::Object::from(value.vertex).unchecked_into();
        let descriptor =
            web_sys::GpuRenderPipelineDescriptor::new(&value.layout.layout, &vertex);

        descriptor.set_fragment(&js_sys::Object::from(value.fragment).unchecked_into());
        descriptor.set_depth_stencil(&js_sys::Object::from(value.depth_stencil).unchecked_into());

        let primitive = web_sys::GpuPrimitiveState::new();
        primitive.set_topology(value.topology.into());
        descriptor.set_primitive(&primitive);

        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Representation of a [`web_sys::GpuVertexState`].
#[derive(Debug)]
pub struct VertexState<'a> {
    pub entry_point: &'a str,
    pub module: &'a ShaderModule,
    pub buffers: Vec<VertexBufferLayout>,
}

impl<'a> From<VertexState<'a>> for js_sys::Object {
    fn from(value: VertexState<'a>) -> Self {
        let buffers = value
            .buffers
            .into_iter()
            .map(|b| JsValue::from(js_sys::Object::from(b)))
            .collect::<js_sys::Array>();

        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("module".into(), value.module.module.clone().into());
        object.set("entryPoint".into(), value.entry_point.into());
        object.set("buffers".into(), buffers.into());
        object.unchecked_into()
    }
}

/// Layout of one vertex buffer made of `vec4<f32>` attributes.
#[derive(Debug)]
pub struct VertexBufferLayout {
    pub array_stride: usize,
    pub vec4_attribute_count: u32,
}

impl From<VertexBufferLayout> for js_sys::Object {
    fn from(value: VertexBufferLayout) -> Self {
        let vec4_size = 4 * std::mem::size_of::<f32>();
        let attributes = (0..value.vec4_attribute_count)
            .map(|location| {
                let attribute = web_sys::GpuVertexAttribute::new(
                    web_sys::GpuVertexFormat::Float32x4,
                    (location as usize * vec4_size) as f64,
                    location,
                );
                JsValue::from(attribute)
            })
            .collect::<js_sys::Array>();

        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("arrayStride".into(), (value.array_stride as f64).into());
        object.set("stepMode".into(), "vertex".into());
        object.set("attributes".into(), attributes.into());
        object.unchecked_into()
    }
}

/// Representation of a [`web_sys::GpuFragmentState`] with a single target.
#[derive(Debug)]
pub struct FragmentState<'a> {
    pub entry_point: &'a str,
    pub module: &'a ShaderModule,
    pub format: TextureFormat,
    pub blend: Option<BlendState>,
}

impl<'a> From<FragmentState<'a>> for js_sys::Object {
    fn from(value: FragmentState<'a>) -> Self {
        let format: web_sys::GpuTextureFormat = value.format.into();
        let target: ObjectExt = js_sys::Object::new().unchecked_into();
        target.set("format".into(), format.into());
        if let Some(blend) = value.blend {
            target.set("blend".into(), js_sys::Object::from(blend).into());
        }

        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("module".into(), value.module.module.clone().into());
        object.set("entryPoint".into(), value.entry_point.into());
        object.set("targets".into(), js_sys::Array::of1(&target).into());
        object.unchecked_into()
    }
}

/// Blend configuration of a color target.
#[derive(Debug, Clone, Copy)]
pub struct BlendState {
    pub color: BlendComponent,
    pub alpha: BlendComponent,
}

#[derive(Debug, Clone, Copy)]
pub struct BlendComponent {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl From<BlendState> for js_sys::Object {
    fn from(value: BlendState) -> Self {
        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("color".into(), js_sys::Object::from(value.color).into());
        object.set("alpha".into(), js_sys::Object::from(value.alpha).into());
        object.unchecked_into()
    }
}

impl From<BlendComponent> for js_sys::Object {
    fn from(value: BlendComponent) -> Self {
        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("srcFactor".into(), value.src_factor.into());
        object.set("dstFactor".into(), value.dst_factor.into());
        object.set("operation".into(), "add".into());
        object.unchecked_into()
    }
}

/// Supported blend factors.
#[derive(Debug, Clone, Copy)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

impl From<BlendFactor> for JsValue {
    fn from(value: BlendFactor) -> Self {
        match value {
            BlendFactor::One => JsValue::from_str("one"),
            BlendFactor::SrcAlpha => JsValue::from_str("src-alpha"),
            BlendFactor::OneMinusSrcAlpha => JsValue::from_str("one-minus-src-alpha"),
        }
    }
}

/// Depth configuration of a pipeline.
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilState {
    pub format: TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
}

impl From<DepthStencilState> for js_sys::Object {
    fn from(value: DepthStencilState) -> Self {
        let format: web_sys::GpuTextureFormat = value.format.into();
        let object: ObjectExt = js_sys::Object::new().unchecked_into();
        object.set("format".into(), format.into());
        object.set(
            "depthWriteEnabled".into(),
            value.depth_write_enabled.into(),
        );
        object.set("depthCompare".into(), value.depth_compare.into());
        object.unchecked_into()
    }
}

/// Supported depth compare functions.
#[derive(Debug, Clone, Copy)]
pub enum CompareFunction {
    Less,
    Always,
}

impl From<CompareFunction> for JsValue {
    fn from(value: CompareFunction) -> Self {
        match value {
            CompareFunction::Less => JsValue::from_str("less"),
            CompareFunction::Always => JsValue::from_str("always"),
        }
    }
}

/// Supported primitive topologies.
#[derive(Debug, Clone, Copy)]
pub enum PrimitiveTopology {
    LineList,
    TriangleList,
}

impl From<PrimitiveTopology> for web_sys::GpuPrimitiveTopology {
    fn from(value: PrimitiveTopology) -> Self {
        match value {
            PrimitiveTopology::LineList => web_sys::GpuPrimitiveTopology::LineList,
            PrimitiveTopology::TriangleList => web_sys::GpuPrimitiveTopology::TriangleList,
        }
    }
}

/// A render pass over one color and one depth attachment.
///
/// Both attachments keep their previous contents.
#[derive(Debug)]
pub struct RenderPassDescriptor<'a> {
    pub label: Option<Cow<'a, str>>,
    pub color: &'a TextureView,
    pub depth: &'a TextureView,
}

impl<'a> From<RenderPassDescriptor<'a>> for web_sys::GpuRenderPassDescriptor {
    fn from(value: RenderPassDescriptor<'a>) -> Self {
        let color: ObjectExt = js_sys::Object::new().unchecked_into();
        color.set("view".into(), value.color.view.clone().into());
        color.set("loadOp".into(), "load".into());
        color.set("storeOp".into(), "store".into());

        let depth: ObjectExt = js_sys::Object::new().unchecked_into();
        depth.set("view".into(), value.depth.view.clone().into());
        depth.set("depthLoadOp".into(), "load".into());
        depth.set("depthStoreOp".into(), "store".into());

        let descriptor =
            web_sys::GpuRenderPassDescriptor::new(&js_sys::Array::of1(&color));
        descriptor.set_depth_stencil_attachment(&depth.unchecked_into());
        if let Some(label) = value.label {
            descriptor.set_label(&label);
        }
        descriptor
    }
}

/// Configures a canvas for copies of `format` textures.
pub fn configure_canvas(
    device: &Device,
    context: &web_sys::GpuCanvasContext,
    format: TextureFormat,
) -> Result<()> {
    let configuration = web_sys::GpuCanvasConfiguration::new(&device.device, format.into());
    configuration.set_alpha_mode(web_sys::GpuCanvasAlphaMode::Premultiplied);
    configuration.set_usage((TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_DST).val);
    context.configure(&configuration).map_err(Error::gpu)
}

#[wasm_bindgen]
extern "C" {
    type ObjectExt;

    #[wasm_bindgen(method, indexing_setter)]
    fn set(this: &ObjectExt, key: js_sys::JsString, value: JsValue);
}
