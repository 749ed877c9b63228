//! WebGPU implementation of the line layers.
use std::{cell::Cell, rc::Rc};

use wasm_bindgen::JsCast;

use crate::{
    buffers::{self, LineBuffers, RenderTargets},
    error::{Error, Result},
    lines::{LayerKind, LineBackend},
    packing::{LineData, SECTION_VERTEX_COUNT},
    panel::{PanelUniforms, ScissorRect},
    pick,
    pipelines::{LinePipelines, COLOR_FORMAT},
    webgpu::{self, Buffer, CommandEncoder, Device, Queue, RenderPassDescriptor, Texture},
};

/// Canvas a layer presents its color target to.
#[derive(Debug)]
struct Presentation {
    context: web_sys::GpuCanvasContext,
}

impl Presentation {
    fn new(
        device: &Device,
        canvas: &web_sys::HtmlCanvasElement,
        [width, height]: [u32; 2],
    ) -> Result<Self> {
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("webgpu")
            .map_err(|_| Error::Context("webgpu"))?
            .ok_or(Error::Context("webgpu"))?
            .dyn_into::<web_sys::GpuCanvasContext>()
            .map_err(|_| Error::Context("webgpu"))?;
        webgpu::configure_canvas(device, &context, COLOR_FORMAT)?;

        Ok(Self { context })
    }
}

/// Line layer drawing with WebGPU.
///
/// Every operation renders into persistent targets, which are then copied
/// to the canvas of the layer, if it has one.
#[derive(Debug)]
pub struct WebGpuLineBackend {
    kind: LayerKind,
    device: Device,
    queue: Queue,
    pipelines: LinePipelines,
    buffers: LineBuffers,
    targets: RenderTargets,
    presentation: Option<Presentation>,
    destroyed: bool,
}

impl WebGpuLineBackend {
    pub fn new(
        device: &Device,
        kind: LayerKind,
        alpha_blending: bool,
        data: &LineData,
        size: [u32; 2],
        canvas: Option<&web_sys::HtmlCanvasElement>,
    ) -> Result<Self> {
        let queue = device.queue();
        let pipelines = LinePipelines::new(device, kind, alpha_blending)?;
        let buffers = LineBuffers::new(device, &queue, &pipelines.layout, data)?;
        let targets = RenderTargets::new(device, size)?;
        let presentation = canvas
            .map(|canvas| Presentation::new(device, canvas, size))
            .transpose()?;

        let backend = Self {
            kind,
            device: device.clone(),
            queue,
            pipelines,
            buffers,
            targets,
            presentation,
            destroyed: false,
        };

        // The targets start out undefined.
        backend.clear(&ScissorRect {
            x: 0,
            y: 0,
            width: size[0],
            height: size[1],
        })?;

        log::debug!("created {kind:?} layer of {}x{} pixels", size[0], size[1]);
        Ok(backend)
    }

    /// Reader of the color target, for the pick layer.
    pub fn pick_reader(&self) -> Result<PickReader> {
        Ok(PickReader {
            device: self.device.clone(),
            queue: self.queue.clone(),
            texture: self.targets.color().clone(),
            buffer: buffers::pick_read_buffer(&self.device)?,
            busy: Rc::new(Cell::new(false)),
        })
    }

    fn clear(&self, scissor: &ScissorRect) -> Result<()> {
        let encoder = self.device.create_command_encoder();
        let pass = self.begin_pass(&encoder, "clear panel pass")?;
        pass.set_pipeline(&self.pipelines.clear_panel);
        pass.set_scissor_rect(scissor.x, scissor.y, scissor.width, scissor.height);
        pass.draw(3, 0);
        pass.end();

        self.present(encoder)
    }

    fn draw(
        &self,
        uniforms: &PanelUniforms,
        scissor: &ScissorRect,
        first_sample: usize,
        sample_count: usize,
    ) -> Result<()> {
        self.buffers.write_panel(&self.queue, uniforms)?;

        let encoder = self.device.create_command_encoder();
        let pass = self.begin_pass(&encoder, "draw lines pass")?;
        pass.set_pipeline(&self.pipelines.draw_lines);
        pass.set_bind_group(0, self.buffers.bind_group());
        pass.set_vertex_buffer(0, self.buffers.vertices());
        pass.set_scissor_rect(scissor.x, scissor.y, scissor.width, scissor.height);
        pass.draw(
            (sample_count * SECTION_VERTEX_COUNT) as u32,
            (first_sample * SECTION_VERTEX_COUNT) as u32,
        );
        pass.end();

        self.present(encoder)
    }

    fn begin_pass(
        &self,
        encoder: &CommandEncoder,
        label: &'static str,
    ) -> Result<webgpu::RenderPassEncoder> {
        encoder.begin_render_pass(RenderPassDescriptor {
            label: Some(label.into()),
            color: self.targets.color_view(),
            depth: self.targets.depth_view(),
        })
    }

    fn present(&self, encoder: CommandEncoder) -> Result<()> {
        if let Some(presentation) = &self.presentation {
            let canvas = Texture::current(&presentation.context)?;
            encoder.copy_texture_to_texture(self.targets.color(), &canvas)?;
        }
        self.queue.submit([encoder.finish()]);
        Ok(())
    }

    fn report(&self, operation: &str, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{operation} of the {:?} layer failed: {e}", self.kind);
        }
    }
}

impl LineBackend for WebGpuLineBackend {
    fn clear_panel(&mut self, scissor: &ScissorRect) {
        if self.destroyed || scissor.is_empty() {
            return;
        }
        let result = self.clear(scissor);
        self.report("clear", result);
    }

    fn draw_lines(
        &mut self,
        uniforms: &PanelUniforms,
        scissor: &ScissorRect,
        first_sample: usize,
        sample_count: usize,
    ) {
        if self.destroyed || scissor.is_empty() || sample_count == 0 {
            return;
        }
        let result = self.draw(uniforms, scissor, first_sample, sample_count);
        self.report("draw", result);
    }

    fn destroy(&mut self) {
        if std::mem::replace(&mut self.destroyed, true) {
            return;
        }
        self.buffers.destroy();
        self.targets.destroy();
        if let Some(presentation) = self.presentation.take() {
            presentation.context.unconfigure();
        }
    }
}

/// Reads single pixels back from the pick layer.
///
/// Only one read is in flight at any time.
#[derive(Debug, Clone)]
pub struct PickReader {
    device: Device,
    queue: Queue,
    texture: Texture,
    buffer: Buffer,
    busy: Rc<Cell<bool>>,
}

impl PickReader {
    /// Reads the pixel at `[x, y]`, in canvas pixels.
    ///
    /// Returns `None` if another read is still in flight or the pixel lies
    /// outside of the layer.
    pub async fn read_pixel(&self, [x, y]: [u32; 2]) -> Result<Option<[u8; 4]>> {
        if self.busy.get() || x >= self.texture.width() || y >= self.texture.height() {
            return Ok(None);
        }

        self.busy.set(true);
        let result = self.read(x, y).await;
        self.busy.set(false);
        result.map(Some)
    }

    /// Sample index of the line under `[x, y]`.
    ///
    /// The outer `None` marks a skipped read, the inner one a pixel without
    /// any line.
    pub async fn read_sample(&self, pixel: [u32; 2]) -> Result<Option<Option<usize>>> {
        Ok(self.read_pixel(pixel).await?.map(pick::decode))
    }

    async fn read(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        let encoder = self.device.create_command_encoder();
        encoder.copy_texel_to_buffer(&self.texture, [x, y], &self.buffer)?;
        self.queue.submit([encoder.finish()]);

        let bytes = self.buffer.read().await?;
        match bytes.as_slice() {
            [r, g, b, a, ..] => Ok([*r, *g, *b, *a]),
            _ => Err(Error::Gpu(format!(
                "expected a texel, read {} bytes",
                bytes.len()
            ))),
        }
    }
}
