use std::rc::Rc;

use async_channel::Receiver;
use wasm_bindgen::prelude::*;

mod webgpu;
mod wgsl;

mod action;
mod buffers;
mod gpu_lines;
mod pipelines;
mod wasm_bridge;

pub mod color_scale;
pub mod colors;
pub mod config;
pub mod dimension;
pub mod error;
pub mod event;
pub mod interaction;
pub mod lerp;
pub mod lines;
pub mod listener;
pub mod logging;
pub mod packing;
pub mod panel;
pub mod pick;
pub mod scale;
pub mod scheduler;

use crate::{
    color_scale::ColorMapping,
    config::Geometry,
    error::Error,
    gpu_lines::{PickReader, WebGpuLineBackend},
    interaction::{Interaction, Layers, PointerResponse},
    lines::{LayerConfig, LayerKind, LineLayer, LineRenderer},
    packing::{LineData, PaletteMode},
    panel::CanvasGeometry,
    scheduler::{AnimationFrameScheduler, FrameScheduler},
};

/// Parallel coordinates plot drawn with WebGPU.
#[wasm_bindgen]
pub struct Parcoords {
    interaction: Interaction,
    pick_reader: Option<PickReader>,
    geometry: Geometry,
    event_queue: Option<Receiver<wasm_bridge::Event>>,
}

#[wasm_bindgen]
impl Parcoords {
    /// Constructs a new plot.
    ///
    /// The context and focus lines are presented on the two canvases, which
    /// are resized to the canvas size of the plot. `callback` receives the
    /// notifications of the plot as `callback(name, payload)`.
    #[wasm_bindgen(constructor)]
    pub async fn new(
        callback: js_sys::Function,
        context_canvas: web_sys::HtmlCanvasElement,
        focus_canvas: web_sys::HtmlCanvasElement,
        dimensions: Box<[wasm_bridge::DimensionDef]>,
        line_color: Option<wasm_bridge::LineColorDef>,
        options: Option<wasm_bridge::PlotOptions>,
    ) -> Result<Parcoords, JsValue> {
        let options = options.unwrap_or_default();
        logging::init(logging::parse_level(options.log_level.as_deref()));

        let dimensions = dimension::prepare(
            dimensions
                .into_vec()
                .into_iter()
                .filter_map(|d| d.dimension)
                .collect(),
        );
        let sample_count = dimension::visible(&dimensions)
            .next()
            .map_or(0, dimension::Dimension::sample_count);

        let style = options.style();
        let geometry = options.layout().geometry(&style);
        let line_color = line_color.unwrap_or_default();
        let colors = ColorMapping::new(&line_color.color, sample_count)?;
        let unit_pad = geometry.unit_pad(style.vertical_padding);

        let device = webgpu::Device::request().await?;
        let scheduler: Rc<dyn FrameScheduler> =
            Rc::new(AnimationFrameScheduler::new().ok_or(Error::NoWindow)?);
        let canvas_geometry = CanvasGeometry {
            canvas_width: geometry.canvas_width,
            canvas_height: geometry.canvas_height,
            overdrag: style.canvas_overdrag_px(),
        };
        let size = [
            geometry.canvas_width.round() as u32,
            geometry.canvas_height.round() as u32,
        ];

        let focus_data = LineData::new(&dimensions, &colors, PaletteMode::Focus, unit_pad)?;
        let context_data = LineData::new(
            &dimensions,
            &colors,
            PaletteMode::Context {
                color: style.context_color,
                opacity: style.context_opacity,
            },
            unit_pad,
        )?;

        let layer = |kind: LayerKind, backend: WebGpuLineBackend, data: &LineData| {
            let config = LayerConfig::new(
                kind,
                &style,
                canvas_geometry,
                data.dimension_count,
                data.sample_count,
            );
            LineLayer::new(backend, config, scheduler.clone())
                .map(|l| Box::new(l) as Box<dyn LineRenderer>)
        };

        let context = WebGpuLineBackend::new(
            &device,
            LayerKind::Context,
            LayerKind::Context.alpha_blending(&style),
            &context_data,
            size,
            Some(&context_canvas),
        )?;
        let focus = WebGpuLineBackend::new(
            &device,
            LayerKind::Focus,
            LayerKind::Focus.alpha_blending(&style),
            &focus_data,
            size,
            Some(&focus_canvas),
        )?;

        let (pick, pick_reader) = if options.hover && pick::pickable(focus_data.sample_count) {
            let backend = WebGpuLineBackend::new(
                &device,
                LayerKind::Pick,
                LayerKind::Pick.alpha_blending(&style),
                &focus_data,
                size,
                None,
            )?;
            let reader = backend.pick_reader()?;
            (
                Some(layer(LayerKind::Pick, backend, &focus_data)?),
                Some(reader),
            )
        } else {
            (None, None)
        };

        let layers = Layers {
            context: layer(LayerKind::Context, context, &context_data)?,
            focus: layer(LayerKind::Focus, focus, &focus_data)?,
            pick,
        };

        let listener = Box::new(wasm_bridge::CallbackListener::new(callback));
        let mut interaction = Interaction::new(
            &dimensions,
            geometry,
            style.vertical_padding,
            layers,
            listener,
        )?;
        interaction.render_all();

        log::info!(
            "plot of {} samples over {} dimensions created",
            focus_data.sample_count,
            focus_data.dimension_count
        );

        Ok(Self {
            interaction,
            pick_reader,
            geometry,
            event_queue: None,
        })
    }

    /// Constructs a new event queue for this plot.
    ///
    /// Replaces the queue constructed before, if any.
    #[wasm_bindgen(js_name = constructEventQueue)]
    pub fn construct_event_queue(&mut self) -> wasm_bridge::EventQueue {
        let (sx, rx) = async_channel::unbounded();
        self.event_queue = Some(rx);
        wasm_bridge::EventQueue { sender: sx }
    }

    /// Starts the event loop of the plot.
    ///
    /// Returns once an `exit` event is received or every queue was dropped.
    #[wasm_bindgen(js_name = enterEventLoop)]
    pub async fn enter_event_loop(&mut self) -> Result<(), JsValue> {
        let Some(events) = self.event_queue.take() else {
            return Err(js_sys::Error::new("the event queue was not constructed").into());
        };

        while let Ok(event) = events.recv().await {
            match event {
                wasm_bridge::Event::Exit => break,
                wasm_bridge::Event::PointerDown { event } => {
                    let [x, y] = self.plot_position(&event);
                    self.interaction.pointer_down(x, y);
                }
                wasm_bridge::Event::PointerUp { event } => {
                    let [x, y] = self.plot_position(&event);
                    self.interaction.pointer_up(x, y);
                }
                wasm_bridge::Event::PointerMove { event } => {
                    let [x, y] = self.plot_position(&event);
                    if let PointerResponse::Pick { pixel } = self.interaction.pointer_move(x, y) {
                        self.hover(x, y, pixel).await;
                    }
                }
                wasm_bridge::Event::SetFilter { index, range } => {
                    self.interaction.set_filter(index, range);
                }
                wasm_bridge::Event::SetColorDomain { unit_domain } => {
                    self.interaction.set_color_domain(unit_domain);
                }
            }
        }

        self.interaction.destroy();
        log::debug!("event loop exited");
        Ok(())
    }

    /// Display order of the axes, as indices of the visible dimensions.
    #[wasm_bindgen(js_name = axisOrder)]
    pub fn axis_order(&self) -> Vec<u32> {
        self.interaction
            .order()
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }
}

impl Parcoords {
    /// Position of a pointer event relative to the plot area.
    fn plot_position(&self, event: &web_sys::PointerEvent) -> [f64; 2] {
        [
            event.offset_x() as f64 - self.geometry.translate_x,
            event.offset_y() as f64 - self.geometry.translate_y,
        ]
    }

    async fn hover(&mut self, x: f64, y: f64, pixel: [u32; 2]) {
        let Some(reader) = &self.pick_reader else {
            return;
        };

        match reader.read_sample(pixel).await {
            Ok(Some(sample)) => self.interaction.handle_pick(x, y, sample),
            Ok(None) => {}
            Err(e) => log::error!("could not read the pick layer: {e}"),
        }
    }
}
