//! `Wasm` bridge types.
use std::borrow::Cow;

use async_channel::Sender;
use wasm_bindgen::prelude::*;

use crate::{
    color_scale::{ColorScaleDescriptor, LineColor},
    colors::Rgba,
    config::{Layout, LineStyle},
    dimension::Dimension,
    listener::{DimensionFilter, FilterChange, Listener},
};

/// One input dimension of the plot.
#[derive(Debug, Clone)]
#[wasm_bindgen]
pub struct DimensionDef {
    /// `None` if the host passed no values at all.
    pub(crate) dimension: Option<Dimension>,
}

#[wasm_bindgen]
impl DimensionDef {
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(constructor)]
    pub fn new(
        label: &str,
        values: Option<Box<[f64]>>,
        id: Option<String>,
        range: Option<Box<[f64]>>,
        constraint_range: Option<Box<[f64]>>,
        tick_vals: Option<Box<[f64]>>,
        integer: Option<bool>,
        visible: Option<bool>,
    ) -> Self {
        let Some(values) = values else {
            log::warn!("dimension {label:?} has no values and is dropped");
            return Self { dimension: None };
        };

        let mut dimension = Dimension::new(label, values.into_vec());
        if let Some(id) = id {
            dimension = dimension.with_id(&id);
        }
        if let Some(range) = range.as_deref().and_then(|r| pair(label, "range", r)) {
            dimension = dimension.with_range(range);
        }
        if let Some(range) = constraint_range
            .as_deref()
            .and_then(|r| pair(label, "constraint range", r))
        {
            dimension = dimension.with_constraint_range(range);
        }
        if let Some(tick_vals) = tick_vals {
            dimension = dimension.with_tick_vals(tick_vals.into_vec());
        }
        if integer.unwrap_or(false) {
            dimension = dimension.integer();
        }
        if !visible.unwrap_or(true) {
            dimension = dimension.hidden();
        }

        Self {
            dimension: Some(dimension),
        }
    }
}

fn pair(label: &str, name: &str, values: &[f64]) -> Option<[f64; 2]> {
    match values {
        [lo, hi] => Some([*lo, *hi]),
        _ => {
            log::warn!(
                "the {name} of dimension {label:?} needs two values, found {}; ignoring it",
                values.len()
            );
            None
        }
    }
}

/// Color scale of per line color values.
#[derive(Debug, Clone)]
#[wasm_bindgen]
pub struct ColorScaleDef {
    pub(crate) descriptor: ColorScaleDescriptor<'static>,
}

#[wasm_bindgen]
impl ColorScaleDef {
    /// One of the predefined scales, e.g. `Viridis`.
    pub fn named(name: &str) -> Self {
        Self {
            descriptor: ColorScaleDescriptor::Named(Cow::Owned(name.into())),
        }
    }

    /// Explicit stops; `positions` and `colors` are matched by index.
    pub fn gradient(positions: Box<[f64]>, colors: Vec<String>) -> Self {
        if positions.len() != colors.len() {
            log::warn!(
                "color scale has {} positions but {} colors, extra entries are ignored",
                positions.len(),
                colors.len()
            );
        }

        let stops = positions
            .iter()
            .copied()
            .zip(colors.into_iter().map(Cow::Owned))
            .collect();
        Self {
            descriptor: ColorScaleDescriptor::Gradient(stops),
        }
    }
}

/// The `color` attribute of the lines.
#[derive(Debug, Clone)]
#[wasm_bindgen]
pub struct LineColorDef {
    pub(crate) color: LineColor,
}

#[wasm_bindgen]
impl LineColorDef {
    /// One css color for every line.
    pub fn constant(css: &str) -> Self {
        Self {
            color: LineColor::Constant(css.into()),
        }
    }

    /// One value per line, mapped through `scale`.
    pub fn values(
        values: Box<[f64]>,
        scale: ColorScaleDef,
        reverse_scale: bool,
        cmin: Option<f64>,
        cmax: Option<f64>,
    ) -> Self {
        Self {
            color: LineColor::Values {
                values: values.into_vec(),
                scale: scale.descriptor,
                reverse_scale,
                cmin,
                cmax,
            },
        }
    }
}

impl Default for LineColorDef {
    fn default() -> Self {
        Self::constant("#444")
    }
}

/// Layout and styling knobs of a plot.
#[derive(Debug, Clone)]
#[wasm_bindgen]
pub struct PlotOptions {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    #[wasm_bindgen(js_name = legendWidth)]
    pub legend_width: f64,
    #[wasm_bindgen(js_name = blockLineCount)]
    pub block_line_count: usize,
    #[wasm_bindgen(js_name = pixelRatio)]
    pub pixel_ratio: f64,
    #[wasm_bindgen(js_name = contextOpacity)]
    pub context_opacity: f64,
    #[wasm_bindgen(js_name = focusAlphaBlending)]
    pub focus_alpha_blending: bool,
    #[wasm_bindgen(js_name = verticalPadding)]
    pub vertical_padding: f64,
    #[wasm_bindgen(js_name = canvasOverdrag)]
    pub canvas_overdrag: f64,
    /// Whether hovering reads back the pick layer.
    pub hover: bool,
    pub(crate) context_color: [u8; 3],
    pub(crate) domain_x: [f64; 2],
    pub(crate) domain_y: [f64; 2],
    pub(crate) log_level: Option<String>,
}

#[wasm_bindgen]
impl PlotOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the color of the context lines from a css color.
    #[wasm_bindgen(js_name = setContextColor)]
    pub fn set_context_color(&mut self, css: &str) -> Result<(), JsValue> {
        let color = Rgba::parse_css(css)?;
        self.context_color = color
            .channels()
            .map(|c| c.round().clamp(0.0, 255.0) as u8);
        Ok(())
    }

    /// Sets the fractions of the host area covered by the plot.
    #[wasm_bindgen(js_name = setDomain)]
    pub fn set_domain(&mut self, x0: f64, x1: f64, y0: f64, y1: f64) {
        self.domain_x = [x0, x1];
        self.domain_y = [y0, y1];
    }

    /// Sets the level of the console log, e.g. `debug`.
    #[wasm_bindgen(js_name = setLogLevel)]
    pub fn set_log_level(&mut self, level: &str) {
        self.log_level = Some(level.into());
    }
}

impl PlotOptions {
    pub(crate) fn style(&self) -> LineStyle {
        LineStyle {
            block_line_count: self.block_line_count,
            pixel_ratio: self.pixel_ratio,
            context_color: self.context_color,
            context_opacity: self.context_opacity,
            focus_alpha_blending: self.focus_alpha_blending,
            vertical_padding: self.vertical_padding,
            canvas_overdrag: self.canvas_overdrag,
        }
        .sanitized()
    }

    pub(crate) fn layout(&self) -> Layout {
        Layout {
            width: self.width,
            height: self.height,
            padding: self.padding,
            legend_width: self.legend_width,
            domain_x: self.domain_x,
            domain_y: self.domain_y,
        }
    }
}

impl Default for PlotOptions {
    fn default() -> Self {
        let style = LineStyle::default();
        let layout = Layout::default();
        Self {
            width: layout.width,
            height: layout.height,
            padding: layout.padding,
            legend_width: layout.legend_width,
            block_line_count: style.block_line_count,
            pixel_ratio: style.pixel_ratio,
            context_opacity: style.context_opacity,
            focus_alpha_blending: style.focus_alpha_blending,
            vertical_padding: style.vertical_padding,
            canvas_overdrag: style.canvas_overdrag,
            hover: true,
            context_color: style.context_color,
            domain_x: layout.domain_x,
            domain_y: layout.domain_y,
            log_level: None,
        }
    }
}

/// Forwards the notifications of the plot to a JS callback.
///
/// The callback is invoked as `callback(name, payload)`.
#[derive(Debug)]
pub(crate) struct CallbackListener {
    callback: js_sys::Function,
}

impl CallbackListener {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }

    fn notify(&self, name: &str, payload: JsValue) {
        let this = JsValue::null();
        if let Err(err) = self.callback.call2(&this, &name.into(), &payload) {
            log::error!("the {name} callback threw: {err:?}");
        }
    }
}

impl Listener for CallbackListener {
    fn filter_changed(&mut self, change: &FilterChange) {
        let payload = filter_object(&change.changed);
        let all = change
            .all
            .iter()
            .map(|f| JsValue::from(filter_object(f)))
            .collect::<js_sys::Array>();
        set_property(&payload, "allDimensions", &all);
        self.notify("filterChanged", payload.into());
    }

    fn axes_moved(&mut self, order: &[usize]) {
        let order = order
            .iter()
            .map(|&i| JsValue::from(i as u32))
            .collect::<js_sys::Array>();
        self.notify("axesMoved", order.into());
    }

    fn hover(&mut self, x: f64, y: f64, sample: usize) {
        let payload = js_sys::Object::new();
        set_property(&payload, "x", &x.into());
        set_property(&payload, "y", &y.into());
        set_property(&payload, "dataIndex", &(sample as u32).into());
        self.notify("hover", payload.into());
    }

    fn unhover(&mut self, sample: usize) {
        let payload = js_sys::Object::new();
        set_property(&payload, "dataIndex", &(sample as u32).into());
        self.notify("unhover", payload.into());
    }
}

fn filter_object(filter: &DimensionFilter) -> js_sys::Object {
    let [lo, hi] = filter.domain_filter;
    let object = js_sys::Object::new();
    set_property(&object, "index", &(filter.index as u32).into());
    set_property(&object, "key", &filter.key.as_str().into());
    set_property(&object, "label", &filter.label.as_str().into());
    set_property(
        &object,
        "range",
        &js_sys::Array::of2(&lo.into(), &hi.into()),
    );
    set_property(&object, "fullDomain", &filter.full_domain.into());
    object
}

fn set_property(object: &js_sys::Object, key: &str, value: &JsValue) {
    if let Err(err) = js_sys::Reflect::set(object, &key.into(), value) {
        log::error!("could not set property {key:?}: {err:?}");
    }
}

pub enum Event {
    Exit,
    PointerDown {
        event: web_sys::PointerEvent,
    },
    PointerUp {
        event: web_sys::PointerEvent,
    },
    PointerMove {
        event: web_sys::PointerEvent,
    },
    SetFilter {
        index: usize,
        range: Option<[f64; 2]>,
    },
    SetColorDomain {
        unit_domain: [f64; 2],
    },
}

/// An event queue to interact with the plot.
#[wasm_bindgen]
pub struct EventQueue {
    pub(crate) sender: Sender<Event>,
}

#[wasm_bindgen]
impl EventQueue {
    /// Spawns an event to shut down the plot.
    pub fn exit(&self) {
        self.send(Event::Exit);
    }

    /// Spawns a `pointer_down` event.
    ///
    /// The offsets of the event are relative to the host area.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, event: web_sys::PointerEvent) {
        self.send(Event::PointerDown { event });
    }

    /// Spawns a `pointer_up` event.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, event: web_sys::PointerEvent) {
        self.send(Event::PointerUp { event });
    }

    /// Spawns a `pointer_move` event.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, event: web_sys::PointerEvent) {
        self.send(Event::PointerMove { event });
    }

    /// Sets the raw filter range of the visible dimension `index`.
    ///
    /// Passing no range resets the filter.
    #[wasm_bindgen(js_name = setFilter)]
    pub fn set_filter(&self, index: usize, range: Option<Box<[f64]>>) {
        let range = match range.as_deref() {
            None => None,
            Some([lo, hi]) => Some([*lo, *hi]),
            Some(other) => {
                log::warn!("a filter range needs two values, found {}", other.len());
                return;
            }
        };
        self.send(Event::SetFilter { index, range });
    }

    /// Sets the unit range the color scale is stretched over.
    #[wasm_bindgen(js_name = setColorDomain)]
    pub fn set_color_domain(&self, lo: f64, hi: f64) {
        self.send(Event::SetColorDomain {
            unit_domain: [lo, hi],
        });
    }

    fn send(&self, event: Event) {
        if self.sender.send_blocking(event).is_err() {
            log::warn!("the event loop of the plot has already exited");
        }
    }
}
