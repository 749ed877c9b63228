//! Blockwise, scissored line drawing of one layer.
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt::Debug,
    rc::{Rc, Weak},
};

use crate::{
    config::LineStyle,
    dimension::MIN_DIMENSIONS,
    error::{Error, Result},
    panel::{self, CanvasGeometry, Panel, PanelUniforms, PanelView, ScissorRect},
    scheduler::{FrameHandle, FrameScheduler},
    wgsl::Vec2,
};

/// Role of a line layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Every line, dimmed, independent of the filters.
    Context,
    /// The lines passing all filters.
    Focus,
    /// Invisible lines colored by their sample index.
    Pick,
}

impl LayerKind {
    pub fn applies_filters(&self) -> bool {
        !matches!(self, LayerKind::Context)
    }

    /// Whether the lines are blended instead of depth tested.
    pub fn alpha_blending(&self, style: &LineStyle) -> bool {
        match self {
            LayerKind::Context => true,
            LayerKind::Focus => style.focus_alpha_blending,
            LayerKind::Pick => false,
        }
    }
}

/// Graphics operations needed by a line layer.
pub trait LineBackend {
    /// Clears the color and depth of a rectangle of the layer.
    fn clear_panel(&mut self, scissor: &ScissorRect);

    /// Draws the lines `first_sample..first_sample + sample_count` of a panel.
    fn draw_lines(
        &mut self,
        uniforms: &PanelUniforms,
        scissor: &ScissorRect,
        first_sample: usize,
        sample_count: usize,
    );

    /// Releases every resource of the backend.
    fn destroy(&mut self);
}

/// Counters of the work issued by a layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerStats {
    pub clears: usize,
    pub draws: usize,
    /// Continuations scheduled for later frames.
    pub scheduled_blocks: usize,
}

/// Operations of a layer used by the interaction engine.
pub trait LineRenderer {
    /// Draws the panels of the axes in display order.
    ///
    /// With `set_changed` every panel is redrawn in blocks, otherwise only
    /// panels that moved are redrawn, in one go. `clear_only` clears the
    /// panels without drawing.
    fn render(&self, views: &[PanelView], set_changed: bool, clear_only: bool);

    /// Sets the unit color range the palette is stretched over.
    fn set_color_domain(&self, unit_domain: [f64; 2]);

    /// Cancels pending work and releases the resources of the layer.
    fn destroy(&self);
}

/// Configuration of a line layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub kind: LayerKind,
    pub sample_count: usize,
    pub dimension_count: usize,
    pub block_line_count: usize,
    pub geometry: CanvasGeometry,
}

impl LayerConfig {
    pub fn new(
        kind: LayerKind,
        style: &LineStyle,
        geometry: CanvasGeometry,
        dimension_count: usize,
        sample_count: usize,
    ) -> Self {
        Self {
            kind,
            sample_count,
            dimension_count,
            block_line_count: style.block_line_count.max(1),
            geometry,
        }
    }
}

struct LayerState<B> {
    backend: B,
    config: LayerConfig,
    color_clamp: [f64; 2],
    /// Last drawn `(x, next_x)` per panel key.
    previous: BTreeMap<usize, (f64, f64)>,
    /// Pending continuation per panel key.
    pending: BTreeMap<usize, FrameHandle>,
    clear_only: bool,
    alive: bool,
    stats: LayerStats,
}

/// A layer of lines drawn panel by panel.
pub struct LineLayer<B: LineBackend + 'static> {
    state: Rc<RefCell<LayerState<B>>>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl<B: LineBackend + 'static> LineLayer<B> {
    pub fn new(backend: B, config: LayerConfig, scheduler: Rc<dyn FrameScheduler>) -> Result<Self> {
        if config.dimension_count < MIN_DIMENSIONS {
            return Err(Error::NotEnoughDimensions {
                found: config.dimension_count,
            });
        }

        Ok(Self {
            state: Rc::new(RefCell::new(LayerState {
                backend,
                config,
                color_clamp: [0.0, 1.0],
                previous: BTreeMap::new(),
                pending: BTreeMap::new(),
                clear_only: false,
                alive: true,
                stats: LayerStats::default(),
            })),
            scheduler,
        })
    }

    pub fn kind(&self) -> LayerKind {
        self.state.borrow().config.kind
    }

    pub fn stats(&self) -> LayerStats {
        self.state.borrow().stats
    }

    /// Number of panels with a continuation waiting for a frame.
    pub fn pending_panels(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn is_alive(&self) -> bool {
        self.state.borrow().alive
    }

    pub fn render(&self, views: &[PanelView], set_changed: bool, clear_only: bool) {
        let (panels, block_line_count) = {
            let mut state = self.state.borrow_mut();
            if !state.alive {
                log::debug!("render of a destroyed {:?} layer ignored", state.config.kind);
                return;
            }

            let config = &state.config;
            let panels = panel::panels(
                views,
                &config.geometry,
                config.kind.applies_filters(),
                state.color_clamp,
            );
            let block_line_count = if set_changed {
                config.block_line_count
            } else {
                config.sample_count.max(1)
            };

            let mut changed = Vec::with_capacity(panels.len());
            for panel in panels {
                let position = (panel.x, panel.next_x);
                if set_changed || state.previous.get(&panel.key) != Some(&position) {
                    state.previous.insert(panel.key, position);
                    changed.push(panel);
                }
            }
            if !changed.is_empty() {
                state.clear_only = clear_only;
            }

            (changed, block_line_count)
        };

        for panel in panels {
            render_block(
                &self.state,
                &self.scheduler,
                Rc::new(panel),
                block_line_count,
                0,
            );
        }
    }

    pub fn set_color_domain(&self, unit_domain: [f64; 2]) {
        self.state.borrow_mut().color_clamp = unit_domain;
    }

    pub fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        if !state.alive {
            return;
        }

        for (_, handle) in std::mem::take(&mut state.pending) {
            self.scheduler.cancel_frame(handle);
        }
        state.alive = false;
        state.backend.destroy();
        log::debug!("{:?} layer destroyed", state.config.kind);
    }
}

/// Draws one block of a panel and schedules the next one.
fn render_block<B: LineBackend + 'static>(
    state_rc: &Rc<RefCell<LayerState<B>>>,
    scheduler: &Rc<dyn FrameScheduler>,
    panel: Rc<Panel>,
    block_line_count: usize,
    block_number: usize,
) {
    let mut state = state_rc.borrow_mut();
    if !state.alive {
        return;
    }
    let state = &mut *state;

    if block_number == 0 {
        if let Some(handle) = state.pending.remove(&panel.key) {
            scheduler.cancel_frame(handle);
        }
        state.backend.clear_panel(&panel.scissor);
        state.stats.clears += 1;
    } else {
        state.pending.remove(&panel.key);
    }

    if state.clear_only {
        return;
    }

    let sample_count = state.config.sample_count;
    let first_sample = block_number * block_line_count;
    let count = block_line_count.min(sample_count.saturating_sub(first_sample));
    if count != 0 {
        let mut uniforms = panel.uniforms;
        uniforms.color_clamp = Vec2(state.color_clamp.map(|c| c as f32));
        state.backend.draw_lines(&uniforms, &panel.scissor, first_sample, count);
        state.stats.draws += 1;
    }

    if first_sample + count < sample_count {
        let weak_state = Rc::downgrade(state_rc);
        let weak_scheduler = Rc::downgrade(scheduler);
        let key = panel.key;
        let handle = scheduler.request_frame(Box::new(move || {
            continue_block(
                weak_state,
                weak_scheduler,
                panel,
                block_line_count,
                block_number + 1,
            )
        }));
        state.pending.insert(key, handle);
        state.stats.scheduled_blocks += 1;
        log::debug!(
            "panel {key}: block {} of {:?} layer scheduled",
            block_number + 1,
            state.config.kind
        );
    }
}

fn continue_block<B: LineBackend + 'static>(
    state: Weak<RefCell<LayerState<B>>>,
    scheduler: Weak<dyn FrameScheduler>,
    panel: Rc<Panel>,
    block_line_count: usize,
    block_number: usize,
) {
    if let (Some(state), Some(scheduler)) = (state.upgrade(), scheduler.upgrade()) {
        render_block(&state, &scheduler, panel, block_line_count, block_number);
    }
}

impl<B: LineBackend + 'static> LineRenderer for LineLayer<B> {
    fn render(&self, views: &[PanelView], set_changed: bool, clear_only: bool) {
        LineLayer::render(self, views, set_changed, clear_only)
    }

    fn set_color_domain(&self, unit_domain: [f64; 2]) {
        LineLayer::set_color_domain(self, unit_domain)
    }

    fn destroy(&self) {
        LineLayer::destroy(self)
    }
}

impl<B: LineBackend + 'static> Drop for LineLayer<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<B: LineBackend + 'static> Debug for LineLayer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("LineLayer")
            .field("config", &state.config)
            .field("alive", &state.alive)
            .field("stats", &state.stats)
            .finish()
    }
}

pub mod recording {
    //! A backend that records the issued operations instead of drawing.
    use super::*;

    /// One operation issued to a [`RecordingBackend`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendCall {
        Clear {
            scissor: ScissorRect,
        },
        Draw {
            uniforms: Box<PanelUniforms>,
            scissor: ScissorRect,
            first_sample: usize,
            sample_count: usize,
        },
        Destroy,
    }

    /// Backend recording its calls into a shared log.
    ///
    /// Clones share the log, so a clone kept outside of a layer observes
    /// the calls of the layer.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingBackend {
        calls: Rc<RefCell<Vec<BackendCall>>>,
    }

    impl RecordingBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<BackendCall> {
            self.calls.borrow().clone()
        }

        /// Removes and returns the recorded calls.
        pub fn take_calls(&self) -> Vec<BackendCall> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }

        /// Sample counts of the recorded draws, in order.
        pub fn draw_sizes(&self) -> Vec<usize> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| match c {
                    BackendCall::Draw { sample_count, .. } => Some(*sample_count),
                    _ => None,
                })
                .collect()
        }

        pub fn clear_count(&self) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| matches!(c, BackendCall::Clear { .. }))
                .count()
        }
    }

    impl LineBackend for RecordingBackend {
        fn clear_panel(&mut self, scissor: &ScissorRect) {
            self.calls
                .borrow_mut()
                .push(BackendCall::Clear { scissor: *scissor });
        }

        fn draw_lines(
            &mut self,
            uniforms: &PanelUniforms,
            scissor: &ScissorRect,
            first_sample: usize,
            sample_count: usize,
        ) {
            self.calls.borrow_mut().push(BackendCall::Draw {
                uniforms: Box::new(*uniforms),
                scissor: *scissor,
                first_sample,
                sample_count,
            });
        }

        fn destroy(&mut self) {
            self.calls.borrow_mut().push(BackendCall::Destroy);
        }
    }
}
