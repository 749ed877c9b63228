//! Axis dragging, brushing and hovering.
use crate::{
    action::{Action, ActionUpdate, BrushMode},
    config::{FilterBar, Geometry},
    dimension::{self, Dimension, MIN_DIMENSIONS},
    error::{Error, Result},
    event::Event,
    lines::LineRenderer,
    listener::{DimensionFilter, FilterChange, Listener},
    panel::PanelView,
    scale::{self, LinearScale, OrdinalScale, UnitSnap},
};

/// Filter of an axis without any constraint.
pub const FULL_FILTER: [f64; 2] = [0.0, 1.0];

/// State of one visible dimension as an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisState {
    pub key: String,
    pub label: String,
    /// Index among the visible dimensions, also the attribute slot.
    pub original_index: usize,
    /// Position in display order.
    pub x_index: usize,
    /// Horizontal position, in css pixels.
    pub x: f64,
    /// Unit filter range.
    pub filter: [f64; 2],
    to_unit: LinearScale,
    snap: Option<UnitSnap>,
}

impl AxisState {
    fn new(original_index: usize, dimension: &Dimension) -> Self {
        let to_unit = scale::domain_to_unit_scale(dimension);
        let filter = dimension
            .constraint_range
            .map(|range| unit_extent(range.map(|v| to_unit.scale(v))))
            .unwrap_or(FULL_FILTER);

        Self {
            key: dimension.key().into(),
            label: dimension.label.clone(),
            original_index,
            x_index: original_index,
            x: 0.0,
            filter,
            to_unit,
            snap: scale::unit_snap(dimension),
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter != FULL_FILTER
    }

    /// Filter in raw domain values.
    pub fn domain_filter(&self) -> [f64; 2] {
        self.filter.map(|f| self.to_unit.invert(f))
    }

    fn filter_report(&self) -> DimensionFilter {
        DimensionFilter {
            index: self.original_index,
            key: self.key.clone(),
            label: self.label.clone(),
            domain_filter: self.domain_filter(),
            full_domain: !self.is_filtered(),
        }
    }
}

fn unit_extent([a, b]: [f64; 2]) -> [f64; 2] {
    let (a, b) = (a.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
    [a.min(b), a.max(b)]
}

/// The three line layers driven by the engine.
pub struct Layers {
    pub context: Box<dyn LineRenderer>,
    pub focus: Box<dyn LineRenderer>,
    /// Hit testing layer, if hovering is enabled.
    pub pick: Option<Box<dyn LineRenderer>>,
}

impl Layers {
    fn each(&self, mut f: impl FnMut(&dyn LineRenderer)) {
        f(self.context.as_ref());
        f(self.focus.as_ref());
        if let Some(pick) = &self.pick {
            f(pick.as_ref());
        }
    }
}

/// Result of routing a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResponse {
    /// A gesture consumed the move.
    Handled(Event),
    /// No gesture is active; the pick layer should be read at `pixel`.
    Pick { pixel: [u32; 2] },
    Ignored,
}

/// Interaction engine of a plot.
///
/// Owns the axis order, positions and filters, and pushes every change to
/// the line layers. Pointer coordinates are css pixels relative to the top
/// left corner of the plot area.
pub struct Interaction {
    axes: Vec<AxisState>,
    x_scale: OrdinalScale,
    unit_scale: LinearScale,
    geometry: Geometry,
    layers: Layers,
    listener: Box<dyn Listener>,
    action: Option<Action>,
    context_shown: bool,
    just_started: bool,
    domain_brushing: bool,
    brush_empty: bool,
    dragging: bool,
    hovered: Option<usize>,
}

impl Interaction {
    pub fn new(
        dimensions: &[Dimension],
        geometry: Geometry,
        vertical_padding: f64,
        layers: Layers,
        listener: Box<dyn Listener>,
    ) -> Result<Self> {
        let mut axes = dimension::visible(dimensions)
            .take(dimension::MAX_DIMENSIONS)
            .enumerate()
            .map(|(i, d)| AxisState::new(i, d))
            .collect::<Vec<_>>();
        if axes.len() < MIN_DIMENSIONS {
            return Err(Error::NotEnoughDimensions { found: axes.len() });
        }

        let x_scale = OrdinalScale::with_range_points(
            (0..axes.len()).map(|i| i as f64).collect::<Vec<_>>(),
            [0.0, geometry.width],
        );
        for (axis, &x) in axes.iter_mut().zip(x_scale.range()) {
            axis.x = x;
        }

        Ok(Self {
            axes,
            x_scale,
            unit_scale: scale::unit_scale(geometry.height, vertical_padding),
            geometry,
            layers,
            listener,
            action: None,
            context_shown: false,
            just_started: false,
            domain_brushing: false,
            brush_empty: true,
            dragging: false,
            hovered: None,
        })
    }

    /// Axes in display order.
    pub fn axes(&self) -> &[AxisState] {
        &self.axes
    }

    /// Original indices of the axes in display order.
    pub fn order(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.original_index).collect()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn filters_active(&self) -> bool {
        self.axes.iter().any(AxisState::is_filtered)
    }

    pub fn context_shown(&self) -> bool {
        self.context_shown
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Views of the axes consumed by the line layers.
    pub fn panel_views(&self) -> Vec<PanelView> {
        self.axes
            .iter()
            .map(|a| PanelView {
                key: a.original_index,
                canvas_x: a.x * self.geometry.pixel_ratio,
                filter: a.filter,
            })
            .collect()
    }

    fn slot_x(&self, x_index: usize) -> f64 {
        self.x_scale.range()[x_index]
    }

    fn position(&self, key: usize) -> Option<usize> {
        let position = self.axes.iter().position(|a| a.original_index == key);
        if position.is_none() {
            log::warn!("no axis with index {key}");
        }
        position
    }

    /// Draws every layer from scratch.
    pub fn render_all(&mut self) {
        let views = self.panel_views();
        let filters_active = self.filters_active();
        self.layers.context.render(&views, false, !filters_active);
        self.context_shown = filters_active;
        self.layers.focus.render(&views, true, false);
        if let Some(pick) = &self.layers.pick {
            pick.render(&views, true, false);
        }
    }

    /// Stretches the palette over a unit color range and redraws the lines.
    pub fn set_color_domain(&mut self, unit_domain: [f64; 2]) {
        self.layers
            .each(|layer| layer.set_color_domain(unit_domain));
        let views = self.panel_views();
        self.layers.focus.render(&views, true, false);
    }

    pub fn drag_start(&mut self, key: usize) -> Event {
        if self.domain_brushing || self.position(key).is_none() {
            return Event::NONE;
        }

        self.dragging = true;
        if let Some(sample) = self.hovered.take() {
            self.listener.unhover(sample);
        }
        Event::NONE
    }

    /// Moves an axis to `x`; the other axes snap to their slots.
    pub fn drag(&mut self, key: usize, x: f64) -> Event {
        if self.domain_brushing {
            return Event::NONE;
        }

        let Some(position) = self.position(key) else {
            return Event::NONE;
        };
        let overdrag = self.geometry.overdrag;
        self.axes[position].x = x.clamp(-overdrag, self.geometry.width + overdrag);

        let order = self.order();
        self.axes.sort_by(|a, b| a.x.total_cmp(&b.x));
        let order_changed = order != self.order();

        for i in 0..self.axes.len() {
            let slot_x = self.slot_x(i);
            let axis = &mut self.axes[i];
            axis.x_index = i;
            if axis.original_index != key {
                axis.x = slot_x;
            }
        }

        let views = self.panel_views();
        let filters_active = self.filters_active();
        self.layers
            .context
            .render(&views, order_changed, !filters_active);
        self.layers.focus.render(&views, order_changed, false);

        let mut event = Event::AXIS_POSITION_CHANGE;
        if order_changed {
            event.signal(Event::AXIS_ORDER_CHANGE);
        }
        event
    }

    /// Snaps the dragged axis to its slot and commits the order.
    pub fn drag_end(&mut self, key: usize) -> Event {
        if self.domain_brushing {
            return Event::NONE;
        }
        let Some(position) = self.position(key) else {
            return Event::NONE;
        };

        self.dragging = false;
        self.axes[position].x = self.slot_x(self.axes[position].x_index);

        let views = self.panel_views();
        let filters_active = self.filters_active();
        self.layers.context.render(&views, false, !filters_active);
        self.layers.focus.render(&views, false, false);
        if let Some(pick) = &self.layers.pick {
            pick.render(&views, true, false);
        }

        let order = self.order();
        self.listener.axes_moved(&order);
        Event::AXIS_DROP
    }

    pub fn brush_start(&mut self, key: usize) -> Event {
        if self.position(key).is_none() {
            return Event::NONE;
        }

        self.just_started = true;
        self.domain_brushing = true;
        self.brush_empty = true;
        Event::NONE
    }

    /// Applies the live extent of a brush.
    ///
    /// A zero width extent on the first move clears the filter.
    pub fn brush_move(&mut self, key: usize, extent: [f64; 2]) -> Event {
        let Some(position) = self.position(key) else {
            return Event::NONE;
        };

        let extent = unit_extent(extent);
        let reset = self.just_started && extent[0] == extent[1];
        self.brush_empty = reset || extent[0] == extent[1];
        let new_extent = if reset { FULL_FILTER } else { extent };

        let changed = self.apply_filter(position, new_extent);
        self.just_started = false;

        if changed {
            Event::FILTER_CHANGE
        } else {
            Event::NONE
        }
    }

    /// Snaps discrete axes, redraws the pick layer and reports the filter.
    pub fn brush_end(&mut self, key: usize) -> Event {
        let Some(position) = self.position(key) else {
            return Event::NONE;
        };

        let axis = &self.axes[position];
        if let (false, Some(snap)) = (self.brush_empty, &axis.snap) {
            let mut f = axis.filter.map(|f| snap.snap(f));
            if f[0] == f[1] {
                f[0] = (f[0] - FilterBar::ORDINAL_NUDGE).max(0.0);
                f[1] = (f[1] + FilterBar::ORDINAL_NUDGE).min(1.0);
            }
            self.axes[position].filter = f;

            let views = self.panel_views();
            self.layers.focus.render(&views, true, false);
            self.toggle_context(&views);
        }

        self.domain_brushing = false;
        self.just_started = false;
        self.commit_filter(position);
        Event::FILTER_COMMIT
    }

    /// Sets the filter of an axis in raw domain values, `None` clears it.
    pub fn set_filter(&mut self, key: usize, range: Option<[f64; 2]>) -> Event {
        let Some(position) = self.position(key) else {
            return Event::NONE;
        };

        let axis = &self.axes[position];
        let filter = range
            .map(|r| unit_extent(r.map(|v| axis.to_unit.scale(v))))
            .unwrap_or(FULL_FILTER);

        let mut event = Event::FILTER_COMMIT;
        if self.apply_filter(position, filter) {
            event.signal(Event::FILTER_CHANGE);
        }
        self.commit_filter(position);
        event
    }

    /// Pushes a new filter to the focus layer and shows or hides the context.
    fn apply_filter(&mut self, position: usize, filter: [f64; 2]) -> bool {
        if self.axes[position].filter == filter {
            return false;
        }
        self.axes[position].filter = filter;

        let views = self.panel_views();
        self.layers.focus.render(&views, true, false);
        self.toggle_context(&views);

        true
    }

    /// Shows the context layer while any filter is active, and hides it
    /// otherwise.
    fn toggle_context(&mut self, views: &[PanelView]) {
        let filters_active = self.filters_active();
        if !self.context_shown && filters_active {
            self.layers.context.render(views, true, false);
            self.context_shown = true;
        } else if self.context_shown && !filters_active {
            self.layers.context.render(views, true, true);
            self.context_shown = false;
        }
    }

    fn commit_filter(&mut self, position: usize) {
        if let Some(pick) = &self.layers.pick {
            pick.render(&self.panel_views(), true, false);
        }

        let change = FilterChange {
            changed: self.axes[position].filter_report(),
            all: self.axes.iter().map(AxisState::filter_report).collect(),
        };
        self.listener.filter_changed(&change);
    }

    /// Starts a brush or an axis drag under the pointer.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Event {
        if self.action.is_some() {
            return Event::NONE;
        }

        let Some((position, distance)) = self
            .axes
            .iter()
            .enumerate()
            .map(|(i, a)| (i, (x - a.x).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
        else {
            return Event::NONE;
        };
        let axis = &self.axes[position];
        let key = axis.original_index;

        let in_bar = y >= -FilterBar::HANDLE_HEIGHT
            && y <= self.geometry.height + FilterBar::HANDLE_HEIGHT;
        if distance <= FilterBar::CAPTURE_WIDTH / 2.0 && in_bar {
            let mode = self.brush_mode(axis, y);
            let action =
                Action::new_brush_action(key, mode, self.unit_scale.invert(y), axis.filter);
            let initial_extent = action.initial_extent();
            self.action = Some(action);

            let mut event = self.brush_start(key);
            if let Some(extent) = initial_extent {
                event.signal(self.brush_move(key, extent));
            }
            return event;
        }

        let reach = self.geometry.width / (self.axes.len() - 1) as f64 / 2.0;
        if y < 0.0 && distance <= reach {
            self.action = Some(Action::new_move_axis_action(key, x, axis.x));
            return self.drag_start(key);
        }

        Event::NONE
    }

    fn brush_mode(&self, axis: &AxisState, y: f64) -> BrushMode {
        if !axis.is_filtered() {
            return BrushMode::New;
        }

        let top = self.unit_scale.scale(axis.filter[1]);
        let bottom = self.unit_scale.scale(axis.filter[0]);
        let handle = FilterBar::HANDLE_HEIGHT;
        if y >= top - handle && y < top {
            BrushMode::ResizeNorth
        } else if y > bottom && y <= bottom + handle {
            BrushMode::ResizeSouth
        } else if y >= top && y <= bottom {
            BrushMode::Move
        } else {
            BrushMode::New
        }
    }

    /// Advances the active gesture, or requests a pick read-back.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> PointerResponse {
        let unit_y = self.unit_scale.invert(y);
        match self.action.as_mut() {
            Some(action) => {
                let key = action.key();
                let event = match action.update(x, unit_y) {
                    ActionUpdate::MoveAxis { x } => self.drag(key, x),
                    ActionUpdate::Brush { extent } => self.brush_move(key, extent),
                };
                PointerResponse::Handled(event)
            }
            None => match self.pick_pixel(x, y) {
                Some(pixel) => PointerResponse::Pick { pixel },
                None => {
                    self.handle_pick(x, y, None);
                    PointerResponse::Ignored
                }
            },
        }
    }

    /// Finishes the active gesture.
    pub fn pointer_up(&mut self, _x: f64, _y: f64) -> Event {
        let Some(action) = self.action.take() else {
            return Event::NONE;
        };

        let key = action.key();
        if action.is_brush() {
            self.brush_end(key)
        } else if action.moved() {
            self.drag_end(key)
        } else {
            self.dragging = false;
            Event::NONE
        }
    }

    /// Canvas pixel of the pick layer under the pointer.
    pub fn pick_pixel(&self, x: f64, y: f64) -> Option<[u32; 2]> {
        if self.layers.pick.is_none() || self.dragging || self.action.is_some() {
            return None;
        }

        let ratio = self.geometry.pixel_ratio;
        let canvas_x = ((x + self.geometry.overdrag) * ratio).floor();
        let canvas_y = (y * ratio).floor();
        let inside = canvas_x >= 0.0
            && canvas_y >= 0.0
            && canvas_x < self.geometry.canvas_width
            && canvas_y < self.geometry.canvas_height;

        inside.then_some([canvas_x as u32, canvas_y as u32])
    }

    /// Reports hover transitions for a picked sample.
    pub fn handle_pick(&mut self, x: f64, y: f64, sample: Option<usize>) {
        if sample == self.hovered || self.dragging {
            return;
        }

        if let Some(previous) = self.hovered.take() {
            self.listener.unhover(previous);
        }
        if let Some(sample) = sample {
            self.listener.hover(x, y, sample);
        }
        self.hovered = sample;
    }

    /// Destroys every layer.
    pub fn destroy(&mut self) {
        self.action = None;
        self.layers.each(|layer| layer.destroy());
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::listener::{Notification, RecordingListener};

    #[derive(Debug, Clone, PartialEq)]
    struct RenderCall {
        views: Vec<PanelView>,
        set_changed: bool,
        clear_only: bool,
    }

    #[derive(Debug, Default, Clone)]
    struct RendererLog {
        calls: Rc<RefCell<Vec<RenderCall>>>,
    }

    impl RendererLog {
        fn take(&self) -> Vec<RenderCall> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }
    }

    impl LineRenderer for RendererLog {
        fn render(&self, views: &[PanelView], set_changed: bool, clear_only: bool) {
            self.calls.borrow_mut().push(RenderCall {
                views: views.to_vec(),
                set_changed,
                clear_only,
            });
        }

        fn set_color_domain(&self, _unit_domain: [f64; 2]) {}

        fn destroy(&self) {}
    }

    struct Fixture {
        engine: Interaction,
        context: RendererLog,
        focus: RendererLog,
        pick: RendererLog,
        listener: RecordingListener,
    }

    const GEOMETRY: Geometry = Geometry {
        width: 600.0,
        height: 300.0,
        canvas_width: 680.0,
        canvas_height: 300.0,
        translate_x: 80.0,
        translate_y: 80.0,
        pixel_ratio: 1.0,
        overdrag: 40.0,
    };

    fn fixture(dimensions: Vec<Dimension>) -> Fixture {
        let context = RendererLog::default();
        let focus = RendererLog::default();
        let pick = RendererLog::default();
        let listener = RecordingListener::new();
        let layers = Layers {
            context: Box::new(RendererLog::clone(&context)),
            focus: Box::new(RendererLog::clone(&focus)),
            pick: Some(Box::new(RendererLog::clone(&pick))),
        };
        let engine =
            Interaction::new(&dimensions, GEOMETRY, 0.0, layers, Box::new(listener.clone()))
                .unwrap();

        Fixture {
            engine,
            context,
            focus,
            pick,
            listener,
        }
    }

    fn dimensions() -> Vec<Dimension> {
        vec![
            Dimension::new("a", vec![0.0, 5.0, 10.0]),
            Dimension::new("b", vec![1.0, 2.0, 5.0]).integer(),
            Dimension::new("c", vec![-1.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn axes_start_at_their_slots() {
        let f = fixture(dimensions());
        let xs = f.engine.axes().iter().map(|a| a.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![0.0, 300.0, 600.0]);
        assert_eq!(f.engine.order(), vec![0, 1, 2]);
    }

    #[test]
    fn constraint_ranges_become_unit_filters() {
        let mut dims = dimensions();
        dims[0] = dims[0].clone().with_constraint_range([7.5, 2.5]);
        let f = fixture(dims);
        assert_eq!(f.engine.axes()[0].filter, [0.25, 0.75]);
        assert_eq!(f.engine.axes()[0].domain_filter(), [2.5, 7.5]);
    }

    #[test]
    fn zero_width_first_move_resets_the_filter() {
        let mut dims = dimensions();
        dims[0] = dims[0].clone().with_constraint_range([2.5, 7.5]);
        let mut f = fixture(dims);
        f.engine.render_all();
        assert!(f.engine.context_shown());

        f.engine.brush_start(0);
        f.engine.brush_move(0, [0.4, 0.4]);
        f.engine.brush_end(0);

        assert_eq!(f.engine.axes()[0].filter, FULL_FILTER);
        match f.listener.take().as_slice() {
            [Notification::FilterChanged(change)] => {
                assert!(change.changed.full_domain);
                assert_eq!(change.changed.domain_filter, [0.0, 10.0]);
                assert_eq!(change.all.len(), 3);
            }
            other => panic!("unexpected notifications {other:?}"),
        }
    }

    #[test]
    fn zero_width_later_move_keeps_a_collapsed_filter() {
        let mut f = fixture(dimensions());
        f.engine.brush_start(0);
        f.engine.brush_move(0, [0.25, 0.5]);
        f.engine.brush_move(0, [0.5, 0.5]);
        assert_eq!(f.engine.axes()[0].filter, [0.5, 0.5]);
    }

    #[test]
    fn context_layer_toggles_once_per_transition() {
        let mut f = fixture(dimensions());
        f.engine.render_all();
        f.context.take();

        f.engine.brush_start(2);
        f.engine.brush_move(2, [0.25, 0.5]);
        f.engine.brush_move(2, [0.25, 0.75]);
        f.engine.brush_move(2, [0.125, 0.75]);
        f.engine.brush_end(2);

        let shows = f.context.take();
        assert_eq!(shows.len(), 1);
        assert!(shows[0].set_changed && !shows[0].clear_only);
        assert_eq!(f.focus.take().len(), 4);

        f.engine.brush_start(2);
        f.engine.brush_move(2, [0.3, 0.3]);
        f.engine.brush_end(2);

        let hides = f.context.take();
        assert_eq!(hides.len(), 1);
        assert!(hides[0].set_changed && hides[0].clear_only);
        assert!(!f.engine.context_shown());
    }

    #[test]
    fn discrete_brushes_snap_to_values() {
        let mut f = fixture(dimensions());
        f.engine.brush_start(1);
        f.engine.brush_move(1, [0.3, 0.45]);
        f.engine.brush_end(1);

        assert_eq!(f.engine.axes()[1].filter, [0.25, 0.5]);
        assert_eq!(f.engine.axes()[1].domain_filter(), [2.0, 3.0]);
    }

    #[test]
    fn collapsed_snaps_are_nudged_outward() {
        let mut f = fixture(dimensions());
        f.engine.brush_start(1);
        f.engine.brush_move(1, [0.3, 0.35]);
        f.engine.brush_end(1);

        let [lo, hi] = f.engine.axes()[1].filter;
        assert!((lo - 0.2).abs() < 1e-12);
        assert!((hi - 0.3).abs() < 1e-12);
    }

    #[test]
    fn snapping_to_the_full_axis_hides_the_context() {
        let mut f = fixture(dimensions());
        f.engine.render_all();
        f.context.take();

        f.engine.brush_start(1);
        f.engine.brush_move(1, [0.02, 0.97]);
        assert!(f.engine.context_shown());
        f.engine.brush_end(1);

        assert_eq!(f.engine.axes()[1].filter, FULL_FILTER);
        assert!(!f.engine.context_shown());
        let context = f.context.take();
        assert_eq!(context.len(), 2);
        assert!(context[1].clear_only);
        match f.listener.take().as_slice() {
            [Notification::FilterChanged(change)] => assert!(change.changed.full_domain),
            other => panic!("unexpected notifications {other:?}"),
        }
    }

    #[test]
    fn wide_integer_axes_snap_to_integers() {
        let dims = vec![
            Dimension::new("t", vec![0.0, 1.0e9]).integer(),
            Dimension::new("u", vec![0.0, 1.0]),
        ];
        let mut f = fixture(dims);
        f.engine.brush_start(0);
        f.engine.brush_move(0, [0.25, 0.5]);
        f.engine.brush_end(0);

        assert_eq!(f.engine.axes()[0].domain_filter(), [2.5e8, 5.0e8]);
    }

    #[test]
    fn dragging_reorders_and_snaps_the_others() {
        let mut f = fixture(dimensions());
        f.engine.render_all();
        f.pick.take();

        f.engine.drag_start(0);
        let event = f.engine.drag(0, 350.0);
        assert!(event.signaled(Event::AXIS_ORDER_CHANGE));
        assert_eq!(f.engine.order(), vec![1, 0, 2]);
        assert_eq!(f.engine.axes()[0].x, 0.0);
        assert_eq!(f.engine.axes()[1].x, 350.0);

        let event = f.engine.drag(0, 360.0);
        assert!(!event.signaled(Event::AXIS_ORDER_CHANGE));
        let focus = f.focus.take();
        assert_eq!(
            focus.iter().map(|c| c.set_changed).collect::<Vec<_>>(),
            vec![true, true, false]
        );
        assert!(f.pick.take().is_empty());

        f.engine.drag_end(0);
        assert_eq!(f.engine.axes()[1].x, 300.0);
        assert_eq!(f.engine.axes()[1].x_index, 1);
        let pick = f.pick.take();
        assert_eq!(pick.len(), 1);
        assert!(pick[0].set_changed);
        assert_eq!(
            f.listener.take(),
            vec![Notification::AxesMoved(vec![1, 0, 2])]
        );
    }

    #[test]
    fn drags_are_clamped_to_the_overdrag() {
        let mut f = fixture(dimensions());
        f.engine.drag_start(1);
        f.engine.drag(1, 1000.0);
        assert_eq!(f.engine.axes()[2].x, 640.0);
        f.engine.drag(1, -1000.0);
        assert_eq!(f.engine.axes()[0].x, -40.0);
    }

    #[test]
    fn drags_are_ignored_while_brushing() {
        let mut f = fixture(dimensions());
        f.engine.brush_start(0);
        assert_eq!(f.engine.drag(1, 10.0), Event::NONE);
        assert_eq!(f.engine.order(), vec![0, 1, 2]);
    }

    #[test]
    fn hover_reports_only_transitions() {
        let mut f = fixture(dimensions());
        f.engine.handle_pick(1.0, 2.0, Some(5));
        f.engine.handle_pick(1.0, 3.0, Some(5));
        f.engine.handle_pick(4.0, 3.0, Some(6));
        f.engine.handle_pick(4.0, 3.0, None);

        assert_eq!(
            f.listener.take(),
            vec![
                Notification::Hover {
                    x: 1.0,
                    y: 2.0,
                    sample: 5
                },
                Notification::Unhover { sample: 5 },
                Notification::Hover {
                    x: 4.0,
                    y: 3.0,
                    sample: 6
                },
                Notification::Unhover { sample: 6 },
            ]
        );
    }

    #[test]
    fn pointer_gestures_brush_an_axis() {
        let mut f = fixture(dimensions());
        f.engine.pointer_down(302.0, 150.0);
        let response = f.engine.pointer_move(302.0, 225.0);
        assert_eq!(response, PointerResponse::Handled(Event::FILTER_CHANGE));
        f.engine.pointer_up(302.0, 225.0);

        assert_eq!(f.engine.axes()[1].filter, [0.25, 0.5]);
        assert!(matches!(
            f.listener.take().as_slice(),
            [Notification::FilterChanged(_)]
        ));
    }

    #[test]
    fn pointer_above_an_axis_drags_it() {
        let mut f = fixture(dimensions());
        f.engine.pointer_down(5.0, -30.0);
        f.engine.pointer_move(405.0, -30.0);
        f.engine.pointer_up(405.0, -30.0);

        assert_eq!(f.engine.order(), vec![1, 0, 2]);
        assert_eq!(
            f.listener.take(),
            vec![Notification::AxesMoved(vec![1, 0, 2])]
        );
    }

    #[test]
    fn idle_pointer_moves_query_the_pick_layer() {
        let mut f = fixture(dimensions());
        assert_eq!(
            f.engine.pointer_move(100.5, 20.0),
            PointerResponse::Pick { pixel: [140, 20] }
        );
        assert_eq!(f.engine.pointer_move(100.0, 400.0), PointerResponse::Ignored);
    }

    #[test]
    fn set_filter_reports_raw_ranges() {
        let mut f = fixture(dimensions());
        let event = f.engine.set_filter(2, Some([0.0, 1.0]));
        assert!(event.signaled(Event::FILTER_CHANGE));
        assert_eq!(f.engine.axes()[2].filter, [0.5, 1.0]);
        assert!(f.engine.context_shown());

        match f.listener.take().as_slice() {
            [Notification::FilterChanged(change)] => {
                assert_eq!(change.changed.index, 2);
                assert_eq!(change.changed.key, "c");
                assert_eq!(change.changed.domain_filter, [0.0, 1.0]);
                assert!(!change.changed.full_domain);
            }
            other => panic!("unexpected notifications {other:?}"),
        }
    }
}
