//! Pointer gestures in progress.

/// How a brush gesture changes the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMode {
    /// Spans a new extent from the grab position.
    New,
    /// Moves the whole extent.
    Move,
    /// Drags the upper end of the extent.
    ResizeNorth,
    /// Drags the lower end of the extent.
    ResizeSouth,
}

/// Target produced by a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionUpdate {
    /// New x position of the dragged axis, in css pixels.
    MoveAxis { x: f64 },
    /// New unit extent of the brushed axis.
    Brush { extent: [f64; 2] },
}

#[derive(Debug)]
pub struct Action {
    inner: ActionInner,
}

#[derive(Debug)]
enum ActionInner {
    MoveAxis(MoveAxisAction),
    Brush(BrushAction),
}

impl Action {
    pub fn new_move_axis_action(key: usize, pointer_x: f64, axis_x: f64) -> Self {
        Self {
            inner: ActionInner::MoveAxis(MoveAxisAction {
                key,
                grab_offset: pointer_x - axis_x,
                moved: false,
            }),
        }
    }

    pub fn new_brush_action(key: usize, mode: BrushMode, unit: f64, filter: [f64; 2]) -> Self {
        Self {
            inner: ActionInner::Brush(BrushAction {
                key,
                mode,
                anchor: unit.clamp(0.0, 1.0),
                start: filter,
            }),
        }
    }

    /// Original index of the axis the gesture acts on.
    pub fn key(&self) -> usize {
        match &self.inner {
            ActionInner::MoveAxis(a) => a.key,
            ActionInner::Brush(a) => a.key,
        }
    }

    pub fn is_brush(&self) -> bool {
        matches!(self.inner, ActionInner::Brush(_))
    }

    /// Whether an axis drag moved at all.
    pub fn moved(&self) -> bool {
        match &self.inner {
            ActionInner::MoveAxis(a) => a.moved,
            ActionInner::Brush(_) => true,
        }
    }

    /// Extent of a brush before any pointer move.
    pub fn initial_extent(&self) -> Option<[f64; 2]> {
        match &self.inner {
            ActionInner::Brush(a) if a.mode == BrushMode::New => Some([a.anchor, a.anchor]),
            _ => None,
        }
    }

    /// Maps the pointer position to the new target of the gesture.
    pub fn update(&mut self, x: f64, unit_y: f64) -> ActionUpdate {
        match &mut self.inner {
            ActionInner::MoveAxis(a) => {
                a.moved = true;
                ActionUpdate::MoveAxis {
                    x: x - a.grab_offset,
                }
            }
            ActionInner::Brush(a) => ActionUpdate::Brush {
                extent: a.extent(unit_y.clamp(0.0, 1.0)),
            },
        }
    }
}

#[derive(Debug)]
struct MoveAxisAction {
    key: usize,
    grab_offset: f64,
    moved: bool,
}

#[derive(Debug)]
struct BrushAction {
    key: usize,
    mode: BrushMode,
    anchor: f64,
    start: [f64; 2],
}

impl BrushAction {
    fn extent(&self, u: f64) -> [f64; 2] {
        let [lo, hi] = self.start;
        match self.mode {
            BrushMode::New => sorted(self.anchor, u),
            BrushMode::Move => {
                let width = hi - lo;
                let lo = (lo + u - self.anchor).clamp(0.0, 1.0 - width);
                [lo, lo + width]
            }
            BrushMode::ResizeNorth => sorted(lo, u),
            BrushMode::ResizeSouth => sorted(u, hi),
        }
    }
}

fn sorted(a: f64, b: f64) -> [f64; 2] {
    [a.min(b), a.max(b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_brush_spans_from_the_anchor() {
        let mut action = Action::new_brush_action(3, BrushMode::New, 0.6, [0.0, 1.0]);
        assert_eq!(action.initial_extent(), Some([0.6, 0.6]));
        assert_eq!(
            action.update(0.0, 0.2),
            ActionUpdate::Brush { extent: [0.2, 0.6] }
        );
        assert_eq!(
            action.update(0.0, 1.7),
            ActionUpdate::Brush { extent: [0.6, 1.0] }
        );
    }

    #[test]
    fn moved_brush_stays_inside_the_axis() {
        let mut action = Action::new_brush_action(0, BrushMode::Move, 0.5, [0.25, 0.75]);
        assert_eq!(
            action.update(0.0, 0.625),
            ActionUpdate::Brush {
                extent: [0.375, 0.875]
            }
        );
        assert_eq!(
            action.update(0.0, 1.0),
            ActionUpdate::Brush { extent: [0.5, 1.0] }
        );
    }

    #[test]
    fn resizing_past_the_other_end_flips() {
        let mut action =
            Action::new_brush_action(0, BrushMode::ResizeNorth, 0.75, [0.25, 0.75]);
        assert_eq!(
            action.update(0.0, 0.1),
            ActionUpdate::Brush { extent: [0.1, 0.25] }
        );
    }

    #[test]
    fn axis_moves_keep_the_grab_offset() {
        let mut action = Action::new_move_axis_action(1, 105.0, 100.0);
        assert!(!action.moved());
        assert_eq!(action.update(205.0, 0.0), ActionUpdate::MoveAxis { x: 200.0 });
        assert!(action.moved());
        assert!(!action.is_brush());
    }
}
