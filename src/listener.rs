//! Notifications of the interaction engine to its host.

/// The filter of one dimension, in raw domain values.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionFilter {
    /// Original index of the dimension among the visible ones.
    pub index: usize,
    pub key: String,
    pub label: String,
    pub domain_filter: [f64; 2],
    /// Whether the filter spans the whole axis.
    pub full_domain: bool,
}

/// Payload of a finished filter edit.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    pub changed: DimensionFilter,
    /// Filters of all dimensions, in display order.
    pub all: Vec<DimensionFilter>,
}

/// Receiver of the interaction notifications.
///
/// Every method has an empty default, so hosts only implement what they
/// care about.
pub trait Listener {
    /// A brush was released, or a filter was set programmatically.
    fn filter_changed(&mut self, change: &FilterChange) {
        let _ = change;
    }

    /// An axis drag ended; `order` lists the original indices in display
    /// order.
    fn axes_moved(&mut self, order: &[usize]) {
        let _ = order;
    }

    /// The pointer moved onto a line.
    fn hover(&mut self, x: f64, y: f64, sample: usize) {
        let _ = (x, y, sample);
    }

    /// The pointer left the hovered line.
    fn unhover(&mut self, sample: usize) {
        let _ = sample;
    }
}

/// Notification recorded by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    FilterChanged(FilterChange),
    AxesMoved(Vec<usize>),
    Hover { x: f64, y: f64, sample: usize },
    Unhover { sample: usize },
}

/// Listener collecting its notifications, shared between its clones.
#[derive(Debug, Default, Clone)]
pub struct RecordingListener {
    notifications: std::rc::Rc<std::cell::RefCell<Vec<Notification>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.borrow_mut())
    }
}

impl Listener for RecordingListener {
    fn filter_changed(&mut self, change: &FilterChange) {
        self.notifications
            .borrow_mut()
            .push(Notification::FilterChanged(change.clone()));
    }

    fn axes_moved(&mut self, order: &[usize]) {
        self.notifications
            .borrow_mut()
            .push(Notification::AxesMoved(order.to_vec()));
    }

    fn hover(&mut self, x: f64, y: f64, sample: usize) {
        self.notifications
            .borrow_mut()
            .push(Notification::Hover { x, y, sample });
    }

    fn unhover(&mut self, sample: usize) {
        self.notifications
            .borrow_mut()
            .push(Notification::Unhover { sample });
    }
}
