//! Dimensions of a plot and their preparation for rendering.

/// Minimum number of visible dimensions required to draw a panel.
pub const MIN_DIMENSIONS: usize = 2;

/// Maximum number of visible dimensions, further ones are dropped.
pub const MAX_DIMENSIONS: usize = 60;

/// One coordinate axis of the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub id: Option<String>,
    pub label: String,
    pub values: Vec<f64>,
    pub range: Option<[f64; 2]>,
    pub constraint_range: Option<[f64; 2]>,
    pub tick_vals: Option<Vec<f64>>,
    pub integer: bool,
    pub visible: bool,
}

impl Dimension {
    /// Constructs a new visible dimension with default settings.
    pub fn new(label: &str, values: Vec<f64>) -> Self {
        Self {
            id: None,
            label: label.into(),
            values,
            range: None,
            constraint_range: None,
            tick_vals: None,
            integer: false,
            visible: true,
        }
    }

    /// Sets the identifier of the dimension.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the shown extent of the axis.
    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets the initial brush, in raw domain values.
    pub fn with_constraint_range(mut self, range: [f64; 2]) -> Self {
        self.constraint_range = Some(range);
        self
    }

    /// Marks the axis as discrete, with values at the given ticks.
    pub fn with_tick_vals(mut self, tick_vals: Vec<f64>) -> Self {
        self.tick_vals = Some(tick_vals);
        self
    }

    /// Marks the axis as holding integer values only.
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Hides the dimension.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Key identifying the dimension, the id if present and the label otherwise.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.label)
    }

    /// Checks whether the dimension is drawn as a discrete axis.
    pub fn is_ordinal(&self) -> bool {
        self.integer || self.tick_vals.is_some()
    }

    /// Number of samples of the dimension.
    pub fn sample_count(&self) -> usize {
        self.values.len()
    }
}

/// Resolves visibility and sample counts of the input dimensions.
///
/// Dimensions without values are hidden, visible dimensions are truncated to
/// the shortest visible sample count, and only the first [`MAX_DIMENSIONS`]
/// visible dimensions stay visible. The order of the dimensions is kept.
pub fn prepare(mut dimensions: Vec<Dimension>) -> Vec<Dimension> {
    for dimension in dimensions.iter_mut() {
        if dimension.values.is_empty() {
            dimension.visible = false;
        }
    }

    let visible = dimensions.iter().filter(|d| d.visible).count();
    if visible > MAX_DIMENSIONS {
        log::warn!(
            "{visible} visible dimensions exceed the supported maximum of {MAX_DIMENSIONS}, \
             the remaining ones are hidden"
        );
        dimensions
            .iter_mut()
            .filter(|d| d.visible)
            .skip(MAX_DIMENSIONS)
            .for_each(|d| d.visible = false);
    }

    let sample_count = dimensions
        .iter()
        .filter(|d| d.visible)
        .map(Dimension::sample_count)
        .min();
    if let Some(sample_count) = sample_count {
        for dimension in dimensions.iter_mut().filter(|d| d.visible) {
            dimension.values.truncate(sample_count);
        }
    }

    dimensions
}

/// Returns the visible dimensions, in order.
pub fn visible(dimensions: &[Dimension]) -> impl Iterator<Item = &Dimension> {
    dimensions.iter().filter(|d| d.visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_truncated_to_common_length() {
        let dimensions = prepare(vec![
            Dimension::new("a", vec![321.0, 534.0, 542.0, 674.0]),
            Dimension::new("b", vec![562.0, 124.0, 942.0]),
            Dimension::new("c", vec![]),
            Dimension::new("d", vec![1.0, 2.0]).hidden(),
        ]);

        assert_eq!(dimensions[0].values, vec![321.0, 534.0, 542.0]);
        assert_eq!(dimensions[1].values, vec![562.0, 124.0, 942.0]);
        assert!(!dimensions[2].visible);
        assert_eq!(dimensions[3].values, vec![1.0, 2.0]);
        assert!(!dimensions[3].visible);
    }

    #[test]
    fn dimension_count_is_capped() {
        let dimensions = (0..70)
            .map(|i| Dimension::new(&format!("d{i}"), vec![i as f64, 1.0]))
            .collect();
        let dimensions = prepare(dimensions);

        assert_eq!(dimensions.len(), 70);
        assert_eq!(visible(&dimensions).count(), MAX_DIMENSIONS);
        assert!(dimensions[59].visible);
        assert!(!dimensions[60].visible);
    }

    #[test]
    fn key_falls_back_to_label() {
        let d = Dimension::new("label", vec![1.0]);
        assert_eq!(d.key(), "label");
        assert_eq!(d.with_id("id").key(), "id");
    }
}
