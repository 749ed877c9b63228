//! Error type of the crate.
use wasm_bindgen::JsValue;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while building or driving a plot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("WebGPU is not supported in the current browser")]
    NoGpu,
    #[error("no global window is available")]
    NoWindow,
    #[error("could not request gpu adapter: {0}")]
    Adapter(String),
    #[error("could not request gpu device: {0}")]
    Device(String),
    #[error("could not acquire the {0} context of the canvas")]
    Context(&'static str),
    #[error("gpu call failed: {0}")]
    Gpu(String),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("invalid color scale: {0}")]
    InvalidColorScale(String),
    #[error("at least two visible dimensions are required, found {found}")]
    NotEnoughDimensions { found: usize },
    #[error("at most {max} dimensions fit the vertex layout, found {found}")]
    TooManyDimensions { found: usize, max: usize },
    #[error("expected {expected} samples, found {found}")]
    SampleCountMismatch { expected: usize, found: usize },
}

impl Error {
    /// Wraps an exception thrown by a JS call.
    pub(crate) fn gpu(value: JsValue) -> Self {
        Self::Gpu(format!("{value:?}"))
    }
}

impl From<Error> for JsValue {
    fn from(value: Error) -> Self {
        js_sys::Error::new(&value.to_string()).into()
    }
}
