use thiserror::Error;

/// Errors that reject a request before any pixel is computed, plus the I/O
/// failures of writing the rendered output. Numeric trouble inside a single
/// pixel's iteration is never reported here: it resolves to the background color.
#[derive(Error, Debug)]
pub enum FractalError {
    #[error("polynomial must have at least one coefficient")]
    EmptyPolynomial,
    #[error("polynomial {0:?} has degree zero and no usable derivative")]
    DegreeZeroPolynomial(Vec<i64>),
    #[error("{0:?} is not convertible to integer")]
    InvalidCoefficient(String),
    #[error("{0:?} is not convertible to integer")]
    InvalidDegree(String),
    #[error("roots of unity degree must be at least one, got {0}")]
    NonPositiveDegree(i64),
    #[error("image resolution must be non-zero in both dimensions")]
    EmptyImage,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parameter file error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}
