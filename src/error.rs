/// Errors raised while building or evaluating a [`QNetwork`](crate::networks::QNetwork).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{field} must be >= 1, got {value}")]
    Construction { field: &'static str, value: usize },

    #[error("expected last dimension {expected}, got input of shape {shape:?}")]
    ShapeMismatch { expected: i64, shape: Vec<i64> },

    #[error("tensor error: {0}")]
    Tensor(#[from] tch::TchError),
}
