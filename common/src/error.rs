use thiserror::Error;

/// Errors raised by transform algebra.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The matrix has no inverse (zero determinant).
    #[error("transform matrix is singular and cannot be inverted")]
    SingularMatrix,
}
