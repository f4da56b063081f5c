/// Domain errors raised by the pure logic in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input rejected before any request is made.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
