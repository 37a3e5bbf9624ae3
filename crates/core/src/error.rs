#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Input rejected before reaching the backend; one `field: reason`
    /// entry per failing check.
    #[error("Validation failed: {0}")]
    Validation(String),
}
