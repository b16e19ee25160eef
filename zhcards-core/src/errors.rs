use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("storage error: {0}")]
    Storage(&'static str),
    #[error("order for set {set_id} is not a permutation of its cards ({missing} missing, {unknown} unknown)")]
    IncompleteOrder {
        set_id: String,
        missing: usize,
        unknown: usize,
    },
    #[error("malformed data: {0}")]
    Serde(#[from] serde_json::Error),
}
