//! Queue Error Types

/// Recoverable admission failures reported by a [`Sink`](crate::queue::api::Sink).
///
/// Both variants are expected conditions under load: the caller decides
/// whether to retry, back off, or drop the element(s).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Sink is full: {requested} element(s) requested, {available} of {capacity} slot(s) free")]
    Full {
        requested: usize,
        available: usize,
        capacity: usize,
    },

    #[error("Enqueue predicate rejected {count} element(s)")]
    Rejected { count: usize },
}

impl SinkError {
    /// True when the failure was caused by capacity rather than a predicate
    pub fn is_full(&self) -> bool {
        matches!(self, SinkError::Full { .. })
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, SinkError>;
