use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness rule on (event, email) or (event, mobile) rejected the write.
    #[error("A registration for this event already uses that email or mobile number")]
    Conflict,
    /// The write may succeed if it is tried again (lock contention, dropped connection, numbering collision).
    #[error("Transient store failure: {0}")]
    Transient(String),
    #[error("Store query failed: {0}")]
    Query(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}
