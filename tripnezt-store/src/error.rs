use tripnezt_domain::TransitionError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// An approval would push booked seats past the trip's capacity.
    /// Surfaced to the operator instead of silently overcommitting.
    #[error("Capacity exceeded: requested {requested}, available {available}")]
    CapacityExceeded { requested: i32, available: i32 },

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound(resource, id.to_string())
    }
}
