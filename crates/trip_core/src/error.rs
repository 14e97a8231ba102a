use thiserror::Error;

/// Locally detected problems that block submission of a research request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("destination is required")]
    EmptyDestination,
    #[error("trip length must be between 1 and 60 days (got {0})")]
    DaysOutOfRange(u32),
}

/// Session-level failures surfaced in the research state.
///
/// Phase failures are recorded as `PhaseStatus::Error` and chat failures as
/// transcript messages; neither escalates to this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to start research: {0}")]
    Network(String),
    #[error("connection lost: {0}")]
    Stream(String),
}
