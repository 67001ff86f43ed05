use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TripError {
    /// A statistic was requested over an empty point sequence.
    #[error("trip contains no points")]
    EmptyTrip,
    /// A speed was requested over a zero length time span.
    #[error("elapsed time is zero")]
    ZeroDuration,
}
