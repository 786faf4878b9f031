//! Error taxonomy for the estimator core.
//!
//! Command violations and numerical degeneracy are recovered locally and
//! never reach the caller as an `Err`; only invariant violations propagate
//! out of [`crate::estimator::Estimator::tick`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("pressure must be positive, got {0}")]
    IllegalPressure(f64),
}

#[derive(Debug, Error)]
pub enum GpsError {
    #[error("ephemeris subframe word out of range: {0}")]
    MalformedSubframe(String),
    #[error("eccentric anomaly solver did not receive a valid eccentricity: {0}")]
    InvalidEccentricity(f64),
}

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("command violation: {0}")]
    CommandViolation(String),

    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error(transparent)]
    Gps(#[from] GpsError),
}
