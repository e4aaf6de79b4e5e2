#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while building transforms,
//! validating robot geometry and integrating robot state.

use alloc::string::String;
use thiserror::Error;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    /// Error for an unrecognized axis token.
    /// Rotations accept `x`, `y`, `z`; translations accept `tx`, `ty`, `tz`.
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),
    /// Error for a translation vector that does not have 1, 2 or 3 elements.
    #[error("Invalid translation length: {0}")]
    InvalidTranslationLength(&'static str),
    /// Error for a translational offset in a shape that cannot be normalized.
    #[error("Invalid offset format: {0}")]
    InvalidOffsetFormat(&'static str),
    /// Error for a rotation specification in a shape that cannot be normalized.
    #[error("Invalid rotation specification: {0}")]
    InvalidRotationSpec(&'static str),
    /// Error for invalid robot geometry.
    /// This variant is returned for non-positive lengths or too few wheels.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(&'static str),
    /// Error for an input slice with the wrong number of elements.
    #[error("Invalid input length: {0}")]
    InvalidInputLength(&'static str),
    /// Error for adding a wheel to a robot that already has all of its wheels.
    #[error("Wheel set full: {0}")]
    WheelSetFull(&'static str),
    /// Error for inverting a matrix that has no inverse.
    #[error("Singular matrix: {0}")]
    SingularMatrix(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used for state updates.
    #[error("Negative time delta: {0}")]
    NegativeTimeDelta(&'static str),
}
