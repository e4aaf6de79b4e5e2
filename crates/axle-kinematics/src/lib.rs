#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for wheeled-robot and serial-link kinematics."]
#![doc = ""]
#![doc = "This crate provides 4×4 homogeneous transform algebra, rotational and translational"]
#![doc = "links, and velocity models for differential-drive, Ackermann and omnidirectional robots."]

extern crate alloc;

use core::f64::consts::TAU;
use core::fmt;
use libm::fmod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod ackermann;
pub mod affine;
pub mod angular_velocity;
pub mod error;
pub mod link;
pub mod omni;
pub mod unicycle;

pub use ackermann::{AckermannCar, Appendage};
pub use affine::{
    Axis, Offset, RotationSpec, Transform, TranslationAxis, affine_from_rotation_and_translation,
    chained_rotations, process_translational_offset, rotational_affine, translational_affine,
};
pub use angular_velocity::omega_from_v_r;
pub use error::KinematicsError;
pub use link::{KinematicChain, Link, LinkKind};
pub use omni::{OmniWheel, OmnidirectionalRobot, RadialLayout, RadialOmnidirectionalRobot};
pub use unicycle::{ChassisSpeeds, UnicycleRobot, WheelSpeeds};

/// A 2‑D pose `(x, y, θ)` in meters and radians (θ measured counter‑clockwise
/// from the x‑axis in the world frame).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (m).
    pub x: f64,
    /// World‑frame y position (m).
    pub y: f64,
    /// Heading (rad), wrapped to `[0, 2π)` by the integrators.
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose { x, y, theta }
    }

    /// Wrap a heading into `[0, 2π)`.
    ///
    /// Every integrator in this crate (unicycle and Ackermann) applies this after
    /// each step, so headings never grow without bound.
    ///
    /// # Arguments
    ///
    /// * `angle`: The angle in radians to wrap.
    ///
    /// # Returns
    ///
    /// The wrapped angle in radians.
    pub fn wrap_heading(angle: f64) -> f64 {
        let a = fmod(angle, TAU);
        let wrapped = if a < 0.0 { a + TAU } else { a };
        // a tiny negative remainder rounds up to exactly TAU
        if wrapped >= TAU { 0.0 } else { wrapped }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.2}, y: {:.2}, θ: {:.2} rad)", self.x, self.y, self.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_wrap_heading() {
        assert!((Pose::wrap_heading(0.0) - 0.0).abs() < EPSILON);
        assert!((Pose::wrap_heading(PI) - PI).abs() < EPSILON);
        assert!((Pose::wrap_heading(TAU) - 0.0).abs() < EPSILON);
        assert!((Pose::wrap_heading(-PI / 2.0) - 1.5 * PI).abs() < EPSILON);
        assert!((Pose::wrap_heading(5.0 * PI) - PI).abs() < EPSILON);
        assert!((Pose::wrap_heading(-4.5 * PI) - 1.5 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_wrap_heading_stays_below_tau() {
        for angle in [-1e-18, -TAU, -3.0 * TAU, 7.0 * TAU - 1e-15, 1e6] {
            let wrapped = Pose::wrap_heading(angle);
            assert!((0.0..TAU).contains(&wrapped), "{angle} wrapped to {wrapped}");
        }
    }

    #[test]
    fn test_pose_display() {
        let pose = Pose::new(1.0, -2.5, 0.5);
        assert_eq!(format!("{}", pose), "(x: 1.00, y: -2.50, θ: 0.50 rad)");
    }
}
