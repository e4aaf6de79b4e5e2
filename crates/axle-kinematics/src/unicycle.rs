//! Differential-drive (unicycle) kinematics.

use core::fmt;
use libm::{cos, sin};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Pose;
use crate::error::KinematicsError;

/// Left and right wheel angular velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (rad/s).
    pub omega_l: f64,
    /// Right wheel angular velocity (rad/s).
    pub omega_r: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    ///
    /// # Arguments
    ///
    /// * `omega_l`: Left wheel angular velocity (rad/s).
    /// * `omega_r`: Right wheel angular velocity (rad/s).
    pub const fn new(omega_l: f64, omega_r: f64) -> Self {
        WheelSpeeds { omega_l, omega_r }
    }
}

impl TryFrom<&[f64]> for WheelSpeeds {
    type Error = KinematicsError;

    /// Reads `[ωL, ωR]` from a motor velocity list.
    fn try_from(motor_velocities: &[f64]) -> Result<Self, Self::Error> {
        match *motor_velocities {
            [omega_l, omega_r] => Ok(WheelSpeeds::new(omega_l, omega_r)),
            _ => Err(KinematicsError::InvalidInputLength(
                "exactly two motor angular velocities are required",
            )),
        }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ωL: {:.2} rad/s, ωR: {:.2} rad/s)", self.omega_l, self.omega_r)
    }
}

/// Linear and angular chassis velocities.
/// These represent the overall motion of the robot's chassis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center (m/s).
    pub v: f64,
    /// Angular speed of the chassis (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `v`: Linear speed of the chassis center (m/s).
    /// * `omega`: Angular speed of the chassis (rad/s).
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2} m/s, ω: {:.2} rad/s)", self.v, self.omega)
    }
}

/// A robot with two independently driven wheels on a common axle.
///
/// The geometry is fixed at construction; the pose is the only mutable state and
/// changes through [`UnicycleRobot::update_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnicycleRobot {
    /// Distance between the two wheel contact points (m).
    wheel_distance: f64,
    /// Wheel diameter (m).
    wheel_diameter: f64,
    pose: Pose,
}

impl UnicycleRobot {
    /// Construct a unicycle robot at the origin.
    ///
    /// # Arguments
    ///
    /// * `wheel_distance`: The distance between the two drive wheels in meters.
    /// * `wheel_diameter`: The diameter of the drive wheels in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` if either value is not positive.
    pub fn new(wheel_distance: f64, wheel_diameter: f64) -> Result<Self, KinematicsError> {
        Self::with_pose(wheel_distance, wheel_diameter, Pose::default())
    }

    /// Construct a unicycle robot at a given starting pose.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` if `wheel_distance` or
    /// `wheel_diameter` is not positive.
    pub fn with_pose(wheel_distance: f64, wheel_diameter: f64, pose: Pose) -> Result<Self, KinematicsError> {
        // NaN fails both checks
        if !(wheel_distance > 0.0) {
            return Err(KinematicsError::InvalidGeometry(
                "wheel distance must be positive",
            ));
        }
        if !(wheel_diameter > 0.0) {
            return Err(KinematicsError::InvalidGeometry(
                "wheel diameter must be positive",
            ));
        }
        debug!(wheel_distance, wheel_diameter, "unicycle robot created");
        Ok(UnicycleRobot {
            wheel_distance,
            wheel_diameter,
            pose,
        })
    }

    /// Returns the wheel distance.
    pub fn wheel_distance(&self) -> f64 {
        self.wheel_distance
    }

    /// Returns the wheel diameter.
    pub fn wheel_diameter(&self) -> f64 {
        self.wheel_diameter
    }

    /// Returns the current pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Angular velocity of the body from `[ωL, ωR]`.
    ///
    /// `ω = (ωR − ωL) · (d / 2) / L`
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidInputLength)` unless exactly two values are given.
    pub fn angular_velocity(&self, motor_velocities: &[f64]) -> Result<f64, KinematicsError> {
        let speeds = WheelSpeeds::try_from(motor_velocities)?;
        Ok(self.forward_kinematics(speeds).omega)
    }

    /// Linear velocity of the body from `[ωL, ωR]`.
    ///
    /// `v = (ωL + ωR) / 2 · (d / 2)`
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidInputLength)` unless exactly two values are given.
    pub fn linear_velocity(&self, motor_velocities: &[f64]) -> Result<f64, KinematicsError> {
        let speeds = WheelSpeeds::try_from(motor_velocities)?;
        Ok(self.forward_kinematics(speeds).v)
    }

    /// Calculates the robot's chassis speeds (linear and angular velocity)
    /// from the wheel speeds. This is the forward kinematics problem.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> ChassisSpeeds {
        let wheel_radius = self.wheel_diameter / 2.0;
        let omega = (wheel_speeds.omega_r - wheel_speeds.omega_l) * wheel_radius / self.wheel_distance;
        let v = (wheel_speeds.omega_l + wheel_speeds.omega_r) / 2.0 * wheel_radius;

        ChassisSpeeds::new(v, omega)
    }

    /// Calculates the required wheel speeds to achieve the given chassis speeds.
    /// This is the inverse kinematics problem.
    pub fn inverse_kinematics(&self, chassis_speeds: ChassisSpeeds) -> WheelSpeeds {
        let wheel_radius = self.wheel_diameter / 2.0;
        let v_r = chassis_speeds.v + chassis_speeds.omega * (self.wheel_distance / 2.0);
        let v_l = chassis_speeds.v - chassis_speeds.omega * (self.wheel_distance / 2.0);

        WheelSpeeds::new(v_l / wheel_radius, v_r / wheel_radius)
    }

    /// Integrates the pose over `dt` with forward Euler, using the body
    /// velocities produced by `motor_velocities`.
    ///
    /// The heading is wrapped to `[0, 2π)` after the step.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidInputLength)` unless exactly two motor
    /// velocities are given, and `Err(KinematicsError::NegativeTimeDelta)` if `dt`
    /// is negative. The pose is left untouched on error.
    ///
    /// # Returns
    ///
    /// The robot's new pose.
    pub fn update_position(&mut self, motor_velocities: &[f64], dt: f64) -> Result<Pose, KinematicsError> {
        let speeds = WheelSpeeds::try_from(motor_velocities)?;
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta(
                "must be non-negative",
            ));
        }

        let ChassisSpeeds { v, omega } = self.forward_kinematics(speeds);
        let theta = self.pose.theta;
        self.pose = Pose {
            x: self.pose.x + v * cos(theta) * dt,
            y: self.pose.y + v * sin(theta) * dt,
            theta: Pose::wrap_heading(theta + omega * dt),
        };
        trace!(%speeds, dt, pose = %self.pose, "unicycle pose updated");
        Ok(self.pose)
    }
}

impl fmt::Display for UnicycleRobot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnicycleRobot (L: {:.2} m, d: {:.2} m) at {}",
            self.wheel_distance, self.wheel_diameter, self.pose
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    fn robot() -> UnicycleRobot {
        UnicycleRobot::new(1.0, 1.0).unwrap()
    }

    #[test]
    fn test_constructor() {
        let robot = UnicycleRobot::new(0.5, 0.2).unwrap();
        assert_eq!(robot.wheel_distance(), 0.5);
        assert_eq!(robot.wheel_diameter(), 0.2);
        assert_eq!(robot.pose(), Pose::default());
    }

    #[test]
    fn test_invalid_wheel_distance() {
        for distance in [-1.0, 0.0, f64::NAN] {
            assert!(matches!(
                UnicycleRobot::new(distance, 1.0),
                Err(KinematicsError::InvalidGeometry("wheel distance must be positive"))
            ));
        }
    }

    #[test]
    fn test_invalid_wheel_diameter() {
        for diameter in [-1.0, 0.0] {
            assert!(matches!(
                UnicycleRobot::new(1.0, diameter),
                Err(KinematicsError::InvalidGeometry("wheel diameter must be positive"))
            ));
        }
    }

    #[test]
    fn test_angular_velocity() {
        let robot = robot();
        assert_eq!(robot.angular_velocity(&[5.0, 5.0]), Ok(0.0));
        assert_eq!(robot.angular_velocity(&[0.0, 5.0]), Ok(2.5));
        assert_eq!(robot.angular_velocity(&[-5.0, 5.0]), Ok(5.0));
    }

    #[test]
    fn test_linear_velocity() {
        let robot = robot();
        assert_eq!(robot.linear_velocity(&[5.0, 5.0]), Ok(2.5));
        assert_eq!(robot.linear_velocity(&[5.0, 10.0]), Ok(3.75));
        assert_eq!(robot.linear_velocity(&[-5.0, 5.0]), Ok(0.0));
    }

    #[test]
    fn test_invalid_motor_velocity_count() {
        let robot = robot();
        for velocities in [&[5.0][..], &[][..], &[1.0, 2.0, 3.0][..]] {
            assert!(matches!(
                robot.angular_velocity(velocities),
                Err(KinematicsError::InvalidInputLength(_))
            ));
            assert!(matches!(
                robot.linear_velocity(velocities),
                Err(KinematicsError::InvalidInputLength(_))
            ));
        }
    }

    #[test]
    fn test_inverse_kinematics_gentle_turn() {
        let robot = UnicycleRobot::new(0.5, 0.2).unwrap(); // r=0.1m, L=0.5m
        let chassis_speeds = ChassisSpeeds::new(0.75, 1.0);
        // v_r = 0.75 + 0.25 = 1.0, v_l = 0.5
        let wheel_speeds = robot.inverse_kinematics(chassis_speeds);
        assert!((wheel_speeds.omega_l - 5.0).abs() < EPSILON);
        assert!((wheel_speeds.omega_r - 10.0).abs() < EPSILON);

        let back = robot.forward_kinematics(wheel_speeds);
        assert!((back.v - 0.75).abs() < EPSILON);
        assert!((back.omega - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_update_position_straight() {
        let mut robot = robot();
        // v = 2.5 m/s, ω = 0
        let pose = robot.update_position(&[5.0, 5.0], 2.0).unwrap();
        assert!((pose.x - 5.0).abs() < EPSILON);
        assert!((pose.y - 0.0).abs() < EPSILON);
        assert!((pose.theta - 0.0).abs() < EPSILON);
        assert_eq!(robot.pose(), pose);
    }

    #[test]
    fn test_update_position_uses_heading_before_step() {
        let mut robot = UnicycleRobot::with_pose(1.0, 1.0, Pose::new(1.0, 1.0, PI / 2.0)).unwrap();
        // v = 0.5 * (1 + 3) / 2 = 1.0, ω = (3 - 1) * 0.5 / 1 = 1.0
        let pose = robot.update_position(&[1.0, 3.0], 0.5).unwrap();
        assert!((pose.x - 1.0).abs() < EPSILON);
        assert!((pose.y - 1.5).abs() < EPSILON);
        assert!((pose.theta - (PI / 2.0 + 0.5)).abs() < EPSILON);
    }

    #[test]
    fn test_update_position_wraps_heading() {
        let mut robot = robot();
        // pivot clockwise: ω = (-5 - 5) * 0.5 = -5 rad/s
        let pose = robot.update_position(&[5.0, -5.0], 0.1).unwrap();
        assert!((pose.theta - (2.0 * PI - 0.5)).abs() < EPSILON);
        assert!((pose.x).abs() < EPSILON);
    }

    #[test]
    fn test_update_position_errors_leave_pose() {
        let mut robot = robot();
        assert!(matches!(
            robot.update_position(&[1.0], 1.0),
            Err(KinematicsError::InvalidInputLength(_))
        ));
        assert!(matches!(
            robot.update_position(&[1.0, 1.0], -0.1),
            Err(KinematicsError::NegativeTimeDelta("must be non-negative"))
        ));
        assert_eq!(robot.pose(), Pose::default());
    }
}
