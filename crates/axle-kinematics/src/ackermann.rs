//! Ackermann-steered car, using the kinematic bicycle model.
//!
//! The car state is a 6-vector `[x, y, yaw, vx, vy, yaw_rate]`. Steering angles
//! are read in degrees or radians depending on the `degrees` flag the car was
//! built with; the yaw stored in the state is always in radians.

use core::fmt;

use libm::{cos, sin, tan};
use nalgebra::{Matrix3, Vector2, Vector3, Vector6};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Pose;
use crate::affine::to_radians;
use crate::error::KinematicsError;

/// A car-like robot steered by its front axle.
#[derive(Debug, Clone, PartialEq)]
pub struct AckermannCar {
    /// `[x, y, yaw, vx, vy, yaw_rate]`
    state: Vector6<f64>,
    /// Distance between the front and rear axles (m).
    wheelbase: f64,
    width: f64,
    length: f64,
    steering_angle: f64,
    velocity: f64,
    degrees: bool,
}

impl Default for AckermannCar {
    /// A mid-size car: 2.5 m wheelbase, 1.5 m wide, 4.5 m long, steering in degrees.
    fn default() -> Self {
        AckermannCar {
            state: Vector6::zeros(),
            wheelbase: 2.5,
            width: 1.5,
            length: 4.5,
            steering_angle: 0.0,
            velocity: 0.0,
            degrees: true,
        }
    }
}

impl AckermannCar {
    /// Construct a car at rest at the origin.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` if `wheelbase`, `width` or
    /// `length` is not positive.
    pub fn new(wheelbase: f64, width: f64, length: f64, degrees: bool) -> Result<Self, KinematicsError> {
        Self::with_state(Vector6::zeros(), wheelbase, width, length, degrees)
    }

    /// Construct a car from a full `[x, y, yaw, vx, vy, yaw_rate]` state.
    ///
    /// The yaw is wrapped to `[0, 2π)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` if `wheelbase`, `width` or
    /// `length` is not positive.
    pub fn with_state(
        mut state: Vector6<f64>,
        wheelbase: f64,
        width: f64,
        length: f64,
        degrees: bool,
    ) -> Result<Self, KinematicsError> {
        if !(wheelbase > 0.0) {
            return Err(KinematicsError::InvalidGeometry("wheelbase must be positive"));
        }
        if !(width > 0.0) || !(length > 0.0) {
            return Err(KinematicsError::InvalidGeometry(
                "car width and length must be positive",
            ));
        }
        state[2] = Pose::wrap_heading(state[2]);
        debug!(wheelbase, width, length, degrees, "ackermann car created");

        Ok(AckermannCar {
            state,
            wheelbase,
            width,
            length,
            steering_angle: 0.0,
            velocity: 0.0,
            degrees,
        })
    }

    /// Returns the full state vector.
    pub fn state(&self) -> &Vector6<f64> {
        &self.state
    }

    /// Returns the world-frame x position.
    pub fn x(&self) -> f64 {
        self.state[0]
    }

    /// Returns the world-frame y position.
    pub fn y(&self) -> f64 {
        self.state[1]
    }

    /// Returns the yaw in radians.
    pub fn yaw(&self) -> f64 {
        self.state[2]
    }

    /// Returns the yaw in the car's angle unit (degrees when `degrees` is set).
    pub fn heading(&self) -> f64 {
        if self.degrees { self.yaw().to_degrees() } else { self.yaw() }
    }

    /// Returns the planar pose `(x, y, yaw)`.
    pub fn pose(&self) -> Pose {
        Pose::new(self.x(), self.y(), self.yaw())
    }

    /// Returns the last body velocity decomposition, `state[3..6]`.
    pub fn body_velocity(&self) -> Vector3<f64> {
        self.state.fixed_rows::<3>(3).into_owned()
    }

    /// Returns the last commanded steering angle.
    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    /// Returns the last commanded velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Returns the wheelbase.
    pub fn wheelbase(&self) -> f64 {
        self.wheelbase
    }

    /// Returns the car width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the car length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns whether angles are in degrees.
    pub fn degrees(&self) -> bool {
        self.degrees
    }

    /// World position of the front axle center.
    pub fn front_axle(&self) -> Vector2<f64> {
        Vector2::new(
            self.x() + self.wheelbase * cos(self.yaw()),
            self.y() + self.wheelbase * sin(self.yaw()),
        )
    }

    /// Planar rotation for the car heading, embedded in a 3×3 matrix acting on
    /// `[vx, vy, yaw_rate]`.
    ///
    /// With `front` set, the current steering angle is added to the heading.
    pub fn kinematic_matrix(&self, front: bool) -> Matrix3<f64> {
        let steering = if front {
            to_radians(self.steering_angle, self.degrees)
        } else {
            0.0
        };
        let angle = self.yaw() + steering;
        let (s, c) = (sin(angle), cos(angle));
        Matrix3::new(
            c, -s, 0.0, //
            s, c, 0.0, //
            0.0, 0.0, 1.0,
        )
    }

    /// Body-frame velocity `[v, 0, v · tan(δ) / wheelbase]` for a speed and steering angle.
    pub fn robot_velocity(&self, velocity: f64, steering_angle: f64) -> Vector3<f64> {
        let steering = to_radians(steering_angle, self.degrees);
        Vector3::new(velocity, 0.0, velocity * tan(steering) / self.wheelbase)
    }

    /// Body-frame velocity for the stored speed and steering angle.
    pub fn current_robot_velocity(&self) -> Vector3<f64> {
        self.robot_velocity(self.velocity, self.steering_angle)
    }

    /// Velocity of the front axle, rotated by heading plus steering.
    pub fn front_velocity(&self, velocity: f64, steering_angle: f64) -> Vector3<f64> {
        self.kinematic_matrix(true) * self.robot_velocity(velocity, steering_angle)
    }

    /// Velocity of the rear axle, rotated by the heading.
    pub fn back_velocity(&self, velocity: f64, steering_angle: f64) -> Vector3<f64> {
        self.kinematic_matrix(false) * self.robot_velocity(velocity, steering_angle)
    }

    /// Mean of the front and rear axle velocities.
    pub fn center_velocity(&self, velocity: f64, steering_angle: f64) -> Vector3<f64> {
        (self.front_velocity(velocity, steering_angle) + self.back_velocity(velocity, steering_angle)) / 2.0
    }

    /// Recovers body-frame components from a world/axle velocity vector.
    ///
    /// Uses `state[3..6]` when `velocities` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::SingularMatrix)` if the kinematic matrix cannot be inverted.
    pub fn body_velocity_from_state(
        &self,
        velocities: Option<&Vector3<f64>>,
        front: bool,
    ) -> Result<Vector3<f64>, KinematicsError> {
        let velocities = velocities.copied().unwrap_or_else(|| self.body_velocity());
        let inverse = self
            .kinematic_matrix(front)
            .try_inverse()
            .ok_or(KinematicsError::SingularMatrix("kinematic matrix is not invertible"))?;
        Ok(inverse * velocities)
    }

    /// Advances the car by `dt` under a speed and steering command.
    ///
    /// Stores the command, moves `[x, y, yaw]` by `dt · K · v_robot` using the
    /// heading from before the step, stores the body velocity decomposition in
    /// `state[3..6]`, and wraps the yaw to `[0, 2π)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative and
    /// `Err(KinematicsError::SingularMatrix)` if the body velocity cannot be
    /// recovered. The car is left untouched on error.
    pub fn update(&mut self, velocity: f64, steering_angle: f64, dt: f64) -> Result<(), KinematicsError> {
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta(
                "must be non-negative",
            ));
        }
        let robot_velocity = self.robot_velocity(velocity, steering_angle);
        let body_velocity = self.body_velocity_from_state(Some(&robot_velocity), false)?;
        let delta = self.kinematic_matrix(false) * robot_velocity * dt;

        self.steering_angle = steering_angle;
        self.velocity = velocity;
        self.state[0] += delta[0];
        self.state[1] += delta[1];
        self.state[2] = Pose::wrap_heading(self.state[2] + delta[2]);
        self.state.fixed_rows_mut::<3>(3).copy_from(&body_velocity);
        trace!(velocity, steering_angle, dt, pose = %self.pose(), "ackermann state updated");
        Ok(())
    }
}

impl fmt::Display for AckermannCar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AckermannCar (wheelbase: {:.2} m) at {}, δ: {:.2}",
            self.wheelbase,
            self.pose(),
            self.steering_angle
        )
    }
}

/// A rigid arm mounted on a car body.
///
/// The arm is attached by composition: it holds only its own geometry and reads
/// the car pose when asked for world positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appendage {
    /// Mount point in the car frame (m).
    pub offset: Vector2<f64>,
    /// Arm length (m).
    pub length: f64,
    /// Arm angle relative to the car heading, in the car's angle unit.
    pub angle: f64,
}

impl Default for Appendage {
    fn default() -> Self {
        Appendage {
            offset: Vector2::zeros(),
            length: 1.0,
            angle: 0.0,
        }
    }
}

impl Appendage {
    /// Construct an appendage.
    pub const fn new(offset: Vector2<f64>, length: f64, angle: f64) -> Self {
        Appendage { offset, length, angle }
    }

    /// Mount offset rotated into the world frame by the car heading.
    pub fn transformed_offset(&self, car: &AckermannCar) -> Vector2<f64> {
        car.kinematic_matrix(false).fixed_view::<2, 2>(0, 0) * self.offset
    }

    /// World position of the arm mount point.
    pub fn base(&self, car: &AckermannCar) -> Vector2<f64> {
        Vector2::new(car.x(), car.y()) + self.transformed_offset(car)
    }

    /// World position of the arm tip.
    pub fn tip(&self, car: &AckermannCar) -> Vector2<f64> {
        let angle = car.yaw() + to_radians(self.angle, car.degrees());
        self.base(car) + Vector2::new(cos(angle), sin(angle)) * self.length
    }
}
