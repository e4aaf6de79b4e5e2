//! Omnidirectional wheels and robots.
//!
//! An [`OmniWheel`] sits at a fixed offset and orientation in the robot frame.
//! When the robot body spins, each wheel's contact point moves tangentially; the
//! helpers here turn a robot angular velocity into that tangential wheel speed
//! and its vector components. Angles in this module are in degrees.

use alloc::vec::Vec;

use libm::{cos, sin};
use nalgebra::{Vector2, Vector3};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::affine::{Axis, Transform, axis_rotation, planar_rotation_of, rotation_translation_affine};
use crate::error::KinematicsError;

/// Smallest wheel count that can drive a holonomic base.
pub const MIN_WHEELS: usize = 3;

/// A wheel with passive rollers, mounted at a fixed pose on the robot frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OmniWheel {
    /// Mount position in the robot frame (m).
    offset: Vector2<f64>,
    /// Mount orientation in the robot frame (deg).
    orientation: f64,
    diameter: f64,
    width: f64,
    /// Robot angular velocity used by [`OmniWheel::world_velocity`].
    velocity: f64,
}

impl Default for OmniWheel {
    fn default() -> Self {
        OmniWheel {
            offset: Vector2::zeros(),
            orientation: 0.0,
            diameter: 1.0,
            width: 0.5,
            velocity: 0.0,
        }
    }
}

impl OmniWheel {
    /// Construct a wheel at rest.
    ///
    /// # Arguments
    ///
    /// * `offset`: Mount position in the robot frame (m).
    /// * `orientation`: Mount orientation in the robot frame (deg).
    /// * `diameter`: Wheel diameter (m).
    /// * `width`: Wheel width (m).
    pub fn new(offset: Vector2<f64>, orientation: f64, diameter: f64, width: f64) -> Self {
        OmniWheel {
            offset,
            orientation,
            diameter,
            width,
            velocity: 0.0,
        }
    }

    /// Returns the mount position in the robot frame.
    pub fn offset(&self) -> Vector2<f64> {
        self.offset
    }

    /// Returns the mount orientation in degrees.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Returns the wheel diameter.
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Returns the wheel width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the stored robot angular velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Store the robot angular velocity used for world-frame velocity queries.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Pose of the wheel in the robot frame.
    pub fn affine_matrix(&self) -> Transform {
        let translation = Vector3::new(self.offset.x, self.offset.y, 0.0);
        rotation_translation_affine(Axis::Z, self.orientation, &translation, true)
    }

    /// Tangential wheel speed for a robot angular velocity: `ω · d / 2`.
    pub fn calculate_velocity(&self, robot_angular_velocity: f64) -> f64 {
        robot_angular_velocity * (self.diameter / 2.0)
    }

    /// Tangential wheel velocity as a vector in the robot frame.
    ///
    /// The wheel's forward direction (first column of its pose) is turned by 90°
    /// and scaled by [`OmniWheel::calculate_velocity`].
    pub fn velocity_components(&self, robot_angular_velocity: f64) -> Vector2<f64> {
        let wheel_velocity = self.calculate_velocity(robot_angular_velocity);
        let affine = self.affine_matrix();
        let direction = Vector2::new(affine[(0, 0)], affine[(1, 0)]);
        planar_rotation_of(&axis_rotation(Axis::Z, 90.0, true)) * direction * wheel_velocity
    }

    /// World position of the wheel for a robot at `robot_position` facing `robot_orientation` (deg).
    pub fn world_position(&self, robot_position: &Vector2<f64>, robot_orientation: f64) -> Vector2<f64> {
        planar_rotation_of(&axis_rotation(Axis::Z, robot_orientation, true)) * self.offset + robot_position
    }

    /// World orientation of the wheel in degrees.
    pub fn world_orientation(&self, robot_orientation: f64) -> f64 {
        self.orientation + robot_orientation
    }

    /// World-frame velocity of the wheel for the stored robot angular velocity.
    pub fn world_velocity(&self, robot_orientation: f64) -> Vector2<f64> {
        planar_rotation_of(&axis_rotation(Axis::Z, robot_orientation, true))
            * self.velocity_components(self.velocity)
    }
}

/// A robot driven by a fixed number of omni wheels.
///
/// Wheels are mounted one at a time until the declared count is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct OmnidirectionalRobot {
    num_wheels: usize,
    wheels: Vec<OmniWheel>,
    position: Vector2<f64>,
    /// Heading in degrees.
    orientation: f64,
}

impl OmnidirectionalRobot {
    /// Construct a robot with room for `num_wheels` wheels and none mounted.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` if `num_wheels` is less than three.
    pub fn new(num_wheels: usize) -> Result<Self, KinematicsError> {
        if num_wheels < MIN_WHEELS {
            return Err(KinematicsError::InvalidGeometry(
                "omnidirectional robot must have at least 3 wheels",
            ));
        }
        Ok(OmnidirectionalRobot {
            num_wheels,
            wheels: Vec::with_capacity(num_wheels),
            position: Vector2::zeros(),
            orientation: 0.0,
        })
    }

    /// Mount the next wheel.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::WheelSetFull)` once `num_wheels` wheels are mounted.
    pub fn add_wheel(&mut self, wheel: OmniWheel) -> Result<(), KinematicsError> {
        if self.is_complete() {
            return Err(KinematicsError::WheelSetFull("all wheels have been added"));
        }
        trace!(index = self.wheels.len(), orientation = wheel.orientation, "omni wheel added");
        self.wheels.push(wheel);
        Ok(())
    }

    /// Returns the declared wheel count.
    pub fn num_wheels(&self) -> usize {
        self.num_wheels
    }

    /// Returns the mounted wheels, in mounting order.
    pub fn wheels(&self) -> &[OmniWheel] {
        &self.wheels
    }

    /// Returns `true` once every declared wheel is mounted.
    pub fn is_complete(&self) -> bool {
        self.wheels.len() >= self.num_wheels
    }

    /// Returns the robot position in the world frame.
    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    /// Returns the robot heading in degrees.
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Place the robot in the world frame.
    pub fn set_pose(&mut self, position: Vector2<f64>, orientation: f64) {
        self.position = position;
        self.orientation = orientation;
    }

    /// Store one robot angular velocity per mounted wheel.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidInputLength)` unless `velocities` has
    /// one entry per mounted wheel. No wheel is modified in that case.
    pub fn set_wheel_velocities(&mut self, velocities: &[f64]) -> Result<(), KinematicsError> {
        if velocities.len() != self.wheels.len() {
            return Err(KinematicsError::InvalidInputLength(
                "exactly one velocity per mounted wheel is required",
            ));
        }
        for (wheel, &velocity) in self.wheels.iter_mut().zip(velocities) {
            wheel.set_velocity(velocity);
        }
        Ok(())
    }

    /// Tangential velocity vector of every wheel, in the robot frame.
    pub fn velocity_components(&self, robot_angular_velocity: f64) -> Vec<Vector2<f64>> {
        self.wheels
            .iter()
            .map(|wheel| wheel.velocity_components(robot_angular_velocity))
            .collect()
    }

    /// World position of every wheel.
    pub fn wheel_positions(&self) -> Vec<Vector2<f64>> {
        self.wheels
            .iter()
            .map(|wheel| wheel.world_position(&self.position, self.orientation))
            .collect()
    }

    /// World velocity of every wheel, from the stored wheel velocities.
    pub fn wheel_velocities(&self) -> Vec<Vector2<f64>> {
        self.wheels
            .iter()
            .map(|wheel| wheel.world_velocity(self.orientation))
            .collect()
    }
}

/// Evenly spaced wheels on a circle around the robot center.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialLayout {
    /// Number of wheels.
    pub num_wheels: usize,
    /// Circle radius (m).
    pub radius: f64,
    /// Angle of the first wheel (deg).
    #[cfg_attr(feature = "serde", serde(default))]
    pub axis_rotation: f64,
    /// Wheel width (m); half the radius when unset.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wheel_width: Option<f64>,
    /// Wheel diameter (m).
    #[cfg_attr(feature = "serde", serde(default = "default_wheel_diameter"))]
    pub wheel_diameter: f64,
}

const DEFAULT_WHEEL_DIAMETER: f64 = 0.5;

#[cfg(feature = "serde")]
fn default_wheel_diameter() -> f64 {
    DEFAULT_WHEEL_DIAMETER
}

impl RadialLayout {
    /// Layout with no axis rotation and default wheel size.
    pub fn new(num_wheels: usize, radius: f64) -> Self {
        RadialLayout {
            num_wheels,
            radius,
            axis_rotation: 0.0,
            wheel_width: None,
            wheel_diameter: DEFAULT_WHEEL_DIAMETER,
        }
    }

    /// Rotate the whole layout by `axis_rotation` degrees.
    pub fn with_axis_rotation(mut self, axis_rotation: f64) -> Self {
        self.axis_rotation = axis_rotation;
        self
    }

    /// Set the wheel width.
    pub fn with_wheel_width(mut self, wheel_width: f64) -> Self {
        self.wheel_width = Some(wheel_width);
        self
    }

    /// Set the wheel diameter.
    pub fn with_wheel_diameter(mut self, wheel_diameter: f64) -> Self {
        self.wheel_diameter = wheel_diameter;
        self
    }

    /// Effective wheel width.
    pub fn wheel_width(&self) -> f64 {
        self.wheel_width.unwrap_or(self.radius / 2.0)
    }

    /// Mount angle of wheel `index`, in degrees.
    pub fn wheel_angle(&self, index: usize) -> f64 {
        index as f64 * (360.0 / self.num_wheels as f64) + self.axis_rotation
    }

    /// The wheel at position `index` of the layout.
    pub fn wheel(&self, index: usize) -> OmniWheel {
        let angle = self.wheel_angle(index);
        let radians = angle.to_radians();
        let offset = Vector2::new(self.radius * cos(radians), self.radius * sin(radians));
        OmniWheel::new(offset, angle, self.wheel_diameter, self.wheel_width())
    }

    /// Build a robot with every wheel of this layout mounted.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGeometry)` for fewer than three wheels
    /// or a non-positive radius or wheel diameter.
    pub fn build(&self) -> Result<OmnidirectionalRobot, KinematicsError> {
        let mut robot = OmnidirectionalRobot::new(self.num_wheels)?;
        if !(self.radius > 0.0) {
            return Err(KinematicsError::InvalidGeometry("layout radius must be positive"));
        }
        if !(self.wheel_diameter > 0.0) {
            return Err(KinematicsError::InvalidGeometry("wheel diameter must be positive"));
        }
        for index in 0..self.num_wheels {
            robot.add_wheel(self.wheel(index))?;
        }
        debug!(
            num_wheels = self.num_wheels,
            radius = self.radius,
            axis_rotation = self.axis_rotation,
            "radial omnidirectional layout built"
        );
        Ok(robot)
    }
}

/// An omnidirectional robot whose wheels come from a [`RadialLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct RadialOmnidirectionalRobot {
    layout: RadialLayout,
    robot: OmnidirectionalRobot,
}

impl RadialOmnidirectionalRobot {
    /// Construct the robot and mount every wheel of `layout`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`RadialLayout::build`].
    pub fn new(layout: RadialLayout) -> Result<Self, KinematicsError> {
        Ok(RadialOmnidirectionalRobot {
            robot: layout.build()?,
            layout,
        })
    }

    /// Returns the layout the wheels were generated from.
    pub fn layout(&self) -> &RadialLayout {
        &self.layout
    }

    /// Returns the circle radius.
    pub fn radius(&self) -> f64 {
        self.layout.radius
    }

    /// Returns the underlying robot.
    pub fn robot(&self) -> &OmnidirectionalRobot {
        &self.robot
    }

    /// Returns the underlying robot mutably.
    pub fn robot_mut(&mut self) -> &mut OmnidirectionalRobot {
        &mut self.robot
    }

    /// Returns the mounted wheels.
    pub fn wheels(&self) -> &[OmniWheel] {
        self.robot.wheels()
    }
}
