//! Homogeneous (4×4 affine) transform algebra.
//!
//! Every pose in this crate is a [`Transform`]: a 3×3 rotation block, a 3×1
//! translation column and a bottom row of `[0, 0, 0, 1]`. Transforms compose by
//! matrix multiplication, with the identity as the neutral element.
//!
//! Geometry is often written down in several notations (a bare number meaning
//! "along x", an `[x, y, z]` triplet, a list of `(axis, value)` pairs). The
//! [`Offset`] and [`RotationSpec`] enums name those notations, and
//! [`process_translational_offset`] / [`chained_rotations`] turn each of them
//! into a single transform.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use nalgebra::{Matrix2, Matrix3, Matrix4, Rotation3, Unit, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;

/// A 4×4 homogeneous transform.
pub type Transform = Matrix4<f64>;

/// Rotation axis of a right-handed frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rotation about x.
    X,
    /// Rotation about y.
    Y,
    /// Rotation about z.
    Z,
}

impl Axis {
    fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

impl FromStr for Axis {
    type Err = KinematicsError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(KinematicsError::InvalidAxis(String::from(other))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Translation axis, written `tx`, `ty` or `tz`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationAxis {
    /// Displacement along x.
    Tx,
    /// Displacement along y.
    Ty,
    /// Displacement along z.
    Tz,
}

impl TranslationAxis {
    /// Row of the translation column this axis writes to.
    fn row(self) -> usize {
        match self {
            TranslationAxis::Tx => 0,
            TranslationAxis::Ty => 1,
            TranslationAxis::Tz => 2,
        }
    }

    /// Parses an offset axis token, accepting both the bare (`x`) and the
    /// prefixed (`tx`) spelling.
    pub fn from_offset_token(token: &str) -> Result<Self, KinematicsError> {
        match token {
            "x" | "tx" => Ok(TranslationAxis::Tx),
            "y" | "ty" => Ok(TranslationAxis::Ty),
            "z" | "tz" => Ok(TranslationAxis::Tz),
            other => Err(KinematicsError::InvalidAxis(String::from(other))),
        }
    }
}

impl FromStr for TranslationAxis {
    type Err = KinematicsError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "tx" => Ok(TranslationAxis::Tx),
            "ty" => Ok(TranslationAxis::Ty),
            "tz" => Ok(TranslationAxis::Tz),
            other => Err(KinematicsError::InvalidAxis(String::from(other))),
        }
    }
}

impl fmt::Display for TranslationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationAxis::Tx => write!(f, "tx"),
            TranslationAxis::Ty => write!(f, "ty"),
            TranslationAxis::Tz => write!(f, "tz"),
        }
    }
}

/// Converts `angle` to radians when it is expressed in degrees.
pub(crate) fn to_radians(angle: f64, degrees: bool) -> f64 {
    if degrees { angle.to_radians() } else { angle }
}

/// Rotation about a typed axis, embedded in an otherwise-identity transform.
pub fn axis_rotation(axis: Axis, angle: f64, degrees: bool) -> Transform {
    Rotation3::from_axis_angle(&axis.unit(), to_radians(angle, degrees)).to_homogeneous()
}

/// Pure translation along a typed axis.
pub fn axis_translation(axis: TranslationAxis, displacement: f64) -> Transform {
    let mut transform = Transform::identity();
    transform[(axis.row(), 3)] = displacement;
    transform
}

/// Builds the homogeneous rotation about the axis named by `axis`.
///
/// # Arguments
///
/// * `axis`: One of `x`, `y`, `z`.
/// * `angle`: Rotation angle, in degrees when `degrees` is set, radians otherwise.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidAxis)` for any other token.
pub fn rotational_affine(axis: &str, angle: f64, degrees: bool) -> Result<Transform, KinematicsError> {
    Ok(axis_rotation(axis.parse()?, angle, degrees))
}

/// Builds the identity transform with `displacement` along the axis named by `axis`.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidAxis)` unless `axis` is `tx`, `ty` or `tz`.
pub fn translational_affine(axis: &str, displacement: f64) -> Result<Transform, KinematicsError> {
    Ok(axis_translation(axis.parse()?, displacement))
}

/// Combines a single-axis rotation and a translation into one transform.
///
/// A translation with one or two components is padded with zeros.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidTranslationLength)` when `translation` is
/// empty or has more than three components, and `Err(KinematicsError::InvalidAxis)`
/// for an unknown rotation axis.
pub fn affine_from_rotation_and_translation(
    rotation_angle: f64,
    translation: &[f64],
    axis: &str,
    degrees: bool,
) -> Result<Transform, KinematicsError> {
    let column = match *translation {
        [x] => Vector3::new(x, 0.0, 0.0),
        [x, y] => Vector3::new(x, y, 0.0),
        [x, y, z] => Vector3::new(x, y, z),
        _ => {
            return Err(KinematicsError::InvalidTranslationLength(
                "translation vector must have 1, 2 or 3 elements",
            ));
        }
    };
    Ok(rotation_translation_affine(axis.parse()?, rotation_angle, &column, degrees))
}

/// Rotation about a typed axis followed by a full 3-D translation.
pub fn rotation_translation_affine(
    axis: Axis,
    rotation_angle: f64,
    translation: &Vector3<f64>,
    degrees: bool,
) -> Transform {
    let mut affine = axis_rotation(axis, rotation_angle, degrees);
    affine.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    affine
}

/// Extrinsic x, y, z Euler rotation (`Rz · Ry · Rx`).
fn euler_affine(angles: [f64; 3], degrees: bool) -> Transform {
    let [roll, pitch, yaw] = angles.map(|angle| to_radians(angle, degrees));
    Rotation3::from_euler_angles(roll, pitch, yaw).to_homogeneous()
}

/// The notations accepted for a fixed frame rotation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum RotationSpec {
    /// Euler angles about x, y and z.
    Euler([f64; 3]),
    /// Several Euler triplets, applied one after the other.
    EulerSequence(Vec<[f64; 3]>),
    /// A single rotation about one axis.
    AxisAngle(String, f64),
    /// Rotations about single axes, applied one after the other.
    AxisAngles(Vec<(String, f64)>),
}

impl RotationSpec {
    /// Interprets a bare list of numbers as an Euler triplet.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidRotationSpec)` unless exactly three
    /// angles are given.
    pub fn from_angles(angles: &[f64]) -> Result<Self, KinematicsError> {
        match *angles {
            [x, y, z] => Ok(RotationSpec::Euler([x, y, z])),
            _ => Err(KinematicsError::InvalidRotationSpec(
                "expected an [x, y, z] Euler triplet",
            )),
        }
    }
}

/// Reduces a rotation specification to a single transform.
///
/// Sequences right-multiply the accumulator, so the first entry is applied first:
/// `result = result · next`.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidRotationSpec)` for an empty sequence and
/// `Err(KinematicsError::InvalidAxis)` for an unknown axis token.
pub fn chained_rotations(spec: &RotationSpec, degrees: bool) -> Result<Transform, KinematicsError> {
    match spec {
        RotationSpec::Euler(angles) => Ok(euler_affine(*angles, degrees)),
        RotationSpec::EulerSequence(sequence) => {
            if sequence.is_empty() {
                return Err(KinematicsError::InvalidRotationSpec("empty Euler sequence"));
            }
            Ok(sequence
                .iter()
                .fold(Transform::identity(), |result, angles| result * euler_affine(*angles, degrees)))
        }
        RotationSpec::AxisAngle(axis, angle) => rotational_affine(axis, *angle, degrees),
        RotationSpec::AxisAngles(pairs) => {
            if pairs.is_empty() {
                return Err(KinematicsError::InvalidRotationSpec("empty (axis, angle) list"));
            }
            let mut result = Transform::identity();
            for (axis, angle) in pairs {
                result *= rotational_affine(axis, *angle, degrees)?;
            }
            Ok(result)
        }
    }
}

/// The notations accepted for a fixed translational offset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum Offset {
    /// Displacement along x.
    Scalar(f64),
    /// Displacements along x, y and z.
    Vector([f64; 3]),
    /// Displacement along one axis (`x` or `tx`, and so on).
    AxisValue(String, f64),
    /// Displacements along single axes, composed in order.
    AxisValues(Vec<(String, f64)>),
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Scalar(0.0)
    }
}

impl From<f64> for Offset {
    fn from(displacement: f64) -> Self {
        Offset::Scalar(displacement)
    }
}

impl From<[f64; 3]> for Offset {
    fn from(displacements: [f64; 3]) -> Self {
        Offset::Vector(displacements)
    }
}

impl Offset {
    /// Interprets a bare list of numbers as a scalar or an `[x, y, z]` offset.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidOffsetFormat)` for any other length.
    pub fn from_components(values: &[f64]) -> Result<Self, KinematicsError> {
        match *values {
            [x] => Ok(Offset::Scalar(x)),
            [x, y, z] => Ok(Offset::Vector([x, y, z])),
            _ => Err(KinematicsError::InvalidOffsetFormat(
                "use a scalar, [x, y, z], or (axis, value) pairs",
            )),
        }
    }
}

/// Reduces a translational offset to a single transform.
///
/// # Errors
///
/// Returns `Err(KinematicsError::InvalidOffsetFormat)` for an empty pair list and
/// `Err(KinematicsError::InvalidAxis)` for an unknown axis token.
pub fn process_translational_offset(offset: &Offset) -> Result<Transform, KinematicsError> {
    match offset {
        Offset::Scalar(displacement) => Ok(axis_translation(TranslationAxis::Tx, *displacement)),
        Offset::Vector(displacements) => Ok(Transform::new_translation(&Vector3::from(*displacements))),
        Offset::AxisValue(axis, displacement) => Ok(axis_translation(
            TranslationAxis::from_offset_token(axis)?,
            *displacement,
        )),
        Offset::AxisValues(pairs) => {
            if pairs.is_empty() {
                return Err(KinematicsError::InvalidOffsetFormat("empty (axis, value) list"));
            }
            let mut result = Transform::identity();
            for (axis, displacement) in pairs {
                result *= axis_translation(TranslationAxis::from_offset_token(axis)?, *displacement);
            }
            Ok(result)
        }
    }
}

/// Position part of a transform.
pub fn translation_of(transform: &Transform) -> Vector3<f64> {
    transform.fixed_view::<3, 1>(0, 3).into_owned()
}

/// Rotation block of a transform.
pub fn rotation_of(transform: &Transform) -> Matrix3<f64> {
    transform.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Upper-left 2×2 block, the in-plane part of a rotation about z.
pub fn planar_rotation_of(transform: &Transform) -> Matrix2<f64> {
    transform.fixed_view::<2, 2>(0, 0).into_owned()
}
