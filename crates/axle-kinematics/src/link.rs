//! Links of a serial kinematic chain.
//!
//! A [`Link`] is either rotational (revolute) or translational (prismatic). It
//! owns a scalar joint state and the 4×4 transform derived from it. The only way
//! to change the state is [`Link::set_state`], which recomputes the transform in
//! the same call, so the two never disagree.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use nalgebra::{Matrix3, Vector3};
use tracing::{debug, trace};

use crate::affine::{
    Axis, Offset, RotationSpec, Transform, TranslationAxis, axis_rotation, axis_translation,
    chained_rotations, process_translational_offset, rotation_of, translation_of,
};
use crate::error::KinematicsError;

/// The joint type of a link, tagged with the axis it moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Revolute joint; the state is an angle.
    Rotational(Axis),
    /// Prismatic joint; the state is a displacement.
    Translational(TranslationAxis),
}

impl FromStr for LinkKind {
    type Err = KinematicsError;

    /// `x`, `y`, `z` give a rotational link; `tx`, `ty`, `tz` a translational one.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "tx" | "ty" | "tz" => Ok(LinkKind::Translational(token.parse()?)),
            _ => Ok(LinkKind::Rotational(token.parse()?)),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Rotational(axis) => write!(f, "rotational({})", axis),
            LinkKind::Translational(axis) => write!(f, "translational({})", axis),
        }
    }
}

/// Computes the pose of a link from its fixed frame transform and joint state.
///
/// Rotational: `axis_transform · R(axis, state)`.
/// Translational: `axis_transform · T(axis, state)`.
pub fn recompute(kind: LinkKind, axis_transform: &Transform, state: f64, degrees: bool) -> Transform {
    let joint = match kind {
        LinkKind::Rotational(axis) => axis_rotation(axis, state, degrees),
        LinkKind::Translational(axis) => axis_translation(axis, state),
    };
    axis_transform * joint
}

/// One joint of a kinematic chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    kind: LinkKind,
    degrees: bool,
    /// Fixed `offset · frame_rotation` part of the pose.
    axis_transform: Transform,
    state: f64,
    transform: Transform,
}

impl Link {
    /// Construct a link from an axis token.
    ///
    /// # Arguments
    ///
    /// * `axis`: `x`, `y`, `z` for a rotational link or `tx`, `ty`, `tz` for a translational one.
    /// * `offset`: Fixed translation from the parent frame.
    /// * `frame_rotation`: Optional fixed rotation applied before the offset.
    /// * `initial_state`: Initial angle or displacement.
    /// * `degrees`: Whether angles (state and frame rotation) are in degrees.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidAxis)` for an unknown axis token, and any
    /// error produced while normalizing `offset` or `frame_rotation`.
    pub fn new(
        axis: &str,
        offset: &Offset,
        frame_rotation: Option<&RotationSpec>,
        initial_state: f64,
        degrees: bool,
    ) -> Result<Self, KinematicsError> {
        Self::from_kind(axis.parse()?, offset, frame_rotation, initial_state, degrees)
    }

    /// Construct a link from an already parsed [`LinkKind`].
    ///
    /// # Errors
    ///
    /// Returns any error produced while normalizing `offset` or `frame_rotation`.
    pub fn from_kind(
        kind: LinkKind,
        offset: &Offset,
        frame_rotation: Option<&RotationSpec>,
        initial_state: f64,
        degrees: bool,
    ) -> Result<Self, KinematicsError> {
        let rotation = match frame_rotation {
            Some(spec) => chained_rotations(spec, degrees)?,
            None => Transform::identity(),
        };
        let axis_transform = process_translational_offset(offset)? * rotation;
        debug!(%kind, initial_state, degrees, "link created");

        Ok(Link {
            kind,
            degrees,
            axis_transform,
            state: initial_state,
            transform: recompute(kind, &axis_transform, initial_state, degrees),
        })
    }

    /// Returns the joint type.
    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Returns whether angles are expressed in degrees.
    pub fn degrees(&self) -> bool {
        self.degrees
    }

    /// Returns the current joint state.
    pub fn state(&self) -> f64 {
        self.state
    }

    /// Returns the fixed part of the pose (offset and frame rotation).
    pub fn axis_transform(&self) -> &Transform {
        &self.axis_transform
    }

    /// Returns the pose of this link relative to its parent frame.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Set a new joint state and recompute the transform.
    pub fn set_state(&mut self, state: f64) {
        self.transform = recompute(self.kind, &self.axis_transform, state, self.degrees);
        self.state = state;
        trace!(kind = %self.kind, state, "link state updated");
    }

    /// Origin of this link's frame, relative to its parent.
    pub fn position(&self) -> Vector3<f64> {
        translation_of(&self.transform)
    }

    /// Orientation of this link's frame, relative to its parent.
    pub fn orientation(&self) -> Matrix3<f64> {
        rotation_of(&self.transform)
    }
}

/// An ordered list of links, each expressed in the frame of the one before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicChain {
    links: Vec<Link>,
}

impl KinematicChain {
    /// Construct an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link at the distal end of the chain.
    pub fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Returns the links, base first.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Returns a mutable reference to the link at `index`.
    pub fn link_mut(&mut self, index: usize) -> Option<&mut Link> {
        self.links.get_mut(index)
    }

    /// Returns the number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Set every joint state at once, base first.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidInputLength)` when `states` does not
    /// have one entry per link. No link is modified in that case.
    pub fn set_states(&mut self, states: &[f64]) -> Result<(), KinematicsError> {
        if states.len() != self.links.len() {
            return Err(KinematicsError::InvalidInputLength(
                "exactly one state per link is required",
            ));
        }
        for (link, &state) in self.links.iter_mut().zip(states) {
            link.set_state(state);
        }
        Ok(())
    }

    /// Pose of every link frame relative to the chain base.
    pub fn frames(&self) -> Vec<Transform> {
        self.links
            .iter()
            .scan(Transform::identity(), |pose, link| {
                *pose *= link.transform();
                Some(*pose)
            })
            .collect()
    }

    /// Pose of the last frame relative to the chain base.
    pub fn end_effector(&self) -> Transform {
        self.links
            .iter()
            .fold(Transform::identity(), |pose, link| pose * link.transform())
    }
}

impl FromIterator<Link> for KinematicChain {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        KinematicChain {
            links: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affine::{rotational_affine, translational_affine};
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_link_invalid_axis() {
        let result = Link::new("a", &Offset::default(), None, 0.0, true);
        assert!(matches!(result, Err(KinematicsError::InvalidAxis(_))));
    }

    #[test]
    fn test_link_kind_from_token() {
        assert_eq!("z".parse::<LinkKind>(), Ok(LinkKind::Rotational(Axis::Z)));
        assert_eq!("ty".parse::<LinkKind>(), Ok(LinkKind::Translational(TranslationAxis::Ty)));
        assert!("t".parse::<LinkKind>().is_err());
    }

    #[test]
    fn test_rotational_link_without_offset() {
        let link = Link::new("z", &Offset::default(), None, 30.0, true).unwrap();
        assert_eq!(link.kind(), LinkKind::Rotational(Axis::Z));
        assert_relative_eq!(
            *link.transform(),
            rotational_affine("z", 30.0, true).unwrap(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_offset_applies_after_joint_rotation() {
        let link = Link::new("z", &Offset::Scalar(1.0), None, 90.0, true).unwrap();
        let tip = link.transform() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(tip, Vector4::new(1.0, 1.0, 0.0, 1.0), epsilon = EPSILON);
        assert_relative_eq!(link.position(), Vector3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_axis_transform_is_offset_times_frame_rotation() {
        let offset = Offset::Vector([0.0, 0.0, 2.0]);
        let rotation = RotationSpec::AxisAngle("x".into(), 90.0);
        let link = Link::new("z", &offset, Some(&rotation), 0.0, true).unwrap();

        let expected = translational_affine("tz", 2.0).unwrap() * rotational_affine("x", 90.0, true).unwrap();
        assert_relative_eq!(*link.axis_transform(), expected, epsilon = EPSILON);
        assert_relative_eq!(*link.transform(), expected, epsilon = EPSILON);
    }

    #[test]
    fn test_translational_link() {
        let mut link = Link::new("tz", &Offset::Vector([0.0, 0.0, 0.5]), None, 0.25, true).unwrap();
        assert_relative_eq!(link.position(), Vector3::new(0.0, 0.0, 0.75), epsilon = EPSILON);
        assert_eq!(link.orientation(), Matrix3::identity());

        link.set_state(-0.5);
        assert_eq!(link.state(), -0.5);
        assert_relative_eq!(link.position(), Vector3::new(0.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_set_state_is_idempotent() {
        let rotation = RotationSpec::Euler([10.0, 20.0, 30.0]);
        let mut link = Link::new("y", &Offset::Scalar(0.3), Some(&rotation), 0.0, true).unwrap();
        link.set_state(42.0);
        let first = *link.transform();
        link.set_state(42.0);
        assert_eq!(first, *link.transform());
    }

    #[test]
    fn test_set_state_matches_fresh_link() {
        let offset = Offset::AxisValues(vec![("x".into(), 1.0), ("y".into(), 2.0)]);
        let mut link = Link::new("x", &offset, None, 0.0, true).unwrap();
        link.set_state(75.0);
        let fresh = Link::new("x", &offset, None, 75.0, true).unwrap();
        assert_eq!(link.transform(), fresh.transform());
        assert_eq!(link.state(), fresh.state());
    }

    #[test]
    fn test_radians_link() {
        let link = Link::new("z", &Offset::default(), None, core::f64::consts::PI, false).unwrap();
        assert!(!link.degrees());
        assert_relative_eq!(
            *link.transform(),
            rotational_affine("z", 180.0, true).unwrap(),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_link_propagates_offset_errors() {
        let result = Link::new("z", &Offset::AxisValues(vec![]), None, 0.0, true);
        assert!(matches!(result, Err(KinematicsError::InvalidOffsetFormat(_))));

        let rotation = RotationSpec::AxisAngles(vec![]);
        let result = Link::new("z", &Offset::default(), Some(&rotation), 0.0, true);
        assert!(matches!(result, Err(KinematicsError::InvalidRotationSpec(_))));
    }

    fn planar_arm() -> KinematicChain {
        [
            Link::new("z", &Offset::default(), None, 90.0, true).unwrap(),
            Link::new("z", &Offset::Scalar(1.0), None, 0.0, true).unwrap(),
            Link::new("tx", &Offset::Scalar(1.0), None, 0.0, true).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_chain_end_effector() {
        let chain = planar_arm();
        assert_eq!(chain.len(), 3);
        let tip = translation_of(&chain.end_effector());
        assert_relative_eq!(tip, Vector3::new(0.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_chain_frames_are_cumulative() {
        let chain = planar_arm();
        let frames = chain.frames();
        assert_eq!(frames.len(), 3);
        assert_relative_eq!(translation_of(&frames[0]), Vector3::zeros(), epsilon = EPSILON);
        assert_relative_eq!(translation_of(&frames[1]), Vector3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(frames[2], chain.end_effector(), epsilon = EPSILON);
    }

    #[test]
    fn test_chain_set_states() {
        let mut chain = planar_arm();
        chain.set_states(&[0.0, 90.0, 0.5]).unwrap();
        let tip = translation_of(&chain.end_effector());
        assert_relative_eq!(tip, Vector3::new(1.0, 1.5, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_chain_set_states_wrong_length() {
        let mut chain = planar_arm();
        let before = chain.clone();
        let result = chain.set_states(&[0.0, 0.0]);
        assert!(matches!(result, Err(KinematicsError::InvalidInputLength(_))));
        assert_eq!(chain, before);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = KinematicChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.end_effector(), Transform::identity());
        assert!(chain.frames().is_empty());
    }
}
