//! Bones of a creature skeleton
//!
//! A bone is a 2D segment from a start point to an end point. The rest segment
//! comes from the skeleton section of the document; the world segment is the
//! posed position written every frame from the bone cache.

use super::types::Lerp;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Posed position of a single bone at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoneState {
    pub start_pt: Vec2,
    pub end_pt: Vec2,
}

impl BoneState {
    pub const fn new(start_pt: Vec2, end_pt: Vec2) -> Self {
        Self { start_pt, end_pt }
    }
}

impl Lerp for BoneState {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            start_pt: self.start_pt.lerp(other.start_pt, t),
            end_pt: self.end_pt.lerp(other.end_pt, t),
        }
    }
}

/// Rigid 2D transform taking a rest-pose bone onto its posed segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform2D {
    rest_origin: Vec2,
    world_origin: Vec2,
    /// Rotation stored as a unit complex number (cos, sin)
    rotation: Vec2,
}

impl BoneTransform2D {
    pub const IDENTITY: Self = Self {
        rest_origin: Vec2::ZERO,
        world_origin: Vec2::ZERO,
        rotation: Vec2::X,
    };

    /// Build the transform that maps `rest` onto `world`
    ///
    /// Degenerate (zero-length) segments keep their rest orientation.
    pub fn between(rest: &BoneState, world: &BoneState) -> Self {
        let rest_dir = (rest.end_pt - rest.start_pt).try_normalize();
        let world_dir = (world.end_pt - world.start_pt).try_normalize();

        let rotation = match (rest_dir, world_dir) {
            (Some(r), Some(w)) => Vec2::new(r.dot(w), r.perp_dot(w)),
            _ => Vec2::X,
        };

        Self {
            rest_origin: rest.start_pt,
            world_origin: world.start_pt,
            rotation,
        }
    }

    /// Transform a rest-space point into posed space
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.rotation.rotate(point - self.rest_origin) + self.world_origin
    }
}

impl Default for BoneTransform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A bone of the render composition
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBone {
    name: String,
    id: i32,
    parent: Option<String>,
    children: Vec<String>,
    rest: BoneState,
    /// Posed segment; callers overriding bones edit this
    pub world: BoneState,
}

impl MeshBone {
    /// Create a bone resting (and posed) on the given segment
    pub fn new(name: impl Into<String>, id: i32, parent: Option<String>, rest: BoneState) -> Self {
        Self {
            name: name.into(),
            id,
            parent,
            children: Vec::new(),
            rest,
            world: rest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: String) {
        self.children.push(child);
    }

    pub fn rest(&self) -> &BoneState {
        &self.rest
    }

    /// Move the posed segment back onto the rest segment
    pub fn reset_to_rest(&mut self) {
        self.world = self.rest;
    }

    /// Transform from the rest segment to the current posed segment
    pub fn transform(&self) -> BoneTransform2D {
        BoneTransform2D::between(&self.rest, &self.world)
    }

    /// Shortest distance from `point` to the posed segment
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let segment = self.world.end_pt - self.world.start_pt;
        let length_sq = segment.length_squared();
        if length_sq <= f32::EPSILON {
            return point.distance(self.world.start_pt);
        }

        let t = ((point - self.world.start_pt).dot(segment) / length_sq).clamp(0.0, 1.0);
        point.distance(self.world.start_pt + segment * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_bone() -> MeshBone {
        MeshBone::new(
            "arm",
            1,
            None,
            BoneState::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)),
        )
    }

    #[test]
    fn test_rest_transform_is_identity() {
        let bone = horizontal_bone();
        let p = Vec2::new(1.5, 0.25);
        assert_eq!(bone.transform().apply(p), p);
    }

    #[test]
    fn test_quarter_turn() {
        let mut bone = horizontal_bone();
        bone.world = BoneState::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0));

        let moved = bone.transform().apply(Vec2::new(2.0, 0.0));
        assert!((moved - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_translation_only() {
        let mut bone = horizontal_bone();
        bone.world = BoneState::new(Vec2::new(1.0, 3.0), Vec2::new(2.0, 3.0));

        let moved = bone.transform().apply(Vec2::new(1.5, 0.0));
        assert_eq!(moved, Vec2::new(1.5, 3.0));
    }

    #[test]
    fn test_distance_to_segment() {
        let bone = horizontal_bone();
        assert_eq!(bone.distance_to(Vec2::new(1.5, 0.0)), 0.0);
        assert!((bone.distance_to(Vec2::new(1.5, 0.5)) - 0.5).abs() < 1e-6);
        // Beyond the end point the distance is to the end point
        assert!((bone.distance_to(Vec2::new(3.0, 0.0)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_bone_keeps_orientation() {
        let rest = BoneState::new(Vec2::ZERO, Vec2::ZERO);
        let world = BoneState::new(Vec2::new(2.0, 2.0), Vec2::new(2.0, 2.0));
        let xform = BoneTransform2D::between(&rest, &world);
        assert_eq!(xform.apply(Vec2::new(1.0, 0.0)), Vec2::new(3.0, 2.0));
    }
}
