//! Local and world transforms
//!
//! [`Transform`] is the authored local position/rotation/scale triple with
//! a lazily rebuilt matrix; [`TransformComponent`] wraps one and adds the
//! world-matrix cache managed by the owning [`Scene`].
//!
//! Both caches follow the same dirty-flag contract: the cached matrix is
//! trustworthy iff the flag is clear, and every setter raises the flag.
//!
//! [`Scene`]: crate::scene::Scene

use std::any::Any;

use crate::foundation::math::{compose_trs, euler_deg_from_quat, quat_from_euler_deg, Mat4, Quat, Vec3};
use crate::scene::component::Component;
use crate::scene::serialization::{self, TransformRecord};
use crate::scene::SceneError;

/// Authored local transform with a cached local matrix
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3, // Euler angles in degrees
    scale: Vec3,
    local_matrix: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create an identity transform
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_matrix: Mat4::identity(),
            dirty: false,
        }
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation as Euler angles in degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Set the local rotation from Euler angles in degrees
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Set the local rotation from a quaternion
    pub fn set_rotation_quat(&mut self, rotation: &Quat) {
        self.rotation = euler_deg_from_quat(rotation);
        self.dirty = true;
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Whether the cached local matrix is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The local matrix, rebuilt lazily when stale
    pub fn local_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.local_matrix = compose_trs(
                &self.position,
                &quat_from_euler_deg(&self.rotation),
                &self.scale,
            );
            self.dirty = false;
        }
        self.local_matrix
    }
}

/// Scene-object component carrying the local transform and the cached
/// world matrix
///
/// The world matrix is `parent_world * local`; the owning scene recomputes
/// it on demand and cascades the world-dirty flag to descendants whenever
/// a local setter runs.
#[derive(Debug, Clone)]
pub struct TransformComponent {
    /// The authored local transform
    pub transform: Transform,
    world_matrix: Mat4,
    world_dirty: bool,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformComponent {
    /// Create an identity transform component
    ///
    /// Starts world-dirty: the cached world matrix is meaningless until
    /// the owning scene resolves it against the parent chain, which
    /// matters when the component is attached under a parent that has
    /// already moved.
    pub fn new() -> Self {
        Self {
            transform: Transform::new(),
            world_matrix: Mat4::identity(),
            world_dirty: true,
        }
    }

    /// Create a component from an existing local transform
    pub fn from_transform(transform: Transform) -> Self {
        Self {
            transform,
            world_matrix: Mat4::identity(),
            world_dirty: true,
        }
    }

    /// Whether the cached world matrix is stale
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty || self.transform.is_dirty()
    }

    /// Raise the world-dirty flag; returns false when it was already set
    pub fn mark_world_dirty(&mut self) -> bool {
        if self.world_dirty {
            false
        } else {
            self.world_dirty = true;
            true
        }
    }

    /// The cached world matrix; only valid when not world-dirty
    pub fn cached_world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Store a freshly recomputed world matrix and clear the flag
    pub(crate) fn set_world_matrix(&mut self, world: Mat4) {
        self.world_matrix = world;
        self.world_dirty = false;
    }
}

impl Component for TransformComponent {
    fn type_name(&self) -> &'static str {
        "TransformComponent"
    }

    fn save(&self) -> Result<ron::Value, SceneError> {
        serialization::to_value(&TransformRecord {
            position: self.transform.position().into(),
            rotation: self.transform.rotation().into(),
            scale: self.transform.scale().into(),
        })
    }

    fn load(&mut self, data: &ron::Value) -> Result<(), SceneError> {
        let record: TransformRecord = serialization::from_value(data)?;
        self.transform.set_position(Vec3::from(record.position));
        self.transform.set_rotation(Vec3::from(record.rotation));
        self.transform.set_scale(Vec3::from(record.scale));
        self.world_dirty = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_setters_mark_local_dirty() {
        let mut transform = Transform::new();
        assert!(!transform.is_dirty());
        transform.set_position(Vec3::new(1.0, 0.0, 0.0));
        assert!(transform.is_dirty());
        transform.local_matrix();
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_local_matrix_matches_components() {
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        transform.set_rotation(Vec3::new(0.0, 90.0, 0.0));
        transform.set_scale(Vec3::new(2.0, 2.0, 2.0));

        let expected = compose_trs(
            &Vec3::new(1.0, 2.0, 3.0),
            &quat_from_euler_deg(&Vec3::new(0.0, 90.0, 0.0)),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        assert_relative_eq!(transform.local_matrix(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_quaternion_rotation_round_trip() {
        let mut transform = Transform::new();
        let quat = quat_from_euler_deg(&Vec3::new(12.5, -40.0, 77.0));
        transform.set_rotation_quat(&quat);

        let rotation = transform.rotation();
        assert_relative_eq!(rotation.x, 12.5, epsilon = 1e-4);
        assert_relative_eq!(rotation.y, -40.0, epsilon = 1e-4);
        assert_relative_eq!(rotation.z, 77.0, epsilon = 1e-4);
    }

    #[test]
    fn test_new_component_starts_world_dirty() {
        let component = TransformComponent::new();
        assert!(component.is_world_dirty());
    }

    #[test]
    fn test_mark_world_dirty_reports_prior_state() {
        let mut component = TransformComponent::new();
        component.set_world_matrix(Mat4::identity());
        assert!(component.mark_world_dirty());
        assert!(!component.mark_world_dirty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut original = TransformComponent::new();
        original.transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        original.transform.set_rotation(Vec3::new(10.0, 20.0, 30.0));
        original.transform.set_scale(Vec3::new(0.5, 0.5, 0.5));

        let value = original.save().unwrap();
        let mut restored = TransformComponent::new();
        restored.load(&value).unwrap();

        assert_relative_eq!(restored.transform.position(), original.transform.position());
        assert_relative_eq!(restored.transform.rotation(), original.transform.rotation());
        assert_relative_eq!(restored.transform.scale(), original.transform.scale());
    }
}
