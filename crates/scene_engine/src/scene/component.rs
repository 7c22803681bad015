//! Polymorphic scene-object components
//!
//! Components are trait objects attached to a [`SceneObject`]; every
//! variant implements the same update/draw/removal hooks (as no-ops where
//! irrelevant) plus type-tagged save/load for scene files.
//!
//! Component updates never touch the arena directly. Transform writes are
//! queued on the [`UpdateContext`] and applied by the scene after the
//! component pass, which keeps the update phase free of aliasing between
//! an object's components and its descendants.
//!
//! [`SceneObject`]: crate::scene::SceneObject

use std::any::Any;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::RenderBackend;
use crate::scene::object::ObjectKey;
use crate::scene::serialization::{self, RotatingRecord};
use crate::scene::SceneError;

/// Behavior shared by every component variant
pub trait Component: Any {
    /// Stable type tag used by the component factory and scene files
    fn type_name(&self) -> &'static str;

    /// Per-frame update; runs before any draw in the same frame
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    /// Per-frame draw; the owning object's world matrix is already resolved
    fn draw(&mut self, _ctx: &mut DrawContext<'_>) {}

    /// Removal notification, sent before the owning object is destroyed
    fn on_removed(&mut self) {}

    /// Serialize authored state (never derived caches)
    fn save(&self) -> Result<ron::Value, SceneError>;

    /// Restore authored state from a scene-file record
    fn load(&mut self, data: &ron::Value) -> Result<(), SceneError>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Transform write queued during the update phase
#[derive(Debug, Clone, Copy)]
pub(crate) enum TransformOp {
    SetPosition(ObjectKey, Vec3),
    SetRotation(ObjectKey, Vec3),
    SetScale(ObjectKey, Vec3),
    RotateBy(ObjectKey, Vec3),
}

/// Context handed to [`Component::update`]
pub struct UpdateContext<'a> {
    delta_time: f32,
    key: ObjectKey,
    ops: &'a mut Vec<TransformOp>,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(delta_time: f32, key: ObjectKey, ops: &'a mut Vec<TransformOp>) -> Self {
        Self {
            delta_time,
            key,
            ops,
        }
    }

    /// Seconds since the previous frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Key of the object owning the component being updated
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Queue an absolute position write
    pub fn set_position(&mut self, key: ObjectKey, position: Vec3) {
        self.ops.push(TransformOp::SetPosition(key, position));
    }

    /// Queue an absolute rotation write (Euler degrees)
    pub fn set_rotation(&mut self, key: ObjectKey, rotation: Vec3) {
        self.ops.push(TransformOp::SetRotation(key, rotation));
    }

    /// Queue an absolute scale write
    pub fn set_scale(&mut self, key: ObjectKey, scale: Vec3) {
        self.ops.push(TransformOp::SetScale(key, scale));
    }

    /// Queue a relative rotation (Euler degrees added to the current value)
    pub fn rotate_by(&mut self, key: ObjectKey, delta: Vec3) {
        self.ops.push(TransformOp::RotateBy(key, delta));
    }
}

/// Context handed to [`Component::draw`]
pub struct DrawContext<'a> {
    /// Destination for draw submissions
    pub backend: &'a mut dyn RenderBackend,
    /// World matrix of the object being drawn
    pub world: Mat4,
}

/// Spins its owner about the Y axis at a fixed rate
///
/// The canonical authored-behavior component; mostly useful in demos and
/// as the third factory-registered variant exercising the extensible
/// component set.
#[derive(Debug, Clone)]
pub struct RotatingComponent {
    /// Rotation rate in degrees per second
    pub degrees_per_second: f32,
}

impl Default for RotatingComponent {
    fn default() -> Self {
        Self::new(90.0)
    }
}

impl RotatingComponent {
    /// Create a rotator with the given rate in degrees per second
    pub fn new(degrees_per_second: f32) -> Self {
        Self { degrees_per_second }
    }
}

impl Component for RotatingComponent {
    fn type_name(&self) -> &'static str {
        "RotatingComponent"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let key = ctx.key();
        let step = self.degrees_per_second * ctx.delta_time();
        ctx.rotate_by(key, Vec3::new(0.0, step, 0.0));
    }

    fn save(&self) -> Result<ron::Value, SceneError> {
        serialization::to_value(&RotatingRecord {
            degrees_per_second: self.degrees_per_second,
        })
    }

    fn load(&mut self, data: &ron::Value) -> Result<(), SceneError> {
        let record: RotatingRecord = serialization::from_value(data)?;
        self.degrees_per_second = record.degrees_per_second;
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

    #[test]
    fn test_rotating_component_queues_scaled_step() {
        let mut ops = Vec::new();
        let key = ObjectKey::default();
        let mut ctx = UpdateContext::new(0.5, key, &mut ops);
        let mut rotator = RotatingComponent::new(90.0);
        rotator.update(&mut ctx);

        assert_eq!(ops.len(), 1);
        match ops[0] {
            TransformOp::RotateBy(k, delta) => {
                assert_eq!(k, key);
                assert!((delta.y - 45.0).abs() < 1e-6);
            }
            _ => panic!("expected a RotateBy op"),
        }
    }

    #[test]
    fn test_rotating_component_round_trip() {
        let original = RotatingComponent::new(12.0);
        let value = original.save().unwrap();
        let mut restored = RotatingComponent::default();
        restored.load(&value).unwrap();
        assert!((restored.degrees_per_second - 12.0).abs() < f32::EPSILON);
    }
}
