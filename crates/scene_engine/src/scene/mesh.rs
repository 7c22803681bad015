//! Skinned mesh component
//!
//! Owns the drawable primitives, the shared skeleton, and the animation
//! clips for one mesh asset. Each frame it advances its [`Animator`],
//! evaluates the active clip into every primitive's bone table, and
//! forwards the results (plus the owning object's world matrix) to the
//! render backend.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::{AnimationClip, Animator, BonesInfo, Skeleton};
use crate::scene::component::{Component, DrawContext, UpdateContext};
use crate::scene::serialization::{self, MeshRecord};
use crate::scene::SceneError;

/// One drawable piece of a mesh with its own bone table
#[derive(Debug, Clone, Default)]
pub struct MeshPrimitive {
    /// Vertex count; the buffers themselves live behind the backend
    pub vertex_count: u32,
    /// Index count
    pub index_count: u32,
    /// Bone bookkeeping for this primitive
    pub bones: BonesInfo,
}

impl MeshPrimitive {
    /// Create a primitive with an empty bone table
    pub fn new(vertex_count: u32, index_count: u32) -> Self {
        Self {
            vertex_count,
            index_count,
            bones: BonesInfo::new(vertex_count as usize),
        }
    }
}

/// Scene component tying primitives, skeleton, and clips together
pub struct MeshComponent {
    /// Identifier of the source asset; the one piece of authored state
    /// that survives serialization
    pub asset: String,
    /// Drawable primitives
    pub primitives: Vec<MeshPrimitive>,
    skeleton: Option<Arc<Skeleton>>,
    clips: HashMap<String, AnimationClip>,
    active_clip: Option<String>,
    animator: Animator,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshComponent {
    /// Create an empty mesh component
    pub fn new() -> Self {
        Self {
            asset: String::new(),
            primitives: Vec::new(),
            skeleton: None,
            clips: HashMap::new(),
            active_clip: None,
            animator: Animator::new(),
        }
    }

    /// Attach the shared skeleton for this mesh source
    pub fn set_skeleton(&mut self, skeleton: Arc<Skeleton>) {
        self.skeleton = Some(skeleton);
    }

    /// The shared skeleton, if this mesh is skinned
    pub fn skeleton(&self) -> Option<&Arc<Skeleton>> {
        self.skeleton.as_ref()
    }

    /// Add a clip; the first one added becomes the active clip
    pub fn add_clip(&mut self, clip: AnimationClip) {
        if self.active_clip.is_none() {
            self.active_clip = Some(clip.name.clone());
        }
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Whether any animation clips are attached
    pub fn has_animations(&self) -> bool {
        !self.clips.is_empty()
    }

    /// Switch the active clip by name
    ///
    /// An unknown name keeps the current clip; callers that care can check
    /// [`MeshComponent::active_clip`] afterwards.
    pub fn set_active_clip(&mut self, name: &str) {
        if self.clips.contains_key(name) {
            self.active_clip = Some(name.to_string());
            self.animator.reset();
        } else {
            log::warn!("mesh '{}' has no animation clip '{name}'", self.asset);
        }
    }

    /// Name of the active clip, if any
    pub fn active_clip(&self) -> Option<&str> {
        self.active_clip.as_deref()
    }

    /// The embedded animation clock
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Mutable access to the animation clock (playback speed, reset)
    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }
}

impl Component for MeshComponent {
    fn type_name(&self) -> &'static str {
        "MeshComponent"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        self.animator.advance(ctx.delta_time());
        let (Some(skeleton), Some(name)) = (&self.skeleton, &self.active_clip) else {
            return;
        };
        let Some(clip) = self.clips.get(name) else {
            return;
        };
        for primitive in &mut self.primitives {
            self.animator.update(skeleton, clip, &mut primitive.bones);
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        for primitive in &self.primitives {
            ctx.backend
                .submit_skinned(ctx.world, primitive.bones.final_transforms());
        }
    }

    fn on_removed(&mut self) {
        log::debug!("mesh component for asset '{}' removed", self.asset);
    }

    fn save(&self) -> Result<ron::Value, SceneError> {
        serialization::to_value(&MeshRecord {
            asset: self.asset.clone(),
            active_clip: self.active_clip.clone(),
            playback_speed: self.animator.playback_speed(),
        })
    }

    fn load(&mut self, data: &ron::Value) -> Result<(), SceneError> {
        let record: MeshRecord = serialization::from_value(data)?;
        self.asset = record.asset;
        self.active_clip = record.active_clip;
        self.animator.set_playback_speed(record.playback_speed);
        // Geometry, skeleton, and clips are derived state; the asset
        // pipeline re-resolves them from `asset` after loading.
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
    use crate::animation::clip::{AnimationChannel, VectorKey};
    use crate::animation::BoneNode;
    use crate::foundation::math::{Mat4, Vec3};
    use crate::render::RecordingBackend;
    use crate::scene::object::Scene;
    use crate::scene::transform::TransformComponent;
    use approx::assert_relative_eq;

    fn skinned_mesh() -> MeshComponent {
        let mut root = BoneNode::new("Root", Mat4::identity());
        root.children.push(BoneNode::new("Child", Mat4::identity()));
        let skeleton = Arc::new(Skeleton::new(root));

        let mut primitive = MeshPrimitive::new(4, 6);
        primitive.bones.bone_index("Root", Mat4::identity());
        primitive.bones.bone_index("Child", Mat4::identity());

        let mut channel = AnimationChannel::new("Child");
        channel.position_keys = vec![
            VectorKey { time: 0.0, value: Vec3::zeros() },
            VectorKey { time: 10.0, value: Vec3::new(1.0, 0.0, 0.0) },
        ];

        let mut mesh = MeshComponent::new();
        mesh.asset = "rig.glb".to_string();
        mesh.set_skeleton(skeleton);
        mesh.primitives.push(primitive);
        mesh.add_clip(AnimationClip::new("slide", 10.0, 1.0, vec![channel]));
        mesh
    }

    #[test]
    fn test_first_clip_becomes_active() {
        let mesh = skinned_mesh();
        assert_eq!(mesh.active_clip(), Some("slide"));
        assert!(mesh.has_animations());
    }

    #[test]
    fn test_unknown_clip_keeps_current() {
        let mut mesh = skinned_mesh();
        mesh.set_active_clip("sprint");
        assert_eq!(mesh.active_clip(), Some("slide"));
    }

    #[test]
    fn test_update_then_draw_submits_palette() {
        let mut scene = Scene::new();
        let key = scene.create_object("rig", None);
        scene.add_component(key, Box::new(TransformComponent::new()));
        scene.add_component(key, Box::new(skinned_mesh()));
        scene.set_position(key, Vec3::new(0.0, 2.0, 0.0));

        // 5 seconds at 1 tick/sec lands halfway through the clip.
        scene.update(5.0);
        let mut backend = RecordingBackend::new();
        scene.draw(&mut backend);

        assert_eq!(backend.draws.len(), 1);
        let draw = &backend.draws[0];
        assert_relative_eq!(draw.world[(1, 3)], 2.0, epsilon = 1e-6);
        assert_eq!(draw.palette.len(), 2);
        assert_relative_eq!(draw.palette[1][(0, 3)], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_non_skinned_primitive_submits_empty_palette() {
        let mut scene = Scene::new();
        let key = scene.create_object("prop", None);
        let mut mesh = MeshComponent::new();
        mesh.primitives.push(MeshPrimitive::new(3, 3));
        scene.add_component(key, Box::new(mesh));

        scene.update(0.016);
        let mut backend = RecordingBackend::new();
        scene.draw(&mut backend);

        assert_eq!(backend.draws.len(), 1);
        assert!(backend.draws[0].palette.is_empty());
    }

    #[test]
    fn test_save_load_keeps_asset_and_clip() {
        let mut mesh = skinned_mesh();
        mesh.animator_mut().set_playback_speed(2.0);
        let value = mesh.save().unwrap();

        let mut restored = MeshComponent::new();
        restored.load(&value).unwrap();
        assert_eq!(restored.asset, "rig.glb");
        assert_eq!(restored.active_clip(), Some("slide"));
        assert_relative_eq!(restored.animator().playback_speed(), 2.0);
    }
}
