//! Scene objects and the scene arena
//!
//! [`Scene`] owns every [`SceneObject`] in a slotmap; hierarchy is stored
//! as parent keys plus ordered child-key lists. Stable keys survive
//! reparenting, and the non-owning parent link can never dangle or cycle
//! the ownership graph.
//!
//! World matrices follow the dirty-flag propagation pattern: local-
//! transform writes mark the whole subtree world-dirty (stopping early in
//! already-dirty regions), and reads recompute lazily along the parent
//! chain, so writes are O(subtree) at worst and reads amortize to
//! O(depth).

use crate::foundation::collections::{new_key_type, SlotMap};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::RenderBackend;
use crate::scene::component::{Component, DrawContext, TransformOp, UpdateContext};
use crate::scene::transform::TransformComponent;

new_key_type! {
    /// Stable handle to a scene object
    pub struct ObjectKey;
}

/// A named node of the scene graph
pub struct SceneObject {
    /// Display name; not required to be unique
    pub name: String,
    pub(crate) parent: Option<ObjectKey>,
    pub(crate) children: Vec<ObjectKey>,
    pub(crate) components: Vec<Box<dyn Component>>,
}

impl SceneObject {
    fn new(name: impl Into<String>, parent: Option<ObjectKey>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Key of the parent object, if any
    pub fn parent(&self) -> Option<ObjectKey> {
        self.parent
    }

    /// Child keys in attach order
    pub fn children(&self) -> &[ObjectKey] {
        &self.children
    }

    /// Attach a component; order is preserved for update/draw
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// First component of concrete type `T`
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the first component of concrete type `T`
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// The scene graph: an arena of objects plus the root list
#[derive(Default)]
pub struct Scene {
    objects: SlotMap<ObjectKey, SceneObject>,
    roots: Vec<ObjectKey>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object, optionally under a parent
    pub fn create_object(&mut self, name: &str, parent: Option<ObjectKey>) -> ObjectKey {
        let key = self.objects.insert(SceneObject::new(name, parent));
        match parent.and_then(|p| self.objects.get_mut(p)) {
            Some(parent_obj) => parent_obj.children.push(key),
            None => {
                if let Some(obj) = self.objects.get_mut(key) {
                    obj.parent = None;
                }
                self.roots.push(key);
            }
        }
        key
    }

    /// Move `key` under `new_parent` (or to the root list)
    ///
    /// Cycle freedom is the caller's contract (a node is never attached
    /// under its own descendant); debug builds assert it.
    pub fn attach(&mut self, key: ObjectKey, new_parent: Option<ObjectKey>) {
        debug_assert!(
            new_parent.map_or(true, |p| !self.is_ancestor(key, p)),
            "attach would create a cycle"
        );
        self.detach_from_container(key);
        if let Some(obj) = self.objects.get_mut(key) {
            obj.parent = new_parent;
        }
        match new_parent.and_then(|p| self.objects.get_mut(p)) {
            Some(parent_obj) => parent_obj.children.push(key),
            None => self.roots.push(key),
        }
        // The subtree's world matrices depend on the new parent chain.
        self.mark_world_dirty(key);
    }

    /// Whether `ancestor` appears on `key`'s parent chain
    pub fn is_ancestor(&self, ancestor: ObjectKey, key: ObjectKey) -> bool {
        let mut current = self.objects.get(key).and_then(|o| o.parent);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.objects.get(k).and_then(|o| o.parent);
        }
        false
    }

    /// Remove an object and its whole subtree
    ///
    /// Every component in the subtree receives its removal notification
    /// before destruction.
    pub fn remove_object(&mut self, key: ObjectKey) {
        self.detach_from_container(key);
        let mut pending = vec![key];
        while let Some(k) = pending.pop() {
            if let Some(mut obj) = self.objects.remove(k) {
                pending.extend(obj.children.iter().copied());
                for component in &mut obj.components {
                    component.on_removed();
                }
                log::debug!("removed scene object '{}'", obj.name);
            }
        }
    }

    /// Borrow an object
    pub fn object(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Mutably borrow an object
    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    /// Attach a component to an object
    pub fn add_component(&mut self, key: ObjectKey, component: Box<dyn Component>) {
        if let Some(obj) = self.objects.get_mut(key) {
            obj.add_component(component);
        } else {
            log::warn!("add_component on a removed object");
        }
    }

    /// Root objects in creation order
    pub fn roots(&self) -> &[ObjectKey] {
        &self.roots
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Set an object's local position and invalidate its subtree
    pub fn set_position(&mut self, key: ObjectKey, position: Vec3) {
        if let Some(tc) = self.transform_component_mut(key) {
            tc.transform.set_position(position);
            self.mark_world_dirty(key);
        } else {
            log::debug!("set_position on an object without a TransformComponent");
        }
    }

    /// Set an object's local rotation (Euler degrees) and invalidate its
    /// subtree
    pub fn set_rotation(&mut self, key: ObjectKey, rotation: Vec3) {
        if let Some(tc) = self.transform_component_mut(key) {
            tc.transform.set_rotation(rotation);
            self.mark_world_dirty(key);
        } else {
            log::debug!("set_rotation on an object without a TransformComponent");
        }
    }

    /// Set an object's local scale and invalidate its subtree
    pub fn set_scale(&mut self, key: ObjectKey, scale: Vec3) {
        if let Some(tc) = self.transform_component_mut(key) {
            tc.transform.set_scale(scale);
            self.mark_world_dirty(key);
        } else {
            log::debug!("set_scale on an object without a TransformComponent");
        }
    }

    /// Mark an object's subtree world-dirty; returns the number of objects
    /// visited
    ///
    /// Invalidation is idempotent: a node whose transform is already
    /// world-dirty stops the recursion, because its descendants were
    /// marked when it was.
    pub fn mark_world_dirty(&mut self, key: ObjectKey) -> usize {
        let Some(obj) = self.objects.get_mut(key) else {
            return 0;
        };
        if let Some(tc) = obj.component_mut::<TransformComponent>() {
            if !tc.mark_world_dirty() {
                return 0;
            }
        }
        let children: Vec<ObjectKey> = self
            .objects
            .get(key)
            .map(|o| o.children.clone())
            .unwrap_or_default();
        let mut visited = 1;
        for child in children {
            visited += self.mark_world_dirty(child);
        }
        visited
    }

    /// The object's world matrix, recomputed lazily
    ///
    /// Objects without a `TransformComponent` (and removed keys) contribute
    /// identity, so an untransformed node renders at its parent's origin
    /// rather than being an error.
    pub fn world_matrix(&mut self, key: ObjectKey) -> Mat4 {
        let parent = match self.objects.get(key) {
            Some(obj) => match obj.component::<TransformComponent>() {
                Some(tc) if !tc.is_world_dirty() => return tc.cached_world_matrix(),
                Some(_) => obj.parent,
                None => return Mat4::identity(),
            },
            None => return Mat4::identity(),
        };
        let parent_world = parent.map_or_else(Mat4::identity, |p| self.world_matrix(p));
        let Some(tc) = self
            .objects
            .get_mut(key)
            .and_then(SceneObject::component_mut::<TransformComponent>)
        else {
            return Mat4::identity();
        };
        let world = parent_world * tc.transform.local_matrix();
        tc.set_world_matrix(world);
        world
    }

    /// Run the update phase: every component's update in hierarchy order,
    /// then the queued transform writes with their subtree invalidation
    pub fn update(&mut self, delta_time: f32) {
        let mut ops: Vec<TransformOp> = Vec::new();
        for key in self.traversal_order() {
            let Some(obj) = self.objects.get_mut(key) else {
                continue;
            };
            let mut components = std::mem::take(&mut obj.components);
            for component in &mut components {
                let mut ctx = UpdateContext::new(delta_time, key, &mut ops);
                component.update(&mut ctx);
            }
            if let Some(obj) = self.objects.get_mut(key) {
                obj.components = components;
            }
        }
        for op in ops {
            self.apply_transform_op(op);
        }
    }

    /// Run the draw phase: resolve each object's world matrix and let its
    /// components submit to the backend
    ///
    /// Must run after [`Scene::update`] in the same frame; draws read the
    /// skinning palettes and world matrices that update wrote.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) {
        for key in self.traversal_order() {
            let world = self.world_matrix(key);
            let Some(obj) = self.objects.get_mut(key) else {
                continue;
            };
            let mut components = std::mem::take(&mut obj.components);
            {
                let mut ctx = DrawContext { backend, world };
                for component in &mut components {
                    component.draw(&mut ctx);
                }
            }
            if let Some(obj) = self.objects.get_mut(key) {
                obj.components = components;
            }
        }
    }

    /// Depth-first order with parents before children
    fn traversal_order(&self) -> Vec<ObjectKey> {
        let mut order = Vec::with_capacity(self.objects.len());
        let mut stack: Vec<ObjectKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            if let Some(obj) = self.objects.get(key) {
                order.push(key);
                stack.extend(obj.children.iter().rev().copied());
            }
        }
        order
    }

    fn apply_transform_op(&mut self, op: TransformOp) {
        match op {
            TransformOp::SetPosition(key, position) => self.set_position(key, position),
            TransformOp::SetRotation(key, rotation) => self.set_rotation(key, rotation),
            TransformOp::SetScale(key, scale) => self.set_scale(key, scale),
            TransformOp::RotateBy(key, delta) => {
                if let Some(tc) = self.transform_component_mut(key) {
                    let rotation = tc.transform.rotation() + delta;
                    tc.transform.set_rotation(rotation);
                    self.mark_world_dirty(key);
                }
            }
        }
    }

    fn detach_from_container(&mut self, key: ObjectKey) {
        let parent = self.objects.get(key).and_then(|o| o.parent);
        match parent.and_then(|p| self.objects.get_mut(p)) {
            Some(parent_obj) => parent_obj.children.retain(|&c| c != key),
            None => self.roots.retain(|&r| r != key),
        }
    }

    fn transform_component_mut(&mut self, key: ObjectKey) -> Option<&mut TransformComponent> {
        self.objects
            .get_mut(key)
            .and_then(SceneObject::component_mut::<TransformComponent>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;
    use crate::scene::component::RotatingComponent;
    use approx::assert_relative_eq;

    fn chain(scene: &mut Scene, depth: usize) -> Vec<ObjectKey> {
        let mut keys = Vec::new();
        let mut parent = None;
        for i in 0..depth {
            let key = scene.create_object(&format!("node{i}"), parent);
            scene.add_component(key, Box::new(TransformComponent::new()));
            keys.push(key);
            parent = Some(key);
        }
        keys
    }

    #[test]
    fn test_dirty_marking_is_idempotent() {
        let mut scene = Scene::new();
        let keys = chain(&mut scene, 4);

        // Resolve every world matrix so the flags start clean.
        for &key in &keys {
            scene.world_matrix(key);
        }

        // The first marking visits the whole subtree.
        assert_eq!(scene.mark_world_dirty(keys[0]), 4);
        // Marking again must not re-walk descendants.
        assert_eq!(scene.mark_world_dirty(keys[0]), 0);
        assert_eq!(scene.mark_world_dirty(keys[2]), 0);
    }

    #[test]
    fn test_world_matrix_matches_recomputation_from_scratch() {
        let mut scene = Scene::new();
        let keys = chain(&mut scene, 3);
        scene.set_position(keys[0], Vec3::new(1.0, 0.0, 0.0));
        scene.set_rotation(keys[1], Vec3::new(0.0, 90.0, 0.0));
        scene.set_scale(keys[2], Vec3::new(2.0, 2.0, 2.0));

        for (i, &key) in keys.iter().enumerate() {
            let mut expected = Mat4::identity();
            for &ancestor in &keys[..=i] {
                let local = scene
                    .object_mut(ancestor)
                    .unwrap()
                    .component_mut::<TransformComponent>()
                    .unwrap()
                    .transform
                    .local_matrix();
                expected *= local;
            }
            assert_relative_eq!(scene.world_matrix(key), expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_world_matrix_cache_invalidated_by_ancestor_write() {
        let mut scene = Scene::new();
        let keys = chain(&mut scene, 3);

        // Populate the caches.
        let before = scene.world_matrix(keys[2]);
        assert_relative_eq!(before, Mat4::identity(), epsilon = 1e-6);

        scene.set_position(keys[0], Vec3::new(0.0, 3.0, 0.0));
        let after = scene.world_matrix(keys[2]);
        assert_relative_eq!(after[(1, 3)], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transform_attached_after_parent_moved() {
        let mut scene = Scene::new();
        let root = scene.create_object("root", None);
        scene.add_component(root, Box::new(TransformComponent::new()));
        scene.set_position(root, Vec3::new(5.0, 0.0, 0.0));
        scene.world_matrix(root);

        // The child gains its transform only after the parent has already
        // moved and been resolved; its cache must not be trusted as-is.
        let child = scene.create_object("child", Some(root));
        scene.add_component(child, Box::new(TransformComponent::new()));

        let world = scene.world_matrix(child);
        assert_relative_eq!(world[(0, 3)], 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_object_without_transform_contributes_identity() {
        let mut scene = Scene::new();
        let root = scene.create_object("root", None);
        scene.add_component(root, Box::new(TransformComponent::new()));
        scene.set_position(root, Vec3::new(5.0, 0.0, 0.0));

        // Middle node carries no TransformComponent.
        let middle = scene.create_object("middle", Some(root));
        let leaf = scene.create_object("leaf", Some(middle));
        scene.add_component(leaf, Box::new(TransformComponent::new()));
        scene.set_position(leaf, Vec3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(scene.world_matrix(middle), Mat4::identity());
        // The leaf's parent has no transform, so the leaf sees identity.
        let leaf_world = scene.world_matrix(leaf);
        assert_relative_eq!(leaf_world[(0, 3)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotating_component_drives_transform() {
        let mut scene = Scene::new();
        let key = scene.create_object("spinner", None);
        scene.add_component(key, Box::new(TransformComponent::new()));
        scene.add_component(key, Box::new(RotatingComponent::new(90.0)));

        scene.update(1.0);
        let rotation = scene
            .object(key)
            .unwrap()
            .component::<TransformComponent>()
            .unwrap()
            .transform
            .rotation();
        assert_relative_eq!(rotation.y, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reparenting_updates_world_matrix() {
        let mut scene = Scene::new();
        let a = scene.create_object("a", None);
        let b = scene.create_object("b", None);
        let child = scene.create_object("child", Some(a));
        for key in [a, b, child] {
            scene.add_component(key, Box::new(TransformComponent::new()));
        }
        scene.set_position(a, Vec3::new(1.0, 0.0, 0.0));
        scene.set_position(b, Vec3::new(-1.0, 0.0, 0.0));

        assert_relative_eq!(scene.world_matrix(child)[(0, 3)], 1.0, epsilon = 1e-6);
        scene.attach(child, Some(b));
        assert_relative_eq!(scene.world_matrix(child)[(0, 3)], -1.0, epsilon = 1e-6);
        assert_eq!(scene.object(child).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_remove_object_notifies_components() {
        use std::any::Any;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Witness(Arc<AtomicUsize>);
        impl Component for Witness {
            fn type_name(&self) -> &'static str {
                "Witness"
            }
            fn on_removed(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn save(&self) -> Result<ron::Value, crate::scene::SceneError> {
                Ok(ron::Value::Unit)
            }
            fn load(&mut self, _: &ron::Value) -> Result<(), crate::scene::SceneError> {
                Ok(())
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let removals = Arc::new(AtomicUsize::new(0));
        let mut scene = Scene::new();
        let root = scene.create_object("root", None);
        let child = scene.create_object("child", Some(root));
        scene.add_component(root, Box::new(Witness(removals.clone())));
        scene.add_component(child, Box::new(Witness(removals.clone())));

        scene.remove_object(root);
        assert_eq!(removals.load(Ordering::SeqCst), 2);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_draw_traverses_parents_first() {
        use crate::scene::mesh::{MeshComponent, MeshPrimitive};

        let mut scene = Scene::new();
        let root = scene.create_object("root", None);
        let child = scene.create_object("child", Some(root));
        for key in [root, child] {
            scene.add_component(key, Box::new(TransformComponent::new()));
            let mut mesh = MeshComponent::new();
            mesh.primitives.push(MeshPrimitive::new(3, 3));
            scene.add_component(key, Box::new(mesh));
        }
        scene.set_position(root, Vec3::new(1.0, 0.0, 0.0));
        scene.set_position(child, Vec3::new(1.0, 0.0, 0.0));

        let mut backend = RecordingBackend::new();
        scene.draw(&mut backend);

        // The root (world x=1) submits before the child (world x=2).
        assert_eq!(backend.draws.len(), 2);
        assert_relative_eq!(backend.draws[0].world[(0, 3)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(backend.draws[1].world[(0, 3)], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_draw_skips_transform_less_objects_without_panicking() {
        let mut scene = Scene::new();
        let root = scene.create_object("root", None);
        let _child = scene.create_object("child", Some(root));
        let mut backend = RecordingBackend::new();
        scene.draw(&mut backend);
        assert!(backend.draws.is_empty());
    }
}
