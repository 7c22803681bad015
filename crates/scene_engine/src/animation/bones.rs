//! Per-primitive bone tables
//!
//! [`BonesInfo`] is the bridge between a shared [`Skeleton`] and one
//! drawable primitive: the bind-pose offset matrices, the name-to-index
//! map, the per-vertex influence table, and the final skinning palette the
//! backend consumes each frame.
//!
//! [`Skeleton`]: crate::animation::Skeleton

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Mat4;

/// Fixed number of bone influences per vertex, matching the GPU vertex layout
pub const MAX_BONE_INFLUENCES: usize = 4;

/// One bone influencing at least one vertex
#[derive(Debug, Clone)]
pub struct Bone {
    /// Bind-pose inverse offset matrix (mesh space to bone space at bind time)
    pub offset: Mat4,
    /// Final skinning transform, overwritten every evaluation
    pub final_transform: Mat4,
}

/// Per-vertex bone influence slots
///
/// Unused slots keep weight 0. The layout is `repr(C)` and `Pod` so the
/// whole table can be cast to bytes for vertex-buffer upload.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct VertexBoneData {
    /// Bone indices, parallel to `weights`
    pub indices: [u32; MAX_BONE_INFLUENCES],
    /// Influence weights; a zero weight marks an unused slot
    pub weights: [f32; MAX_BONE_INFLUENCES],
}

impl Default for VertexBoneData {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Bone bookkeeping for one mesh primitive
#[derive(Debug, Clone, Default)]
pub struct BonesInfo {
    vertex_bones: Vec<VertexBoneData>,
    bone_index: HashMap<String, usize>,
    bones: Vec<Bone>,
    final_transforms: Vec<Mat4>,
    dropped_weights: u32,
}

impl BonesInfo {
    /// Create a table for a primitive with `vertex_count` vertices
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_bones: vec![VertexBoneData::default(); vertex_count],
            ..Self::default()
        }
    }

    /// Get the index for `name`, registering the bone on first sight
    ///
    /// Numbering is first-seen-wins: a repeated name returns its existing
    /// index and the original offset matrix is kept.
    pub fn bone_index(&mut self, name: &str, offset: Mat4) -> usize {
        if let Some(&index) = self.bone_index.get(name) {
            return index;
        }
        let index = self.bones.len();
        self.bone_index.insert(name.to_string(), index);
        self.bones.push(Bone {
            offset,
            final_transform: Mat4::identity(),
        });
        index
    }

    /// Look up a registered bone's index without registering it
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bone_index.get(name).copied()
    }

    /// Record one (vertex, bone, weight) influence
    ///
    /// Fills the vertex's first unused slot. Influences past
    /// [`MAX_BONE_INFLUENCES`] are dropped; the drop is counted and warned
    /// about because it silently changes skinning results otherwise.
    pub fn add_vertex_weight(&mut self, vertex: usize, bone: usize, weight: f32) {
        let Some(slots) = self.vertex_bones.get_mut(vertex) else {
            log::warn!("bone weight for out-of-range vertex {vertex}");
            return;
        };
        for i in 0..MAX_BONE_INFLUENCES {
            if slots.weights[i] == 0.0 {
                slots.indices[i] = bone as u32;
                slots.weights[i] = weight;
                return;
            }
        }
        self.dropped_weights += 1;
        log::warn!(
            "vertex {vertex} influenced by more than {MAX_BONE_INFLUENCES} bones; dropping weight {weight} for bone {bone}"
        );
    }

    /// Number of registered bones
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Registered bones in index order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Mutable bone access for the animator's final-transform writes
    pub(crate) fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    /// Per-vertex influence table, ready for vertex-buffer upload
    pub fn vertex_bones(&self) -> &[VertexBoneData] {
        &self.vertex_bones
    }

    /// The skinning palette in bone-index order
    ///
    /// Empty for a primitive with no registered bones, which the backend
    /// reads as "non-skinned, use a single identity matrix".
    pub fn final_transforms(&self) -> &[Mat4] {
        &self.final_transforms
    }

    /// Number of influences dropped by the 4-slot-per-vertex limit
    pub fn dropped_weights(&self) -> u32 {
        self.dropped_weights
    }

    /// Ensure the palette is sized to the bone count
    pub fn resize_palette(&mut self) {
        self.final_transforms.resize(self.bones.len(), Mat4::identity());
    }

    /// Copy each bone's final transform into the palette, in index order
    pub fn write_palette(&mut self) {
        for (slot, bone) in self.final_transforms.iter_mut().zip(self.bones.iter()) {
            *slot = bone.final_transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_bone_index_is_first_seen_wins() {
        let mut bones = BonesInfo::new(0);
        let offset = Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bones.bone_index("hip", offset), 0);
        assert_eq!(bones.bone_index("knee", Mat4::identity()), 1);
        // Re-registering keeps the index and the original offset.
        assert_eq!(bones.bone_index("hip", Mat4::identity()), 0);
        assert_relative_eq!(bones.bones()[0].offset, offset);
    }

    #[test]
    fn test_vertex_weights_fill_free_slots() {
        let mut bones = BonesInfo::new(1);
        for bone in 0..3 {
            bones.add_vertex_weight(0, bone, 0.25);
        }
        let slots = &bones.vertex_bones()[0];
        assert_eq!(slots.indices[..3], [0, 1, 2]);
        assert_relative_eq!(slots.weights[2], 0.25);
        assert_relative_eq!(slots.weights[3], 0.0);
        assert_eq!(bones.dropped_weights(), 0);
    }

    #[test]
    fn test_fifth_influence_is_dropped_and_counted() {
        let mut bones = BonesInfo::new(1);
        for bone in 0..5 {
            bones.add_vertex_weight(0, bone, 0.2);
        }
        let slots = &bones.vertex_bones()[0];
        assert_eq!(slots.indices, [0, 1, 2, 3]);
        assert_eq!(bones.dropped_weights(), 1);
    }

    #[test]
    fn test_palette_matches_bone_count() {
        let mut bones = BonesInfo::new(0);
        bones.bone_index("a", Mat4::identity());
        bones.bone_index("b", Mat4::identity());
        bones.resize_palette();
        assert_eq!(bones.final_transforms().len(), bones.bone_count());
    }

    #[test]
    fn test_empty_table_has_empty_palette() {
        let mut bones = BonesInfo::new(8);
        bones.resize_palette();
        assert!(bones.final_transforms().is_empty());
    }
}
