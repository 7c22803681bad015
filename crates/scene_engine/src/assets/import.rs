//! Imported mesh and animation data
//!
//! Plain data mirroring what the importer produced: a node tree with
//! bind-pose transforms, a flat bone table with per-vertex weights, and
//! keyed animation clips. The build functions turn these into runtime
//! types. Malformed entries are logged and skipped, never raised: a mesh
//! with a broken bone still loads and renders, just less animated.

use crate::animation::clip::{AnimationChannel, AnimationClip, QuatKey, VectorKey};
use crate::animation::{BoneNode, BonesInfo, Skeleton};
use crate::foundation::math::{Mat4, Quat, Vec3};

/// One node of the importer's hierarchy
#[derive(Debug, Clone)]
pub struct ImportedNode {
    /// Node name
    pub name: String,
    /// Local bind-pose transform relative to the parent
    pub transform: Mat4,
    /// Children in file order
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    /// Create a leaf node
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }
}

/// One (vertex, weight) influence entry
#[derive(Debug, Clone, Copy)]
pub struct VertexWeight {
    /// Index of the influenced vertex
    pub vertex: usize,
    /// Influence weight
    pub weight: f32,
}

/// One bone of the importer's flat bone table
#[derive(Debug, Clone)]
pub struct ImportedBone {
    /// Bone name, matching a node in the hierarchy
    pub name: String,
    /// Bind-pose inverse offset matrix
    pub offset: Mat4,
    /// Influenced vertices
    pub weights: Vec<VertexWeight>,
}

/// One keyed channel of an imported clip
#[derive(Debug, Clone, Default)]
pub struct ImportedChannel {
    /// Target bone name
    pub target: String,
    /// (time, position) keys in tick order
    pub position_keys: Vec<(f32, Vec3)>,
    /// (time, rotation) keys in tick order
    pub rotation_keys: Vec<(f32, Quat)>,
    /// (time, scale) keys in tick order
    pub scaling_keys: Vec<(f32, Vec3)>,
}

/// One imported animation clip
#[derive(Debug, Clone)]
pub struct ImportedClip {
    /// Clip name
    pub name: String,
    /// Duration in ticks
    pub duration: f32,
    /// Tick rate; 0 when the file left it unset
    pub ticks_per_second: f32,
    /// Per-bone channels
    pub channels: Vec<ImportedChannel>,
}

/// Recursively mirror the importer's node tree into an owned bone tree
///
/// Pure and deterministic; children keep their import order. Called once
/// per mesh source at load time.
pub fn build_bone_hierarchy(node: &ImportedNode) -> BoneNode {
    let mut bone = BoneNode::new(node.name.clone(), node.transform);
    bone.children = node.children.iter().map(build_bone_hierarchy).collect();
    bone
}

/// Build a shareable skeleton from the importer's root node
pub fn build_skeleton(root: &ImportedNode) -> Skeleton {
    Skeleton::new(build_bone_hierarchy(root))
}

/// Build one primitive's bone table from the importer's bone list
///
/// Bones are numbered first-seen-wins in list order; weights land in each
/// vertex's first free influence slot.
pub fn build_bones_info(vertex_count: usize, bones: &[ImportedBone]) -> BonesInfo {
    let mut info = BonesInfo::new(vertex_count);
    for imported in bones {
        let index = info.bone_index(&imported.name, imported.offset);
        for weight in &imported.weights {
            info.add_vertex_weight(weight.vertex, index, weight.weight);
        }
    }
    if info.dropped_weights() > 0 {
        log::warn!(
            "{} vertex weight(s) dropped while binding {} bones",
            info.dropped_weights(),
            info.bone_count()
        );
    }
    info
}

/// Build a runtime clip from an imported clip record
pub fn build_clip(imported: &ImportedClip) -> AnimationClip {
    let channels = imported
        .channels
        .iter()
        .map(|channel| {
            let mut runtime = AnimationChannel::new(channel.target.clone());
            runtime.position_keys = channel
                .position_keys
                .iter()
                .map(|&(time, value)| VectorKey { time, value })
                .collect();
            runtime.rotation_keys = channel
                .rotation_keys
                .iter()
                .map(|&(time, value)| QuatKey { time, value })
                .collect();
            runtime.scaling_keys = channel
                .scaling_keys
                .iter()
                .map(|&(time, value)| VectorKey { time, value })
                .collect();
            runtime
        })
        .collect();
    AnimationClip::new(
        imported.name.clone(),
        imported.duration,
        imported.ticks_per_second,
        channels,
    )
}
