//! Skeletal animation
//!
//! Turns imported bone hierarchies and keyframe tracks into the per-frame
//! skinning-matrix palette the rendering backend consumes:
//!
//! - [`Skeleton`]/[`BoneNode`]: the immutable bone topology with bind-pose
//!   local transforms
//! - [`AnimationClip`]/[`AnimationChannel`]: per-bone keyframe tracks
//! - [`BonesInfo`]: the bridge between a skeleton and one drawable
//!   primitive (offsets, vertex weights, final transforms)
//! - [`Animator`]: the per-frame evaluation walking the hierarchy

pub mod animator;
pub mod bones;
pub mod clip;
pub mod skeleton;

pub use animator::{evaluate_bone_hierarchy, Animator, DEFAULT_TICKS_PER_SECOND};
pub use bones::{Bone, BonesInfo, VertexBoneData, MAX_BONE_INFLUENCES};
pub use clip::{AnimationChannel, AnimationClip, QuatKey, VectorKey};
pub use skeleton::{BoneNode, Skeleton};
