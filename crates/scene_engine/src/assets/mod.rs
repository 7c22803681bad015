//! Asset import boundary
//!
//! Model-file parsing is an external collaborator; this module defines the
//! already-parsed data it hands over and the conversions into the engine's
//! runtime types.

pub mod import;

pub use import::{
    build_bone_hierarchy, build_bones_info, build_clip, build_skeleton, ImportedBone,
    ImportedChannel, ImportedClip, ImportedNode, VertexWeight,
};
