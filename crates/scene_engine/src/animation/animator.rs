//! Per-frame bone transform evaluation
//!
//! The [`Animator`] owns nothing but a running clock; evaluation is a pure
//! function of clock, clip, and hierarchy. Each frame the owning mesh
//! component advances the clock by the frame's delta time and evaluates the
//! active clip into every primitive's [`BonesInfo`].

use crate::animation::bones::BonesInfo;
use crate::animation::clip::AnimationClip;
use crate::animation::skeleton::{BoneNode, Skeleton};
use crate::foundation::math::Mat4;

/// Fallback conversion rate for clips whose importer left it at zero
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Animation clock plus playback settings
#[derive(Debug, Clone)]
pub struct Animator {
    time: f32,
    playback_speed: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    /// Create an animator at time zero with normal playback speed
    pub fn new() -> Self {
        Self {
            time: 0.0,
            playback_speed: 1.0,
        }
    }

    /// Advance the clock by the frame's delta time in seconds
    pub fn advance(&mut self, delta_time: f32) {
        self.time += delta_time * self.playback_speed;
    }

    /// Rewind the clock to zero
    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /// Current clock value in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Playback speed multiplier (1.0 = authored speed)
    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    /// Set the playback speed multiplier
    pub fn set_playback_speed(&mut self, speed: f32) {
        self.playback_speed = speed;
    }

    /// Current clock position converted to clip ticks, wrapped for looping
    ///
    /// Time wraps at the clip duration rather than clamping, so playback
    /// loops forever.
    pub fn time_in_ticks(&self, clip: &AnimationClip) -> f32 {
        let ticks_per_second = if clip.ticks_per_second > 0.0 {
            clip.ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        };
        if clip.duration > 0.0 {
            (self.time * ticks_per_second) % clip.duration
        } else {
            0.0
        }
    }

    /// Evaluate `clip` at the current clock into one primitive's bone table
    ///
    /// Sizes the palette to the bone count, walks the skeleton from the
    /// root, and copies the resulting final transforms out in bone-index
    /// order. Bones without a channel stay rigid relative to their parent.
    pub fn update(&self, skeleton: &Skeleton, clip: &AnimationClip, bones: &mut BonesInfo) {
        bones.resize_palette();

        let time_in_ticks = self.time_in_ticks(clip);
        let root_inverse = skeleton.root.local_transform.try_inverse().unwrap_or_else(|| {
            log::debug!("skeleton root bind transform is singular; using identity");
            Mat4::identity()
        });

        evaluate_bone_hierarchy(
            &skeleton.root,
            &Mat4::identity(),
            clip,
            time_in_ticks,
            &root_inverse,
            bones,
        );
        bones.write_palette();
    }
}

/// Recursively evaluate one bone subtree
///
/// At each node the local transform is the channel sample when the clip
/// animates this node, or the static bind-pose transform when it does not.
/// The node's global transform is `parent_global * local`; nodes registered
/// in `bones` get their final skinning transform written as
/// `root_inverse * global * offset`.
pub fn evaluate_bone_hierarchy(
    node: &BoneNode,
    parent_global: &Mat4,
    clip: &AnimationClip,
    time_in_ticks: f32,
    root_inverse: &Mat4,
    bones: &mut BonesInfo,
) {
    let local = clip
        .channel(&node.name)
        .map_or(node.local_transform, |channel| {
            channel.sample_local_transform(time_in_ticks)
        });

    let global = parent_global * local;

    if let Some(index) = bones.index_of(&node.name) {
        let offset = bones.bones()[index].offset;
        bones.bones_mut()[index].final_transform = root_inverse * global * offset;
    }

    for child in &node.children {
        evaluate_bone_hierarchy(child, &global, clip, time_in_ticks, root_inverse, bones);
    }
}
