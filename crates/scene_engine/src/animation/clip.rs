//! Animation clips and keyframe channels
//!
//! A clip is a named set of [`AnimationChannel`]s, one per animated bone.
//! Each channel carries three independently sized, independently
//! timestamped key tracks (positions, rotations, scalings). Timestamps are
//! assumed non-decreasing within a track; the importer is trusted on that.

use std::collections::HashMap;

use crate::foundation::math::{compose_trs, Mat4, Quat, Vec3};

/// A timestamped vector keyframe (position or scale)
#[derive(Debug, Clone, Copy)]
pub struct VectorKey {
    /// Key time in clip ticks
    pub time: f32,
    /// Key value
    pub value: Vec3,
}

/// A timestamped rotation keyframe
#[derive(Debug, Clone, Copy)]
pub struct QuatKey {
    /// Key time in clip ticks
    pub time: f32,
    /// Key value
    pub value: Quat,
}

/// Keyframe tracks for one animated bone
///
/// Any track may be empty (the bone keeps its rest value for that channel
/// type) or hold a single key (a constant channel).
#[derive(Debug, Clone, Default)]
pub struct AnimationChannel {
    /// Name of the bone node this channel animates
    pub target: String,
    /// Position keys in tick order
    pub position_keys: Vec<VectorKey>,
    /// Rotation keys in tick order
    pub rotation_keys: Vec<QuatKey>,
    /// Scaling keys in tick order
    pub scaling_keys: Vec<VectorKey>,
}

impl AnimationChannel {
    /// Create an empty channel targeting `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sample the position track at `time` ticks
    pub fn sample_position(&self, time: f32) -> Vec3 {
        sample_vector_track(&self.position_keys, time, Vec3::zeros())
    }

    /// Sample the rotation track at `time` ticks
    pub fn sample_rotation(&self, time: f32) -> Quat {
        sample_quat_track(&self.rotation_keys, time)
    }

    /// Sample the scaling track at `time` ticks
    ///
    /// The no-data fallback is uniform scale 1.0, never zero.
    pub fn sample_scale(&self, time: f32) -> Vec3 {
        sample_vector_track(&self.scaling_keys, time, Vec3::new(1.0, 1.0, 1.0))
    }

    /// Sample all three tracks and compose the local transform
    pub fn sample_local_transform(&self, time: f32) -> Mat4 {
        compose_trs(
            &self.sample_position(time),
            &self.sample_rotation(time),
            &self.sample_scale(time),
        )
    }
}

/// Find the key pair bracketing `time` and the interpolation factor.
///
/// Scans for the first consecutive pair whose second key is still ahead of
/// `time`. Returns `None` when `time` is past every key; the caller falls
/// back to the track's rest value rather than clamping to the last key.
fn bracketing_pair(times: impl Iterator<Item = f32> + Clone, time: f32) -> Option<(usize, f32)> {
    let mut iter = times.clone().zip(times.skip(1)).enumerate();
    iter.find_map(|(i, (t0, t1))| {
        if time < t1 {
            let span = t1 - t0;
            let factor = if span > 0.0 { (time - t0) / span } else { 0.0 };
            Some((i, factor))
        } else {
            None
        }
    })
}

fn sample_vector_track(keys: &[VectorKey], time: f32, fallback: Vec3) -> Vec3 {
    match keys {
        [] => fallback,
        [only] => only.value,
        _ => match bracketing_pair(keys.iter().map(|k| k.time), time) {
            Some((i, t)) => keys[i].value.lerp(&keys[i + 1].value, t),
            None => fallback,
        },
    }
}

fn sample_quat_track(keys: &[QuatKey], time: f32) -> Quat {
    match keys {
        [] => Quat::identity(),
        [only] => only.value,
        _ => match bracketing_pair(keys.iter().map(|k| k.time), time) {
            Some((i, t)) => keys[i].value.slerp(&keys[i + 1].value, t),
            None => Quat::identity(),
        },
    }
}

/// A named animation with one channel per animated bone
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Clip name, unique within its mesh
    pub name: String,
    /// Clip length in ticks
    pub duration: f32,
    /// Conversion rate from seconds to ticks; 0 means "importer left it
    /// unset" and the animator substitutes a default
    pub ticks_per_second: f32,
    channels: Vec<AnimationChannel>,
    by_target: HashMap<String, usize>,
}

impl AnimationClip {
    /// Create a clip from its channels
    ///
    /// When two channels target the same bone the first one wins; the
    /// duplicate is kept in the list but never looked up.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        channels: Vec<AnimationChannel>,
    ) -> Self {
        let mut by_target = HashMap::with_capacity(channels.len());
        for (i, channel) in channels.iter().enumerate() {
            if by_target.contains_key(&channel.target) {
                log::debug!("duplicate animation channel for bone '{}'", channel.target);
            } else {
                by_target.insert(channel.target.clone(), i);
            }
        }
        Self {
            name: name.into(),
            duration,
            ticks_per_second,
            channels,
            by_target,
        }
    }

    /// Look up the channel targeting `bone_name`
    pub fn channel(&self, bone_name: &str) -> Option<&AnimationChannel> {
        self.by_target.get(bone_name).map(|&i| &self.channels[i])
    }

    /// All channels in import order
    pub fn channels(&self) -> &[AnimationChannel] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_key_channel() -> AnimationChannel {
        let mut channel = AnimationChannel::new("bone");
        channel.position_keys = vec![
            VectorKey { time: 0.0, value: Vec3::zeros() },
            VectorKey { time: 10.0, value: Vec3::new(1.0, 0.0, 0.0) },
        ];
        channel
    }

    #[test]
    fn test_single_key_channel_is_constant() {
        let mut channel = AnimationChannel::new("bone");
        channel.position_keys = vec![VectorKey { time: 3.0, value: Vec3::new(7.0, 8.0, 9.0) }];

        for time in [0.0, 3.0, 1000.0] {
            assert_relative_eq!(channel.sample_position(time), Vec3::new(7.0, 8.0, 9.0));
        }
    }

    #[test]
    fn test_empty_tracks_fall_back_per_type() {
        let channel = AnimationChannel::new("bone");
        assert_relative_eq!(channel.sample_position(1.0), Vec3::zeros());
        assert_relative_eq!(channel.sample_scale(1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(
            channel.sample_rotation(1.0).angle(),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_interpolation_endpoints_and_midpoint() {
        let channel = two_key_channel();
        assert_relative_eq!(channel.sample_position(0.0), Vec3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(
            channel.sample_position(5.0),
            Vec3::new(0.5, 0.0, 0.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            channel.sample_position(9.999_999),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_sampling_past_last_key_returns_rest_value() {
        // The scan runs off the end of the track and the channel reverts to
        // its rest value instead of clamping to the final key.
        let channel = two_key_channel();
        assert_relative_eq!(channel.sample_position(11.0), Vec3::zeros());
    }

    #[test]
    fn test_rotation_slerp_midpoint() {
        let mut channel = AnimationChannel::new("bone");
        let half_turn = Quat::from_euler_angles(0.0, std::f32::consts::PI, 0.0);
        channel.rotation_keys = vec![
            QuatKey { time: 0.0, value: Quat::identity() },
            QuatKey { time: 2.0, value: half_turn },
        ];

        let mid = channel.sample_rotation(1.0);
        assert_relative_eq!(mid.angle(), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_clip_channel_lookup() {
        let clip = AnimationClip::new("walk", 10.0, 25.0, vec![two_key_channel()]);
        assert!(clip.channel("bone").is_some());
        assert!(clip.channel("missing").is_none());
    }
}
