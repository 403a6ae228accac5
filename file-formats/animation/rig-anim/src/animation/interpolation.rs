//! Keyframe lookup and interpolation for clip tracks

use glam::{Quat, Vec3, Vec4};

use crate::channel::Track;

/// Above this cosine the two rotations are close enough to blend linearly
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Values that can be blended between two keyframes
pub trait Interpolate: Copy {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp_position(*self, *other, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        slerp_rotation(*self, *other, t)
    }
}

/// Index of the first timestamp strictly greater than `time`
pub fn upper_bound(timestamps: &[f32], time: f32) -> usize {
    timestamps.partition_point(|&t| t <= time)
}

/// Blend factor between two keyframe times. A zero or negative span yields 0.
pub fn segment_factor(start: f32, end: f32, time: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 0.0;
    }
    ((time - start) / span).clamp(0.0, 1.0)
}

/// Componentwise linear interpolation, unclamped
pub fn lerp_position(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Shortest-path spherical interpolation.
///
/// Inputs need not be normalized; a zero-length input is treated as the
/// identity rotation. The result is always a unit quaternion.
pub fn slerp_rotation(a: Quat, b: Quat, t: f32) -> Quat {
    let a = normalize_or_identity(Vec4::from(a));
    let mut b = normalize_or_identity(Vec4::from(b));

    let mut dot = a.dot(b);
    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    let blended = if dot > SLERP_LINEAR_THRESHOLD {
        a + (b - a) * t
    } else {
        let theta_0 = dot.min(1.0).acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();
        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = theta.sin() / sin_theta_0;
        a * s0 + b * s1
    };

    Quat::from_vec4(normalize_or_identity(blended))
}

fn normalize_or_identity(v: Vec4) -> Vec4 {
    let len_sq = v.length_squared();
    if len_sq.is_finite() && len_sq > f32::EPSILON {
        v / len_sq.sqrt()
    } else {
        Vec4::from(Quat::IDENTITY)
    }
}

/// Sample a track at `time`.
///
/// No keyframes gives `None`; one keyframe is returned as is; before the
/// first or after the last keyframe the end value is held.
pub fn sample_track<T: Interpolate>(track: Track<'_, T>, time: f32) -> Option<T> {
    let count = track.len().min(track.values.len());
    match count {
        0 => None,
        1 => Some(track.values[0]),
        _ => {
            let idx = upper_bound(&track.timestamps[..count], time);
            if idx == 0 {
                return Some(track.values[0]);
            }
            if idx >= count {
                return Some(track.values[count - 1]);
            }
            let t = segment_factor(track.timestamps[idx - 1], track.timestamps[idx], time);
            Some(track.values[idx - 1].interpolate(&track.values[idx], t))
        }
    }
}
