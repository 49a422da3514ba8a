//! Remote entity interpolation
//!
//! Renders remote entities slightly in the past: the render time is the
//! estimated server time minus a fixed delay, chosen so that two real
//! samples almost always bracket it. That trades a small, bounded latency
//! for smoothness and avoids extrapolation error entirely. When no
//! bracket exists the entity freezes at its last applied pose; there is
//! no extrapolation past the newest sample.

use std::f64::consts::{PI, TAU};

use paredes_protocol::Vec3;

use crate::StateBuffer;

/// Fixed delay subtracted from estimated server time, in ms
pub const INTERPOLATION_DELAY_MS: f64 = 100.0;
/// Samples older than render time minus this are pruned, in ms
pub const PRUNE_HORIZON_MS: f64 = 1000.0;

/// An interpolated render pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f64,
}

/// Compute the render pose for one entity at `render_time`
///
/// Scans for the bracketing pair `s0.timestamp <= render_time <=
/// s1.timestamp` and blends between them. Returns `None` when fewer than
/// two samples exist or nothing brackets the render time; the caller
/// keeps the previous pose in that case. On success, samples older than
/// `render_time - PRUNE_HORIZON_MS` are pruned.
pub fn sample_pose(buffer: &mut StateBuffer, render_time: f64) -> Option<Pose> {
    let samples = buffer.samples();
    if samples.len() < 2 {
        return None;
    }

    let (s0, s1) = samples
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .find(|(s0, s1)| s0.timestamp <= render_time && render_time <= s1.timestamp)?;

    let span = s1.timestamp - s0.timestamp;
    // Duplicate timestamps collapse the span; land on the newer sample
    let alpha = if span > 0.0 {
        (render_time - s0.timestamp) / span
    } else {
        1.0
    };

    let pose = Pose {
        position: s0.position.lerp(&s1.position, alpha),
        yaw: lerp_angle(s0.yaw, s1.yaw, alpha),
    };

    buffer.prune_older_than(render_time - PRUNE_HORIZON_MS);
    Some(pose)
}

/// Interpolate between two angles along the shortest path
///
/// Never rotates the long way around: the effective delta is normalized
/// into `[-π, π]` before blending, and the result is wrapped back into
/// `(-π, π]`.
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    let mut delta = (b - a) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    wrap_angle(a + delta * t)
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle % TAU;
    if wrapped > PI {
        wrapped - TAU
    } else if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
