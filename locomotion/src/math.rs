use nalgebra::{UnitQuaternion, Vector3};

use crate::constants::{DIRECTION_EPS_SQ, MIN_SMOOTH_TIME, NORMALIZE_EPS};

/// Remove the component of `v` along `plane_normal`.
///
/// `plane_normal` does not need to be unit length; a zero normal returns `v` unchanged.
#[inline]
pub fn project_on_plane(v: Vector3<f32>, plane_normal: Vector3<f32>) -> Vector3<f32> {
    let len_sq = plane_normal.norm_squared();
    if len_sq <= DIRECTION_EPS_SQ {
        return v;
    }
    v - plane_normal * (v.dot(&plane_normal) / len_sq)
}

/// Scale `v` down so its length is at most `max_len`.
#[inline]
pub fn clamp_magnitude(v: Vector3<f32>, max_len: f32) -> Vector3<f32> {
    let max_len = max_len.max(0.0);
    let len_sq = v.norm_squared();
    if len_sq > max_len * max_len {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}

/// Unit vector along `v`, or zero when `v` is too short to normalize.
#[inline]
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(NORMALIZE_EPS).unwrap_or_else(Vector3::zeros)
}

/// Frame-rate independent lerp factor for an exponential approach at `response` (1/s).
///
/// `lerp(a, b, exp_decay_factor(r, dt))` covers the same fraction of the gap
/// regardless of how `dt` is sliced.
#[inline]
pub fn exp_decay_factor(response: f32, dt: f32) -> f32 {
    1.0 - (-response * dt.max(0.0)).exp()
}

/// Rotation of `angle_deg` degrees about `axis`; identity when the axis is degenerate.
#[inline]
pub fn angle_axis_deg(angle_deg: f32, axis: Vector3<f32>) -> UnitQuaternion<f32> {
    match nalgebra::Unit::try_new(axis, NORMALIZE_EPS) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_deg.to_radians()),
        None => UnitQuaternion::identity(),
    }
}

/// Critically damped smoothing toward `target` with an approximate `smooth_time`.
///
/// Returns the new `(value, velocity)`. Uses the usual cubic approximation of
/// `exp(-2 dt / smooth_time)` and refuses to overshoot the target.
pub fn smooth_damp(
    current: Vector3<f32>,
    target: Vector3<f32>,
    velocity: Vector3<f32>,
    smooth_time: f32,
    dt: f32,
) -> (Vector3<f32>, Vector3<f32>) {
    if dt <= 0.0 {
        return (current, velocity);
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (velocity + change * omega) * dt;
    let mut new_velocity = (velocity - temp * omega) * decay;
    let mut output = target + (change + temp) * decay;

    // Passed the target this step: land on it.
    if (target - current).dot(&(output - target)) > 0.0 {
        output = target;
        new_velocity = Vector3::zeros();
    }

    (output, new_velocity)
}
