//! Damped spring integrator.
//!
//! Closed-form implicit step of a damped harmonic oscillator. The spring is
//! parameterized by `frequency` (angular, rad/s) and `half_life`, the time it
//! takes a free oscillation at that frequency to lose half its amplitude.
//!
//! Each step solves the 2x2 implicit-Euler system for position and velocity
//! directly, so the integrator never diverges no matter how large `dt` is.

use nalgebra::SVector;

use crate::constants::MIN_HALF_LIFE;

/// Damping ratio that makes a free oscillation at `frequency` halve in `half_life` seconds.
#[inline]
pub fn damping_ratio(half_life: f32, frequency: f32) -> f32 {
    -(0.5f32.ln()) / (frequency * half_life.max(MIN_HALF_LIFE))
}

/// Advance a spring one step toward `target`.
///
/// Returns the new `(position, velocity)`. A non-positive `dt` or `frequency`
/// leaves the state untouched.
#[inline]
pub fn step<const D: usize>(
    position: SVector<f32, D>,
    velocity: SVector<f32, D>,
    target: SVector<f32, D>,
    half_life: f32,
    frequency: f32,
    dt: f32,
) -> (SVector<f32, D>, SVector<f32, D>) {
    if dt <= 0.0 || frequency <= 0.0 {
        return (position, velocity);
    }

    let zeta = damping_ratio(half_life, frequency);
    let f = 1.0 + 2.0 * dt * zeta * frequency;
    let oo = frequency * frequency;
    let hoo = dt * oo;
    let hhoo = dt * hoo;
    let det_inv = 1.0 / (f + hhoo);

    let det_x = position * f + velocity * dt + target * hhoo;
    let det_v = velocity + (target - position) * hoo;

    (det_x * det_inv, det_v * det_inv)
}

/// Scalar convenience over [`step`].
#[inline]
pub fn step_scalar(
    position: f32,
    velocity: f32,
    target: f32,
    half_life: f32,
    frequency: f32,
    dt: f32,
) -> (f32, f32) {
    let (x, v) = step(
        SVector::<f32, 1>::new(position),
        SVector::<f32, 1>::new(velocity),
        SVector::<f32, 1>::new(target),
        half_life,
        frequency,
        dt,
    );
    (x.x, v.x)
}
