/// Pitch limit for the camera, in degrees, either side of the horizon.
///
/// Keeps the view just short of vertical so yaw never flips.
pub const PITCH_LIMIT_DEG: f32 = 89.0;

/// Squared length below which a direction is treated as zero.
pub const DIRECTION_EPS_SQ: f32 = 1.0e-12;

/// Length below which a vector cannot be normalized safely.
pub const NORMALIZE_EPS: f32 = 1.0e-6;

/// Smallest smoothing time accepted by [`crate::math::smooth_damp`] (seconds).
pub const MIN_SMOOTH_TIME: f32 = 1.0e-4;

/// Smallest spring half-life accepted by [`crate::spring::step`] (seconds).
pub const MIN_HALF_LIFE: f32 = 1.0e-2;
