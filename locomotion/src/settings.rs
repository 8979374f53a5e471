//! Tuning values for the character and its camera.
//!
//! Units are meters, seconds and degrees. Accelerations are signed along the
//! character up axis, so gravity is negative. Every field has a default, so a
//! partial config file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

/// Character locomotion tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    /// Target ground speed while standing (m/s).
    pub walk_speed: f32,
    /// Target ground speed while crouched (m/s).
    pub crouch_speed: f32,
    /// Target ground speed while standing with sprint held (m/s).
    pub sprint_speed: f32,
    /// Exponential response toward the standing target velocity (1/s).
    pub walk_response: f32,
    /// Exponential response toward the crouched target velocity (1/s).
    pub crouch_response: f32,

    /// Planar speed cap that air control can accelerate up to (m/s).
    pub air_speed: f32,
    /// Planar air acceleration (m/s^2).
    pub air_accel: f32,

    /// Minimum vertical speed right after a jump (m/s).
    pub jump_speed: f32,
    /// Grace window after leaving the ground, and lifetime of a pending jump request (s).
    pub coyote_time: f32,
    /// Gravity multiplier while ascending with jump held (0..=1).
    pub jump_sustain_gravity: f32,
    /// Airborne gravity along the up axis (m/s^2).
    pub gravity: f32,

    /// Speed a slide starts at, unless already moving faster (m/s).
    pub slide_start_speed: f32,
    /// Speed under which a slide settles into a crouch (m/s).
    pub slide_end_speed: f32,
    /// Fraction of slide velocity lost per second.
    pub slide_friction: f32,
    /// How quickly a slide turns toward the movement intent (1/s).
    pub slide_steer_accel: f32,
    /// Gravity applied along the slope while sliding (m/s^2).
    pub slide_gravity: f32,

    /// Capsule radius, fixed for the session (m).
    pub capsule_radius: f32,
    /// Capsule height while standing (m).
    pub stand_height: f32,
    /// Capsule height while crouched or sliding (m).
    pub crouch_height: f32,
    /// Response of the visual body and camera target toward the capsule height (1/s).
    pub crouch_height_response: f32,
    /// Camera target height as a fraction of the capsule height while standing.
    pub stand_camera_target_height: f32,
    /// Camera target height as a fraction of the capsule height while crouched.
    pub crouch_camera_target_height: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            walk_speed: 13.0,
            crouch_speed: 3.0,
            sprint_speed: 18.0,
            walk_response: 10.0,
            crouch_response: 15.0,

            air_speed: 7.0,
            air_accel: 20.0,

            jump_speed: 15.0,
            coyote_time: 0.2,
            jump_sustain_gravity: 0.6,
            gravity: -90.0,

            slide_start_speed: 15.0,
            slide_end_speed: 2.5,
            slide_friction: 0.8,
            slide_steer_accel: 5.0,
            slide_gravity: -90.0,

            capsule_radius: 0.5,
            stand_height: 2.0,
            crouch_height: 1.0,
            crouch_height_response: 15.0,
            stand_camera_target_height: 0.9,
            crouch_camera_target_height: 0.7,
        }
    }
}

/// Lean strength targets for each locomotion context.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeanPresets {
    pub walk: f32,
    pub slide: f32,
    pub sprint: f32,
}

impl Default for LeanPresets {
    fn default() -> Self {
        Self {
            walk: 0.075,
            slide: 0.2,
            sprint: 0.1,
        }
    }
}

/// Camera rig tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Degrees of rotation per unit of look input.
    pub sensitivity: f32,

    /// Spring half-life (s).
    pub half_life: f32,
    /// Spring angular frequency (rad/s).
    pub frequency: f32,
    /// Degrees of pitch per meter of vertical spring offset.
    pub angular_displacement: f32,
    /// Fraction of the spring offset applied as a positional nudge.
    pub linear_displacement: f32,

    /// Smoothing time while lean acceleration grows (s).
    pub attack_damping: f32,
    /// Smoothing time while lean acceleration shrinks (s).
    pub decay_damping: f32,
    /// Degrees of lean per m/s^2 of smoothed acceleration, per context.
    pub lean: LeanPresets,
    /// Response of the lean strength toward its preset (1/s).
    pub lean_strength_response: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,

            half_life: 0.075,
            frequency: 18.0,
            angular_displacement: 2.0,
            linear_displacement: 0.05,

            attack_damping: 0.5,
            decay_damping: 0.3,
            lean: LeanPresets::default(),
            lean_strength_response: 6.0,
        }
    }
}
