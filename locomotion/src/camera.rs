//! First-person camera rig: yaw/pitch look, spring bob and acceleration lean.
//!
//! The rig tracks an authoritative position (the character's camera target) and
//! layers two cosmetic effects on top of it:
//! - a spring that lags behind the target; its vertical lag pitches the view a
//!   little and a fraction of the full lag nudges the eye position,
//! - a lean that tilts the view toward the character's smoothed planar
//!   acceleration.
//!
//! Neither effect feeds back into the tracked position or the look angles.

use log::trace;

use crate::character::{CameraInput, CharacterState, Stance};
use crate::constants::PITCH_LIMIT_DEG;
use crate::math::{angle_axis_deg, exp_decay_factor, normalize_or_zero, project_on_plane, smooth_damp};
use crate::settings::CameraSettings;
use crate::spring;
use crate::types::{Iso, Quat, Vec3, forward, iso};

/// Which lean strength applies this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeanPreset {
    #[default]
    Walk,
    Slide,
    Sprint,
}

impl LeanPreset {
    pub fn for_state(state: &CharacterState, sprinting: bool) -> Self {
        match state.stance {
            Stance::Slide => LeanPreset::Slide,
            Stance::Stand if sprinting && state.grounded => LeanPreset::Sprint,
            _ => LeanPreset::Walk,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    settings: CameraSettings,

    yaw_deg: f32,
    pitch_deg: f32,
    position: Vec3,

    spring_position: Vec3,
    spring_velocity: Vec3,
    bob: Quat,
    nudge: Vec3,

    damped_acceleration: Vec3,
    damped_acceleration_velocity: Vec3,
    lean_strength: f32,
    lean: Quat,
}

impl CameraRig {
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            position: Vec3::zeros(),
            spring_position: Vec3::zeros(),
            spring_velocity: Vec3::zeros(),
            bob: Quat::identity(),
            nudge: Vec3::zeros(),
            damped_acceleration: Vec3::zeros(),
            damped_acceleration_velocity: Vec3::zeros(),
            lean_strength: settings.lean.walk,
            lean: Quat::identity(),
        }
    }

    /// Snap to `target` and seed the spring there. Roll is discarded.
    pub fn initialize(&mut self, target: &Iso) {
        self.position = target.translation.vector;

        let facing = target.rotation * forward();
        self.yaw_deg = (-facing.x).atan2(-facing.z).to_degrees();
        self.pitch_deg = facing.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);

        self.spring_position = self.position;
        self.spring_velocity = Vec3::zeros();
        self.bob = Quat::identity();
        self.nudge = Vec3::zeros();

        self.damped_acceleration = Vec3::zeros();
        self.damped_acceleration_velocity = Vec3::zeros();
        self.lean_strength = self.settings.lean.walk;
        self.lean = Quat::identity();
    }

    pub fn update_rotation(&mut self, input: &CameraInput) {
        let sensitivity = self.settings.sensitivity;
        self.yaw_deg = wrap_degrees(self.yaw_deg - input.look.x * sensitivity);
        self.pitch_deg = (self.pitch_deg + input.look.y * sensitivity).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
    }

    pub fn update_position(&mut self, target: Vec3) {
        self.position = target;
    }

    pub fn spring_update(&mut self, dt: f32, up: Vec3) {
        let s = &self.settings;
        (self.spring_position, self.spring_velocity) = spring::step(
            self.spring_position,
            self.spring_velocity,
            self.position,
            s.half_life,
            s.frequency,
            dt,
        );

        let offset = self.spring_position - self.position;
        let height = offset.dot(&up);

        // Lagging above the eye pitches up.
        self.bob = angle_axis_deg(height * s.angular_displacement, Vec3::x());
        self.nudge = offset * s.linear_displacement;
    }

    pub fn lean_update(&mut self, dt: f32, acceleration: Vec3, up: Vec3, preset: LeanPreset) {
        let s = &self.settings;

        let target_strength = match preset {
            LeanPreset::Walk => s.lean.walk,
            LeanPreset::Slide => s.lean.slide,
            LeanPreset::Sprint => s.lean.sprint,
        };
        self.lean_strength += (target_strength - self.lean_strength) * exp_decay_factor(s.lean_strength_response, dt);

        let plane_acceleration = project_on_plane(acceleration, up);
        let damping = if plane_acceleration.norm() > self.damped_acceleration.norm() {
            s.attack_damping
        } else {
            s.decay_damping
        };

        (self.damped_acceleration, self.damped_acceleration_velocity) = smooth_damp(
            self.damped_acceleration,
            plane_acceleration,
            self.damped_acceleration_velocity,
            damping,
            dt,
        );

        let axis = normalize_or_zero(normalize_or_zero(self.damped_acceleration).cross(&up));
        self.lean = angle_axis_deg(-self.damped_acceleration.norm() * self.lean_strength, axis);

        trace!(
            "lean: accel={:.2} strength={:.3}",
            self.damped_acceleration.norm(),
            self.lean_strength
        );
    }

    /// Look rotation without bob or lean.
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), self.yaw_deg.to_radians())
            * Quat::from_axis_angle(&Vec3::x_axis(), self.pitch_deg.to_radians())
    }

    /// Final eye pose: lean, then look, then bob; position nudged by the spring.
    pub fn view(&self) -> Iso {
        iso(self.position + self.nudge, self.lean * self.rotation() * self.bob)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    /// Spring lag behind the tracked position.
    pub fn spring_offset(&self) -> Vec3 {
        self.spring_position - self.position
    }

    pub fn lean_strength(&self) -> f32 {
        self.lean_strength
    }

    pub fn lean_rotation(&self) -> Quat {
        self.lean
    }

    pub fn bob_rotation(&self) -> Quat {
        self.bob
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}
