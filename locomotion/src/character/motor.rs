//! Contracts between the character logic and the collision solver that moves it.
//!
//! The solver ("motor") owns the capsule, the transient pose and the grounding
//! probe. Once per physics tick it calls back into a [`CharacterController`]
//! in a fixed order:
//!
//! 1. [`CharacterController::before_update`]
//! 2. [`CharacterController::update_velocity`]
//! 3. [`CharacterController::update_rotation`]
//! 4. collision move, ground probe (hit callbacks fire here)
//! 5. [`CharacterController::post_grounding_update`]
//! 6. [`CharacterController::after_update`]
//!
//! Velocity and rotation are returned, not written through a side channel: the
//! motor applies whatever the controller hands back.

use crate::math::normalize_or_zero;
use crate::types::{Quat, Vec3};

/// Grounding result of the most recent probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundingReport {
    /// Standing on walkable ground this tick.
    pub is_stable_on_ground: bool,
    /// Any surface was found under the character, walkable or not.
    pub found_any_ground: bool,
    /// Normal of the surface under the character, up when nothing was found.
    pub ground_normal: Vec3,
}

impl Default for GroundingReport {
    fn default() -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: false,
            ground_normal: Vec3::y(),
        }
    }
}

/// Capsule shape as the motor currently holds it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleDimensions {
    pub radius: f32,
    /// Total height, caps included.
    pub height: f32,
    /// Height of the capsule center above the character origin (the feet).
    pub y_offset: f32,
}

impl CapsuleDimensions {
    /// Capsule standing on the origin.
    #[inline]
    pub fn standing_on_origin(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            y_offset: height * 0.5,
        }
    }

    /// Half length of the cylinder between the two caps.
    #[inline]
    pub fn segment_half_height(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// Opaque id of a collider in the motor's world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u64);

/// Contact reported by the motor during a move or a ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorHit {
    pub collider: ColliderId,
    /// Surface normal, pointing away from the obstacle.
    pub normal: Vec3,
    /// Capsule center when the hit happened.
    pub character_position: Vec3,
}

/// Stability verdict for a hit; the controller may override it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitStabilityReport {
    pub is_stable: bool,
}

/// Query and mutation interface of the collision/grounding solver.
pub trait CharacterMotor {
    fn grounding(&self) -> GroundingReport;

    fn character_up(&self) -> Vec3;

    /// Redirect `direction` along the surface with `surface_normal`, keeping it
    /// in the vertical plane of the incoming direction. Unit length, or zero.
    fn direction_tangent_to_surface(&self, direction: Vec3, surface_normal: Vec3) -> Vec3 {
        let right = direction.cross(&self.character_up());
        normalize_or_zero(surface_normal.cross(&right))
    }

    fn capsule(&self) -> CapsuleDimensions;

    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32);

    /// Number of colliders overlapping the current capsule placed at the given pose.
    fn character_overlap(&self, position: Vec3, rotation: Quat) -> usize;

    fn transient_position(&self) -> Vec3;

    fn transient_rotation(&self) -> Quat;

    /// Teleport; takes effect immediately.
    fn set_position(&mut self, position: Vec3);

    /// Velocity after the last collision resolution.
    fn velocity(&self) -> Vec3;

    fn set_base_velocity(&mut self, velocity: Vec3);

    /// Skip ground detection for `duration` seconds; zero skips the next probe only.
    fn force_unground(&mut self, duration: f32);
}

/// Callbacks a motor drives once per physics tick. See the module docs for the order.
pub trait CharacterController {
    fn before_update(&mut self, motor: &mut dyn CharacterMotor, dt: f32);

    fn update_velocity(&mut self, motor: &mut dyn CharacterMotor, current: Vec3, dt: f32) -> Vec3;

    fn update_rotation(&mut self, motor: &dyn CharacterMotor, current: Quat, dt: f32) -> Quat;

    fn post_grounding_update(&mut self, motor: &dyn CharacterMotor, dt: f32);

    fn after_update(&mut self, motor: &mut dyn CharacterMotor, dt: f32);

    fn on_ground_hit(&mut self, _hit: &MotorHit, _report: &mut HitStabilityReport) {}

    fn on_movement_hit(&mut self, _hit: &MotorHit, _report: &mut HitStabilityReport) {}

    fn process_hit_stability(
        &mut self,
        _hit: &MotorHit,
        _at_position: Vec3,
        _at_rotation: Quat,
        _report: &mut HitStabilityReport,
    ) {
    }

    fn is_collider_valid_for_collisions(&self, _collider: ColliderId) -> bool {
        true
    }
}
