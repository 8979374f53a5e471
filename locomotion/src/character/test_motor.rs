//! Scripted motor for unit tests: no collision, grounding set by hand.

use std::cell::Cell;

use crate::types::{Quat, Vec3};

use super::motor::{CapsuleDimensions, CharacterController, CharacterMotor, GroundingReport};

#[derive(Debug)]
pub struct TestMotor {
    pub grounding: GroundingReport,
    pub capsule: CapsuleDimensions,
    pub position: Vec3,
    pub rotation: Quat,
    pub base_velocity: Vec3,
    /// What `character_overlap` reports.
    pub overlap_count: usize,
    /// Capsule height seen by the most recent overlap query.
    pub last_overlap_height: Cell<Option<f32>>,
    pub force_unground_calls: usize,
    unground_pending: bool,
}

impl TestMotor {
    pub fn grounded() -> Self {
        let mut motor = Self {
            grounding: GroundingReport::default(),
            capsule: CapsuleDimensions::standing_on_origin(0.5, 2.0),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            base_velocity: Vec3::zeros(),
            overlap_count: 0,
            last_overlap_height: Cell::new(None),
            force_unground_calls: 0,
            unground_pending: false,
        };
        motor.set_grounded(Vec3::y());
        motor
    }

    pub fn set_grounded(&mut self, normal: Vec3) {
        self.grounding = GroundingReport {
            is_stable_on_ground: true,
            found_any_ground: true,
            ground_normal: normal,
        };
    }

    pub fn set_airborne(&mut self) {
        self.grounding = GroundingReport::default();
    }
}

impl CharacterMotor for TestMotor {
    fn grounding(&self) -> GroundingReport {
        self.grounding
    }

    fn character_up(&self) -> Vec3 {
        Vec3::y()
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32) {
        self.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset,
        };
    }

    fn character_overlap(&self, _position: Vec3, _rotation: Quat) -> usize {
        self.last_overlap_height.set(Some(self.capsule.height));
        self.overlap_count
    }

    fn transient_position(&self) -> Vec3 {
        self.position
    }

    fn transient_rotation(&self) -> Quat {
        self.rotation
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.base_velocity
    }

    fn set_base_velocity(&mut self, velocity: Vec3) {
        self.base_velocity = velocity;
    }

    fn force_unground(&mut self, _duration: f32) {
        self.force_unground_calls += 1;
        self.unground_pending = true;
    }
}

/// Drive one tick in motor order. Movement is not integrated; resolved
/// velocity equals the requested one.
pub fn run_tick(controller: &mut impl CharacterController, motor: &mut TestMotor, dt: f32) {
    controller.before_update(motor, dt);

    let current = motor.base_velocity;
    motor.base_velocity = controller.update_velocity(motor, current, dt);

    let rotation = motor.rotation;
    motor.rotation = controller.update_rotation(motor, rotation, dt);

    if std::mem::take(&mut motor.unground_pending) {
        motor.set_airborne();
    }

    controller.post_grounding_update(motor, dt);
    controller.after_update(motor, dt);
}
