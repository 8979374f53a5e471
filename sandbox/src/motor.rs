//! Rapier-backed character motor.
//!
//! [`RapierMotor`] owns the capsule, pose, velocity and grounding of one
//! character. [`RapierMotor::simulate`] drives a [`CharacterController`]
//! through one physics tick:
//!
//! - `before_update`, `update_velocity`, `update_rotation`
//! - KCC `move_shape` against the static world, velocity projected off the
//!   planes it ran into
//! - downward ray ground probe (skipped while ungrounding is forced)
//! - `post_grounding_update`, `after_update`
//!
//! The character origin is the bottom of the capsule (the feet).

use locomotion::{
    CapsuleDimensions, CharacterController, CharacterMotor, ColliderId, GroundingReport, HitStabilityReport,
    MotorHit, Quat, Vec3,
};
use log::trace;
use rapier3d::control::{CharacterCollision, KinematicCharacterController};
use rapier3d::na::{Point3, Translation3};
use rapier3d::parry::query;
use rapier3d::prelude::*;

use crate::kcc_settings::KccSettings;
use crate::world::QueryWorld;

/// Ground probe starts this far above the feet to avoid starting inside geometry.
const PROBE_LIFT: f32 = 0.02;

/// Overlap tests shrink the capsule radius by this much, so resting contact doesn't count.
const OVERLAP_SKIN: f32 = 0.01;

pub struct RapierMotor {
    settings: KccSettings,
    kcc: KinematicCharacterController,

    capsule: CapsuleDimensions,
    position: Vec3,
    rotation: Quat,
    base_velocity: Vec3,
    velocity: Vec3,
    grounding: GroundingReport,

    unground_next_probe: bool,
    unground_time_left: f32,
}

/// A motor paired with the world it moves in; this is what controllers see.
pub struct BoundMotor<'a> {
    motor: &'a mut RapierMotor,
    world: &'a QueryWorld,
}

impl RapierMotor {
    pub fn new(settings: KccSettings, position: Vec3, capsule: CapsuleDimensions) -> Self {
        Self {
            kcc: settings.controller(),
            settings,
            capsule,
            position,
            rotation: Quat::identity(),
            base_velocity: Vec3::zeros(),
            velocity: Vec3::zeros(),
            grounding: GroundingReport::default(),
            unground_next_probe: false,
            unground_time_left: 0.0,
        }
    }

    pub fn bind<'a>(&'a mut self, world: &'a QueryWorld) -> BoundMotor<'a> {
        BoundMotor { motor: self, world }
    }

    /// Run one physics tick of `controller` against `world`.
    pub fn simulate(&mut self, world: &QueryWorld, controller: &mut dyn CharacterController, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        {
            let mut bound = self.bind(world);
            controller.before_update(&mut bound, dt);

            let current = bound.motor.base_velocity;
            bound.motor.base_velocity = controller.update_velocity(&mut bound, current, dt);

            let current = bound.motor.rotation;
            bound.motor.rotation = controller.update_rotation(&bound, current, dt);
        }

        self.move_and_probe(world, controller, dt);

        let mut bound = self.bind(world);
        controller.post_grounding_update(&bound, dt);
        controller.after_update(&mut bound, dt);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn grounding(&self) -> GroundingReport {
        self.grounding
    }

    pub fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    pub fn settings(&self) -> &KccSettings {
        &self.settings
    }

    fn move_and_probe(&mut self, world: &QueryWorld, controller: &mut dyn CharacterController, dt: f32) {
        let forced = self.unground_next_probe || self.unground_time_left > 0.0;
        let min_normal_y = self.settings.min_ground_normal_y();

        let mut kcc = self.kcc;
        let mut desired = self.base_velocity * dt;
        if forced {
            kcc.snap_to_ground = None;
        } else if self.grounding.is_stable_on_ground {
            desired.y -= self.settings.grounded_down_bias_mps * dt;
        }

        let shape = Capsule::new_y(self.capsule.segment_half_height(), self.capsule.radius);
        let pose = capsule_pose(&self.capsule, self.position, self.rotation);

        let mut collisions: Vec<CharacterCollision> = Vec::new();
        let movement = {
            let is_valid = |_: ColliderHandle, collider: &Collider| {
                controller.is_collider_valid_for_collisions(ColliderId(collider.user_data as u64))
            };
            let query_pipeline = world.query_pipeline(QueryFilter::default().predicate(&is_valid));
            kcc.move_shape(dt, &query_pipeline, &shape, &pose, desired, |collision| {
                collisions.push(collision)
            })
        };

        self.position += movement.translation;

        let mut velocity = self.base_velocity;
        for collision in &collisions {
            // Normal facing back against the motion.
            let mut normal = collision.hit.normal1.into_inner();
            if normal.dot(&desired) > 0.0 {
                normal = -normal;
            }

            let into_surface = velocity.dot(&normal);
            if into_surface < 0.0 {
                velocity -= normal * into_surface;
            }

            let hit = MotorHit {
                collider: world.collider_id(collision.handle).unwrap_or(ColliderId(0)),
                normal,
                character_position: collision.character_pos.translation.vector,
            };
            let mut report = HitStabilityReport {
                is_stable: normal.y >= min_normal_y,
            };
            controller.process_hit_stability(&hit, self.position, self.rotation, &mut report);
            controller.on_movement_hit(&hit, &mut report);
        }

        self.grounding = if forced {
            GroundingReport::default()
        } else {
            self.probe_ground(world, controller, movement.grounded, min_normal_y)
        };

        if self.grounding.is_stable_on_ground {
            let normal = self.grounding.ground_normal;
            let into_ground = velocity.dot(&normal);
            if into_ground < 0.0 {
                velocity -= normal * into_ground;
            }
        }

        self.base_velocity = velocity;
        self.velocity = velocity;

        self.unground_next_probe = false;
        self.unground_time_left = (self.unground_time_left - dt).max(0.0);

        trace!(
            "motor: pos={:?} vel={:?} stable={} forced={forced} hits={}",
            self.position,
            self.velocity,
            self.grounding.is_stable_on_ground,
            collisions.len()
        );
    }

    fn probe_ground(
        &self,
        world: &QueryWorld,
        controller: &mut dyn CharacterController,
        kcc_grounded: bool,
        min_normal_y: f32,
    ) -> GroundingReport {
        let up = Vec3::y();
        let origin = self.position + up * PROBE_LIFT;
        let ray = Ray::new(Point3::from(origin), -up);
        let max_distance = self.settings.ground_probe_distance + PROBE_LIFT;

        let hit = {
            let is_valid = |_: ColliderHandle, collider: &Collider| {
                controller.is_collider_valid_for_collisions(ColliderId(collider.user_data as u64))
            };
            let query_pipeline = world.query_pipeline(QueryFilter::default().predicate(&is_valid));
            query_pipeline.cast_ray_and_get_normal(&ray, max_distance, true)
        };

        match hit {
            Some((handle, ray_hit)) => {
                let normal = ray_hit.normal;
                let hit = MotorHit {
                    collider: world.collider_id(handle).unwrap_or(ColliderId(0)),
                    normal,
                    character_position: capsule_pose(&self.capsule, self.position, self.rotation)
                        .translation
                        .vector,
                };
                let mut report = HitStabilityReport {
                    is_stable: normal.y >= min_normal_y,
                };
                controller.process_hit_stability(&hit, self.position, self.rotation, &mut report);
                controller.on_ground_hit(&hit, &mut report);

                GroundingReport {
                    is_stable_on_ground: report.is_stable,
                    found_any_ground: true,
                    ground_normal: normal,
                }
            }
            // Resting on an edge the ray slips past.
            None if kcc_grounded => GroundingReport {
                is_stable_on_ground: true,
                found_any_ground: true,
                ground_normal: up,
            },
            None => GroundingReport::default(),
        }
    }
}

fn capsule_pose(capsule: &CapsuleDimensions, position: Vec3, rotation: Quat) -> Isometry<f32> {
    let center = position + rotation * Vec3::new(0.0, capsule.y_offset, 0.0);
    Isometry::from_parts(Translation3::from(center), rotation)
}

impl CharacterMotor for BoundMotor<'_> {
    fn grounding(&self) -> GroundingReport {
        self.motor.grounding
    }

    fn character_up(&self) -> Vec3 {
        Vec3::y()
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.motor.capsule
    }

    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32) {
        self.motor.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset,
        };
        trace!("capsule: radius={radius} height={height} y_offset={y_offset}");
    }

    fn character_overlap(&self, position: Vec3, rotation: Quat) -> usize {
        let capsule = self.motor.capsule;
        let shape = Capsule::new_y(capsule.segment_half_height(), (capsule.radius - OVERLAP_SKIN).max(0.0));
        let pose = capsule_pose(&capsule, position, rotation);

        self.world
            .colliders
            .iter()
            .filter(|(_, collider)| {
                query::intersection_test(&pose, &shape, collider.position(), collider.shape()).unwrap_or(false)
            })
            .count()
    }

    fn transient_position(&self) -> Vec3 {
        self.motor.position
    }

    fn transient_rotation(&self) -> Quat {
        self.motor.rotation
    }

    fn set_position(&mut self, position: Vec3) {
        self.motor.position = position;
        self.motor.grounding = GroundingReport::default();
    }

    fn velocity(&self) -> Vec3 {
        self.motor.velocity
    }

    fn set_base_velocity(&mut self, velocity: Vec3) {
        self.motor.base_velocity = velocity;
        self.motor.velocity = velocity;
    }

    fn force_unground(&mut self, duration: f32) {
        self.motor.unground_next_probe = true;
        self.motor.unground_time_left = duration.max(0.0);
    }
}
