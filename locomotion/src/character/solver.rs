//! Stance, velocity and jump logic for a first-person capsule character.
//!
//! [`MotionSolver`] is the single [`CharacterController`] implementation. It
//! turns per-tick intent into a velocity for the motor to resolve, switches
//! between Stand, Crouch and Slide, resizes the capsule around the collision
//! step and commits a [`CharacterState`] snapshot at the end of every tick.
//!
//! Two snapshots are kept. `state` is the live one. `last_state` is the state
//! as it was when the previous tick began, so transition tests such as "was
//! standing" are not fooled by the capsule hooks that already ran this tick.

use log::{debug, trace};

use crate::constants::DIRECTION_EPS_SQ;
use crate::math::{clamp_magnitude, exp_decay_factor, normalize_or_zero, project_on_plane};
use crate::settings::CharacterSettings;
use crate::types::{Iso, Quat, Vec3, forward, iso};

use super::motor::{CharacterController, CharacterMotor};
use super::state::{CharacterInput, CharacterState, CrouchInput, Stance};

/// Visual-only pose of the body, eased toward the capsule every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyPose {
    /// Scale applied to the visual root; `y` tracks capsule height / stand height.
    pub root_scale: Vec3,
    /// Camera target position relative to the character origin.
    pub camera_target_offset: Vec3,
}

#[derive(Clone, Debug)]
pub struct MotionSolver {
    settings: CharacterSettings,

    state: CharacterState,
    last_state: CharacterState,
    temp_state: CharacterState,

    requested_rotation: Quat,
    requested_movement: Vec3,
    requested_jump: bool,
    requested_sustained_jump: bool,
    requested_crouch: bool,
    requested_air_crouch: bool,
    requested_sprint: bool,

    time_since_ungrounded: f32,
    time_since_jump_request: f32,
    ungrounded_jump: bool,

    /// Height last handed to the motor.
    capsule_height: f32,
    body: BodyPose,
}

impl MotionSolver {
    pub fn new(settings: CharacterSettings) -> Self {
        let body = BodyPose {
            root_scale: Vec3::new(1.0, 1.0, 1.0),
            camera_target_offset: Vec3::new(
                0.0,
                settings.stand_height * settings.stand_camera_target_height,
                0.0,
            ),
        };

        Self {
            settings,
            state: CharacterState::default(),
            last_state: CharacterState::default(),
            temp_state: CharacterState::default(),
            requested_rotation: Quat::identity(),
            requested_movement: Vec3::zeros(),
            requested_jump: false,
            requested_sustained_jump: false,
            requested_crouch: false,
            requested_air_crouch: false,
            requested_sprint: false,
            time_since_ungrounded: 0.0,
            time_since_jump_request: 0.0,
            ungrounded_jump: false,
            capsule_height: settings.stand_height,
            body,
        }
    }

    /// Reset to a standing character and give the motor the standing capsule.
    ///
    /// Call once before the first tick. Calling it again yields the same result.
    pub fn initialize(&mut self, motor: &mut dyn CharacterMotor) {
        self.state = CharacterState {
            stance: Stance::Stand,
            ..self.state
        };
        self.last_state = self.state;
        self.temp_state = self.state;

        let stand = self.settings.stand_height;
        motor.set_capsule_dimensions(self.settings.capsule_radius, stand, stand * 0.5);
        self.capsule_height = stand;

        debug!("character initialized: {}", self.state);
    }

    /// Latch the intent for the coming physics tick.
    pub fn update_input(&mut self, input: &CharacterInput) {
        self.requested_rotation = input.rotation;

        let local = Vec3::new(input.move_axis.x, 0.0, -input.move_axis.y);
        self.requested_movement = input.rotation * clamp_magnitude(local, 1.0);

        let was_requesting_jump = self.requested_jump;
        self.requested_jump = self.requested_jump || input.jump;
        if self.requested_jump && !was_requesting_jump {
            self.time_since_jump_request = 0.0;
        }
        self.requested_sustained_jump = input.jump_sustain;
        self.requested_sprint = input.sprint;

        let was_requesting_crouch = self.requested_crouch;
        self.requested_crouch = match input.crouch {
            CrouchInput::None => self.requested_crouch,
            CrouchInput::Toggle => !self.requested_crouch,
            CrouchInput::Hold(held) => held,
        };

        if self.requested_crouch && !was_requesting_crouch {
            self.requested_air_crouch = !self.state.grounded;
        } else if !self.requested_crouch && was_requesting_crouch {
            self.requested_air_crouch = false;
        }
    }

    /// Ease the visual body and camera target toward the current capsule.
    ///
    /// Purely cosmetic; runs at frame rate, outside the physics tick.
    pub fn update_body(&mut self, dt: f32) {
        let s = &self.settings;
        let height = self.capsule_height;
        let normalized_height = height / s.stand_height;
        let camera_fraction = match self.state.stance {
            Stance::Stand => s.stand_camera_target_height,
            Stance::Crouch | Stance::Slide => s.crouch_camera_target_height,
        };

        let root_target = Vec3::new(1.0, normalized_height, 1.0);
        let camera_target = Vec3::new(0.0, height * camera_fraction, 0.0);
        let t = exp_decay_factor(s.crouch_height_response, dt);

        self.body.camera_target_offset = self.body.camera_target_offset.lerp(&camera_target, t);
        self.body.root_scale = self.body.root_scale.lerp(&root_target, t);
    }

    /// Teleport the character, optionally dropping its velocity.
    pub fn set_position(&mut self, motor: &mut dyn CharacterMotor, position: Vec3, kill_velocity: bool) {
        motor.set_position(position);
        if kill_velocity {
            motor.set_base_velocity(Vec3::zeros());
        }
    }

    /// World pose of the point the camera follows.
    pub fn camera_target(&self, motor: &dyn CharacterMotor) -> Iso {
        self.camera_target_at(motor.transient_position(), motor.transient_rotation())
    }

    /// [`Self::camera_target`] for a character standing at `position` with `rotation`.
    pub fn camera_target_at(&self, position: Vec3, rotation: Quat) -> Iso {
        iso(position + rotation * self.body.camera_target_offset, rotation)
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn last_state(&self) -> CharacterState {
        self.last_state
    }

    pub fn settings(&self) -> &CharacterSettings {
        &self.settings
    }

    pub fn body(&self) -> BodyPose {
        self.body
    }

    pub fn is_crouch_requested(&self) -> bool {
        self.requested_crouch
    }

    pub fn is_jump_requested(&self) -> bool {
        self.requested_jump
    }

    pub fn is_sprint_requested(&self) -> bool {
        self.requested_sprint
    }

    fn set_crouch_capsule(&mut self, motor: &mut dyn CharacterMotor) {
        let radius = motor.capsule().radius;
        let height = self.settings.crouch_height;
        motor.set_capsule_dimensions(radius, height, height * 0.5);
        self.capsule_height = height;
    }

    fn set_stand_capsule(&mut self, motor: &mut dyn CharacterMotor) {
        let radius = motor.capsule().radius;
        let height = self.settings.stand_height;
        motor.set_capsule_dimensions(radius, height, height * 0.5);
        self.capsule_height = height;
    }

    fn grounded_velocity(&mut self, motor: &dyn CharacterMotor, mut velocity: Vec3, dt: f32) -> Vec3 {
        self.time_since_ungrounded = 0.0;
        self.ungrounded_jump = false;

        let s = self.settings;
        let ground_normal = motor.grounding().ground_normal;
        let intent_len = self.requested_movement.norm();
        let grounded_movement =
            motor.direction_tangent_to_surface(self.requested_movement, ground_normal) * intent_len;

        let moving = grounded_movement.norm_squared() > 0.0;
        let crouching = self.state.stance == Stance::Crouch;
        let was_standing = self.last_state.stance == Stance::Stand;
        let was_air = !self.last_state.grounded;

        if moving && crouching && (was_standing || was_air) {
            self.state.stance = Stance::Slide;

            if was_air {
                velocity = project_on_plane(self.last_state.velocity, ground_normal);
            }

            let mut start_speed = s.slide_start_speed;
            if was_air && !self.requested_air_crouch {
                start_speed = 0.0;
                self.requested_air_crouch = false;
            }

            let slide_speed = start_speed.max(velocity.norm());
            let mut direction = motor.direction_tangent_to_surface(velocity, ground_normal);
            if direction.norm_squared() <= DIRECTION_EPS_SQ {
                // Entered from rest: slide where the player is pushing.
                direction = normalize_or_zero(grounded_movement);
            }
            velocity = direction * slide_speed;

            debug!("slide start: speed={slide_speed:.2} from_air={was_air}");
        }

        match self.state.stance {
            Stance::Stand | Stance::Crouch => {
                let (speed, response) = match self.state.stance {
                    Stance::Stand if self.requested_sprint => (s.sprint_speed, s.walk_response),
                    Stance::Stand => (s.walk_speed, s.walk_response),
                    _ => (s.crouch_speed, s.crouch_response),
                };

                let target = grounded_movement * speed;
                let moved = velocity.lerp(&target, exp_decay_factor(response, dt));

                self.state.acceleration = (moved - velocity) / dt;
                moved
            }
            Stance::Slide => {
                velocity -= velocity * (s.slide_friction * dt).min(1.0);

                let slope_force = project_on_plane(-motor.character_up(), ground_normal) * s.slide_gravity;
                velocity -= slope_force * dt;

                // Steering turns the slide; it never adds speed.
                let speed = velocity.norm();
                let target = grounded_movement * speed;
                let steer_force = (target - velocity) * (s.slide_steer_accel * dt);
                let steered = clamp_magnitude(velocity + steer_force, speed);

                self.state.acceleration = (steered - velocity) / dt;

                if steered.norm() < s.slide_end_speed {
                    self.state.stance = Stance::Crouch;
                    debug!("slide end: speed={:.2}", steered.norm());
                }

                steered
            }
        }
    }

    fn airborne_velocity(&mut self, motor: &dyn CharacterMotor, mut velocity: Vec3, dt: f32) -> Vec3 {
        self.time_since_ungrounded += dt;

        let s = self.settings;
        let up = motor.character_up();

        if self.requested_movement.norm_squared() > 0.0 {
            let plane_velocity = project_on_plane(velocity, up);
            let plane_movement = project_on_plane(self.requested_movement, up) * self.requested_movement.norm();

            let mut movement_force = plane_movement * (s.air_accel * dt);

            if plane_velocity.norm() < s.air_speed {
                // Under the cap: accelerate, but not past it.
                let target_plane = clamp_magnitude(plane_velocity + movement_force, s.air_speed);
                movement_force = target_plane - plane_velocity;
            } else if plane_velocity.dot(&movement_force) > 0.0 {
                // Over the cap: only steer, never push further along the current heading.
                movement_force = project_on_plane(movement_force, normalize_or_zero(plane_velocity));
            }

            let grounding = motor.grounding();
            if grounding.found_any_ground && movement_force.dot(&(velocity + movement_force)) > 0.0 {
                // Don't drive into an unwalkable slope we are brushing against.
                let obstruction = normalize_or_zero(up.cross(&up.cross(&grounding.ground_normal)));
                movement_force = project_on_plane(movement_force, obstruction);
            }

            velocity += movement_force;
        }

        let mut gravity = s.gravity;
        let vertical_speed = velocity.dot(&up);
        if self.requested_sustained_jump && vertical_speed > 0.0 {
            gravity *= s.jump_sustain_gravity;
        }
        velocity += up * (gravity * dt);

        velocity
    }

    fn consume_jump(&mut self, motor: &mut dyn CharacterMotor, mut velocity: Vec3, dt: f32) -> Vec3 {
        if !self.requested_jump {
            return velocity;
        }

        let s = self.settings;
        let grounded = motor.grounding().is_stable_on_ground;
        let can_coyote_jump = self.time_since_ungrounded < s.coyote_time && !self.ungrounded_jump;

        if grounded || can_coyote_jump {
            self.requested_jump = false;
            self.requested_crouch = false;
            self.requested_air_crouch = false;

            motor.force_unground(0.0);
            self.ungrounded_jump = true;

            let up = motor.character_up();
            let vertical_speed = velocity.dot(&up);
            let target_vertical_speed = vertical_speed.max(s.jump_speed);
            velocity += up * (target_vertical_speed - vertical_speed);

            debug!("jump: grounded={grounded} vertical_speed={target_vertical_speed:.2}");
        } else {
            self.time_since_jump_request += dt;
            self.requested_jump = self.time_since_jump_request < s.coyote_time;
            if !self.requested_jump {
                debug!("jump request expired");
            }
        }

        velocity
    }
}

impl CharacterController for MotionSolver {
    fn before_update(&mut self, motor: &mut dyn CharacterMotor, _dt: f32) {
        self.temp_state = self.state;

        if self.requested_crouch && self.state.stance == Stance::Stand {
            self.state.stance = Stance::Crouch;
            self.set_crouch_capsule(motor);
            debug!("crouch");
        }
    }

    fn update_velocity(&mut self, motor: &mut dyn CharacterMotor, current: Vec3, dt: f32) -> Vec3 {
        self.state.acceleration = Vec3::zeros();
        if dt <= 0.0 {
            return current;
        }

        let velocity = if motor.grounding().is_stable_on_ground {
            self.grounded_velocity(motor, current, dt)
        } else {
            self.airborne_velocity(motor, current, dt)
        };

        let velocity = self.consume_jump(motor, velocity, dt);
        trace!("velocity: {current:?} -> {velocity:?} stance={}", self.state.stance);
        velocity
    }

    fn update_rotation(&mut self, motor: &dyn CharacterMotor, current: Quat, _dt: f32) -> Quat {
        let up = motor.character_up();
        let facing = project_on_plane(self.requested_rotation * forward(), up);

        if facing.norm_squared() > DIRECTION_EPS_SQ {
            // face_towards aims +Z; the character looks down -Z.
            Quat::face_towards(&-facing, &up)
        } else {
            current
        }
    }

    fn post_grounding_update(&mut self, motor: &dyn CharacterMotor, _dt: f32) {
        if !motor.grounding().is_stable_on_ground && self.state.stance == Stance::Slide {
            self.state.stance = Stance::Crouch;
            debug!("slide lost ground");
        }
    }

    fn after_update(&mut self, motor: &mut dyn CharacterMotor, _dt: f32) {
        if !self.requested_crouch && self.state.stance.is_low() {
            // The grown capsule must exist before the overlap query can judge it.
            self.set_stand_capsule(motor);

            let blocked = motor.character_overlap(motor.transient_position(), motor.transient_rotation()) > 0;
            if blocked {
                self.requested_crouch = true;
                self.set_crouch_capsule(motor);
                debug!("stand blocked, staying low");
            } else {
                self.state.stance = Stance::Stand;
                debug!("stand");
            }
        }

        self.state.grounded = motor.grounding().is_stable_on_ground;
        self.state.velocity = motor.velocity();
        self.last_state = self.temp_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_motor::{TestMotor, run_tick};
    use crate::types::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn solver_on_ground() -> (MotionSolver, TestMotor) {
        let mut solver = MotionSolver::new(CharacterSettings::default());
        let mut motor = TestMotor::grounded();
        solver.initialize(&mut motor);
        (solver, motor)
    }

    fn forward_input() -> CharacterInput {
        CharacterInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..CharacterInput::default()
        }
    }

    fn settle(solver: &mut MotionSolver, motor: &mut TestMotor, input: &CharacterInput, ticks: usize) {
        for _ in 0..ticks {
            solver.update_input(input);
            run_tick(solver, motor, DT);
        }
    }

    #[test]
    fn walk_response_matches_closed_form() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.base_velocity = Vec3::new(0.0, 0.0, 5.0);

        // Identity facing, pulling back on the stick: intent is +Z.
        solver.update_input(&CharacterInput {
            move_axis: Vec2::new(0.0, -1.0),
            ..CharacterInput::default()
        });
        let v = solver.update_velocity(&mut motor, Vec3::new(0.0, 0.0, 5.0), 0.02);

        let expected = 5.0 + (13.0 - 5.0) * (1.0 - (-10.0f32 * 0.02).exp());
        assert!((v.z - expected).abs() < 1.0e-4, "vz = {}", v.z);
        assert!((v.z - 6.4502).abs() < 1.0e-3);
        assert!(v.x.abs() < 1.0e-6 && v.y.abs() < 1.0e-6);

        let accel = solver.state().acceleration;
        assert!((accel.z - (expected - 5.0) / 0.02).abs() < 1.0e-2);
    }

    #[test]
    fn sprint_raises_target_speed_while_standing() {
        let (mut solver, mut motor) = solver_on_ground();
        let input = CharacterInput {
            sprint: true,
            ..forward_input()
        };
        settle(&mut solver, &mut motor, &input, 240);

        let speed = solver.state().velocity.norm();
        assert!((speed - solver.settings().sprint_speed).abs() < 1.0e-2, "speed = {speed}");
    }

    #[test]
    fn crouch_round_trip_keeps_velocity_and_stands() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 3);
        let before = motor.base_velocity;

        let toggle = CharacterInput {
            crouch: CrouchInput::Toggle,
            ..CharacterInput::default()
        };

        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule.height, solver.settings().crouch_height);

        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Stand);
        assert_eq!(motor.capsule.height, solver.settings().stand_height);
        assert_eq!(motor.base_velocity, before);
        assert_eq!(solver.state().velocity, before);
    }

    #[test]
    fn hold_crouch_follows_the_button() {
        let (mut solver, mut motor) = solver_on_ground();
        let held = CharacterInput {
            crouch: CrouchInput::Hold(true),
            ..CharacterInput::default()
        };
        settle(&mut solver, &mut motor, &held, 2);
        assert_eq!(solver.state().stance, Stance::Crouch);

        let released = CharacterInput {
            crouch: CrouchInput::Hold(false),
            ..CharacterInput::default()
        };
        settle(&mut solver, &mut motor, &released, 1);
        assert_eq!(solver.state().stance, Stance::Stand);
    }

    #[test]
    fn low_ceiling_keeps_character_crouched() {
        let (mut solver, mut motor) = solver_on_ground();
        let toggle = CharacterInput {
            crouch: CrouchInput::Toggle,
            ..CharacterInput::default()
        };

        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Crouch);

        motor.overlap_count = 1;
        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);

        assert_eq!(solver.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule.height, solver.settings().crouch_height);
        assert_eq!(motor.capsule.y_offset, solver.settings().crouch_height * 0.5);
        assert!(solver.is_crouch_requested());
        // The query ran against the standing capsule.
        assert_eq!(motor.last_overlap_height.get(), Some(solver.settings().stand_height));

        // Ceiling gone: the next release stands up.
        motor.overlap_count = 0;
        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Stand);
    }

    #[test]
    fn slide_decays_and_ends_in_crouch_once() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &forward_input(), 120);
        assert_eq!(solver.state().stance, Stance::Stand);

        let slide = CharacterInput {
            crouch: CrouchInput::Toggle,
            ..forward_input()
        };
        solver.update_input(&slide);
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Slide);
        let start_speed = solver.state().velocity.norm();
        // Boosted past walking speed, minus one tick of friction.
        assert!(start_speed > solver.settings().walk_speed, "speed = {start_speed}");

        let idle = CharacterInput::default();
        let mut previous_speed = start_speed;
        let mut slide_exits = 0;
        let mut previous_stance = Stance::Slide;

        for _ in 0..240 {
            solver.update_input(&idle);
            run_tick(&mut solver, &mut motor, DT);

            let state = solver.state();
            if previous_stance == Stance::Slide {
                assert!(state.velocity.norm() < previous_speed, "slide must lose speed");
            }
            if previous_stance == Stance::Slide && state.stance == Stance::Crouch {
                slide_exits += 1;
                assert!(state.velocity.norm() < solver.settings().slide_end_speed);
            }
            assert_ne!(
                (previous_stance, state.stance),
                (Stance::Crouch, Stance::Slide),
                "slide must not restart"
            );

            previous_speed = state.velocity.norm();
            previous_stance = state.stance;
        }

        assert_eq!(slide_exits, 1);
        assert_eq!(solver.state().stance, Stance::Crouch);
    }

    #[test]
    fn slide_ends_when_ground_is_lost() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &forward_input(), 60);
        solver.update_input(&CharacterInput {
            crouch: CrouchInput::Toggle,
            ..forward_input()
        });
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Slide);

        motor.set_airborne();
        solver.update_input(&CharacterInput::default());
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Crouch);
        assert!(!solver.state().grounded);
    }

    #[test]
    fn landing_with_air_crouch_slides_at_start_speed() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        motor.set_airborne();
        motor.base_velocity = Vec3::new(0.0, -5.0, -4.0);
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        // Crouch pressed mid-air arms the air crouch.
        solver.update_input(&CharacterInput {
            crouch: CrouchInput::Toggle,
            ..forward_input()
        });
        run_tick(&mut solver, &mut motor, DT);
        assert_eq!(solver.state().stance, Stance::Crouch);

        motor.set_grounded(Vec3::y());
        settle(&mut solver, &mut motor, &forward_input(), 1);
        assert_eq!(solver.state().stance, Stance::Slide);
        let speed = solver.state().velocity.norm();
        assert!(speed >= solver.settings().slide_start_speed - 1.0, "speed = {speed}");
    }

    #[test]
    fn landing_without_air_crouch_keeps_landing_speed() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);
        // Crouch on the ground, then drop off a ledge still crouched.
        let toggle = CharacterInput {
            crouch: CrouchInput::Toggle,
            ..CharacterInput::default()
        };
        solver.update_input(&toggle);
        run_tick(&mut solver, &mut motor, DT);
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        motor.set_airborne();
        motor.base_velocity = Vec3::new(0.0, -3.0, -4.0);
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);
        let landing = solver.state().velocity;

        motor.set_grounded(Vec3::y());
        settle(&mut solver, &mut motor, &forward_input(), 1);
        assert_eq!(solver.state().stance, Stance::Slide);

        // Started from the planar landing velocity, not the boosted start speed.
        let speed = solver.state().velocity.norm();
        let planar_landing = Vec3::new(landing.x, 0.0, landing.z).norm();
        assert!(speed < solver.settings().slide_start_speed);
        assert!(speed <= planar_landing + 1.0e-3, "speed = {speed}");
    }

    #[test]
    fn grounded_jump_sets_minimum_vertical_speed() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        solver.update_input(&CharacterInput {
            jump: true,
            ..CharacterInput::default()
        });
        run_tick(&mut solver, &mut motor, DT);

        assert!((motor.base_velocity.y - solver.settings().jump_speed).abs() < 1.0e-4);
        assert_eq!(motor.force_unground_calls, 1);
        assert!(!solver.is_jump_requested());
    }

    #[test]
    fn jump_never_reduces_upward_speed() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);
        motor.set_airborne();

        // Coyote jump while already rising faster than a jump would.
        solver.update_input(&CharacterInput {
            jump: true,
            ..CharacterInput::default()
        });
        let v = solver.update_velocity(&mut motor, Vec3::new(0.0, 40.0, 0.0), DT);
        let after_gravity = 40.0 + solver.settings().gravity * DT;
        assert!((v.y - after_gravity).abs() < 1.0e-4, "vy = {}", v.y);
        assert!(!solver.is_jump_requested());
    }

    #[test]
    fn coyote_jump_allowed_just_after_leaving_ground() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        motor.set_airborne();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 3);
        let before = motor.base_velocity.y;

        solver.update_input(&CharacterInput {
            jump: true,
            ..CharacterInput::default()
        });
        run_tick(&mut solver, &mut motor, DT);
        assert!(motor.base_velocity.y > before);
        assert!((motor.base_velocity.y - solver.settings().jump_speed).abs() < 1.0e-4);
    }

    #[test]
    fn no_jump_after_coyote_window() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        motor.set_airborne();
        let window_ticks = (solver.settings().coyote_time / DT).ceil() as usize + 1;
        settle(&mut solver, &mut motor, &CharacterInput::default(), window_ticks);

        solver.update_input(&CharacterInput {
            jump: true,
            ..CharacterInput::default()
        });
        for tick in 0..window_ticks {
            if tick > 0 {
                solver.update_input(&CharacterInput::default());
            }
            let before = motor.base_velocity.y;
            run_tick(&mut solver, &mut motor, DT);
            assert!(motor.base_velocity.y < before, "no upward velocity may be added");
        }

        // The request timed out on its own.
        assert!(!solver.is_jump_requested());
    }

    #[test]
    fn no_double_jump_before_landing() {
        let (mut solver, mut motor) = solver_on_ground();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);

        let jump = CharacterInput {
            jump: true,
            ..CharacterInput::default()
        };
        solver.update_input(&jump);
        run_tick(&mut solver, &mut motor, DT);
        assert!(!motor.grounding.is_stable_on_ground);

        settle(&mut solver, &mut motor, &CharacterInput::default(), 2);
        let before = motor.base_velocity.y;

        solver.update_input(&jump);
        run_tick(&mut solver, &mut motor, DT);
        assert!(motor.base_velocity.y < before);
        assert_eq!(motor.force_unground_calls, 1);
    }

    #[test]
    fn pending_jump_fires_on_landing_within_window() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.set_airborne();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 30);

        solver.update_input(&CharacterInput {
            jump: true,
            ..CharacterInput::default()
        });
        run_tick(&mut solver, &mut motor, DT);
        assert!(solver.is_jump_requested());

        motor.set_grounded(Vec3::y());
        motor.base_velocity = Vec3::zeros();
        settle(&mut solver, &mut motor, &CharacterInput::default(), 1);
        assert!((motor.base_velocity.y - solver.settings().jump_speed).abs() < 1.0e-4);
    }

    #[test]
    fn air_control_respects_air_speed() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.set_airborne();

        settle(&mut solver, &mut motor, &forward_input(), 120);
        let v = motor.base_velocity;
        let planar = Vec3::new(v.x, 0.0, v.z).norm();
        assert!(planar <= solver.settings().air_speed + 1.0e-3, "planar = {planar}");
        assert!(planar > solver.settings().air_speed - 1.0e-2);
    }

    #[test]
    fn air_control_scales_with_stick_and_pitch() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.set_airborne();
        let s = *solver.settings();
        let dt = 0.02;

        solver.update_input(&CharacterInput {
            move_axis: Vec2::new(0.0, 0.5),
            ..CharacterInput::default()
        });
        let v = solver.update_velocity(&mut motor, Vec3::zeros(), dt);
        let planar = Vec3::new(v.x, 0.0, v.z).norm();
        assert!((planar - 0.25 * s.air_accel * dt).abs() < 1.0e-5, "planar = {planar}");

        // Looking 60 degrees up halves the planar share of a full stick.
        let pitch = Quat::from_axis_angle(&Vec3::x_axis(), std::f32::consts::FRAC_PI_3);
        solver.update_input(&CharacterInput {
            rotation: pitch,
            move_axis: Vec2::new(0.0, 1.0),
            ..CharacterInput::default()
        });
        let v = solver.update_velocity(&mut motor, Vec3::zeros(), dt);
        let planar = Vec3::new(v.x, 0.0, v.z).norm();
        assert!((planar - 0.5 * s.air_accel * dt).abs() < 1.0e-5, "planar = {planar}");
    }

    #[test]
    fn air_control_over_cap_only_steers() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.set_airborne();
        motor.base_velocity = Vec3::new(0.0, 0.0, -20.0);

        settle(&mut solver, &mut motor, &forward_input(), 1);
        let v = motor.base_velocity;
        assert!((Vec3::new(v.x, 0.0, v.z).norm() - 20.0).abs() < 1.0e-3);
    }

    #[test]
    fn sustained_jump_softens_gravity_on_the_way_up() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.set_airborne();
        let s = *solver.settings();

        solver.update_input(&CharacterInput {
            jump_sustain: true,
            ..CharacterInput::default()
        });
        let held = solver.update_velocity(&mut motor, Vec3::new(0.0, 10.0, 0.0), DT);
        assert!((held.y - (10.0 + s.gravity * s.jump_sustain_gravity * DT)).abs() < 1.0e-4);

        solver.update_input(&CharacterInput::default());
        let released = solver.update_velocity(&mut motor, Vec3::new(0.0, 10.0, 0.0), DT);
        assert!((released.y - (10.0 + s.gravity * DT)).abs() < 1.0e-4);
    }

    #[test]
    fn zero_dt_leaves_velocity_alone() {
        let (mut solver, mut motor) = solver_on_ground();
        solver.update_input(&forward_input());
        let v = solver.update_velocity(&mut motor, Vec3::new(1.0, 2.0, 3.0), 0.0);
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(solver.state().acceleration, Vec3::zeros());
    }

    #[test]
    fn rotation_faces_camera_yaw_only() {
        let (mut solver, motor) = solver_on_ground();
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), -std::f32::consts::FRAC_PI_2);
        let pitch = Quat::from_axis_angle(&Vec3::x_axis(), 0.6);
        solver.update_input(&CharacterInput {
            rotation: yaw * pitch,
            ..CharacterInput::default()
        });

        let r = solver.update_rotation(&motor, Quat::identity(), DT);
        let facing = r * forward();
        // Turned right, level with the ground.
        assert!((facing - Vec3::x()).norm() < 1.0e-4, "facing = {facing:?}");
    }

    #[test]
    fn body_eases_toward_crouch_height() {
        let (mut solver, mut motor) = solver_on_ground();
        solver.update_input(&CharacterInput {
            crouch: CrouchInput::Toggle,
            ..CharacterInput::default()
        });
        run_tick(&mut solver, &mut motor, DT);

        for _ in 0..120 {
            solver.update_body(DT);
        }

        let s = solver.settings();
        let body = solver.body();
        assert!((body.root_scale.y - s.crouch_height / s.stand_height).abs() < 1.0e-3);
        let expected = s.crouch_height * s.crouch_camera_target_height;
        assert!((body.camera_target_offset.y - expected).abs() < 1.0e-3);
    }

    #[test]
    fn teleport_can_keep_or_kill_velocity() {
        let (mut solver, mut motor) = solver_on_ground();
        motor.base_velocity = Vec3::new(1.0, 0.0, 0.0);

        solver.set_position(&mut motor, Vec3::new(0.0, 5.0, 0.0), false);
        assert_eq!(motor.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(motor.base_velocity, Vec3::new(1.0, 0.0, 0.0));

        solver.set_position(&mut motor, Vec3::new(0.0, 6.0, 0.0), true);
        assert_eq!(motor.base_velocity, Vec3::zeros());
    }

    #[test]
    fn camera_target_sits_above_the_feet() {
        let (solver, mut motor) = solver_on_ground();
        motor.position = Vec3::new(1.0, 2.0, 3.0);

        let target = solver.camera_target(&motor);
        let s = solver.settings();
        let expected_y = 2.0 + s.stand_height * s.stand_camera_target_height;
        assert!((target.translation.vector.y - expected_y).abs() < 1.0e-5);
        assert!((target.translation.vector.x - 1.0).abs() < 1.0e-5);
    }
}
