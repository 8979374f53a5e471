//! Player orchestrator: wires raw input through the camera, the motion solver
//! and the Rapier motor, then lets the camera follow the result.

use locomotion::types::forward;
use locomotion::{
    CameraInput, CameraRig, CapsuleDimensions, CharacterInput, CharacterState, CrouchInput, Iso, LeanPreset,
    MotionSolver, Vec2, Vec3,
};
use log::{debug, info};

use crate::config::SandboxConfig;
use crate::motor::RapierMotor;
use crate::world::QueryWorld;

/// Raw per-frame input, as a device layer would report it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    pub look: Vec2,
    pub move_axis: Vec2,
    /// Jump went down this frame.
    pub jump_pressed: bool,
    pub jump_held: bool,
    /// Crouch went down this frame (toggle binding).
    pub crouch_pressed: bool,
    pub sprint: bool,
    /// Teleport to wherever the camera is looking.
    pub teleport: bool,
}

/// How far the look-teleport ray reaches (meters).
pub const TELEPORT_RANGE: f32 = 500.0;

pub struct Player {
    world: QueryWorld,
    motor: RapierMotor,
    solver: MotionSolver,
    camera: CameraRig,
}

impl Player {
    pub fn new(config: &SandboxConfig, world: QueryWorld) -> Self {
        let character = config.character;
        let capsule = CapsuleDimensions::standing_on_origin(character.capsule_radius, character.stand_height);
        let mut motor = RapierMotor::new(config.kcc, config.spawn_position(), capsule);

        let mut solver = MotionSolver::new(character);
        solver.initialize(&mut motor.bind(&world));

        let mut camera = CameraRig::new(config.camera);
        camera.initialize(&solver.camera_target(&motor.bind(&world)));

        info!("player spawned at {:?}", motor.position());

        Self {
            world,
            motor,
            solver,
            camera,
        }
    }

    /// Advance one frame: look, intent, physics, then camera follow.
    pub fn tick(&mut self, input: &PlayerInput, dt: f32) {
        self.camera.update_rotation(&CameraInput { look: input.look });

        let character_input = CharacterInput {
            rotation: self.camera.rotation(),
            move_axis: input.move_axis,
            jump: input.jump_pressed,
            jump_sustain: input.jump_held,
            crouch: if input.crouch_pressed {
                CrouchInput::Toggle
            } else {
                CrouchInput::None
            },
            sprint: input.sprint,
        };
        self.solver.update_input(&character_input);
        self.solver.update_body(dt);

        if input.teleport {
            self.teleport_along_ray(TELEPORT_RANGE);
        }

        self.motor.simulate(&self.world, &mut self.solver, dt);

        let target = self.camera_target();
        let state = self.solver.state();
        let up = target.rotation * Vec3::y();
        let preset = LeanPreset::for_state(&state, self.solver.is_sprint_requested());

        self.camera.update_position(target.translation.vector);
        self.camera.spring_update(dt, up);
        self.camera.lean_update(dt, state.acceleration, up, preset);
    }

    /// Move the character's feet to `position` and stop it.
    pub fn teleport(&mut self, position: Vec3) {
        self.solver.set_position(&mut self.motor.bind(&self.world), position, true);
        debug!("teleported to {position:?}");
    }

    /// Teleport to the first surface along the camera's forward ray.
    pub fn teleport_along_ray(&mut self, max_distance: f32) -> Option<Vec3> {
        let origin = self.camera.position();
        let direction = self.camera.rotation() * forward();
        let hit = self.world.raycast(origin, direction, max_distance)?;

        self.teleport(hit.point);
        Some(hit.point)
    }

    pub fn state(&self) -> CharacterState {
        self.solver.state()
    }

    pub fn position(&self) -> Vec3 {
        self.motor.position()
    }

    pub fn camera_view(&self) -> Iso {
        self.camera.view()
    }

    pub fn camera_target(&self) -> Iso {
        self.solver
            .camera_target_at(self.motor.position(), self.motor.rotation())
    }

    pub fn solver(&self) -> &MotionSolver {
        &self.solver
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn motor(&self) -> &RapierMotor {
        &self.motor
    }

    /// One-line status for logs and overlays.
    pub fn state_text(&self) -> String {
        let p = self.motor.position();
        format!("{} pos=({:.2}, {:.2}, {:.2})", self.solver.state(), p.x, p.y, p.z)
    }
}
