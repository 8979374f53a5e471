use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Quat, Vec2, Vec3};

/// Locomotion mode of the character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Stand,
    Crouch,
    Slide,
}

impl Stance {
    /// Crouch and slide share the short capsule.
    #[inline]
    pub fn is_low(self) -> bool {
        !matches!(self, Stance::Stand)
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stance::Stand => "stand",
            Stance::Crouch => "crouch",
            Stance::Slide => "slide",
        };
        f.write_str(name)
    }
}

/// Per-tick snapshot of the character, read by the camera and any UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    pub grounded: bool,
    pub stance: Stance,
    pub velocity: Vec3,
    /// Velocity change per second produced by ground locomotion this tick.
    pub acceleration: Vec3,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            grounded: false,
            stance: Stance::Stand,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
        }
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grounded={} stance={} speed={:.2} accel={:.2}",
            self.grounded,
            self.stance,
            self.velocity.norm(),
            self.acceleration.norm()
        )
    }
}

/// How the crouch button is reported for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrouchInput {
    /// No change to the current crouch request.
    #[default]
    None,
    /// Flip the crouch request (press-to-toggle binding).
    Toggle,
    /// Crouch while the button is held (hold binding), reported every tick.
    Hold(bool),
}

/// Movement intent for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterInput {
    /// Facing the move axis is expressed in, usually the camera rotation.
    pub rotation: Quat,
    /// `x` strafes right, `y` moves forward. Clamped to unit length.
    pub move_axis: Vec2,
    /// Jump pressed this tick.
    pub jump: bool,
    /// Jump held.
    pub jump_sustain: bool,
    pub crouch: CrouchInput,
    pub sprint: bool,
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self {
            rotation: Quat::identity(),
            move_axis: Vec2::zeros(),
            jump: false,
            jump_sustain: false,
            crouch: CrouchInput::None,
            sprint: false,
        }
    }
}

/// Look input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    /// Raw look delta: `x` turns right, `y` looks up.
    pub look: Vec2,
}
