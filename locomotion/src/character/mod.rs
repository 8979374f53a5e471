pub mod motor;
pub mod solver;
pub mod state;

#[cfg(test)]
pub(crate) mod test_motor;

pub use motor::{
    CapsuleDimensions, CharacterController, CharacterMotor, ColliderId, GroundingReport, HitStabilityReport,
    MotorHit,
};
pub use solver::{BodyPose, MotionSolver};
pub use state::{CameraInput, CharacterInput, CharacterState, CrouchInput, Stance};
