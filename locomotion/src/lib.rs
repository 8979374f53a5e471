pub mod camera;
pub mod character;
pub mod constants;
pub mod math;
pub mod settings;
pub mod spring;
pub mod types;

pub use camera::{CameraRig, LeanPreset};
pub use character::{
    BodyPose, CameraInput, CapsuleDimensions, CharacterController, CharacterInput, CharacterMotor, CharacterState,
    ColliderId, CrouchInput, GroundingReport, HitStabilityReport, MotionSolver, MotorHit, Stance,
};
pub use settings::{CameraSettings, CharacterSettings, LeanPresets};
pub use types::{Iso, Quat, Vec2, Vec3};
