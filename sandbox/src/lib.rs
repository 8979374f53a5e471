//! Headless sandbox for the `locomotion` crate.
//!
//! Hosts a [`player::Player`] on a Rapier query world built from static
//! collider definitions, and drives it from scripted input.

pub mod config;
pub mod error;
pub mod kcc_settings;
pub mod motor;
pub mod player;
pub mod scenario;
pub mod world;

pub use config::SandboxConfig;
pub use error::{Result, SandboxError};
pub use kcc_settings::KccSettings;
pub use motor::{BoundMotor, RapierMotor};
pub use player::{Player, PlayerInput, TELEPORT_RANGE};
pub use scenario::{Scenario, ScriptStep};
pub use world::{ColliderShapeDef, QueryWorld, RayHit, StaticWorldDef, demo_course};
