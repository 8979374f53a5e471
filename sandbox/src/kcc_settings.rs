use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use serde::{Deserialize, Serialize};

/// Kinematic Character Controller (KCC) settings for the Rapier-backed motor.
///
/// Notes
/// - Values are expressed in meters, seconds, and degrees (converted to radians at runtime).
/// - Autostep and snap-to-ground are always enabled; snapping is skipped for a
///   tick whenever the character asks to be ungrounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KccSettings {
    /// Small gap preserved between the character and its surroundings (meters).
    /// Keep `offset` small but non-zero for numerical stability
    pub offset: f32,

    /// Maximum climbable slope angle (degrees). Also the stability limit of the ground probe.
    pub max_slope_climb_deg: f32,

    /// Minimum slope angle (degrees) before automatic sliding starts.
    pub min_slope_slide_deg: f32,

    /// Autostep maximum height (meters).
    pub autostep_max_height: f32,

    /// Autostep minimum width (meters).
    pub autostep_min_width: f32,

    /// Whether the controller should slide against obstacles.
    pub slide: bool,

    /// Increase if the character gets stuck when sliding (small, meters).
    pub normal_nudge_factor: f32,

    /// Snap-to-ground distance (meters).
    pub snap_to_ground: f32,

    /// How far below the feet the ground probe looks (meters).
    pub ground_probe_distance: f32,

    /// Small downward bias magnitude (m/s) applied while grounded to satisfy snap-to-ground preconditions.
    pub grounded_down_bias_mps: f32,
}

impl Default for KccSettings {
    fn default() -> Self {
        Self {
            offset: 0.02,
            max_slope_climb_deg: 52.0,
            min_slope_slide_deg: 45.0,
            autostep_max_height: 0.325,
            autostep_min_width: 0.2,
            slide: true,
            normal_nudge_factor: 0.05,
            snap_to_ground: 0.3,
            ground_probe_distance: 0.1,
            grounded_down_bias_mps: 1.75,
        }
    }
}

impl KccSettings {
    pub fn controller(&self) -> KinematicCharacterController {
        KinematicCharacterController {
            offset: CharacterLength::Absolute(self.offset),
            max_slope_climb_angle: self.max_slope_climb_deg.to_radians(),
            min_slope_slide_angle: self.min_slope_slide_deg.to_radians(),
            snap_to_ground: Some(CharacterLength::Absolute(self.snap_to_ground)),
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(self.autostep_max_height),
                min_width: CharacterLength::Absolute(self.autostep_min_width),
                include_dynamic_bodies: false,
            }),
            slide: self.slide,
            normal_nudge_factor: self.normal_nudge_factor,
            ..KinematicCharacterController::default()
        }
    }

    /// Smallest `normal.y` of ground the character can stand on.
    #[inline]
    pub fn min_ground_normal_y(&self) -> f32 {
        self.max_slope_climb_deg.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_mirrors_settings() {
        let settings = KccSettings::default();
        let kcc = settings.controller();
        assert!((kcc.max_slope_climb_angle - 52f32.to_radians()).abs() < 1.0e-6);
        assert!(kcc.snap_to_ground.is_some());
        assert!(kcc.autostep.is_some());
        assert!(kcc.slide);
    }

    #[test]
    fn flat_ground_is_walkable() {
        let settings = KccSettings::default();
        assert!(1.0 >= settings.min_ground_normal_y());
        assert!(60f32.to_radians().cos() < settings.min_ground_normal_y());
    }
}
