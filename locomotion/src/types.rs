/*!
Math aliases shared by the character and camera modules.

Conventions
- Right-handed, `+Y` up, `-Z` forward, `+X` right.
- Distances in meters, time in seconds, angles in degrees at the API surface.
*/

use nalgebra as na;

pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Local forward (`-Z`).
#[inline]
pub fn forward() -> Vec3 {
    -Vec3::z()
}

/// Build an isometry from a translation vector and rotation.
#[inline]
pub fn iso(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(na::Translation3::from(translation), rotation)
}
