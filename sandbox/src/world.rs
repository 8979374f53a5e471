//! Rapier query world for immutable level geometry.
//!
//! The sandbox never steps a dynamics simulation. It builds enough Rapier state
//! to run scene queries (ray casts, overlap tests) and the built-in
//! `KinematicCharacterController` against static colliders.
//!
//! Conventions
//! - Units are meters.
//! - Rotation is a unit quaternion.
//! - For planes, the normal is derived from the pose: `normal = rotation * +Y`,
//!   and `dist = dot(normal, translation) + offset_along_normal`.
//! - Every collider carries its definition id in `user_data`.

use locomotion::{ColliderId, Quat, Vec3};
use log::info;
use rapier3d::na::{Point3, Translation3};
use rapier3d::prelude::*;

/// Schema-agnostic definition of an immutable world collider.
#[derive(Clone, Debug)]
pub struct StaticWorldDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
}

impl StaticWorldDef {
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space), offset along its pose-derived normal.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },
}

/// Result of [`QueryWorld::raycast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub collider: ColliderId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// In-memory Rapier structures for scene queries and KCC against a static world.
pub struct QueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl QueryWorld {
    /// Build a query world from static collider definitions, sorted by `id` first.
    pub fn build(mut defs: Vec<StaticWorldDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.iter() {
            let pose = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(pose).build();
            let rb_handle = bodies.insert(rb);

            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only (no dynamics): fills the broad-phase BVH and narrow-phase graph.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        info!("built query world: {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Borrowed `QueryPipeline` for scene queries and the KCC.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Id stored on the collider behind `handle`.
    pub fn collider_id(&self, handle: ColliderHandle) -> Option<ColliderId> {
        self.colliders
            .get(handle)
            .map(|collider| ColliderId(collider.user_data as u64))
    }

    /// Closest hit along `direction` within `max_distance`.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.try_normalize(1.0e-6)?;
        let ray = Ray::new(Point3::from(origin), direction);

        let query_pipeline = self.query_pipeline(QueryFilter::default());
        let (handle, hit) = query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;

        Some(RayHit {
            collider: self.collider_id(handle)?,
            point: origin + direction * hit.time_of_impact,
            normal: hit.normal,
            distance: hit.time_of_impact,
        })
    }
}

/// Build a Rapier collider from a [`StaticWorldDef`].
///
/// The pose lives on the parent rigid-body, so shapes get an identity local
/// transform. Planes are the exception: their offset becomes a local shift along +Y.
fn collider_from_def(def: &StaticWorldDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane { offset_along_normal } => {
            // The parent pose supplies the rotation, so the local normal is +Y.
            ColliderBuilder::halfspace(Vector::y_axis()).translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY { radius, half_height } => ColliderBuilder::capsule_y(*half_height, *radius),
    };

    builder.user_data(def.id as u128).build()
}

/// Small obstacle course used by the headless driver and the integration tests.
///
/// - id 1: ground plane at `y = 0`
/// - id 2: low ceiling slab, underside at `y = 1.5`, over `z` in `[-14, -10]`
/// - id 3: wall at `x = 6`
/// - id 4: 0.25 m step at `z` in `[4, 6]`
/// - id 5: 20° ramp rising toward `+x` around `x = -8`
pub fn demo_course() -> Vec<StaticWorldDef> {
    vec![
        StaticWorldDef::new(1, Vec3::zeros(), ColliderShapeDef::Plane {
            offset_along_normal: 0.0,
        }),
        StaticWorldDef::new(2, Vec3::new(0.0, 1.75, -12.0), ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.25, 2.0),
        }),
        StaticWorldDef::new(3, Vec3::new(6.5, 1.5, 0.0), ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(0.5, 1.5, 20.0),
        }),
        StaticWorldDef::new(4, Vec3::new(0.0, 0.125, 5.0), ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.125, 1.0),
        }),
        StaticWorldDef::new(5, Vec3::new(-8.0, 0.0, 0.0), ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.2, 2.0),
        })
        .rotated(Quat::from_axis_angle(&Vector::z_axis(), 20f32.to_radians())),
    ]
}
