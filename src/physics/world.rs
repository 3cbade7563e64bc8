//! Physics simulation using rapier3d
//!
//! Gravity is zero: the black hole pull is a per-ball force the session
//! applies before every substep.

use glam::{Quat, Vec3};
use rapier3d::na::{self, UnitQuaternion};
use rapier3d::prelude::*;
use smallvec::SmallVec;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Which kind of game object a collider belongs to
///
/// | Kind      | Collides with                     |
/// |-----------|-----------------------------------|
/// | Ball      | Ball, BlackHole, Blok, Platform   |
/// | Blok      | Ball, BlackHole                   |
/// | BlackHole | Ball                              |
/// | Platform  | Ball                              |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    Ball,
    Blok,
    BlackHole,
    Platform,
}

impl CollisionKind {
    fn membership(self) -> Group {
        match self {
            Self::Ball => Group::GROUP_1,
            Self::Blok => Group::GROUP_2,
            Self::BlackHole => Group::GROUP_3,
            Self::Platform => Group::GROUP_4,
        }
    }

    fn filter(self) -> Group {
        match self {
            Self::Ball => Group::GROUP_1 | Group::GROUP_2 | Group::GROUP_3 | Group::GROUP_4,
            Self::Blok => Group::GROUP_1 | Group::GROUP_3,
            Self::BlackHole | Self::Platform => Group::GROUP_1,
        }
    }

    /// Interaction groups for colliders of this kind
    pub fn groups(self) -> InteractionGroups {
        InteractionGroups::new(self.membership(), self.filter())
    }
}

/// Settings for a new dynamic body
#[derive(Debug, Clone, Copy)]
pub struct BodyOptions {
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Only rotation is simulated
    pub lock_translations: bool,
    pub can_sleep: bool,
    pub ccd: bool,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            linear_damping: 0.0,
            angular_damping: 0.0,
            lock_translations: false,
            can_sleep: true,
            ccd: false,
        }
    }
}

impl BodyOptions {
    #[must_use]
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    #[must_use]
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    #[must_use]
    pub fn with_locked_translations(mut self) -> Self {
        self.lock_translations = true;
        self
    }

    #[must_use]
    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    #[must_use]
    pub fn with_ccd(mut self, ccd: bool) -> Self {
        self.ccd = ccd;
        self
    }
}

/// Settings for a new collider
#[derive(Debug, Clone, Copy)]
pub struct ColliderOptions {
    pub kind: CollisionKind,
    /// Collider mass; `None` keeps rapier's default density
    pub mass: Option<f32>,
    pub restitution: f32,
    /// Usually an entity packed with `ecs::entity_to_user_data`
    pub user_data: u128,
}

impl ColliderOptions {
    pub fn new(kind: CollisionKind) -> Self {
        Self {
            kind,
            mass: None,
            restitution: 0.0,
            user_data: 0,
        }
    }

    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    #[must_use]
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, user_data: u128) -> Self {
        self.user_data = user_data;
        self
    }

    fn apply(self, builder: ColliderBuilder) -> ColliderBuilder {
        let builder = builder
            .restitution(self.restitution)
            .collision_groups(self.kind.groups())
            .user_data(self.user_data);
        match self.mass {
            Some(mass) => builder.mass(mass),
            None => builder,
        }
    }
}

/// One touching point between two colliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
    /// World-space position
    pub point: Vec3,
    /// World-space normal pointing from `collider_a` toward `collider_b`
    pub normal: Vec3,
}

/// First collider along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub collider: ColliderHandle,
    /// World-space hit point
    pub point: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<f32> {
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

fn to_glam(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Physics world manager
pub struct Physics {
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Refreshed by every `step`
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create an empty world without gravity
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &Vector::zeros(),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .position(isometry(position, rotation))
            .build();
        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a dynamic rigid body (affected by forces)
    pub fn create_dynamic_body(
        &mut self,
        position: Vec3,
        rotation: Quat,
        options: BodyOptions,
    ) -> RigidBodyHandle {
        let mut builder = RigidBodyBuilder::dynamic()
            .position(isometry(position, rotation))
            .linear_damping(options.linear_damping)
            .angular_damping(options.angular_damping)
            .can_sleep(options.can_sleep)
            .ccd_enabled(options.ccd);
        if options.lock_translations {
            builder = builder.lock_translations();
        }
        RigidBodyHandle(self.rigid_body_set.insert(builder.build()))
    }

    fn attach(&mut self, body: RigidBodyHandle, collider: Collider) -> ColliderHandle {
        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a box collider placed relative to its body
    pub fn add_cuboid_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec3,
        local_position: Vec3,
        local_rotation: Quat,
        options: ColliderOptions,
    ) -> ColliderHandle {
        let builder = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(isometry(local_position, local_rotation));
        self.attach(body, options.apply(builder).build())
    }

    /// Add a sphere collider centered on its body
    pub fn add_ball_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
        options: ColliderOptions,
    ) -> ColliderHandle {
        let builder = ColliderBuilder::ball(radius);
        self.attach(body, options.apply(builder).build())
    }

    /// Add an infinite plane through the body origin. Everything behind
    /// `normal` is solid.
    pub fn add_halfspace_collider(
        &mut self,
        body: RigidBodyHandle,
        normal: Vec3,
        options: ColliderOptions,
    ) -> ColliderHandle {
        let normal = na::Unit::new_normalize(vector![normal.x, normal.y, normal.z]);
        let builder = ColliderBuilder::halfspace(normal);
        self.attach(body, options.apply(builder).build())
    }

    /// Detach and drop a collider. The parent's mass properties are
    /// recomputed from the colliders that remain.
    pub fn remove_collider(&mut self, collider: ColliderHandle) -> bool {
        self.collider_set
            .remove(
                collider.0,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            )
            .is_some()
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.rigid_body_set.remove(
            body.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of colliders still attached to a body
    pub fn collider_count(&self, body: RigidBodyHandle) -> usize {
        self.rigid_body_set
            .get(body.0)
            .map_or(0, |rb| rb.colliders().len())
    }

    /// Data stored on a collider at creation
    pub fn collider_user_data(&self, collider: ColliderHandle) -> Option<u128> {
        self.collider_set.get(collider.0).map(|c| c.user_data)
    }

    /// Body a collider is attached to
    pub fn collider_parent(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.collider_set
            .get(collider.0)
            .and_then(Collider::parent)
            .map(RigidBodyHandle)
    }

    pub fn collider_kind(&self, collider: ColliderHandle) -> Option<CollisionKind> {
        let membership = self.collider_set.get(collider.0)?.collision_groups().memberships;
        [
            CollisionKind::Ball,
            CollisionKind::Blok,
            CollisionKind::BlackHole,
            CollisionKind::Platform,
        ]
        .into_iter()
        .find(|kind| membership == kind.membership())
    }

    /// Get the position of a rigid body
    pub fn position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| to_glam(rb.translation()))
    }

    /// Get the rotation of a rigid body
    pub fn rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| rapier_to_quat(rb.rotation()))
    }

    /// Linear velocity in units per second
    pub fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| to_glam(rb.linvel()))
    }

    /// Angular velocity in radians per second around each world axis
    pub fn angular_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| to_glam(rb.angvel()))
    }

    /// Transform a world point into the body's local frame
    pub fn world_to_local(&self, body: RigidBodyHandle, point: Vec3) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let local = rb
                .position()
                .inverse_transform_point(&point![point.x, point.y, point.z]);
            Vec3::new(local.x, local.y, local.z)
        })
    }

    /// Clear forces accumulated on a body
    pub fn reset_forces(&mut self, body: RigidBodyHandle) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.reset_forces(true);
        }
    }

    /// Apply a force to a dynamic body until the next `reset_forces`
    pub fn add_force(&mut self, body: RigidBodyHandle, force: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    /// Apply an impulse to a dynamic body
    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    pub fn set_linear_damping(&mut self, body: RigidBodyHandle, damping: f32) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_linear_damping(damping);
        }
    }

    /// Set the angular velocity of a body
    pub fn set_angular_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_angvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Every touching point found by the last step
    pub fn contacts(&self) -> SmallVec<[ContactPoint; 16]> {
        let mut out = SmallVec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            for manifold in &pair.manifolds {
                let normal = to_glam(&manifold.data.normal);
                for contact in &manifold.data.solver_contacts {
                    out.push(ContactPoint {
                        collider_a: ColliderHandle(pair.collider1),
                        collider_b: ColliderHandle(pair.collider2),
                        point: Vec3::new(contact.point.x, contact.point.y, contact.point.z),
                        normal,
                    });
                }
            }
        }
        out
    }

    /// Cast a ray against every collider, up to `max_distance` along the
    /// normalized `direction`. Sees the world as of the last `step`.
    pub fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                QueryFilter::default(),
            )
            .map(|(handle, distance)| RayHit {
                collider: ColliderHandle(handle),
                point: origin + direction * distance,
                distance,
            })
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn ball_over_plane(physics: &mut Physics, height: f32) -> (RigidBodyHandle, ColliderHandle) {
        let ball = physics.create_dynamic_body(
            Vec3::new(0.0, 0.0, height),
            Quat::IDENTITY,
            BodyOptions::default().with_can_sleep(false),
        );
        physics.add_ball_collider(
            ball,
            0.5,
            ColliderOptions::new(CollisionKind::Ball).with_mass(5.0),
        );
        let ground = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        let plane = physics.add_halfspace_collider(
            ground,
            Vec3::Z,
            ColliderOptions::new(CollisionKind::BlackHole).with_user_data(42),
        );
        (ball, plane)
    }

    #[test]
    fn test_no_gravity() {
        let mut physics = Physics::new();
        let (ball, _) = ball_over_plane(&mut physics, 10.0);
        for _ in 0..30 {
            physics.step(DT);
        }
        let pos = physics.position(ball).unwrap();
        assert!((pos.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_force_pulls_into_halfspace_contact() {
        let mut physics = Physics::new();
        let (ball, plane) = ball_over_plane(&mut physics, 3.0);

        let mut touched = false;
        for _ in 0..240 {
            physics.reset_forces(ball);
            physics.add_force(ball, Vec3::new(0.0, 0.0, -50.0));
            physics.step(DT);
            if physics
                .contacts()
                .iter()
                .any(|c| c.collider_a == plane || c.collider_b == plane)
            {
                touched = true;
                break;
            }
        }
        assert!(touched);
        assert_eq!(physics.collider_user_data(plane), Some(42));
        assert_eq!(physics.collider_kind(plane), Some(CollisionKind::BlackHole));
    }

    #[test]
    fn test_bloks_ignore_each_other() {
        let groups_a = CollisionKind::Blok.groups();
        assert!(!groups_a.test(CollisionKind::Blok.groups()));
        assert!(!groups_a.test(CollisionKind::Platform.groups()));
        assert!(groups_a.test(CollisionKind::Ball.groups()));
        assert!(groups_a.test(CollisionKind::BlackHole.groups()));
        assert!(CollisionKind::Ball.groups().test(CollisionKind::Ball.groups()));
        assert!(!CollisionKind::BlackHole.groups().test(CollisionKind::Platform.groups()));
    }

    #[test]
    fn test_locked_translation_only_spins() {
        let mut physics = Physics::new();
        let body = physics.create_dynamic_body(
            Vec3::new(0.0, 0.0, 70.0),
            Quat::IDENTITY,
            BodyOptions::default().with_locked_translations(),
        );
        physics.add_cuboid_collider(
            body,
            Vec3::splat(1.0),
            Vec3::new(2.0, 0.0, 0.0),
            Quat::IDENTITY,
            ColliderOptions::new(CollisionKind::Blok).with_mass(1.0),
        );
        physics.add_cuboid_collider(
            body,
            Vec3::splat(1.0),
            Vec3::new(-2.0, 0.0, 0.0),
            Quat::IDENTITY,
            ColliderOptions::new(CollisionKind::Blok).with_mass(1.0),
        );
        physics.apply_impulse(body, Vec3::new(100.0, 0.0, 0.0));
        physics.set_angular_velocity(body, Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..10 {
            physics.step(DT);
        }

        assert!((physics.position(body).unwrap() - Vec3::new(0.0, 0.0, 70.0)).length() < 1e-4);
        assert!(physics.angular_velocity(body).unwrap().z > 0.5);
        assert_eq!(physics.collider_count(body), 2);
    }

    #[test]
    fn test_remove_collider_and_local_transform() {
        let mut physics = Physics::new();
        let body = physics.create_dynamic_body(
            Vec3::new(0.0, 0.0, 5.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            BodyOptions::default(),
        );
        let collider = physics.add_cuboid_collider(
            body,
            Vec3::splat(0.5),
            Vec3::ZERO,
            Quat::IDENTITY,
            ColliderOptions::new(CollisionKind::Blok),
        );

        let local = physics
            .world_to_local(body, Vec3::new(0.0, 1.0, 5.0))
            .unwrap();
        assert!((local - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(physics.collider_parent(collider), Some(body));

        assert!(physics.remove_collider(collider));
        assert!(!physics.remove_collider(collider));
        assert_eq!(physics.collider_count(body), 0);
    }

    #[test]
    fn test_velocity_after_impulse() {
        let mut physics = Physics::new();
        let (ball, _) = ball_over_plane(&mut physics, 10.0);
        physics.step(DT);
        assert_eq!(physics.linear_velocity(ball), Some(Vec3::ZERO));

        physics.apply_impulse(ball, Vec3::new(5.0, 0.0, 0.0));
        let velocity = physics.linear_velocity(ball).unwrap();
        // Ball mass is 5
        assert!((velocity - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_cast_ray_hits_nearest_collider() {
        let mut physics = Physics::new();
        let (_, plane) = ball_over_plane(&mut physics, 10.0);
        physics.step(DT);

        let hit = physics
            .cast_ray(Vec3::new(0.0, 0.0, 30.0), Vec3::NEG_Z, 100.0)
            .unwrap();
        assert!((hit.distance - 19.5).abs() < 1e-3);
        assert!((hit.point.z - 10.5).abs() < 1e-3);
        assert_ne!(hit.collider, plane);

        // Beside the ball only the black hole plane is in the way
        let hit = physics
            .cast_ray(Vec3::new(5.0, 0.0, 30.0), Vec3::NEG_Z, 100.0)
            .unwrap();
        assert_eq!(hit.collider, plane);
        assert!(physics.cast_ray(Vec3::new(5.0, 0.0, 30.0), Vec3::Z, 100.0).is_none());
    }
}
