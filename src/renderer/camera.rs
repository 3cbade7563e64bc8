//! Camera system for 3D rendering

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Perspective camera for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Direction the camera is looking at
    pub direction: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Camera {
    /// Create a camera at a specific position looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            direction: (target - position).normalize(),
            up,
            fov: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Builder style frustum setup
    #[must_use]
    pub fn with_frustum(mut self, fov: f32, near: f32, far: f32) -> Self {
        self.fov = fov;
        self.near = near;
        self.far = far;
        self
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the right vector
    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    /// Pixel to normalized device coordinates
    fn to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / viewport.x.max(1.0) * 2.0 - 1.0,
            1.0 - screen.y / viewport.y.max(1.0) * 2.0,
        )
    }

    /// Unit direction of the ray from the eye through a window pixel
    pub fn screen_ray(&self, screen: Vec2, viewport: Vec2) -> Vec3 {
        let ndc = Self::to_ndc(screen, viewport);
        let inverse = self.view_projection_matrix().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let near = near.xyz() / near.w;
        (near - self.position).normalize()
    }

    /// The point under a window pixel on the plane `z = plane_z`
    ///
    /// Rays parallel to the plane return the eye position.
    pub fn map_2d_point_to_z_plane(&self, screen: Vec2, viewport: Vec2, plane_z: f32) -> Vec3 {
        let dir = self.screen_ray(screen, viewport);
        if dir.z.abs() < f32::EPSILON {
            return self.position;
        }
        let t = (plane_z - self.position.z) / dir.z;
        self.position + dir * t
    }

    /// Window pixel of a world point, `None` behind the camera
    pub fn world_to_screen(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
    }
}
