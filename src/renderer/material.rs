//! Surface parameters for the lit pipeline

use glam::Vec4;

/// Material properties for rendering
///
/// Packed into every [`super::MeshInstance`] rather than bound per draw, so
/// bloks, balls and particles of different colors share one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color (RGBA)
    pub color: Vec4,
    /// Specular reflectivity (0.0 - 1.0)
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
    /// Strength of the edge grid that lights up on hits (0 disables it)
    pub grid: f32,
    /// Self illumination added on top of lighting
    pub emissive: f32,
}

impl Material {
    /// Create a new material with a color
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            specular: 0.5,
            shininess: 32.0,
            grid: 0.0,
            emissive: 0.0,
        }
    }

    /// Matte material with no highlight
    pub fn diffuse(color: Vec4) -> Self {
        Self {
            specular: 0.0,
            ..Self::new(color)
        }
    }

    /// Glossy material with a tight highlight
    pub fn shiny(color: Vec4) -> Self {
        Self {
            specular: 0.9,
            shininess: 64.0,
            ..Self::new(color)
        }
    }

    /// Level blok: pale metal with the hit grid
    pub fn blok() -> Self {
        Self {
            grid: 1.0,
            ..Self::new(Vec4::new(0.75, 0.78, 0.85, 1.0))
        }
    }

    /// Explosion debris, glowing in the ball's color
    pub fn debris(color: Vec4) -> Self {
        Self {
            emissive: 0.4,
            ..Self::new(color)
        }
    }

    /// Player pad, a darker tint of the player's color
    pub fn platform(color: Vec4) -> Self {
        Self::diffuse((color.truncate() * 0.35).extend(1.0))
    }

    /// Pause button bars
    pub fn pause() -> Self {
        Self {
            emissive: 0.6,
            ..Self::diffuse(Vec4::new(0.9, 0.9, 0.9, 1.0))
        }
    }

    /// `[grid, specular, shininess, emissive]` as the shader reads them
    #[must_use]
    pub fn params(&self) -> [f32; 4] {
        [self.grid, self.specular, self.shininess, self.emissive]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec4::new(0.8, 0.8, 0.8, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_bloks_carry_the_grid() {
        assert_eq!(Material::blok().params()[0], 1.0);
        assert_eq!(Material::shiny(Vec4::ONE).params()[0], 0.0);
        assert_eq!(Material::debris(Vec4::ONE).params()[3], 0.4);
    }

    #[test]
    fn test_platform_tint_keeps_alpha() {
        let m = Material::platform(Vec4::new(1.0, 0.25, 0.25, 1.0));
        assert!((m.color.x - 0.35).abs() < 1e-6);
        assert_eq!(m.color.w, 1.0);
        assert_eq!(m.specular, 0.0);
    }
}
