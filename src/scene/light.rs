use glam::{Vec3, Vec4};

use crate::scene::colour::Colour;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// Distance attenuation: usable range plus constant/linear/quadratic falloff
/// coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub range: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const NONE: Attenuation = Attenuation {
        range: 0.0,
        constant: 0.0,
        linear: 0.0,
        quadratic: 0.0,
    };
}

#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub diffuse: Colour,
    pub specular: Colour,
    /// Multiplier applied to the colour channels for HDR pipelines.
    pub power_scale: f32,
    pub attenuation: Attenuation,
    /// Full inner cone angle in radians (spotlights only).
    pub inner_cone_angle: f32,
    /// Full outer cone angle in radians (spotlights only).
    pub outer_cone_angle: f32,
    pub spot_falloff: f32,
    pub casts_shadows: bool,
}

impl Light {
    /// Stand-in returned for light indices beyond the bound list: contributes
    /// nothing to shading, so shader-side light arrays can be populated without
    /// bounds checks.
    pub const BLANK: Light = Light {
        kind: LightKind::Point,
        position: Vec3::ZERO,
        direction: Vec3::ZERO,
        diffuse: Colour::BLACK,
        specular: Colour::BLACK,
        power_scale: 1.0,
        attenuation: Attenuation::NONE,
        inner_cone_angle: 0.0,
        outer_cone_angle: 0.0,
        spot_falloff: 0.0,
        casts_shadows: false,
    };

    pub fn directional(direction: Vec3, diffuse: Colour, specular: Colour) -> Self {
        Self {
            kind: LightKind::Directional,
            direction: direction.normalize(),
            diffuse,
            specular,
            ..Self::BLANK
        }
    }

    pub fn point(position: Vec3, diffuse: Colour, specular: Colour, attenuation: Attenuation) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            diffuse,
            specular,
            attenuation,
            ..Self::BLANK
        }
    }

    pub fn spot(
        position: Vec3,
        direction: Vec3,
        diffuse: Colour,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
        falloff: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction: direction.normalize(),
            diffuse,
            specular: diffuse,
            inner_cone_angle,
            outer_cone_angle,
            spot_falloff: falloff,
            ..Self::BLANK
        }
    }

    /// Homogeneous shader representation: directional lights become the vector
    /// *towards* the light with w = 0, positional lights their position with
    /// w = 1.
    pub fn as_4d_vector(&self) -> Vec4 {
        match self.kind {
            LightKind::Directional => (-self.direction).extend(0.0),
            LightKind::Point | LightKind::Spot => self.position.extend(1.0),
        }
    }
}

/// Hemisphere ambient term: upper/lower colours blended along a direction.
#[derive(Clone, Copy, Debug)]
pub struct AmbientLight {
    pub hemispheres: [Colour; 2],
    pub hemisphere_dir: Vec3,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            hemispheres: [Colour::BLACK, Colour::BLACK],
            hemisphere_dir: Vec3::Y,
        }
    }
}
