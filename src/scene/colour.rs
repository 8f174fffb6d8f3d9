use std::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// RGBA colour with straight (non-premultiplied) alpha.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0, 1.0);
    pub const ZERO: Colour = Colour::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn grey(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Scales the colour channels only; alpha is left untouched.
    pub fn scaled_rgb(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Mul for Colour {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
            self.a * rhs.a,
        )
    }
}

impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        Colour::new(
            self.r + rhs.r,
            self.g + rhs.g,
            self.b + rhs.b,
            self.a + rhs.a,
        )
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_rgb_leaves_alpha_untouched() {
        let c = Colour::new(0.5, 0.25, 1.0, 0.75).scaled_rgb(2.0);
        assert_eq!(c, Colour::new(1.0, 0.5, 2.0, 0.75));
    }

    #[test]
    fn modulate_is_component_wise() {
        let c = Colour::new(0.5, 0.5, 0.5, 1.0) * Colour::new(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Colour::new(0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn colour_is_16_bytes() {
        assert_eq!(std::mem::size_of::<Colour>(), 16);
    }
}
