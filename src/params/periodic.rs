use std::f32::consts::TAU;

use glam::Vec4;

use crate::params::source::ParamSource;
use crate::time::TimeSource;

/// `t` wrapped into [0, period). A non-positive period yields 0 instead of a
/// division hazard.
pub fn wrapped_time(t: f32, period: f32) -> f32 {
    if period > 0.0 {
        t.rem_euclid(period)
    } else {
        0.0
    }
}

/// (t, sin t, cos t, tan t) in one value, so shaders evaluate the
/// transcendentals once per draw instead of once per use.
pub fn packed_trig(t: f32) -> Vec4 {
    Vec4::new(t, t.sin(), t.cos(), t.tan())
}

impl<'s> ParamSource<'s> {
    fn bound_time(&self) -> &'s dyn TimeSource {
        self.time
            .expect("time source must be bound before time queries")
    }

    /// Seconds since the bound clock started.
    pub fn time(&self) -> f32 {
        self.bound_time().elapsed_time()
    }

    pub fn time_0_x(&self, x: f32) -> f32 {
        wrapped_time(self.time(), x)
    }

    pub fn sin_time_0_x(&self, x: f32) -> f32 {
        self.time_0_x(x).sin()
    }

    pub fn cos_time_0_x(&self, x: f32) -> f32 {
        self.time_0_x(x).cos()
    }

    pub fn tan_time_0_x(&self, x: f32) -> f32 {
        self.time_0_x(x).tan()
    }

    pub fn time_0_x_packed(&self, x: f32) -> Vec4 {
        packed_trig(self.time_0_x(x))
    }

    /// Time wrapped to the period and normalized to [0, 1).
    pub fn time_0_1(&self, x: f32) -> f32 {
        if x > 0.0 {
            self.time_0_x(x) / x
        } else {
            0.0
        }
    }

    pub fn sin_time_0_1(&self, x: f32) -> f32 {
        self.time_0_1(x).sin()
    }

    pub fn cos_time_0_1(&self, x: f32) -> f32 {
        self.time_0_1(x).cos()
    }

    pub fn tan_time_0_1(&self, x: f32) -> f32 {
        self.time_0_1(x).tan()
    }

    pub fn time_0_1_packed(&self, x: f32) -> Vec4 {
        packed_trig(self.time_0_1(x))
    }

    /// Time wrapped to the period and scaled to [0, 2π).
    pub fn time_0_2pi(&self, x: f32) -> f32 {
        self.time_0_1(x) * TAU
    }

    pub fn sin_time_0_2pi(&self, x: f32) -> f32 {
        self.time_0_2pi(x).sin()
    }

    pub fn cos_time_0_2pi(&self, x: f32) -> f32 {
        self.time_0_2pi(x).cos()
    }

    pub fn tan_time_0_2pi(&self, x: f32) -> f32 {
        self.time_0_2pi(x).tan()
    }

    pub fn time_0_2pi_packed(&self, x: f32) -> Vec4 {
        packed_trig(self.time_0_2pi(x))
    }

    pub fn frame_time(&self) -> f32 {
        self.bound_time().frame_time()
    }

    pub fn fps(&self) -> f32 {
        self.bound_time().fps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::RenderBackend;
    use crate::time::ManualClock;

    #[test]
    fn wrapped_time_stays_in_range() {
        for &(t, period) in &[
            (0.0, 1.0),
            (0.999, 1.0),
            (1.0, 1.0),
            (17.35, 4.0),
            (1e6, 0.25),
        ] {
            let w = wrapped_time(t, period);
            assert!(
                (0.0..period).contains(&w),
                "wrapped({t}, {period}) = {w} out of range"
            );
        }
    }

    #[test]
    fn non_positive_periods_yield_zero() {
        assert_eq!(wrapped_time(3.0, 0.0), 0.0);
        assert_eq!(wrapped_time(3.0, -2.0), 0.0);
    }

    #[test]
    fn packed_variants_match_direct_calls() {
        let backend = RenderBackend::default();
        let clock = ManualClock::at(7.31);
        let mut source = ParamSource::new(&backend);
        source.set_time_source(&clock);

        for &x in &[1.0, 2.5, 10.0] {
            let p = source.time_0_x_packed(x);
            assert_eq!(p.x, source.time_0_x(x));
            assert_eq!(p.y, source.sin_time_0_x(x));
            assert_eq!(p.z, source.cos_time_0_x(x));
            assert_eq!(p.w, source.tan_time_0_x(x));

            let p = source.time_0_1_packed(x);
            assert_eq!(p.x, source.time_0_1(x));
            assert_eq!(p.y, source.sin_time_0_1(x));

            let p = source.time_0_2pi_packed(x);
            assert_eq!(p.x, source.time_0_2pi(x));
            assert!(p.x < TAU);
        }
    }

    #[test]
    fn frame_statistics_pass_through() {
        let backend = RenderBackend::default();
        let mut clock = ManualClock::at(0.0);
        clock.advance(0.02);
        let mut source = ParamSource::new(&backend);
        source.set_time_source(&clock);

        assert_eq!(source.frame_time(), 0.02);
        assert_eq!(source.fps(), 50.0);
        assert_eq!(source.time(), 0.02);
    }

    #[test]
    #[should_panic(expected = "time source must be bound")]
    fn querying_time_without_a_clock_panics() {
        let backend = RenderBackend::default();
        let source = ParamSource::new(&backend);
        let _ = source.time();
    }
}
