use glam::{Mat4, Vec2, Vec4};

use crate::settings::{
    ClipRangeSetting, DepthModeSetting, OrientationSetting, PipelineSettings,
};

/// How the depth buffer is interpreted by the active graphics API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthMode {
    /// Near maps to the low end of the clip range.
    Standard,
    /// Near maps to 1, far to 0 (reverse-z).
    Reverse,
}

/// Clip-space depth interval produced by converted projection matrices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipRange {
    ZeroToOne,
    NegativeOneToOne,
}

/// Rotation applied to presentation on platforms whose natural orientation
/// differs from the window's (rotated displays).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationMode {
    Natural,
    Degree90,
    Degree180,
    Degree270,
}

impl OrientationMode {
    pub fn angle_radians(self) -> f32 {
        use std::f32::consts::FRAC_PI_2;
        match self {
            OrientationMode::Natural => 0.0,
            OrientationMode::Degree90 => FRAC_PI_2,
            OrientationMode::Degree180 => 2.0 * FRAC_PI_2,
            OrientationMode::Degree270 => 3.0 * FRAC_PI_2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Backbuffer,
    Offscreen,
}

/// Descriptor of the render target a pass draws into, as far as parameter
/// resolution is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub requires_texture_flipping: bool,
}

/// Immutable facts about the graphics back end that parameter resolution needs:
/// depth and clip conventions, display orientation, and target flipping rules.
/// Built once from `PipelineSettings` and injected into every `ParamSource`.
#[derive(Clone, Copy, Debug)]
pub struct RenderBackend {
    depth_mode: DepthMode,
    clip_range: ClipRange,
    orientation: OrientationMode,
    flip_offscreen_targets: bool,
}

impl RenderBackend {
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let depth_mode = match settings.depth_mode {
            DepthModeSetting::Standard => DepthMode::Standard,
            DepthModeSetting::Reverse => DepthMode::Reverse,
        };
        let clip_range = match settings.clip_range {
            ClipRangeSetting::ZeroToOne => ClipRange::ZeroToOne,
            ClipRangeSetting::NegativeOneToOne => ClipRange::NegativeOneToOne,
        };
        let orientation = match settings.orientation {
            OrientationSetting::Natural => OrientationMode::Natural,
            OrientationSetting::Rotate90 => OrientationMode::Degree90,
            OrientationSetting::Rotate180 => OrientationMode::Degree180,
            OrientationSetting::Rotate270 => OrientationMode::Degree270,
        };
        Self {
            depth_mode,
            clip_range,
            orientation,
            flip_offscreen_targets: settings.flip_offscreen_targets,
        }
    }

    pub fn is_reverse_depth(&self) -> bool {
        self.depth_mode == DepthMode::Reverse
    }

    pub fn orientation(&self) -> OrientationMode {
        self.orientation
    }

    /// Rewrites an API-independent projection matrix (clip z in [-1, 1]) into
    /// this back end's depth convention.
    pub fn convert_projection(&self, m: Mat4) -> Mat4 {
        let r2 = m.row(2);
        let r3 = m.row(3);
        let depth_row = match (self.clip_range, self.depth_mode) {
            (ClipRange::NegativeOneToOne, DepthMode::Standard) => r2,
            (ClipRange::NegativeOneToOne, DepthMode::Reverse) => -r2,
            (ClipRange::ZeroToOne, DepthMode::Standard) => (r2 + r3) * 0.5,
            (ClipRange::ZeroToOne, DepthMode::Reverse) => (r3 - r2) * 0.5,
        };
        from_rows(m.row(0), m.row(1), depth_row, r3)
    }

    /// Depth interval shaders should expect after projection: (near, far) ends
    /// of the clip range.
    pub fn depth_range(&self) -> Vec2 {
        if self.is_reverse_depth() {
            Vec2::new(1.0, 0.0)
        } else {
            match self.clip_range {
                ClipRange::NegativeOneToOne => Vec2::new(-1.0, 1.0),
                ClipRange::ZeroToOne => Vec2::new(0.0, 1.0),
            }
        }
    }

    pub fn target_descriptor(&self, kind: TargetKind) -> RenderTargetDesc {
        RenderTargetDesc {
            requires_texture_flipping: self.flip_offscreen_targets
                && kind == TargetKind::Offscreen,
        }
    }
}

impl Default for RenderBackend {
    fn default() -> Self {
        Self::from_settings(&PipelineSettings::default())
    }
}

pub(crate) fn from_rows(r0: Vec4, r1: Vec4, r2: Vec4, r3: Vec4) -> Mat4 {
    Mat4::from_cols(r0, r1, r2, r3).transpose()
}

pub(crate) fn negate_row(m: Mat4, row: usize) -> Mat4 {
    let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];
    from_rows(
        if row == 0 { -rows[0] } else { rows[0] },
        if row == 1 { -rows[1] } else { rows[1] },
        if row == 2 { -rows[2] } else { rows[2] },
        if row == 3 { -rows[3] } else { rows[3] },
    )
}
