use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default)]
    pub depth_mode: DepthModeSetting,
    #[serde(default)]
    pub clip_range: ClipRangeSetting,
    #[serde(default)]
    pub orientation: OrientationSetting,
    #[serde(default)]
    pub flip_offscreen_targets: bool,
    #[serde(default = "PipelineSettings::default_shadow_extrusion_distance")]
    pub shadow_extrusion_distance: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            depth_mode: DepthModeSetting::default(),
            clip_range: ClipRangeSetting::default(),
            orientation: OrientationSetting::default(),
            flip_offscreen_targets: false,
            shadow_extrusion_distance: Self::default_shadow_extrusion_distance(),
        }
    }
}

impl PipelineSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<PipelineSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded pipeline settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default pipeline settings.",
                        path, err
                    );
                    PipelineSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Pipeline settings file {:?} not found. Using default settings.",
                    path
                );
                PipelineSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default pipeline settings.",
                    path, err
                );
                PipelineSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.depth_mode == DepthModeSetting::Reverse
            && self.clip_range == ClipRangeSetting::NegativeOneToOne
        {
            warn!("Reverse depth requires a zero-to-one clip range. Using zero_to_one.");
            self.clip_range = ClipRangeSetting::ZeroToOne;
        }

        if !self.shadow_extrusion_distance.is_finite() || self.shadow_extrusion_distance <= 0.0 {
            warn!("Shadow extrusion distance must be positive and finite. Using default value.");
            self.shadow_extrusion_distance = Self::default_shadow_extrusion_distance();
        }

        self
    }

    const fn default_shadow_extrusion_distance() -> f32 {
        10_000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DepthModeSetting {
    #[default]
    Standard,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipRangeSetting {
    #[default]
    ZeroToOne,
    NegativeOneToOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrientationSetting {
    #[default]
    Natural,
    Rotate90,
    Rotate180,
    Rotate270,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_coerces_reverse_depth_onto_zero_to_one() {
        let settings = PipelineSettings {
            depth_mode: DepthModeSetting::Reverse,
            clip_range: ClipRangeSetting::NegativeOneToOne,
            ..PipelineSettings::default()
        }
        .validate();

        assert_eq!(settings.clip_range, ClipRangeSetting::ZeroToOne);
        assert_eq!(settings.depth_mode, DepthModeSetting::Reverse);
    }

    #[test]
    fn validate_replaces_nonpositive_extrusion_distance() {
        let settings = PipelineSettings {
            shadow_extrusion_distance: -3.0,
            ..PipelineSettings::default()
        }
        .validate();

        assert_eq!(
            settings.shadow_extrusion_distance,
            PipelineSettings::default().shadow_extrusion_distance
        );
    }

    #[test]
    fn missing_fields_take_defaults_when_parsing() {
        let settings: PipelineSettings =
            serde_json::from_str(r#"{ "depth_mode": "reverse" }"#).unwrap();
        assert_eq!(settings.depth_mode, DepthModeSetting::Reverse);
        assert_eq!(settings.clip_range, ClipRangeSetting::ZeroToOne);
        assert!(!settings.flip_offscreen_targets);
    }
}
