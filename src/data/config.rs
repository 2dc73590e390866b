use anyhow::{Context, Result, bail};
use glam::{Vec2, Vec3};
use serde::Deserialize;
use std::path::Path;

use crate::error::SceneError;

/// Every hand-tuned constant of the sequence.
///
/// All sections default to the authored values, so a JSON file only needs the
/// keys it overrides.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub dolly: DollyConfig,
    pub helix: HelixConfig,
    pub transition: TransitionConfig,
    pub lighting: LightingConfig,
    pub ambient: AmbientConfig,
    pub effects: EffectsConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub tv: TvDimensions,
    pub set: SetDimensions,
    pub assets: AssetPaths,
    /// Upper bound on a single tick's delta, so a suspended tab resumes smoothly.
    pub max_tick_secs: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dolly: DollyConfig::default(),
            helix: HelixConfig::default(),
            transition: TransitionConfig::default(),
            lighting: LightingConfig::default(),
            ambient: AmbientConfig::default(),
            effects: EffectsConfig::default(),
            audio: AudioConfig::default(),
            input: InputConfig::default(),
            tv: TvDimensions::default(),
            set: SetDimensions::default(),
            assets: AssetPaths::default(),
            max_tick_secs: 0.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DollyConfig {
    pub start: Vec3,
    pub end: Vec3,
    pub look_at: Vec3,
    pub max_scroll: f32,
    pub sensitivity: f32,
    pub smoothing: f32,
    /// Distance in front of the screen glass at which the cut fires.
    pub threshold_margin: f32,
    pub fov_deg: f32,
}

impl Default for DollyConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(-0.08, 0.95, 4.5),
            end: Vec3::new(-0.08, 0.54, 0.15),
            look_at: Vec3::new(-0.08, 0.54, -2.0),
            max_scroll: 2500.0,
            sensitivity: 0.5,
            smoothing: 0.05,
            threshold_margin: 0.12,
            fov_deg: 45.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HelixConfig {
    pub origin: Vec3,
    pub camera_distance: f32,
    pub base_radius: f32,
    pub vertical_spacing: f32,
    pub scale_falloff: f32,
    pub opacity_falloff: f32,
    pub opacity_floor: f32,
    /// Extra radius fraction for the front-facing slot; `0` disables the bulge.
    pub bulge: f32,
    pub bulge_width: f32,
    pub sensitivity: f32,
    pub smoothing: f32,
    pub card_size: Vec2,
    pub hover_lift: f32,
    pub hover_secs: f32,
    pub title_fade_secs: f32,
}

impl Default for HelixConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, -40.0),
            camera_distance: 3.6,
            base_radius: 1.6,
            vertical_spacing: 0.7,
            scale_falloff: 0.15,
            opacity_falloff: 0.35,
            opacity_floor: 0.12,
            bulge: 0.12,
            bulge_width: 0.6,
            sensitivity: 0.0025,
            smoothing: 0.08,
            card_size: Vec2::new(0.8, 1.1),
            hover_lift: 0.08,
            hover_secs: 0.2,
            title_fade_secs: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlackoutStyle {
    /// Jump straight to black on the trigger tick.
    Cut,
    /// Fade to black over `fade_out_secs`.
    #[default]
    Fade,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransitionConfig {
    pub style: BlackoutStyle,
    pub fade_out_secs: f32,
    pub swap_delay_secs: f32,
    pub fade_in_secs: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            style: BlackoutStyle::Fade,
            fade_out_secs: 0.25,
            swap_delay_secs: 0.08,
            fade_in_secs: 0.45,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub key_start: f32,
    pub key_end: f32,
    pub fill: f32,
    pub glow_start: f32,
    pub glow_end: f32,
    pub rim: f32,
    pub spiral_key: f32,
    pub spiral_glow: f32,
    pub ambient_brightness: f32,
    /// Per-second smoothing toward the sampled poster colour.
    pub glow_color_smoothing: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            key_start: 900_000.0,
            key_end: 350_000.0,
            fill: 120_000.0,
            glow_start: 20_000.0,
            glow_end: 160_000.0,
            rim: 200_000.0,
            spiral_key: 600_000.0,
            spiral_glow: 90_000.0,
            ambient_brightness: 60.0,
            glow_color_smoothing: 0.06,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmbientConfig {
    pub brightness_base: f32,
    pub brightness_amp: f32,
    pub brightness_rate: f32,
    pub flicker_amount: f32,
    pub pulse_amount: f32,
    pub pulse_rate: f32,
    pub grain_fps: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            brightness_base: 0.95,
            brightness_amp: 0.05,
            brightness_rate: 1.2,
            flicker_amount: 0.06,
            pulse_amount: 0.05,
            pulse_rate: 2.0,
            grain_fps: 24.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub bloom: bool,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub grain: bool,
    pub grain_opacity: f32,
    pub grain_frames: usize,
    pub grain_size: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            bloom: true,
            bloom_strength: 0.15,
            bloom_radius: 0.3,
            bloom_threshold: 0.95,
            grain: true,
            grain_opacity: 0.06,
            grain_frames: 6,
            grain_size: 128,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub min_gain: f32,
    pub max_gain: f32,
    pub spiral_proximity: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            min_gain: 0.1,
            max_gain: 1.0,
            spiral_proximity: 0.4,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub touch_multiplier: f32,
    /// Pixels per wheel "line" for devices that report line deltas.
    pub line_height_px: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            touch_multiplier: 2.0,
            line_height_px: 40.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TvDimensions {
    pub cabinet: Vec3,
    pub leg_height: f32,
    pub leg_radius: f32,
    pub screen: Vec2,
    /// Screen centre relative to the cabinet front centre.
    pub screen_offset: Vec2,
    pub bezel_margin: f32,
    pub bezel_depth: f32,
    pub knob_radius: f32,
    pub antenna_length: f32,
    pub antenna_spread_deg: f32,
    pub segments: u32,
}

impl Default for TvDimensions {
    fn default() -> Self {
        Self {
            cabinet: Vec3::new(0.9, 0.7, 0.6),
            leg_height: 0.16,
            leg_radius: 0.025,
            screen: Vec2::new(0.56, 0.42),
            screen_offset: Vec2::new(-0.08, 0.03),
            bezel_margin: 0.035,
            bezel_depth: 0.03,
            knob_radius: 0.045,
            antenna_length: 0.55,
            antenna_spread_deg: 28.0,
            segments: 32,
        }
    }
}

impl TvDimensions {
    /// World Z of the screen glass, with the TV group at the origin.
    pub fn screen_plane_z(&self) -> f32 {
        self.cabinet.z * 0.5 + self.bezel_depth + 0.002
    }

    /// World-space centre of the screen glass.
    pub fn screen_center(&self) -> Vec3 {
        Vec3::new(
            self.screen_offset.x,
            self.leg_height + self.cabinet.y * 0.5 + self.screen_offset.y,
            self.screen_plane_z(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SetDimensions {
    pub floor_size: f32,
    pub wall_distance: f32,
    pub wall_height: f32,
    pub grain_seed: u32,
    pub grain_size: u32,
}

impl Default for SetDimensions {
    fn default() -> Self {
        Self {
            floor_size: 40.0,
            wall_distance: 3.0,
            wall_height: 12.0,
            grain_seed: 7,
            grain_size: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetPaths {
    pub font: Option<String>,
    pub ambience: Option<String>,
    pub loader_hide_secs: f32,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            font: Some("fonts/FiraSans-Bold.ttf".to_string()),
            ambience: None,
            loader_hide_secs: 1.5,
        }
    }
}

impl SceneConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_bytes(&bytes).with_context(|| format!("loading {:?}", path))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let config: SceneConfig =
            serde_json::from_slice(bytes).context("parsing scene config json")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets the state machine cannot honour.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dolly;
        let threshold_z = self.tv.screen_plane_z() + d.threshold_margin;
        if d.max_scroll <= 0.0 {
            bail!(SceneError::InvalidConfig("dolly.max_scroll must be positive".into()));
        }
        for (name, k) in [
            ("dolly.smoothing", d.smoothing),
            ("helix.smoothing", self.helix.smoothing),
            ("lighting.glow_color_smoothing", self.lighting.glow_color_smoothing),
        ] {
            if !(k > 0.0 && k < 1.0) {
                bail!(SceneError::InvalidConfig(format!("{name} must lie in (0, 1), got {k}")));
            }
        }
        if !(d.start.z > threshold_z && threshold_z > d.end.z) {
            bail!(SceneError::InvalidConfig(format!(
                "screen threshold z {threshold_z} is not between dolly end {} and start {}",
                d.end.z, d.start.z
            )));
        }
        if d.look_at.z >= d.end.z {
            bail!(SceneError::InvalidConfig(
                "dolly.look_at must sit behind the dolly end anchor".into()
            ));
        }
        if self.helix.base_radius <= 0.0 || self.helix.vertical_spacing < 0.0 {
            bail!(SceneError::InvalidConfig("helix radius/spacing out of range".into()));
        }
        if !(0.0..=1.0).contains(&self.helix.opacity_floor) {
            bail!(SceneError::InvalidConfig("helix.opacity_floor must lie in [0, 1]".into()));
        }
        let t = &self.transition;
        if t.fade_out_secs < 0.0 || t.swap_delay_secs < 0.0 || t.fade_in_secs < 0.0 {
            bail!(SceneError::InvalidConfig("transition durations must be non-negative".into()));
        }
        if self.max_tick_secs <= 0.0 {
            bail!(SceneError::InvalidConfig("max_tick_secs must be positive".into()));
        }
        Ok(())
    }
}
