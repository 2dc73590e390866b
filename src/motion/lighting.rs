use glam::Vec3;

use super::easing::lerp;
use crate::data::config::LightingConfig;

/// Intensities for every light role the blueprint spawns.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LightLevels {
    pub key: f32,
    pub fill: f32,
    pub screen_glow: f32,
    pub rim: f32,
    pub spiral_key: f32,
    pub spiral_glow: f32,
    /// Multiplier for the static shader as the camera closes in.
    pub screen_boost: f32,
}

/// Key dims and the screen glow grows as the dolly closes in.
pub fn intro_lights(config: &LightingConfig, eased: f32, flicker: f32) -> LightLevels {
    let e = eased.clamp(0.0, 1.0);
    LightLevels {
        key: lerp(config.key_start, config.key_end, e) * flicker,
        fill: config.fill,
        screen_glow: lerp(config.glow_start, config.glow_end, e) * flicker,
        rim: config.rim,
        spiral_key: 0.0,
        spiral_glow: 0.0,
        screen_boost: 1.0 + e * 0.35,
    }
}

pub fn spiral_lights(config: &LightingConfig, pulse: f32) -> LightLevels {
    LightLevels {
        spiral_key: config.spiral_key,
        spiral_glow: config.spiral_glow * pulse,
        screen_boost: 1.0,
        ..Default::default()
    }
}

/// Light colour eased toward the sampled poster colour of the focused card.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowTracker {
    color: Vec3,
    neutral: Vec3,
    k: f32,
}

impl GlowTracker {
    pub fn new(k: f32) -> Self {
        let neutral = Vec3::new(0.75, 0.82, 1.0);
        Self {
            color: neutral,
            neutral,
            k,
        }
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// `sample` of `None` drifts back toward the neutral screen tint.
    pub fn advance(&mut self, sample: Option<Vec3>, alpha: f32) {
        let goal = sample.unwrap_or(self.neutral).clamp(Vec3::ZERO, Vec3::ONE);
        self.color += (goal - self.color) * alpha.clamp(0.0, 1.0);
    }

    pub fn smoothing(&self) -> f32 {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glow_grows_and_key_dims_with_progress() {
        let cfg = LightingConfig::default();
        let near = intro_lights(&cfg, 1.0, 1.0);
        let far = intro_lights(&cfg, 0.0, 1.0);
        assert!(near.screen_glow > far.screen_glow);
        assert!(near.key < far.key);
        assert!(near.screen_boost > far.screen_boost);
    }

    #[test]
    fn glow_tracker_moves_toward_sample_without_overshoot() {
        let mut g = GlowTracker::new(0.06);
        let target = Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..500 {
            g.advance(Some(target), 0.06);
            assert!(g.color().x <= 1.0 && g.color().y >= 0.0);
        }
        assert!((g.color() - target).length() < 1e-3);
    }

    #[test]
    fn glow_tracker_ignores_zero_alpha() {
        let mut g = GlowTracker::new(0.06);
        let before = g.color();
        g.advance(Some(Vec3::ZERO), 0.0);
        assert_eq!(g.color(), before);
    }
}
