use glam::{Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use super::dolly::CameraPose;
use crate::data::config::HelixConfig;

/// Smallest scale any card is drawn at, regardless of distance from focus.
pub const MIN_CARD_SCALE: f32 = 0.6;

/// Placement of one card relative to the carousel group origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardTransform {
    pub index: usize,
    pub offset: f32,
    pub angle: f32,
    pub translation: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

impl CardTransform {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}

/// Pure helix slot math; holds parameters only, no per-frame state.
#[derive(Clone, Debug, PartialEq)]
pub struct HelixLayout {
    pub base_radius: f32,
    pub vertical_spacing: f32,
    pub scale_falloff: f32,
    pub opacity_falloff: f32,
    pub opacity_floor: f32,
    pub bulge: f32,
    pub bulge_width: f32,
    pub card_size: Vec2,
}

impl HelixLayout {
    pub fn from_config(helix: &HelixConfig) -> Self {
        Self {
            base_radius: helix.base_radius,
            vertical_spacing: helix.vertical_spacing,
            scale_falloff: helix.scale_falloff,
            opacity_falloff: helix.opacity_falloff,
            opacity_floor: helix.opacity_floor,
            bulge: helix.bulge,
            bulge_width: helix.bulge_width,
            card_size: helix.card_size,
        }
    }

    /// Extra radius fraction near the front-facing slot. Smooth in `angle`.
    pub fn facing_bias(&self, angle: f32) -> f32 {
        if self.bulge == 0.0 || self.bulge_width <= 0.0 {
            return 0.0;
        }
        let u = angle / self.bulge_width;
        self.bulge * (-u * u).exp()
    }

    pub fn slot(&self, index: usize, progress: f32) -> CardTransform {
        let offset = index as f32 - progress;
        let angle = offset * FRAC_PI_2;
        let radius = self.base_radius * (1.0 + self.facing_bias(angle));
        let translation = Vec3::new(
            angle.sin() * radius,
            -offset * self.vertical_spacing,
            angle.cos() * radius - self.base_radius,
        );
        let distance = offset.abs();
        CardTransform {
            index,
            offset,
            angle,
            translation,
            scale: (1.0 - distance * self.scale_falloff).max(MIN_CARD_SCALE),
            opacity: (1.0 - distance * self.opacity_falloff).max(self.opacity_floor),
        }
    }

    pub fn layout(&self, count: usize, progress: f32) -> Vec<CardTransform> {
        (0..count).map(|i| self.slot(i, progress)).collect()
    }

    /// Nearest card whose quad the ray hits, in carousel-local space.
    ///
    /// `extra_scale` multiplies each card's own scale (hover lift), indexed
    /// like `slots`; missing entries count as `1.0`.
    pub fn pick(
        &self,
        origin: Vec3,
        dir: Vec3,
        slots: &[CardTransform],
        extra_scale: &[f32],
    ) -> Option<usize> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        let mut best: Option<(f32, usize)> = None;
        for (i, slot) in slots.iter().enumerate() {
            let rot = slot.rotation();
            let normal = rot * Vec3::Z;
            let denom = normal.dot(dir);
            if denom.abs() < 1e-6 {
                continue;
            }
            let t = normal.dot(slot.translation - origin) / denom;
            if t <= 0.0 {
                continue;
            }
            let hit = origin + dir * t;
            let local = rot.inverse() * (hit - slot.translation);
            let scale = slot.scale * extra_scale.get(i).copied().unwrap_or(1.0);
            let half = self.card_size * 0.5 * scale;
            let inside = local.x.abs() <= half.x && local.y.abs() <= half.y;
            if inside && best.is_none_or(|(best_t, _)| t < best_t) {
                best = Some((t, slot.index));
            }
        }
        best.map(|(_, index)| index)
    }
}

/// Nearest whole card to a continuous focus value.
pub fn focus_index(progress: f32, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let max = (count - 1) as f32;
    Some(progress.clamp(0.0, max).round() as usize)
}

/// Fixed spiral-mode camera: straight on to the front slot.
pub fn spiral_camera(helix: &HelixConfig) -> CameraPose {
    CameraPose {
        position: helix.origin + Vec3::new(0.0, 0.0, helix.camera_distance),
        look_at: helix.origin,
    }
}
