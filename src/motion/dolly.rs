use glam::{Vec2, Vec3};

use super::easing::{ease_in_out, ease_in_out_inverse};
use crate::data::config::{DollyConfig, SceneConfig};

/// Camera placement. Orientation is always derived by aiming at `look_at`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }
}

/// Intro camera path from the establishing shot to just behind the screen glass.
#[derive(Clone, Debug, PartialEq)]
pub struct DollyPath {
    start: Vec3,
    end: Vec3,
    look_at: Vec3,
    max_scroll: f32,
    threshold_z: f32,
}

impl DollyPath {
    pub fn new(dolly: &DollyConfig, screen_plane_z: f32) -> Self {
        Self {
            start: dolly.start,
            end: dolly.end,
            look_at: dolly.look_at,
            max_scroll: dolly.max_scroll,
            threshold_z: screen_plane_z + dolly.threshold_margin,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(&config.dolly, config.tv.screen_plane_z())
    }

    pub fn max_scroll(&self) -> f32 {
        self.max_scroll
    }

    pub fn normalized(&self, scroll_z: f32) -> f32 {
        (scroll_z / self.max_scroll).clamp(0.0, 1.0)
    }

    pub fn eased(&self, scroll_z: f32) -> f32 {
        ease_in_out(self.normalized(scroll_z))
    }

    pub fn pose(&self, scroll_z: f32) -> CameraPose {
        let e = self.eased(scroll_z);
        CameraPose {
            position: self.start + (self.end - self.start) * e,
            look_at: self.look_at,
        }
    }

    pub fn camera_z(&self, scroll_z: f32) -> f32 {
        self.pose(scroll_z).position.z
    }

    pub fn threshold_z(&self) -> f32 {
        self.threshold_z
    }

    /// Whether the rendered camera has reached the screen plane threshold.
    pub fn has_crossed(&self, scroll_z: f32) -> bool {
        self.camera_z(scroll_z) <= self.threshold_z
    }

    /// Scroll value at which the eased camera meets the threshold, solved once
    /// through the inverse easing instead of a hand-copied constant.
    pub fn threshold_progress(&self) -> f32 {
        let span = self.end.z - self.start.z;
        if span.abs() <= f32::EPSILON {
            return 0.0;
        }
        let e = ((self.threshold_z - self.start.z) / span).clamp(0.0, 1.0);
        ease_in_out_inverse(e) * self.max_scroll
    }

    /// Distance-like closeness to the screen in `[0, 1]` (1 at the threshold).
    pub fn proximity(&self, scroll_z: f32) -> f32 {
        let total = self.start.z - self.threshold_z;
        if total <= 0.0 {
            return 1.0;
        }
        ((self.start.z - self.camera_z(scroll_z)) / total).clamp(0.0, 1.0)
    }
}

/// World size of a plane at `distance` that exactly fills the view frustum.
pub fn backdrop_extent(fov_y_deg: f32, aspect: f32, distance: f32) -> Vec2 {
    let h = 2.0 * (fov_y_deg.to_radians() * 0.5).tan() * distance;
    Vec2::new(h * aspect.max(0.0), h)
}

/// The backdrop creeps closer slower than the set, scaling with eased progress.
pub fn backdrop_parallax(eased: f32) -> f32 {
    1.0 + eased * 0.3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> DollyPath {
        DollyPath::from_config(&SceneConfig::default())
    }

    #[test]
    fn anchors_map_to_ends() {
        let cfg = SceneConfig::default();
        let p = path();
        assert_eq!(p.pose(0.0).position, cfg.dolly.start);
        assert!((p.pose(cfg.dolly.max_scroll).position - cfg.dolly.end).length() < 1e-5);
        assert_eq!(p.pose(-50.0), p.pose(0.0));
        assert_eq!(p.pose(1e9), p.pose(cfg.dolly.max_scroll));
    }

    #[test]
    fn threshold_progress_lands_on_threshold_z() {
        let p = path();
        let s = p.threshold_progress();
        assert!(s > 0.0 && s < p.max_scroll());
        assert!((p.camera_z(s) - p.threshold_z()).abs() < 1e-3);
        assert!(!p.has_crossed(s - 5.0));
        assert!(p.has_crossed(s + 5.0));
    }

    #[test]
    fn pose_is_lipschitz_in_scroll() {
        let p = path();
        let eps = 0.5;
        // max |d ease/dp| is 2, so |dpos| <= 2 * |end - start| * eps / max_scroll.
        let cfg = SceneConfig::default();
        let bound = 2.0 * (cfg.dolly.end - cfg.dolly.start).length() * eps / p.max_scroll() + 1e-5;
        let mut s = 0.0;
        while s < p.max_scroll() {
            let d = (p.pose(s + eps).position - p.pose(s).position).length();
            assert!(d <= bound, "jump {d} at {s}");
            s += 7.3;
        }
    }

    #[test]
    fn proximity_spans_unit_interval() {
        let p = path();
        assert_eq!(p.proximity(0.0), 0.0);
        assert!((p.proximity(p.threshold_progress()) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn backdrop_fills_frustum() {
        let e = backdrop_extent(90.0, 2.0, 1.0);
        assert!((e.y - 2.0).abs() < 1e-5);
        assert!((e.x - 4.0).abs() < 1e-5);
    }
}
