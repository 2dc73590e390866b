//! Idle motion driven by wall-clock elapsed time only.
//!
//! Nothing here reads scroll progress, so static, flicker and pulsing keep a
//! constant rate whether the user is scrolling or not.

use crate::data::config::AmbientConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientFrame {
    /// Static shader `time` uniform.
    pub time: f32,
    pub static_brightness: f32,
    /// Multiplier around 1.0 applied to practical lights.
    pub flicker: f32,
    /// Multiplier around 1.0 for glow sprites.
    pub pulse: f32,
    pub grain_frame: usize,
}

pub fn ambient_at(config: &AmbientConfig, elapsed: f32, grain_frames: usize) -> AmbientFrame {
    let t = elapsed.max(0.0);
    AmbientFrame {
        time: t,
        static_brightness: config.brightness_base
            + (t * config.brightness_rate).sin() * config.brightness_amp,
        flicker: flicker(t, config.flicker_amount),
        pulse: 1.0 + (t * config.pulse_rate).sin() * config.pulse_amount,
        grain_frame: grain_frame(t, config.grain_fps, grain_frames),
    }
}

/// Deterministic bounded flicker in `[1 - amount, 1 + amount]`.
pub fn flicker(t: f32, amount: f32) -> f32 {
    let n = 0.6 * (t * 13.0).sin() + 0.3 * (t * 29.7 + 1.3).sin() + 0.1 * (t * 71.3 + 0.4).sin();
    1.0 + n * amount
}

fn grain_frame(t: f32, fps: f32, frames: usize) -> usize {
    if frames == 0 || fps <= 0.0 {
        return 0;
    }
    ((t * fps).floor() as usize) % frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_time_same_frame() {
        let cfg = AmbientConfig::default();
        assert_eq!(ambient_at(&cfg, 3.25, 6), ambient_at(&cfg, 3.25, 6));
    }

    #[test]
    fn flicker_stays_bounded() {
        for i in 0..5000 {
            let f = flicker(i as f32 * 0.0173, 0.06);
            assert!((0.94 - 1e-5..=1.06 + 1e-5).contains(&f));
        }
    }

    #[test]
    fn brightness_matches_static_pulse() {
        let cfg = AmbientConfig::default();
        let a = ambient_at(&cfg, 0.0, 6);
        assert!((a.static_brightness - 0.95).abs() < 1e-6);
        assert_eq!(a.grain_frame, 0);
        let b = ambient_at(&cfg, 1.0, 6);
        assert!((b.static_brightness - (0.95 + 1.2f32.sin() * 0.05)).abs() < 1e-6);
        assert_eq!(b.grain_frame, 24 % 6);
    }

    #[test]
    fn grain_without_frames_is_zero() {
        let cfg = AmbientConfig::default();
        assert_eq!(ambient_at(&cfg, 10.0, 0).grain_frame, 0);
    }
}
