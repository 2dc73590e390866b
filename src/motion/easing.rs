use serde::Deserialize;

/// Slow-fast-slow remap of `p ∈ [0, 1]`; inputs outside the range are clamped.
pub fn ease_in_out(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        2.0 * p * p
    } else {
        let u = -2.0 * p + 2.0;
        1.0 - u * u / 2.0
    }
}

/// Analytic inverse of [`ease_in_out`]: returns the `p` whose eased value is `e`.
pub fn ease_in_out_inverse(e: f32) -> f32 {
    let e = e.clamp(0.0, 1.0);
    if e < 0.5 {
        (e / 2.0).sqrt()
    } else {
        1.0 - (2.0 * (1.0 - e)).sqrt() / 2.0
    }
}

pub fn ease_out_cubic(p: f32) -> f32 {
    let u = 1.0 - p.clamp(0.0, 1.0);
    1.0 - u * u * u
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent smoothing factor.
///
/// `k` is the fraction closed per frame at `reference_hz`; the returned factor
/// closes the same fraction over `dt` seconds at any frame rate, and is `0`
/// for a zero `dt`.
pub fn smoothing_alpha(k: f32, dt: f32, reference_hz: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - k).powf(dt * reference_hz)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    InOut,
    OutCubic,
}

impl Easing {
    pub fn apply(self, p: f32) -> f32 {
        match self {
            Easing::Linear => p.clamp(0.0, 1.0),
            Easing::InOut => ease_in_out(p),
            Easing::OutCubic => ease_out_cubic(p),
        }
    }
}
