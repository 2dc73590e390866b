//! Deterministic procedural textures.
//!
//! Same seed, same bytes. These only add surface detail; nothing positional
//! depends on them.

use noise::{NoiseFn, OpenSimplex};

/// Square RGBA8 image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrainTexture {
    pub size: u32,
    pub rgba: Vec<u8>,
}

impl GrainTexture {
    fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self { size, rgba }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.size + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

fn shade(base: [f32; 3], v: f32) -> [u8; 4] {
    let c = |b: f32| ((b * v).clamp(0.0, 1.0) * 255.0) as u8;
    [c(base[0]), c(base[1]), c(base[2]), 255]
}

/// Walnut veneer: stretched noise bent into rings.
pub fn wood_grain(seed: u32, size: u32) -> GrainTexture {
    let noise = OpenSimplex::new(seed);
    let inv = 1.0 / size.max(1) as f64;
    GrainTexture::from_fn(size, |x, y| {
        let u = x as f64 * inv;
        let v = y as f64 * inv;
        let warp = noise.get([u * 3.0, v * 0.6]) * 1.8;
        let rings = ((u * 24.0 + warp * 4.0).sin() * 0.5 + 0.5).powf(3.0);
        let fine = noise.get([u * 40.0, v * 4.0]) * 0.5 + 0.5;
        let value = 0.72 + rings as f32 * 0.18 + fine as f32 * 0.1;
        shade([0.36, 0.22, 0.13], value)
    })
}

/// Low-contrast mottling for the studio floor.
pub fn floor_grain(seed: u32, size: u32) -> GrainTexture {
    let noise = OpenSimplex::new(seed.wrapping_add(1));
    let inv = 1.0 / size.max(1) as f64;
    GrainTexture::from_fn(size, |x, y| {
        let u = x as f64 * inv;
        let v = y as f64 * inv;
        let broad = noise.get([u * 4.0, v * 4.0]);
        let fine = noise.get([u * 32.0, v * 32.0]);
        let value = 0.85 + broad as f32 * 0.08 + fine as f32 * 0.05;
        shade([0.16, 0.15, 0.15], value)
    })
}

/// Pre-generated film grain frames, cycled by the overlay.
///
/// Grey noise with the noise value also in alpha so dark specks stay subtle.
pub fn film_grain_frames(seed: u64, frames: usize, size: u32) -> Vec<GrainTexture> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..frames)
        .map(|_| {
            GrainTexture::from_fn(size, |_, _| {
                let g = rng.u8(..);
                let a = rng.u8(64..=255);
                [g, g, g, a]
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        assert_eq!(wood_grain(7, 32), wood_grain(7, 32));
        assert_eq!(floor_grain(7, 32), floor_grain(7, 32));
        assert_eq!(film_grain_frames(3, 2, 16), film_grain_frames(3, 2, 16));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(wood_grain(1, 32).rgba, wood_grain(2, 32).rgba);
        let frames = film_grain_frames(3, 2, 16);
        assert_ne!(frames[0], frames[1]);
    }

    #[test]
    fn sizes_and_opaque_alpha() {
        let tex = wood_grain(7, 8);
        assert_eq!(tex.rgba.len(), 8 * 8 * 4);
        assert_eq!(tex.pixel(3, 5)[3], 255);
        assert_eq!(film_grain_frames(0, 0, 8).len(), 0);
    }
}
