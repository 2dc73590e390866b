use crate::data::config::EffectsConfig;

/// What the running renderer can do, probed once at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeCapabilities {
    /// HDR targets (required for bloom).
    pub hdr: bool,
    /// Full-screen image overlays (film grain).
    pub overlay_images: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrainParams {
    pub opacity: f32,
    pub frames: usize,
    pub size: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    Bloom(BloomParams),
    FilmGrain(GrainParams),
}

/// Negotiated render configuration, consumed uniformly after setup.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderPath {
    Composed(Vec<Effect>),
    Direct,
}

impl RenderPath {
    pub fn bloom(&self) -> Option<BloomParams> {
        self.effects().find_map(|e| match e {
            Effect::Bloom(b) => Some(*b),
            _ => None,
        })
    }

    pub fn grain(&self) -> Option<GrainParams> {
        self.effects().find_map(|e| match e {
            Effect::FilmGrain(g) => Some(*g),
            _ => None,
        })
    }

    fn effects(&self) -> impl Iterator<Item = &Effect> {
        match self {
            RenderPath::Composed(effects) => effects.iter(),
            RenderPath::Direct => [].iter(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            RenderPath::Direct => "direct".to_string(),
            RenderPath::Composed(effects) => effects
                .iter()
                .map(|e| match e {
                    Effect::Bloom(_) => "bloom",
                    Effect::FilmGrain(_) => "grain",
                })
                .collect::<Vec<_>>()
                .join(" + "),
        }
    }
}

/// Keep only the requested effects the runtime supports; none left means
/// rendering straight to the surface.
pub fn negotiate(requested: &EffectsConfig, caps: RuntimeCapabilities) -> RenderPath {
    let mut effects = Vec::new();
    if requested.bloom && caps.hdr {
        effects.push(Effect::Bloom(BloomParams {
            strength: requested.bloom_strength,
            radius: requested.bloom_radius,
            threshold: requested.bloom_threshold,
        }));
    }
    if requested.grain && caps.overlay_images && requested.grain_frames > 0 {
        effects.push(Effect::FilmGrain(GrainParams {
            opacity: requested.grain_opacity,
            frames: requested.grain_frames,
            size: requested.grain_size,
        }));
    }
    if effects.is_empty() {
        RenderPath::Direct
    } else {
        RenderPath::Composed(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_available_composes_both() {
        let path = negotiate(
            &EffectsConfig::default(),
            RuntimeCapabilities {
                hdr: true,
                overlay_images: true,
            },
        );
        assert!(path.bloom().is_some());
        assert!(path.grain().is_some());
        assert_eq!(path.label(), "bloom + grain");
    }

    #[test]
    fn missing_hdr_drops_bloom_only() {
        let path = negotiate(
            &EffectsConfig::default(),
            RuntimeCapabilities {
                hdr: false,
                overlay_images: true,
            },
        );
        assert!(path.bloom().is_none());
        assert!(path.grain().is_some());
    }

    #[test]
    fn nothing_available_falls_back_to_direct() {
        let path = negotiate(
            &EffectsConfig::default(),
            RuntimeCapabilities {
                hdr: false,
                overlay_images: false,
            },
        );
        assert_eq!(path, RenderPath::Direct);
        assert_eq!(path.label(), "direct");
    }
}
