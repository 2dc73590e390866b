use bevy::audio::{AudioSink, AudioSinkPlayback, Volume};
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use screen_reveal::Mode;
use screen_reveal::data::config::AudioConfig;
use screen_reveal::util::media::{MediaControl, ProximityOutput, proximity_gain};
use std::collections::HashMap;

use crate::RevealState;
use crate::spawn::RevealEntities;

/// Playback flag for a card's media. Focus starts it; anything else can toggle it.
#[derive(Component, Clone, Copy, Debug)]
pub struct CardMedia {
    pub index: usize,
    playing: bool,
}

impl CardMedia {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            playing: false,
        }
    }
}

impl MediaControl for CardMedia {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[derive(Component)]
pub struct AmbienceAudio;

/// Routes proximity onto an audio sink's volume.
pub struct AmbienceOutput<'a> {
    pub sink: &'a mut AudioSink,
    pub audio: &'a AudioConfig,
    pub mode: Mode,
}

impl ProximityOutput for AmbienceOutput<'_> {
    fn set_proximity(&mut self, proximity: f32) {
        let gain = proximity_gain(self.audio, self.mode, proximity);
        self.sink.set_volume(Volume::Linear(gain));
    }
}

pub(crate) fn apply_media(
    state: Res<RevealState>,
    entities: Res<RevealEntities>,
    mut last_focus: Local<Option<usize>>,
    mut media: Query<&mut CardMedia>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let frame = &state.frame;
    if frame.focused != *last_focus {
        for mut card in &mut media {
            if Some(card.index) == frame.focused {
                card.play();
            } else if card.is_playing() {
                card.pause();
            }
        }
        *last_focus = frame.focused;
    }

    for card in &media {
        let Some(entity) = entities.cards.iter().find(|c| c.index == card.index) else {
            continue;
        };
        let glow = if card.is_playing() {
            0.25 * frame.ambient.pulse
        } else {
            0.0
        };
        let Some(current) = materials.get(&entity.poster_material) else {
            continue;
        };
        let emissive = poster_glow(current.base_color, glow);
        if current.emissive != emissive
            && let Some(material) = materials.get_mut(&entity.poster_material)
        {
            material.emissive = emissive;
        }
    }
}

/// Emissive for a playing poster. Alpha stays out of it, so card fade does
/// not dim the glow.
fn poster_glow(base: Color, glow: f32) -> LinearRgba {
    let rgb = LinearRgba::from(base.with_alpha(1.0)) * glow;
    rgb.with_alpha(1.0)
}

pub(crate) fn apply_ambience(
    state: Res<RevealState>,
    mut sinks: Query<&mut AudioSink, With<AmbienceAudio>>,
) {
    let audio = &state.director.config().audio;
    for mut sink in &mut sinks {
        AmbienceOutput {
            sink: &mut *sink,
            audio,
            mode: state.frame.mode,
        }
        .set_proximity(state.frame.proximity);
    }
}

/// Mean colour of an 8-bit RGBA image, sampling every `stride`th pixel.
pub(crate) fn average_color(image: &Image, stride: usize) -> Option<Vec3> {
    match image.texture_descriptor.format {
        TextureFormat::Rgba8UnormSrgb | TextureFormat::Rgba8Unorm => {}
        _ => return None,
    }
    let data = image.data.as_ref()?;
    let mut sum = Vec3::ZERO;
    let mut count = 0u32;
    for px in data.chunks_exact(4).step_by(stride.max(1)) {
        sum += Vec3::new(px[0] as f32, px[1] as f32, px[2] as f32);
        count += 1;
    }
    (count > 0).then(|| sum / (count as f32 * 255.0))
}

pub(crate) fn sample_poster_glow(
    mut state: ResMut<RevealState>,
    entities: Res<RevealEntities>,
    images: Res<Assets<Image>>,
    mut cache: Local<HashMap<usize, Vec3>>,
    mut sampled_for: Local<Option<usize>>,
) {
    let focused = state.frame.focused;
    if focused.is_none() {
        *sampled_for = None;
        return;
    }
    if *sampled_for == focused {
        return;
    }
    let Some(index) = focused else { return };
    let sample = cache.get(&index).copied().or_else(|| {
        let poster = entities
            .cards
            .iter()
            .find(|c| c.index == index)
            .and_then(|c| c.poster.as_ref())?;
        let color = average_color(images.get(poster)?, 16)?;
        cache.insert(index, color);
        Some(color)
    });
    if let Some(color) = sample {
        state.director.set_poster_sample(Some(color));
        *sampled_for = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension};

    #[test]
    fn average_of_solid_image_is_its_colour() {
        let pixel = [255u8, 0, 51, 255];
        let image = Image::new_fill(
            Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &pixel,
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        let color = average_color(&image, 3).unwrap();
        assert!((color - Vec3::new(1.0, 0.0, 0.2)).length() < 1e-5);
    }

    #[test]
    fn glow_ignores_card_transparency() {
        let opaque = poster_glow(Color::srgba(0.8, 0.4, 0.2, 1.0), 0.25);
        let faded = poster_glow(Color::srgba(0.8, 0.4, 0.2, 0.3), 0.25);
        assert_eq!(opaque, faded);
        assert_eq!(faded.alpha, 1.0);
    }

    #[test]
    fn toggle_flips_playback() {
        let mut card = CardMedia::new(1);
        assert!(!card.is_playing());
        card.toggle();
        assert!(card.is_playing());
        card.toggle();
        assert!(!card.is_playing());
    }
}
