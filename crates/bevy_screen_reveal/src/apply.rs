use bevy::prelude::*;
use screen_reveal::model::LightRole;

use crate::material::StaticScreenMaterial;
use crate::spawn::{
    BackdropTag, CardTag, LayerRoot, MainCamera, RevealEntities, SceneLight, pose_transform,
};
use crate::RevealState;

pub(crate) fn apply_camera(
    state: Res<RevealState>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let target = pose_transform(&state.frame.camera);
    for mut transform in &mut cameras {
        *transform = target;
    }
}

/// Exactly one layer root is visible at a time.
pub(crate) fn apply_layers(
    state: Res<RevealState>,
    mut roots: Query<(&LayerRoot, &mut Visibility)>,
) {
    for (root, mut visibility) in &mut roots {
        let wanted = if root.0 == state.frame.layer {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

pub(crate) fn apply_cards(
    state: Res<RevealState>,
    entities: Res<RevealEntities>,
    mut cards: Query<(&CardTag, &mut Transform)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let frame = &state.frame;
    if frame.cards.is_empty() {
        return;
    }
    for (tag, mut transform) in &mut cards {
        let Some(card) = frame.cards.get(tag.index) else {
            continue;
        };
        let t = &card.transform;
        transform.translation = t.translation;
        transform.rotation = t.rotation();
        transform.scale = Vec3::splat(t.scale * card.hover);
    }
    for entity in &entities.cards {
        let Some(card) = frame.cards.get(entity.index) else {
            continue;
        };
        let opacity = card.transform.opacity;
        for handle in [&entity.frame_material, &entity.poster_material] {
            if let Some(material) = materials.get_mut(handle)
                && material.base_color.alpha() != opacity
            {
                material.base_color.set_alpha(opacity);
            }
        }
    }
}

pub(crate) fn apply_lights(
    state: Res<RevealState>,
    mut lights: Query<(&SceneLight, Option<&mut PointLight>, Option<&mut SpotLight>)>,
) {
    let levels = &state.frame.lights;
    let glow = state.frame.glow_color;
    for (light, point, spot) in &mut lights {
        let intensity = match light.0 {
            LightRole::Key => levels.key,
            LightRole::Fill => levels.fill,
            LightRole::ScreenGlow => levels.screen_glow,
            LightRole::Rim => levels.rim,
            LightRole::SpiralKey => levels.spiral_key,
            LightRole::SpiralGlow => levels.spiral_glow,
        };
        let tinted = matches!(light.0, LightRole::ScreenGlow | LightRole::SpiralGlow);
        if let Some(mut point) = point {
            point.intensity = intensity;
            if tinted {
                point.color = Color::srgb(glow.x, glow.y, glow.z);
            }
        }
        if let Some(mut spot) = spot {
            spot.intensity = intensity;
        }
    }
}

pub(crate) fn apply_screen(
    state: Res<RevealState>,
    entities: Res<RevealEntities>,
    mut materials: ResMut<Assets<StaticScreenMaterial>>,
) {
    let frame = &state.frame;
    // Screen sits on the intro layer; nothing to animate once it is hidden.
    let Some(intro) = frame.intro else { return };
    if let Some(material) = materials.get_mut(&entities.screen_material) {
        material.set_time(frame.ambient.time);
        material.set_brightness(frame.ambient.static_brightness);
        material.set_push(intro.screen_push);
        material.set_boost(frame.lights.screen_boost);
        material.set_tint(frame.glow_color);
    }
}

pub(crate) fn apply_backdrop(
    state: Res<RevealState>,
    mut backdrops: Query<&mut Transform, With<BackdropTag>>,
) {
    let Some(intro) = state.frame.intro else { return };
    for mut transform in &mut backdrops {
        transform.scale = intro.backdrop_scale.extend(1.0);
    }
}
