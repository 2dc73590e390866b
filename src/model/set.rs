use glam::{Quat, Vec2, Vec3};

use super::SceneBuilder;
use super::blueprint::{
    LightKind, LightRole, LightSpec, LocalTransform, NodeId, NodeKind, Primitive, Surface,
};
use crate::data::config::SceneConfig;
use crate::motion::dolly::{backdrop_extent, backdrop_parallax};

pub(crate) struct SetNodes {
    pub floor: NodeId,
    pub backdrop: NodeId,
}

/// Floor and a camera-facing backdrop quad. The backdrop is a unit quad;
/// its scale is the only thing resized per viewport.
pub(crate) fn build_set(b: &mut SceneBuilder, intro: NodeId, config: &SceneConfig) -> SetNodes {
    let set = &config.set;
    let floor = b.add(
        Some(intro),
        "set/floor",
        NodeKind::Mesh {
            primitive: Primitive::Quad {
                size: Vec2::splat(set.floor_size),
            },
            surface: Surface::Floor,
        },
        LocalTransform::default().with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    );

    let look = config.dolly.look_at;
    let backdrop = b.add(
        Some(intro),
        "set/backdrop",
        NodeKind::Mesh {
            primitive: Primitive::Quad { size: Vec2::ONE },
            surface: Surface::Backdrop,
        },
        LocalTransform::from_translation(Vec3::new(look.x, look.y, -set.wall_distance))
            .with_scale(backdrop_scale(config, 16.0 / 9.0, 0.0).extend(1.0)),
    );
    SetNodes { floor, backdrop }
}

/// Backdrop size that covers the frame from the dolly start, grown by the
/// parallax factor as the camera moves in.
pub fn backdrop_scale(config: &SceneConfig, aspect: f32, eased: f32) -> Vec2 {
    let set = &config.set;
    let distance = config.dolly.start.z + set.wall_distance;
    let extent = backdrop_extent(config.dolly.fov_deg, aspect, distance);
    Vec2::new(extent.x, extent.y.max(set.wall_height)) * backdrop_parallax(eased)
}

fn light(role: LightRole, kind: LightKind, color: Vec3, intensity: f32, shadows: bool) -> NodeKind {
    NodeKind::Light(LightSpec {
        role,
        kind,
        color,
        intensity,
        shadows,
    })
}

/// Practical lights of both layers, at their starting intensities.
pub(crate) fn build_lights(
    b: &mut SceneBuilder,
    intro: NodeId,
    card_group: NodeId,
    config: &SceneConfig,
) -> Vec<(LightRole, NodeId)> {
    let l = &config.lighting;
    let screen = config.tv.screen_center();
    let tv_center = Vec3::new(0.0, config.tv.leg_height + config.tv.cabinet.y * 0.5, 0.0);
    let mut out = Vec::new();

    let key = b.add(
        Some(intro),
        "light/key",
        light(
            LightRole::Key,
            LightKind::Spot {
                range: 20.0,
                outer_angle: 0.6,
            },
            Vec3::new(1.0, 0.9, 0.8),
            l.key_start,
            true,
        ),
        LocalTransform::looking_at(Vec3::new(2.5, 3.5, 3.0), tv_center),
    );
    out.push((LightRole::Key, key));

    let fill = b.add(
        Some(intro),
        "light/fill",
        light(
            LightRole::Fill,
            LightKind::Point { range: 15.0 },
            Vec3::new(0.6, 0.7, 1.0),
            l.fill,
            false,
        ),
        LocalTransform::from_translation(Vec3::new(-3.0, 2.0, 2.0)),
    );
    out.push((LightRole::Fill, fill));

    let rim = b.add(
        Some(intro),
        "light/rim",
        light(
            LightRole::Rim,
            LightKind::Point { range: 10.0 },
            Vec3::new(0.9, 0.8, 1.0),
            l.rim,
            false,
        ),
        LocalTransform::from_translation(Vec3::new(0.0, 2.5, -1.5)),
    );
    out.push((LightRole::Rim, rim));

    let glow = b.add(
        Some(intro),
        "light/screen_glow",
        light(
            LightRole::ScreenGlow,
            LightKind::Point { range: 4.0 },
            Vec3::new(0.75, 0.82, 1.0),
            l.glow_start,
            false,
        ),
        LocalTransform::from_translation(screen + Vec3::new(0.0, 0.0, 0.25)),
    );
    out.push((LightRole::ScreenGlow, glow));

    // Spiral lights live under the card group so they follow the carousel.
    let spiral_key = b.add(
        Some(card_group),
        "light/spiral_key",
        light(
            LightRole::SpiralKey,
            LightKind::Point { range: 20.0 },
            Vec3::ONE,
            l.spiral_key,
            false,
        ),
        LocalTransform::from_translation(Vec3::new(0.0, 2.0, 4.0)),
    );
    out.push((LightRole::SpiralKey, spiral_key));

    let spiral_glow = b.add(
        Some(card_group),
        "light/spiral_glow",
        light(
            LightRole::SpiralGlow,
            LightKind::Point { range: 6.0 },
            Vec3::new(0.75, 0.82, 1.0),
            l.spiral_glow,
            false,
        ),
        LocalTransform::from_translation(Vec3::new(0.0, 0.0, 0.5)),
    );
    out.push((LightRole::SpiralGlow, spiral_glow));

    out
}
