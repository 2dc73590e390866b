use glam::{Quat, Vec2, Vec3};

use super::SceneBuilder;
use super::blueprint::{LocalTransform, NodeId, NodeKind, Primitive, Surface};
use crate::data::config::TvDimensions;

const KNOB_DEPTH: f32 = 0.03;
const LEG_INSET: f32 = 0.08;
const ANTENNA_ROD_RADIUS: f32 = 0.006;

pub(crate) struct TvNodes {
    pub group: NodeId,
    pub screen: NodeId,
}

fn mesh(primitive: Primitive, surface: Surface) -> NodeKind {
    NodeKind::Mesh { primitive, surface }
}

/// Cabinet on legs with bezel, screen glass, knob panel and rabbit ears.
/// Everything is positioned relative to the TV group origin on the floor.
pub(crate) fn build_tv(b: &mut SceneBuilder, parent: NodeId, tv: &TvDimensions) -> TvNodes {
    let group = b.add(Some(parent), "tv", NodeKind::Group, LocalTransform::default());
    let cab = tv.cabinet;
    let cab_y = tv.leg_height + cab.y * 0.5;
    let front = cab.z * 0.5;

    b.add(
        Some(group),
        "tv/cabinet",
        mesh(Primitive::Cuboid { size: cab }, Surface::Wood),
        LocalTransform::from_translation(Vec3::new(0.0, cab_y, 0.0)),
    );

    let screen_center = tv.screen_center();
    let bezel = tv.screen + Vec2::splat(tv.bezel_margin * 2.0);
    b.add(
        Some(group),
        "tv/bezel",
        mesh(
            Primitive::Cuboid {
                size: bezel.extend(tv.bezel_depth),
            },
            Surface::Plastic([0.05, 0.05, 0.06]),
        ),
        LocalTransform::from_translation(Vec3::new(
            screen_center.x,
            screen_center.y,
            front + tv.bezel_depth * 0.5,
        )),
    );

    let screen = b.add(
        Some(group),
        "tv/screen",
        mesh(Primitive::Quad { size: tv.screen }, Surface::StaticScreen),
        LocalTransform::from_translation(screen_center),
    );

    // Knob panel fills the cabinet face to the right of the bezel.
    let panel_left = screen_center.x + bezel.x * 0.5;
    let panel_width = (cab.x * 0.5 - panel_left).max(0.0);
    let panel_x = panel_left + panel_width * 0.5;
    let knob_rot = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
    for (i, dy) in [0.12, 0.0].into_iter().enumerate() {
        b.add(
            Some(group),
            &format!("tv/knob_{i}"),
            mesh(
                Primitive::Cylinder {
                    radius: tv.knob_radius,
                    height: KNOB_DEPTH,
                    segments: tv.segments,
                },
                Surface::Metal,
            ),
            LocalTransform::from_translation(Vec3::new(
                panel_x,
                cab_y + dy,
                front + KNOB_DEPTH * 0.5,
            ))
            .with_rotation(knob_rot),
        );
    }
    b.add(
        Some(group),
        "tv/grille",
        mesh(
            Primitive::Cuboid {
                size: Vec3::new(panel_width * 0.7, 0.16, 0.005),
            },
            Surface::Grille,
        ),
        LocalTransform::from_translation(Vec3::new(panel_x, cab_y - 0.15, front + 0.0025)),
    );

    for (i, (sx, sz)) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
        .into_iter()
        .enumerate()
    {
        b.add(
            Some(group),
            &format!("tv/leg_{i}"),
            mesh(
                Primitive::Cylinder {
                    radius: tv.leg_radius,
                    height: tv.leg_height,
                    segments: tv.segments,
                },
                Surface::Metal,
            ),
            LocalTransform::from_translation(Vec3::new(
                sx * (cab.x * 0.5 - LEG_INSET),
                tv.leg_height * 0.5,
                sz * (cab.z * 0.5 - LEG_INSET),
            )),
        );
    }

    build_antenna(b, group, tv, tv.leg_height + cab.y);

    TvNodes { group, screen }
}

fn build_antenna(b: &mut SceneBuilder, group: NodeId, tv: &TvDimensions, top: f32) {
    let base = b.add(
        Some(group),
        "tv/antenna",
        NodeKind::Group,
        LocalTransform::from_translation(Vec3::new(0.0, top, -0.05)),
    );
    b.add(
        Some(base),
        "tv/antenna/base",
        mesh(
            Primitive::Sphere {
                radius: 0.04,
                segments: tv.segments,
            },
            Surface::Metal,
        ),
        LocalTransform::default(),
    );
    let spread = tv.antenna_spread_deg.to_radians();
    for (side, sign) in [("left", 1.0), ("right", -1.0)] {
        let rot = Quat::from_rotation_z(sign * spread);
        let len = tv.antenna_length;
        b.add(
            Some(base),
            &format!("tv/antenna/{side}_rod"),
            mesh(
                Primitive::Cylinder {
                    radius: ANTENNA_ROD_RADIUS,
                    height: len,
                    segments: 8,
                },
                Surface::Metal,
            ),
            LocalTransform::from_translation(rot * Vec3::new(0.0, len * 0.5, 0.0))
                .with_rotation(rot),
        );
        b.add(
            Some(base),
            &format!("tv/antenna/{side}_tip"),
            mesh(
                Primitive::Sphere {
                    radius: ANTENNA_ROD_RADIUS * 2.0,
                    segments: 8,
                },
                Surface::Metal,
            ),
            LocalTransform::from_translation(rot * Vec3::new(0.0, len, 0.0)),
        );
    }
}
