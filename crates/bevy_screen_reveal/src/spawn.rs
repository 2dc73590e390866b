use bevy::asset::RenderAssetUsages;
use bevy::log::{error, info};
use bevy::post_process::bloom::{Bloom, BloomPrefilter};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::render::view::Hdr;
use screen_reveal::Layer;
use screen_reveal::model::grain::GrainTexture;
use screen_reveal::model::{
    CardBlueprint, LightKind, LightRole, LightSpec, LocalTransform, NodeId, NodeKind, Primitive,
    SceneBlueprint, Surface,
};
use screen_reveal::motion::dolly::CameraPose;
use screen_reveal::util::capability::{RuntimeCapabilities, negotiate};

use crate::material::StaticScreenMaterial;
use crate::media::CardMedia;
use crate::overlay::spawn_overlays;
use crate::{RevealDiagnostics, RevealPackage, RevealState};

#[derive(Component)]
pub struct MainCamera;

/// Root of one of the two mutually exclusive layers.
#[derive(Component, Clone, Copy, Debug)]
pub struct LayerRoot(pub Layer);

#[derive(Component, Clone, Copy, Debug)]
pub struct SceneLight(pub LightRole);

#[derive(Component)]
pub struct ScreenTag;

#[derive(Component)]
pub struct BackdropTag;

#[derive(Component, Clone, Copy, Debug)]
pub struct CardTag {
    pub index: usize,
}

pub struct CardEntity {
    pub index: usize,
    pub entity: Entity,
    pub frame_material: Handle<StandardMaterial>,
    pub poster_material: Handle<StandardMaterial>,
    pub poster: Option<Handle<Image>>,
}

/// Spawned entities and asset handles the apply systems write into.
#[derive(Resource)]
pub struct RevealEntities {
    pub camera: Entity,
    pub card_group: Entity,
    pub screen_material: Handle<StaticScreenMaterial>,
    pub cards: Vec<CardEntity>,
}

/// Native targets get HDR; WebGL2 builds render straight to the surface.
pub fn probe_capabilities() -> RuntimeCapabilities {
    RuntimeCapabilities {
        hdr: !cfg!(target_arch = "wasm32"),
        overlay_images: true,
    }
}

pub(crate) fn pose_transform(pose: &CameraPose) -> Transform {
    Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y)
}

fn local_transform(local: &LocalTransform) -> Transform {
    Transform {
        translation: local.translation,
        rotation: local.rotation,
        scale: local.scale,
    }
}

fn primitive_mesh(primitive: Primitive) -> Mesh {
    match primitive {
        Primitive::Cuboid { size } => Cuboid::from_size(size).into(),
        Primitive::Cylinder {
            radius,
            height,
            segments,
        } => Cylinder::new(radius, height)
            .mesh()
            .resolution(segments)
            .build(),
        Primitive::Sphere { radius, segments } => Sphere::new(radius)
            .mesh()
            .uv(segments, (segments / 2).max(2))
            .build(),
        Primitive::Quad { size } => Rectangle::from_size(size).into(),
    }
}

pub(crate) fn grain_image(texture: &GrainTexture) -> Image {
    Image::new(
        Extent3d {
            width: texture.size,
            height: texture.size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        texture.rgba.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

fn rgb(c: Vec3) -> Color {
    Color::srgb(c.x, c.y, c.z)
}

struct SurfaceMaterials {
    wood: Handle<StandardMaterial>,
    metal: Handle<StandardMaterial>,
    grille: Handle<StandardMaterial>,
    floor: Handle<StandardMaterial>,
    backdrop: Handle<StandardMaterial>,
}

impl SurfaceMaterials {
    fn new(
        blueprint: &SceneBlueprint,
        materials: &mut Assets<StandardMaterial>,
        images: &mut Assets<Image>,
    ) -> Self {
        let wood = images.add(grain_image(&blueprint.textures.wood));
        let floor = images.add(grain_image(&blueprint.textures.floor));
        Self {
            wood: materials.add(StandardMaterial {
                base_color_texture: Some(wood),
                perceptual_roughness: 0.55,
                reflectance: 0.3,
                ..default()
            }),
            metal: materials.add(StandardMaterial {
                base_color: Color::srgb(0.75, 0.75, 0.78),
                metallic: 0.9,
                perceptual_roughness: 0.3,
                ..default()
            }),
            grille: materials.add(StandardMaterial {
                base_color: Color::srgb(0.08, 0.07, 0.06),
                perceptual_roughness: 0.9,
                ..default()
            }),
            floor: materials.add(StandardMaterial {
                base_color_texture: Some(floor),
                perceptual_roughness: 0.85,
                ..default()
            }),
            backdrop: materials.add(StandardMaterial {
                base_color: Color::srgb(0.05, 0.05, 0.06),
                perceptual_roughness: 1.0,
                ..default()
            }),
        }
    }

    fn get(&self, surface: Surface, materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
        match surface {
            Surface::Wood => self.wood.clone(),
            Surface::Plastic(c) => materials.add(StandardMaterial {
                base_color: Color::srgb(c[0], c[1], c[2]),
                perceptual_roughness: 0.4,
                ..default()
            }),
            Surface::Metal => self.metal.clone(),
            Surface::Grille => self.grille.clone(),
            Surface::Floor => self.floor.clone(),
            Surface::Backdrop | Surface::StaticScreen => self.backdrop.clone(),
        }
    }
}

fn insert_light(entity: &mut EntityCommands, spec: LightSpec) {
    match spec.kind {
        LightKind::Point { range } => {
            entity.insert(PointLight {
                color: rgb(spec.color),
                intensity: spec.intensity,
                range,
                shadows_enabled: spec.shadows,
                ..default()
            });
        }
        LightKind::Spot { range, outer_angle } => {
            entity.insert(SpotLight {
                color: rgb(spec.color),
                intensity: spec.intensity,
                range,
                outer_angle,
                inner_angle: outer_angle * 0.7,
                shadows_enabled: spec.shadows,
                ..default()
            });
        }
    }
    entity.insert(SceneLight(spec.role));
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn setup_scene(
    mut commands: Commands,
    package: Res<RevealPackage>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut screen_materials: ResMut<Assets<StaticScreenMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut diagnostics: ResMut<RevealDiagnostics>,
) {
    commands.remove_resource::<RevealPackage>();
    let package = package.0.clone();
    let built = package
        .director()
        .and_then(|director| Ok((director, package.blueprint()?)));
    let (mut director, blueprint) = match built {
        Ok(built) => built,
        Err(err) => {
            error!("screen reveal: scene construction failed: {err:#}");
            diagnostics.errors.push(format!("{err:#}"));
            return;
        }
    };

    let render_path = negotiate(&package.config.effects, probe_capabilities());
    info!(
        "screen reveal: {} nodes, render path {}",
        blueprint.nodes.len(),
        render_path.label()
    );

    let surfaces = SurfaceMaterials::new(&blueprint, &mut materials, &mut images);
    let screen_material = screen_materials.add(StaticScreenMaterial::default());
    let handles = &blueprint.handles;

    let mut spawned: Vec<Entity> = Vec::with_capacity(blueprint.nodes.len());
    for (i, node) in blueprint.nodes.iter().enumerate() {
        let id = NodeId(i);
        let mut entity = commands.spawn((
            Name::new(node.name.clone()),
            local_transform(&node.local),
            Visibility::Inherited,
        ));
        if let Some(parent) = node.parent.and_then(|p| spawned.get(p.0).copied()) {
            entity.insert(ChildOf(parent));
        }
        match node.kind {
            NodeKind::Group => {}
            NodeKind::Mesh { primitive, surface } => {
                entity.insert(Mesh3d(meshes.add(primitive_mesh(primitive))));
                if surface == Surface::StaticScreen {
                    entity.insert((MeshMaterial3d(screen_material.clone()), ScreenTag));
                } else {
                    entity.insert(MeshMaterial3d(surfaces.get(surface, &mut materials)));
                }
            }
            NodeKind::Light(spec) => insert_light(&mut entity, spec),
        }
        if id == handles.backdrop {
            entity.insert(BackdropTag);
        }
        for layer in [Layer::Intro, Layer::Spiral] {
            if id == handles.layer_root(layer) {
                let visibility = match layer {
                    Layer::Intro => Visibility::Visible,
                    Layer::Spiral => Visibility::Hidden,
                };
                entity.insert((LayerRoot(layer), visibility));
            }
        }
        spawned.push(entity.id());
    }

    let frame = director.tick(0.0);
    let mut camera = commands.spawn((
        Name::new("camera"),
        MainCamera,
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: package.config.dolly.fov_deg.to_radians(),
            ..default()
        }),
        pose_transform(&frame.camera),
    ));
    if let Some(bloom) = render_path.bloom() {
        camera.insert((
            Hdr,
            Bloom {
                intensity: bloom.strength,
                low_frequency_boost: bloom.radius,
                prefilter: BloomPrefilter {
                    threshold: bloom.threshold,
                    threshold_softness: 0.1,
                },
                ..Bloom::NATURAL
            },
        ));
    }
    let camera = camera.id();

    commands.insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.012)));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.7, 0.75, 0.9),
        brightness: package.config.lighting.ambient_brightness,
        affects_lightmapped_meshes: true,
    });

    spawn_overlays(&mut commands, &package.config, &render_path, &mut images);

    let card_group = spawned
        .get(handles.card_group.0)
        .copied()
        .unwrap_or(Entity::PLACEHOLDER);
    commands.insert_resource(RevealEntities {
        camera,
        card_group,
        screen_material,
        cards: Vec::new(),
    });
    commands.insert_resource(RevealState {
        director,
        frame,
        render_path,
    });
}

/// One card per blueprint: a coloured frame with the poster quad inset in front.
pub(crate) fn spawn_cards(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    entities: &mut RevealEntities,
    cards: &[CardBlueprint],
) {
    let frame_mesh = meshes.add(Rectangle::from_size(cards.first().map_or(Vec2::ONE, |c| c.size)));
    for card in cards {
        let frame_material = materials.add(StandardMaterial {
            base_color: rgb(card.color),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: 0.6,
            ..default()
        });
        let poster_material = materials.add(StandardMaterial {
            base_color: rgb(card.color * 0.35),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: 0.8,
            ..default()
        });
        let poster_mesh = meshes.add(Rectangle::from_size(card.poster_size));
        let entity = commands
            .spawn((
                Name::new(format!("card/{}", card.index)),
                CardTag { index: card.index },
                CardMedia::new(card.index),
                Transform::default(),
                Visibility::Inherited,
                ChildOf(entities.card_group),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(frame_mesh.clone()),
                    MeshMaterial3d(frame_material.clone()),
                    Transform::default(),
                ));
                parent.spawn((
                    Mesh3d(poster_mesh),
                    MeshMaterial3d(poster_material.clone()),
                    Transform::from_xyz(0.0, 0.0, 0.005),
                ));
            })
            .id();
        entities.cards.push(CardEntity {
            index: card.index,
            entity,
            frame_material,
            poster_material,
            poster: None,
        });
    }
    info!("screen reveal: spawned {} cards", cards.len());
}
