//! Screen-space UI layered over the 3D view: loader, blackout, caption,
//! film grain and the error readout.

use bevy::prelude::*;
use screen_reveal::SceneConfig;
use screen_reveal::model::grain::film_grain_frames;
use screen_reveal::util::capability::RenderPath;

use crate::spawn::{RevealEntities, grain_image};
use crate::{RevealDiagnostics, RevealState};

#[derive(Component)]
pub struct LoaderOverlay;

#[derive(Component)]
pub struct BlackoutOverlay;

/// Title of the focused card.
#[derive(Component)]
pub struct CaptionText;

#[derive(Component)]
pub struct GrainOverlay {
    pub frames: Vec<Handle<Image>>,
}

#[derive(Component)]
pub struct DiagnosticText;

const GRAIN_SEED: u64 = 0x5eed;

fn full_screen() -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(0.0),
        top: Val::Px(0.0),
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        ..default()
    }
}

pub(crate) fn spawn_overlays(
    commands: &mut Commands,
    config: &SceneConfig,
    render_path: &RenderPath,
    images: &mut Assets<Image>,
) {
    if let Some(grain) = render_path.grain() {
        let frames: Vec<Handle<Image>> = film_grain_frames(GRAIN_SEED, grain.frames, grain.size)
            .iter()
            .map(|texture| images.add(grain_image(texture)))
            .collect();
        if let Some(first) = frames.first().cloned() {
            commands.spawn((
                Name::new("overlay/grain"),
                full_screen(),
                ImageNode::new(first).with_color(Color::WHITE.with_alpha(grain.opacity)),
                GlobalZIndex(10),
                GrainOverlay { frames },
            ));
        }
    }

    commands
        .spawn((
            Name::new("overlay/loader"),
            LoaderOverlay,
            Node {
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..full_screen()
            },
            BackgroundColor(Color::srgb(0.01, 0.01, 0.012)),
            GlobalZIndex(20),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Loading"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
            ));
        });

    commands.spawn((
        Name::new("overlay/blackout"),
        BlackoutOverlay,
        full_screen(),
        BackgroundColor(Color::BLACK.with_alpha(0.0)),
        GlobalZIndex(30),
    ));

    debug!(
        "screen reveal: overlays spawned, loader hides after {}s",
        config.assets.loader_hide_secs
    );
}

/// Caption under the focused card; spawned once the font has settled.
pub(crate) fn spawn_caption(commands: &mut Commands, font: Option<Handle<Font>>) {
    commands
        .spawn((
            Name::new("overlay/caption"),
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Percent(10.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            GlobalZIndex(5),
        ))
        .with_children(|parent| {
            parent.spawn((
                CaptionText,
                Text::new(""),
                TextFont {
                    font: font.unwrap_or_default(),
                    font_size: 34.0,
                    ..default()
                },
                TextColor(Color::WHITE.with_alpha(0.0)),
            ));
        });
}

pub(crate) fn update_overlays(
    mut commands: Commands,
    state: Res<RevealState>,
    entities: Res<RevealEntities>,
    loader: Query<Entity, With<LoaderOverlay>>,
    mut blackout: Query<&mut BackgroundColor, With<BlackoutOverlay>>,
    mut captions: Query<(&mut Text, &mut TextColor), With<CaptionText>>,
    mut grain: Query<(&GrainOverlay, &mut ImageNode)>,
) {
    let frame = &state.frame;
    let director = &state.director;

    let loaded = !entities.cards.is_empty();
    if loaded || director.elapsed() >= director.config().assets.loader_hide_secs {
        for entity in &loader {
            commands.entity(entity).despawn();
        }
    }

    for mut background in &mut blackout {
        background.0 = Color::BLACK.with_alpha(frame.blackout);
    }

    let title = frame
        .focused
        .and_then(|i| director.items().get(i))
        .map(|item| item.title.as_str())
        .unwrap_or("");
    for (mut text, mut color) in &mut captions {
        if text.0 != title {
            text.0 = title.to_string();
        }
        color.0 = Color::WHITE.with_alpha(frame.title_opacity);
    }

    for (overlay, mut node) in &mut grain {
        if let Some(image) = overlay.frames.get(frame.ambient.grain_frame % overlay.frames.len().max(1))
            && node.image != *image
        {
            node.image = image.clone();
        }
    }
}

pub(crate) fn show_diagnostics(
    mut commands: Commands,
    diagnostics: Res<RevealDiagnostics>,
    mut existing: Query<&mut Text, With<DiagnosticText>>,
) {
    if diagnostics.errors.is_empty() || !diagnostics.is_changed() {
        return;
    }
    let body = diagnostics.errors.join("\n");
    if let Ok(mut text) = existing.single_mut() {
        text.0 = body;
        return;
    }
    commands.spawn((
        Name::new("overlay/diagnostics"),
        DiagnosticText,
        Text::new(body),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.45, 0.4)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            max_width: Val::Percent(60.0),
            ..default()
        },
        GlobalZIndex(40),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use screen_reveal::util::capability::{BloomParams, Effect, GrainParams};

    #[test]
    fn grain_overlay_only_when_negotiated() {
        let mut world = World::new();
        let mut images = Assets::<Image>::default();
        let config = SceneConfig::default();

        spawn_overlays(
            &mut world.commands(),
            &config,
            &RenderPath::Composed(vec![Effect::Bloom(BloomParams {
                strength: 0.15,
                radius: 0.3,
                threshold: 0.95,
            })]),
            &mut images,
        );
        world.flush();
        assert_eq!(world.query::<&GrainOverlay>().iter(&world).count(), 0);
        assert_eq!(world.query::<&BlackoutOverlay>().iter(&world).count(), 1);

        spawn_overlays(
            &mut world.commands(),
            &config,
            &RenderPath::Composed(vec![Effect::FilmGrain(GrainParams {
                opacity: 0.06,
                frames: 3,
                size: 8,
            })]),
            &mut images,
        );
        world.flush();
        let frames: Vec<usize> = world
            .query::<&GrainOverlay>()
            .iter(&world)
            .map(|g| g.frames.len())
            .collect();
        assert_eq!(frames, vec![3]);
    }
}
