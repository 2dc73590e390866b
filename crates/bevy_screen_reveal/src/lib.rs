use bevy::app::AppExit;
use bevy::log::{error, info};
use bevy::pbr::MaterialPlugin;
use bevy::prelude::*;
use screen_reveal::director::{Frame, SceneEvent};
use screen_reveal::util::capability::RenderPath;
use screen_reveal::util::lifetime::SceneLifetime;
use screen_reveal::{Director, ScenePackage};
use std::path::PathBuf;
use std::sync::Arc;

mod apply;
mod assets;
mod input;
mod material;
mod media;
mod overlay;
mod spawn;

pub use assets::{AssetKey, BuildStep, RevealLoads, ScenePackageAsset};
pub use material::StaticScreenMaterial;
pub use media::{AmbienceAudio, AmbienceOutput, CardMedia};
pub use overlay::{BlackoutOverlay, CaptionText, DiagnosticText, GrainOverlay, LoaderOverlay};
pub use screen_reveal;
pub use spawn::{
    BackdropTag, CardEntity, CardTag, LayerRoot, MainCamera, RevealEntities, SceneLight, ScreenTag,
    probe_capabilities,
};

/// Where the plugin gets its config and carousel from.
#[derive(Clone)]
pub enum RevealSource {
    /// Built-in config and carousel.
    Default,
    Paths {
        config: PathBuf,
        carousel: PathBuf,
    },
    Bytes {
        config: &'static [u8],
        carousel: &'static [u8],
    },
    Preloaded(Arc<ScenePackage>),
    /// Load via the Bevy asset pipeline from a `.reveal.json` config; the
    /// loader pulls the sibling `.carousel.json` alongside it.
    AssetPath(String),
}

pub struct ScreenRevealPlugin {
    pub source: RevealSource,
}

impl Default for ScreenRevealPlugin {
    fn default() -> Self {
        Self {
            source: RevealSource::Default,
        }
    }
}

impl ScreenRevealPlugin {
    pub fn from_paths<C: Into<PathBuf>, I: Into<PathBuf>>(config: C, carousel: I) -> Self {
        Self {
            source: RevealSource::Paths {
                config: config.into(),
                carousel: carousel.into(),
            },
        }
    }

    /// Embed config and carousel bytes directly (useful for wasm).
    pub fn from_bytes(config: &'static [u8], carousel: &'static [u8]) -> Self {
        Self {
            source: RevealSource::Bytes { config, carousel },
        }
    }

    pub fn from_asset_path(path: impl Into<String>) -> Self {
        Self {
            source: RevealSource::AssetPath(path.into()),
        }
    }

    pub fn preloaded(package: ScenePackage) -> Self {
        Self {
            source: RevealSource::Preloaded(Arc::new(package)),
        }
    }
}

/// Package waiting to be turned into a scene; consumed by setup.
#[derive(Resource, Clone)]
pub struct RevealPackage(pub Arc<ScenePackage>);

/// Live sequence state plus the last frame handed to the apply systems.
#[derive(Resource)]
pub struct RevealState {
    pub director: Director,
    pub frame: Frame,
    pub render_path: RenderPath,
}

/// Setup and load errors, shown by the diagnostic overlay.
#[derive(Resource, Default, Debug)]
pub struct RevealDiagnostics {
    pub errors: Vec<String>,
}

/// Set by the host while another consumer owns the pointer (e.g. an egui panel).
#[derive(Resource, Default, Debug)]
pub struct ScrollGate {
    pub blocked: bool,
}

#[derive(Resource, Clone, Default)]
pub struct RevealLifetime(pub SceneLifetime);

/// Plugin that builds the TV set and card helix and drives them from scroll input.
impl Plugin for ScreenRevealPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<StaticScreenMaterial>::default())
            .init_asset::<ScenePackageAsset>()
            .init_asset_loader::<assets::ScenePackageLoader>()
            .init_resource::<RevealDiagnostics>()
            .init_resource::<ScrollGate>()
            .init_resource::<RevealLifetime>()
            .add_systems(
                Update,
                (
                    assets::hydrate_package_asset,
                    spawn::setup_scene.run_if(resource_exists::<RevealPackage>),
                    assets::begin_loads
                        .run_if(resource_exists::<RevealState>)
                        .run_if(not(resource_exists::<RevealLoads>)),
                    assets::track_loads.run_if(resource_exists::<RevealLoads>),
                    (
                        input::track_viewport,
                        input::read_wheel,
                        input::read_touch,
                        input::update_hover,
                        tick_director,
                    )
                        .chain()
                        .run_if(resource_exists::<RevealState>),
                    (
                        apply::apply_camera,
                        apply::apply_layers,
                        apply::apply_cards,
                        apply::apply_lights,
                        apply::apply_screen,
                        apply::apply_backdrop,
                        media::apply_media,
                        media::apply_ambience,
                        media::sample_poster_glow,
                        overlay::update_overlays,
                    )
                        .chain()
                        .run_if(resource_exists::<RevealState>)
                        .run_if(resource_exists::<RevealEntities>),
                    overlay::show_diagnostics,
                )
                    .chain(),
            )
            .add_systems(Last, teardown_on_exit);

        match &self.source {
            RevealSource::Default => {
                app.insert_resource(RevealPackage(Arc::new(ScenePackage::default())));
            }
            RevealSource::Paths { config, carousel } => {
                insert_loaded(app, ScenePackage::from_paths(config, carousel));
            }
            RevealSource::Bytes { config, carousel } => {
                insert_loaded(app, ScenePackage::from_bytes(config, carousel));
            }
            RevealSource::Preloaded(package) => {
                app.insert_resource(RevealPackage(package.clone()));
            }
            RevealSource::AssetPath(path) => {
                if let Some(asset_server) = app.world().get_resource::<AssetServer>() {
                    let handle: Handle<ScenePackageAsset> = asset_server.load(path.clone());
                    app.insert_resource(assets::PackageHandle(handle));
                } else {
                    record_error(app, format!("no AssetServer to load {path:?}"));
                }
            }
        }
    }
}

fn insert_loaded(app: &mut App, package: anyhow::Result<ScenePackage>) {
    match package {
        Ok(package) => {
            app.insert_resource(RevealPackage(Arc::new(package)));
        }
        Err(err) => record_error(app, format!("{err:#}")),
    }
}

fn record_error(app: &mut App, message: String) {
    error!("screen reveal: {message}");
    app.world_mut()
        .resource_mut::<RevealDiagnostics>()
        .errors
        .push(message);
}

fn tick_director(time: Res<Time>, mut state: ResMut<RevealState>) {
    let frame = state.director.tick(time.delta_secs());
    for event in &frame.events {
        match event {
            SceneEvent::TransitionStarted(direction) => {
                info!("screen reveal: {direction:?} transition started")
            }
            SceneEvent::TransitionFinished(mode) => info!("screen reveal: now in {mode:?}"),
            SceneEvent::FocusChanged { to, .. } => debug!("screen reveal: focus -> {to:?}"),
            SceneEvent::LayersSwapped(_) | SceneEvent::InputBlocked => {}
        }
    }
    state.frame = frame;
}

fn teardown_on_exit(mut exits: MessageReader<AppExit>, lifetime: Res<RevealLifetime>) {
    if exits.read().next().is_some() && lifetime.0.is_alive() {
        info!("screen reveal: tearing down");
        lifetime.0.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
    use bevy::input::touch::TouchInput;
    use bevy::window::WindowResized;
    use screen_reveal::{Layer, Mode};
    use std::time::Duration;

    fn scene_app(package: ScenePackage) -> App {
        let mut app = App::new();
        app.insert_resource(Assets::<Mesh>::default());
        app.insert_resource(Assets::<StandardMaterial>::default());
        app.insert_resource(Assets::<StaticScreenMaterial>::default());
        app.insert_resource(Assets::<Image>::default());
        app.init_resource::<RevealDiagnostics>();
        app.init_resource::<ScrollGate>();
        app.add_message::<MouseWheel>();
        app.add_message::<TouchInput>();
        app.add_message::<WindowResized>();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 60.0));
        app.insert_resource(time);
        app.insert_resource(RevealPackage(Arc::new(package)));
        app.add_systems(
            Update,
            (
                spawn::setup_scene.run_if(resource_exists::<RevealPackage>),
                (input::read_wheel, tick_director)
                    .chain()
                    .run_if(resource_exists::<RevealState>),
                (apply::apply_camera, apply::apply_layers, apply::apply_backdrop)
                    .chain()
                    .run_if(resource_exists::<RevealState>),
            )
                .chain(),
        );
        app
    }

    #[test]
    fn setup_spawns_scene_and_state() {
        let mut app = scene_app(ScenePackage::default());
        app.update();

        let world = app.world_mut();
        assert!(world.get_resource::<RevealPackage>().is_none());
        assert!(world.get_resource::<RevealState>().is_some());
        assert!(world.get_resource::<RevealEntities>().is_some());
        let cameras = world
            .query_filtered::<Entity, With<MainCamera>>()
            .iter(world)
            .count();
        assert_eq!(cameras, 1);
        let screens = world
            .query_filtered::<Entity, With<ScreenTag>>()
            .iter(world)
            .count();
        assert_eq!(screens, 1);
        let lights = world.query::<&SceneLight>().iter(world).count();
        assert_eq!(lights, 6);
    }

    #[test]
    fn construction_error_spawns_nothing() {
        let mut package = ScenePackage::default();
        package.config.tv.cabinet.x = -1.0;
        let mut app = scene_app(package);
        app.update();

        let world = app.world_mut();
        assert!(world.get_resource::<RevealState>().is_none());
        let diagnostics = world.resource::<RevealDiagnostics>();
        assert_eq!(diagnostics.errors.len(), 1);
        assert!(diagnostics.errors[0].contains("cabinet.x"));
        let cameras = world
            .query_filtered::<Entity, With<MainCamera>>()
            .iter(world)
            .count();
        assert_eq!(cameras, 0);
    }

    #[test]
    fn wheel_scroll_drives_camera_through_the_screen() {
        let mut app = scene_app(ScenePackage::default());
        app.update();
        let start_z = {
            let world = app.world_mut();
            let mut q = world.query_filtered::<&Transform, With<MainCamera>>();
            q.single(world).map(|t| t.translation.z).unwrap_or_default()
        };

        for _ in 0..6 {
            app.world_mut().write_message(MouseWheel {
                unit: MouseScrollUnit::Pixel,
                x: 0.0,
                y: -1000.0,
                window: Entity::PLACEHOLDER,
            });
        }
        app.update();
        for _ in 0..420 {
            app.update();
        }

        let world = app.world_mut();
        let state = world.resource::<RevealState>();
        assert_eq!(state.frame.mode, Mode::Spiral);
        assert_eq!(state.frame.layer, Layer::Spiral);
        let stored = state.director.transition().stored_scroll_z();
        assert!(stored.is_some());

        let mut roots = world.query::<(&LayerRoot, &Visibility)>();
        for (root, visibility) in roots.iter(world) {
            let expected = if root.0 == Layer::Spiral {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            assert_eq!(*visibility, expected);
        }
        let mut q = world.query_filtered::<&Transform, With<MainCamera>>();
        let z = q.single(world).map(|t| t.translation.z).unwrap_or_default();
        assert_ne!(z, start_z);
    }

    #[test]
    fn gated_scroll_is_ignored() {
        let mut app = scene_app(ScenePackage::default());
        app.update();
        app.world_mut().resource_mut::<ScrollGate>().blocked = true;
        app.world_mut().write_message(MouseWheel {
            unit: MouseScrollUnit::Line,
            x: 0.0,
            y: -10.0,
            window: Entity::PLACEHOLDER,
        });
        app.update();
        let state = app.world().resource::<RevealState>();
        assert_eq!(state.frame.scroll_target, 0.0);
    }
}
