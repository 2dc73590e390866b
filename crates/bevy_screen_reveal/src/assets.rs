use anyhow::{Context, anyhow};
use bevy::asset::{AssetLoader, LoadContext, LoadState as AssetLoadState, UntypedAssetId, io::Reader};
use bevy::audio::{AudioPlayer, AudioSource, PlaybackSettings};
use bevy::log::{info, warn};
use bevy::prelude::*;
use screen_reveal::ScenePackage;
use screen_reveal::model::build_cards;
use screen_reveal::util::lifetime::LiveToken;
use screen_reveal::util::loads::{LoadGraph, ReadyStep};
use std::sync::Arc;

use crate::media::AmbienceAudio;
use crate::overlay::spawn_caption;
use crate::spawn::{RevealEntities, spawn_cards};
use crate::{RevealDiagnostics, RevealLifetime, RevealPackage, RevealState};

#[derive(Resource, Clone)]
pub(crate) struct PackageHandle(pub Handle<ScenePackageAsset>);

#[derive(Asset, TypePath, Clone)]
pub struct ScenePackageAsset(pub Arc<ScenePackage>);

#[derive(Default)]
pub(crate) struct ScenePackageLoader;

impl AssetLoader for ScenePackageLoader {
    type Asset = ScenePackageAsset;
    type Settings = ();
    type Error = anyhow::Error;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext<'_>,
    ) -> impl bevy::tasks::ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            let mut config_bytes: Vec<u8> = Vec::new();
            reader.read_to_end(&mut config_bytes).await?;
            let stem = load_context
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| anyhow!("scene config missing stem"))?;
            let base = stem.strip_suffix(".reveal").unwrap_or(stem);
            let carousel_path = load_context
                .path()
                .with_file_name(format!("{base}.carousel.json"));
            let carousel_bytes: Vec<u8> = load_context
                .read_asset_bytes(carousel_path.clone())
                .await
                .with_context(|| format!("reading companion {:?}", carousel_path))?;
            let package = ScenePackage::from_bytes(&config_bytes, &carousel_bytes)?;
            Ok(ScenePackageAsset(Arc::new(package)))
        }
    }

    fn extensions(&self) -> &[&str] {
        &["reveal.json"]
    }
}

pub(crate) fn hydrate_package_asset(
    mut commands: Commands,
    handle: Option<Res<PackageHandle>>,
    assets: Res<Assets<ScenePackageAsset>>,
    asset_server: Res<AssetServer>,
    mut diagnostics: ResMut<RevealDiagnostics>,
) {
    let Some(handle) = handle else { return };
    if let Some(asset) = assets.get(&handle.0) {
        commands.insert_resource(RevealPackage(asset.0.clone()));
        commands.remove_resource::<PackageHandle>();
    } else if let AssetLoadState::Failed(err) = asset_server.load_state(&handle.0) {
        error!("screen reveal: scene package failed to load: {err}");
        diagnostics.errors.push(format!("scene package: {err}"));
        commands.remove_resource::<PackageHandle>();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Font,
    Poster(usize),
    Ambience,
}

/// Construction that waits on one or more assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStep {
    Cards,
    Caption,
    Poster(usize),
    Ambience,
}

/// Outstanding asset loads and the steps gated on them.
#[derive(Resource)]
pub struct RevealLoads {
    graph: LoadGraph<BuildStep, AssetKey>,
    pending: Vec<(AssetKey, UntypedAssetId)>,
    font: Option<Handle<Font>>,
    posters: Vec<Option<Handle<Image>>>,
    ambience: Option<Handle<AudioSource>>,
    token: LiveToken,
}

impl RevealLoads {
    pub fn font(&self) -> Option<&Handle<Font>> {
        self.font.as_ref()
    }

    pub fn poster(&self, index: usize) -> Option<&Handle<Image>> {
        self.posters.get(index).and_then(Option::as_ref)
    }

    pub fn is_settled(&self) -> bool {
        self.graph.is_settled()
    }

    /// Resolve finished loads and hand back the steps they release. Returns
    /// `None` once the scene has been torn down, leaving everything untouched.
    fn poll(
        &mut self,
        state_of: impl Fn(UntypedAssetId) -> AssetLoadState,
    ) -> Option<Vec<ReadyStep<BuildStep, AssetKey>>> {
        let token = self.token.clone();
        token.guard(|| {
            let mut ready = self.graph.drain_ready();
            let mut still_pending = Vec::new();
            for (key, id) in std::mem::take(&mut self.pending) {
                match state_of(id) {
                    AssetLoadState::Loaded => ready.extend(self.graph.resolve(key, true)),
                    AssetLoadState::Failed(err) => {
                        warn!("screen reveal: {key:?} failed to load: {err}");
                        ready.extend(self.graph.resolve(key, false));
                    }
                    _ => still_pending.push((key, id)),
                }
            }
            self.pending = still_pending;
            ready
        })
    }
}

pub(crate) fn begin_loads(
    mut commands: Commands,
    state: Res<RevealState>,
    asset_server: Res<AssetServer>,
    lifetime: Res<RevealLifetime>,
) {
    let config = state.director.config();
    let mut graph = LoadGraph::new();
    let mut pending = Vec::new();

    let font = config.assets.font.as_ref().map(|path| {
        let handle: Handle<Font> = asset_server.load(path.clone());
        pending.push((AssetKey::Font, handle.id().untyped()));
        handle
    });
    let font_deps: Vec<AssetKey> = font.iter().map(|_| AssetKey::Font).collect();
    graph.add_step(BuildStep::Cards, font_deps.clone());
    graph.add_step(BuildStep::Caption, font_deps.clone());

    let posters: Vec<Option<Handle<Image>>> = state
        .director
        .items()
        .iter()
        .map(|item| {
            item.video.as_ref().map(|path| {
                let handle: Handle<Image> = asset_server.load(path.clone());
                pending.push((AssetKey::Poster(item.index), handle.id().untyped()));
                graph.add_step(
                    BuildStep::Poster(item.index),
                    font_deps
                        .iter()
                        .copied()
                        .chain([AssetKey::Poster(item.index)]),
                );
                handle
            })
        })
        .collect();

    let ambience = config.assets.ambience.as_ref().map(|path| {
        let handle: Handle<AudioSource> = asset_server.load(path.clone());
        pending.push((AssetKey::Ambience, handle.id().untyped()));
        graph.add_step(BuildStep::Ambience, [AssetKey::Ambience]);
        handle
    });

    info!("screen reveal: waiting on {} asset loads", pending.len());
    commands.insert_resource(RevealLoads {
        graph,
        pending,
        font,
        posters,
        ambience,
        token: lifetime.0.token(),
    });
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn track_loads(
    mut commands: Commands,
    mut loads: ResMut<RevealLoads>,
    asset_server: Res<AssetServer>,
    state: Res<RevealState>,
    entities: Option<ResMut<RevealEntities>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut diagnostics: ResMut<RevealDiagnostics>,
) {
    let Some(mut entities) = entities else { return };
    if loads.is_settled() {
        return;
    }
    let Some(ready) = loads.poll(|id| asset_server.load_state(id)) else {
        return;
    };

    for ready in ready {
        if ready.degraded() {
            warn!(
                "screen reveal: {:?} running without {:?}",
                ready.step, ready.failed
            );
        }
        let font = if ready.failed.contains(&AssetKey::Font) {
            None
        } else {
            loads.font().cloned()
        };
        let step = ready.step;
        match step {
            BuildStep::Cards => {
                match build_cards(state.director.items(), &state.director.config().helix) {
                    Ok(cards) => spawn_cards(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        &mut entities,
                        &cards,
                    ),
                    Err(err) => {
                        error!("screen reveal: building cards failed: {err:#}");
                        diagnostics.errors.push(format!("{err:#}"));
                    }
                }
            }
            BuildStep::Caption => spawn_caption(&mut commands, font),
            BuildStep::Poster(index) => {
                if ready.failed.contains(&AssetKey::Poster(index)) {
                    continue;
                }
                let poster = loads.poster(index).cloned();
                if let (Some(card), Some(poster)) =
                    (entities.cards.iter_mut().find(|c| c.index == index), poster)
                {
                    if let Some(material) = materials.get_mut(&card.poster_material) {
                        material.base_color = Color::WHITE;
                        material.base_color_texture = Some(poster.clone());
                    }
                    card.poster = Some(poster);
                }
            }
            BuildStep::Ambience => {
                if !ready.degraded()
                    && let Some(handle) = loads.ambience.clone()
                {
                    commands.spawn((
                        Name::new("ambience"),
                        AmbienceAudio,
                        AudioPlayer::new(handle),
                        PlaybackSettings::LOOP,
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screen_reveal::util::lifetime::SceneLifetime;

    fn font_only_loads(lifetime: &SceneLifetime) -> RevealLoads {
        let font: Handle<Font> = Handle::default();
        let mut graph = LoadGraph::new();
        graph.add_step(BuildStep::Caption, [AssetKey::Font]);
        RevealLoads {
            graph,
            pending: vec![(AssetKey::Font, font.id().untyped())],
            font: Some(font),
            posters: Vec::new(),
            ambience: None,
            token: lifetime.token(),
        }
    }

    #[test]
    fn finished_font_releases_the_caption() {
        let lifetime = SceneLifetime::new();
        let mut loads = font_only_loads(&lifetime);

        let waiting = loads.poll(|_| AssetLoadState::Loading).unwrap_or_default();
        assert!(waiting.is_empty());
        assert_eq!(loads.pending.len(), 1);

        let ready = loads.poll(|_| AssetLoadState::Loaded).unwrap_or_default();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].step, BuildStep::Caption);
        assert!(!ready[0].degraded());
        assert!(loads.is_settled());
        assert!(loads.pending.is_empty());
    }

    #[test]
    fn loads_finishing_after_teardown_are_dropped() {
        let lifetime = SceneLifetime::new();
        let mut loads = font_only_loads(&lifetime);
        lifetime.teardown();
        assert!(loads.poll(|_| AssetLoadState::Loaded).is_none());
        assert!(!loads.is_settled());
        assert_eq!(loads.pending.len(), 1);
    }
}
