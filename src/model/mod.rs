//! Procedural scene construction.
//!
//! [`SceneBuilder`] turns the dimension config into an engine-neutral
//! [`SceneBlueprint`]: a node tree of primitives and lights plus the handles
//! the per-frame systems mutate. Cards are built separately, once their font
//! dependency has settled.

pub mod blueprint;
pub mod cards;
pub mod grain;
pub mod set;
mod tv;

use anyhow::{Result, bail};
use tracing::debug;

pub use blueprint::{
    LightKind, LightRole, LightSpec, LocalTransform, Node, NodeId, NodeKind, Primitive,
    SceneBlueprint, SceneHandles, SceneTextures, Surface,
};
pub use cards::{CardBlueprint, build_cards};

use crate::data::config::SceneConfig;
use crate::error::SceneError;

pub struct SceneBuilder {
    config: SceneConfig,
    nodes: Vec<Node>,
}

impl SceneBuilder {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            config: config.clone(),
            nodes: Vec::new(),
        }
    }

    pub(crate) fn add(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        local: LocalTransform,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            kind,
            local,
        });
        id
    }

    fn validate(&self) -> Result<()> {
        let tv = &self.config.tv;
        let set = &self.config.set;
        let positive = [
            ("tv.cabinet.x", tv.cabinet.x),
            ("tv.cabinet.y", tv.cabinet.y),
            ("tv.cabinet.z", tv.cabinet.z),
            ("tv.leg_height", tv.leg_height),
            ("tv.leg_radius", tv.leg_radius),
            ("tv.screen.x", tv.screen.x),
            ("tv.screen.y", tv.screen.y),
            ("tv.bezel_depth", tv.bezel_depth),
            ("tv.knob_radius", tv.knob_radius),
            ("tv.antenna_length", tv.antenna_length),
            ("set.floor_size", set.floor_size),
            ("set.wall_distance", set.wall_distance),
            ("set.wall_height", set.wall_height),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                bail!(SceneError::Construction(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if tv.segments < 3 {
            bail!(SceneError::Construction(format!(
                "tv.segments must be at least 3, got {}",
                tv.segments
            )));
        }
        let bezel = tv.screen.x + tv.bezel_margin * 2.0;
        let bezel_left = tv.screen_offset.x - bezel * 0.5;
        let bezel_right = tv.screen_offset.x + bezel * 0.5;
        if bezel_left < -tv.cabinet.x * 0.5 || bezel_right > tv.cabinet.x * 0.5 {
            bail!(SceneError::Construction(
                "screen and bezel do not fit the cabinet width".into()
            ));
        }
        if tv.screen.y + tv.bezel_margin * 2.0 + tv.screen_offset.y.abs() * 2.0 > tv.cabinet.y {
            bail!(SceneError::Construction(
                "screen and bezel do not fit the cabinet height".into()
            ));
        }
        Ok(())
    }

    /// Validate and emit the whole static scene. Consumes the builder.
    pub fn build(mut self) -> Result<SceneBlueprint> {
        self.validate()?;
        let config = self.config.clone();

        let intro_root = self.add(None, "intro", NodeKind::Group, LocalTransform::default());
        let spiral_root = self.add(None, "spiral", NodeKind::Group, LocalTransform::default());

        let tv_nodes = tv::build_tv(&mut self, intro_root, &config.tv);
        let set_nodes = set::build_set(&mut self, intro_root, &config);
        let card_group = self.add(
            Some(spiral_root),
            "cards",
            NodeKind::Group,
            LocalTransform::from_translation(config.helix.origin),
        );
        let lights = set::build_lights(&mut self, intro_root, card_group, &config);

        let textures = SceneTextures {
            wood: grain::wood_grain(config.set.grain_seed, config.set.grain_size),
            floor: grain::floor_grain(config.set.grain_seed, config.set.grain_size),
        };

        debug!(nodes = self.nodes.len(), "scene blueprint built");
        Ok(SceneBlueprint {
            nodes: self.nodes,
            handles: SceneHandles {
                intro_root,
                spiral_root,
                tv_group: tv_nodes.group,
                screen: tv_nodes.screen,
                floor: set_nodes.floor,
                backdrop: set_nodes.backdrop,
                card_group,
                lights,
            },
            textures,
        })
    }
}
