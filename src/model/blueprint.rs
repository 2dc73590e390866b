use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use super::grain::GrainTexture;
use crate::state::transition::Layer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Local transform relative to the parent node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Placed at `eye`, -Z pointing at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
        Self::from_translation(eye).with_rotation(rotation)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Engine-neutral mesh shapes. Cylinders run along local Y, quads face +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Cuboid { size: Vec3 },
    Cylinder { radius: f32, height: f32, segments: u32 },
    Sphere { radius: f32, segments: u32 },
    Quad { size: Vec2 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Surface {
    /// Cabinet veneer, uses the wood grain texture.
    Wood,
    Plastic([f32; 3]),
    Metal,
    Grille,
    /// The animated static shader.
    StaticScreen,
    /// Uses the floor grain texture.
    Floor,
    Backdrop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightRole {
    Key,
    Fill,
    ScreenGlow,
    Rim,
    SpiralKey,
    SpiralGlow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Point { range: f32 },
    Spot { range: f32, outer_angle: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSpec {
    pub role: LightRole,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub shadows: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { primitive: Primitive, surface: Surface },
    Light(LightSpec),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub local: LocalTransform,
}

/// Nodes the per-frame systems mutate after spawning.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneHandles {
    pub intro_root: NodeId,
    pub spiral_root: NodeId,
    pub tv_group: NodeId,
    pub screen: NodeId,
    pub floor: NodeId,
    pub backdrop: NodeId,
    pub card_group: NodeId,
    pub lights: Vec<(LightRole, NodeId)>,
}

impl SceneHandles {
    pub fn light(&self, role: LightRole) -> Option<NodeId> {
        self.lights
            .iter()
            .find_map(|(r, id)| (*r == role).then_some(*id))
    }

    pub fn layer_root(&self, layer: Layer) -> NodeId {
        match layer {
            Layer::Intro => self.intro_root,
            Layer::Spiral => self.spiral_root,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneTextures {
    pub wood: GrainTexture,
    pub floor: GrainTexture,
}

/// Output of [`SceneBuilder`](super::SceneBuilder): a flat arena of nodes
/// where every parent precedes its children.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneBlueprint {
    pub nodes: Vec<Node>,
    pub handles: SceneHandles,
    pub textures: SceneTextures,
}

impl SceneBlueprint {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(i, _)| NodeId(i))
    }

    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current.0];
            m = node.local.matrix() * m;
            cursor = node.parent;
        }
        m
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_transform(id).transform_point3(Vec3::ZERO)
    }

    pub fn layer_of(&self, id: NodeId) -> Option<Layer> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.handles.intro_root {
                return Some(Layer::Intro);
            }
            if current == self.handles.spiral_root {
                return Some(Layer::Spiral);
            }
            cursor = self.nodes[current.0].parent;
        }
        None
    }
}
