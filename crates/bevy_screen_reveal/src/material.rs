use bevy::pbr::Material;
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::render_resource::AsBindGroup;
use bevy::shader::ShaderRef;

/// Animated TV static on the screen glass.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct StaticScreenMaterial {
    #[uniform(0)]
    // One uniform block: WebGPU allows few uniform buffers per stage.
    // Layout: [(time, brightness, push, boost), (tint.rgb, _)]
    pub u: [Vec4; 2],
}

impl Default for StaticScreenMaterial {
    fn default() -> Self {
        Self {
            u: [Vec4::new(0.0, 0.95, 0.0, 1.0), Vec4::new(0.75, 0.82, 1.0, 0.0)],
        }
    }
}

impl StaticScreenMaterial {
    pub fn set_time(&mut self, t: f32) {
        self.u[0].x = t;
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.u[0].y = brightness;
    }

    pub fn set_push(&mut self, push: f32) {
        self.u[0].z = push;
    }

    pub fn set_boost(&mut self, boost: f32) {
        self.u[0].w = boost;
    }

    pub fn set_tint(&mut self, tint: Vec3) {
        self.u[1] = tint.extend(0.0);
    }
}

impl Material for StaticScreenMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/static_noise.wgsl".into()
    }
}
