use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use screen_reveal::Mode;
use std::collections::HashMap;

use crate::spawn::MainCamera;
use crate::{RevealState, ScrollGate};

/// Wheel deltas in pixels, positive scrolls forward into the scene.
pub(crate) fn read_wheel(
    mut wheel: MessageReader<MouseWheel>,
    gate: Res<ScrollGate>,
    mut state: ResMut<RevealState>,
) {
    let line_height = state.director.config().input.line_height_px;
    for event in wheel.read() {
        if gate.blocked {
            continue;
        }
        let delta = match event.unit {
            MouseScrollUnit::Line => -event.y * line_height,
            MouseScrollUnit::Pixel => -event.y,
        };
        state.director.on_input(delta);
    }
}

/// Vertical drag, scaled so a short swipe covers as much as a wheel flick.
pub(crate) fn read_touch(
    mut touches: MessageReader<TouchInput>,
    mut last_y: Local<HashMap<u64, f32>>,
    gate: Res<ScrollGate>,
    mut state: ResMut<RevealState>,
) {
    let multiplier = state.director.config().input.touch_multiplier;
    for touch in touches.read() {
        match touch.phase {
            TouchPhase::Started => {
                last_y.insert(touch.id, touch.position.y);
            }
            TouchPhase::Moved => {
                let previous = last_y.insert(touch.id, touch.position.y);
                if let Some(previous) = previous
                    && !gate.blocked
                {
                    state.director.on_input((previous - touch.position.y) * multiplier);
                }
            }
            TouchPhase::Ended | TouchPhase::Canceled => {
                last_y.remove(&touch.id);
            }
        }
    }
}

pub(crate) fn track_viewport(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut seeded: Local<bool>,
    mut state: ResMut<RevealState>,
) {
    if !*seeded && let Ok(window) = windows.single() {
        *seeded = true;
        if window.height() > 0.0 {
            state.director.set_viewport(window.width() / window.height());
        }
    }
    if let Some(event) = resized.read().last()
        && event.height > 0.0
    {
        state.director.set_viewport(event.width / event.height);
    }
}

pub(crate) fn update_hover(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    gate: Res<ScrollGate>,
    mut state: ResMut<RevealState>,
) {
    if state.director.mode() != Mode::Spiral || gate.blocked {
        if state.director.hovered().is_some() {
            state.director.set_hovered(None);
        }
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let hit = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
        .and_then(|ray| state.director.pick(ray.origin, *ray.direction));
    state.director.set_hovered(hit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use screen_reveal::ScenePackage;
    use screen_reveal::util::capability::RenderPath;

    fn touch(phase: TouchPhase, y: f32) -> TouchInput {
        TouchInput {
            phase,
            position: Vec2::new(100.0, y),
            window: Entity::PLACEHOLDER,
            force: None,
            id: 1,
        }
    }

    #[test]
    fn upward_swipe_scrolls_forward() -> anyhow::Result<()> {
        let package = ScenePackage::default();
        let director = package.director()?;
        let frame = director.frame();
        let mut app = App::new();
        app.add_message::<TouchInput>();
        app.init_resource::<ScrollGate>();
        app.insert_resource(RevealState {
            director,
            frame,
            render_path: RenderPath::Direct,
        });
        app.add_systems(Update, read_touch);

        app.world_mut().write_message(touch(TouchPhase::Started, 500.0));
        app.world_mut().write_message(touch(TouchPhase::Moved, 400.0));
        app.world_mut().write_message(touch(TouchPhase::Ended, 400.0));
        app.update();

        let state = app.world().resource::<RevealState>();
        let expected = 100.0
            * package.config.input.touch_multiplier
            * package.config.dolly.sensitivity;
        assert!((state.director.scroll().scroll_z().target() - expected).abs() < 1e-3);
        Ok(())
    }
}
