#![cfg_attr(target_arch = "wasm32", no_main)]

use bevy::app::AppExit;
use bevy::input::{ButtonInput, keyboard::KeyCode};
use bevy::prelude::*;
use bevy::prelude::{MessageReader, MessageWriter};
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use bevy_screen_reveal::screen_reveal::util::media::MediaControl;
use bevy_screen_reveal::{
    CardMedia, RevealDiagnostics, RevealState, ScreenRevealPlugin, ScrollGate,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

/// Scroll distance of one arrow-key press, in wheel pixels.
const KEY_STEP: f32 = 100.0;
const PAGE_STEP: f32 = 1000.0;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "screen reveal".to_string(),
            #[cfg(target_arch = "wasm32")]
            canvas: Some("#bevy-canvas".to_string()),
            #[cfg(target_arch = "wasm32")]
            fit_canvas_to_parent: true,
            ..default()
        }),
        ..default()
    });
    #[cfg(target_arch = "wasm32")]
    let plugins = plugins.set(bevy::asset::AssetPlugin {
        meta_check: bevy::asset::AssetMetaCheck::Never,
        ..default()
    });

    App::new()
        .add_plugins(plugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(ScreenRevealPlugin::from_asset_path("scene.reveal.json"))
        .add_systems(
            PreUpdate,
            (
                handle_close_requests,
                gate_scroll_during_egui,
                native_controls.run_if(resource_exists::<RevealState>),
            ),
        )
        .add_systems(EguiPrimaryContextPass, hud)
        .run();
}

fn handle_close_requests(
    mut reader: MessageReader<bevy::window::WindowCloseRequested>,
    mut exit: MessageWriter<AppExit>,
) {
    if reader.read().next().is_some() {
        exit.write(AppExit::Success);
    }
}

fn gate_scroll_during_egui(mut contexts: EguiContexts, mut gate: ResMut<ScrollGate>) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let block =
        ctx.is_pointer_over_area() || ctx.wants_pointer_input() || ctx.wants_keyboard_input();
    if gate.blocked != block {
        gate.blocked = block;
    }
}

fn native_controls(
    keys: Res<ButtonInput<KeyCode>>,
    gate: Res<ScrollGate>,
    mut state: ResMut<RevealState>,
    mut media: Query<&mut CardMedia>,
    mut exit: MessageWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
        return;
    }
    if gate.blocked {
        return;
    }
    for (key, delta) in [
        (KeyCode::ArrowDown, KEY_STEP),
        (KeyCode::ArrowUp, -KEY_STEP),
        (KeyCode::PageDown, PAGE_STEP),
        (KeyCode::PageUp, -PAGE_STEP),
    ] {
        if keys.just_pressed(key) {
            state.director.on_input(delta);
        }
    }
    if keys.just_pressed(KeyCode::Space)
        && let Some(focused) = state.frame.focused
    {
        for mut card in &mut media {
            if card.index == focused {
                card.toggle();
            }
        }
    }
}

fn hud(
    mut contexts: EguiContexts,
    state: Option<Res<RevealState>>,
    diagnostics: Res<RevealDiagnostics>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Window::new("screen reveal")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .show(ctx, |ui| {
            match &state {
                Some(state) => {
                    let frame = &state.frame;
                    let max_scroll = state.director.config().dolly.max_scroll;
                    ui.label(format!("mode: {:?} ({:?})", frame.mode, frame.phase));
                    ui.label(format!(
                        "scroll: {:.0} / {:.0}",
                        frame.scroll_z, max_scroll
                    ));
                    ui.label(format!("focus: {:.2}", frame.focus));
                    if let Some(item) = frame.focused.and_then(|i| state.director.items().get(i)) {
                        ui.label(format!("focused: {}", item.title));
                    }
                    ui.label(format!("render: {}", state.render_path.label()));
                }
                None => {
                    ui.label("building scene");
                }
            }
            ui.separator();
            ui.label("wheel / swipe / arrows: scroll");
            ui.label("space: play or pause focused card");
            ui.label("esc: quit");
            for error in &diagnostics.errors {
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }
        });
}
