//! The per-tick scheduler.
//!
//! [`Director`] owns every piece of mutable sequence state. The host feeds it
//! input deltas and frame times and applies the returned [`Frame`]; nothing in
//! here touches an engine, so several directors can run side by side in tests.

use anyhow::{Result, bail};
use glam::{Vec2, Vec3};
use tracing::{debug, info};

use crate::data::carousel::CarouselItem;
use crate::data::config::SceneConfig;
use crate::error::SceneError;
use crate::model::set::backdrop_scale;
use crate::motion::ambient::{AmbientFrame, ambient_at};
use crate::motion::dolly::{CameraPose, DollyPath};
use crate::motion::easing::{Easing, smoothing_alpha};
use crate::motion::helix::{CardTransform, HelixLayout, focus_index, spiral_camera};
use crate::motion::lighting::{GlowTracker, LightLevels, intro_lights, spiral_lights};
use crate::state::scroll::{Direction, InputOutcome, Mode, REFERENCE_HZ, ScrollStateMachine};
use crate::state::transition::{Layer, Phase, TransitionController};
use crate::state::tween::{TweenChannel, TweenList};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    TransitionStarted(Direction),
    LayersSwapped(Layer),
    TransitionFinished(Mode),
    FocusChanged {
        from: Option<usize>,
        to: Option<usize>,
    },
    InputBlocked,
}

/// Intro-only values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntroFrame {
    pub eased: f32,
    pub backdrop_scale: Vec2,
    /// `push` uniform of the static shader, grows toward the glass.
    pub screen_push: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardFrame {
    pub transform: CardTransform,
    /// Hover scale multiplier, `1.0` at rest.
    pub hover: f32,
}

/// Everything the host needs to draw one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub mode: Mode,
    pub layer: Layer,
    pub phase: Phase,
    pub camera: CameraPose,
    pub blackout: f32,
    pub scroll_z: f32,
    pub scroll_target: f32,
    pub focus: f32,
    pub focus_target: f32,
    pub intro: Option<IntroFrame>,
    /// Empty unless the spiral layer is visible.
    pub cards: Vec<CardFrame>,
    pub lights: LightLevels,
    pub glow_color: Vec3,
    pub ambient: AmbientFrame,
    pub proximity: f32,
    pub focused: Option<usize>,
    pub title_opacity: f32,
    pub events: Vec<SceneEvent>,
}

pub struct Director {
    config: SceneConfig,
    items: Vec<CarouselItem>,
    scroll: ScrollStateMachine,
    transition: TransitionController,
    tweens: TweenList,
    helix: HelixLayout,
    glow: GlowTracker,
    elapsed: f32,
    aspect: f32,
    hovered: Option<usize>,
    focused: Option<usize>,
    poster_sample: Option<Vec3>,
    events: Vec<SceneEvent>,
}

impl Director {
    pub fn new(config: SceneConfig, mut items: Vec<CarouselItem>) -> Result<Self> {
        config.validate()?;
        if items.is_empty() {
            bail!(SceneError::EmptyCarousel);
        }
        for (i, item) in items.iter_mut().enumerate() {
            item.index = i;
        }
        let dolly = DollyPath::from_config(&config);
        debug!(
            threshold_z = dolly.threshold_z(),
            threshold_progress = dolly.threshold_progress(),
            "dolly threshold derived"
        );
        let scroll = ScrollStateMachine::new(
            dolly,
            config.dolly.sensitivity,
            config.dolly.smoothing,
            items.len(),
            config.helix.sensitivity,
            config.helix.smoothing,
        );
        Ok(Self {
            transition: TransitionController::new(config.transition.clone()),
            helix: HelixLayout::from_config(&config.helix),
            glow: GlowTracker::new(config.lighting.glow_color_smoothing),
            tweens: TweenList::new(),
            scroll,
            items,
            config,
            elapsed: 0.0,
            aspect: 16.0 / 9.0,
            hovered: None,
            focused: None,
            poster_sample: None,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    pub fn mode(&self) -> Mode {
        self.scroll.mode()
    }

    pub fn scroll(&self) -> &ScrollStateMachine {
        &self.scroll
    }

    pub fn transition(&self) -> &TransitionController {
        &self.transition
    }

    pub fn tweens(&self) -> &TweenList {
        &self.tweens
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Feed one raw scroll delta (pixels, positive moves forward).
    pub fn on_input(&mut self, raw_delta: f32) -> InputOutcome {
        let outcome = self.scroll.on_input(raw_delta);
        match outcome {
            InputOutcome::Blocked => self.events.push(SceneEvent::InputBlocked),
            InputOutcome::SwitchRequested(direction) => self.start_transition(direction),
            InputOutcome::Accepted => {}
        }
        outcome
    }

    fn start_transition(&mut self, direction: Direction) {
        let scroll_z = self.scroll.scroll_z().current();
        if self.transition.trigger(direction, scroll_z) {
            info!(?direction, scroll_z, "transition started");
            self.scroll.begin_transition();
            self.set_hovered(None);
            // The caption holds where it is while the screen goes dark.
            self.tweens.cancel(TweenChannel::TitleOpacity);
            self.events.push(SceneEvent::TransitionStarted(direction));
        }
    }

    /// Hovered card from picking. Ignored outside the spiral.
    pub fn set_hovered(&mut self, hovered: Option<usize>) {
        let hovered = hovered
            .filter(|i| *i < self.items.len())
            .filter(|_| self.scroll.mode() == Mode::Spiral);
        if hovered == self.hovered {
            return;
        }
        let h = &self.config.helix;
        if let Some(old) = self.hovered {
            self.tweens
                .retarget(TweenChannel::CardHover(old), 1.0, h.hover_secs, Easing::OutCubic, 1.0);
        }
        if let Some(new) = hovered {
            self.tweens.retarget(
                TweenChannel::CardHover(new),
                1.0 + h.hover_lift,
                h.hover_secs,
                Easing::OutCubic,
                1.0,
            );
        }
        self.hovered = hovered;
    }

    /// Width over height of the render surface.
    pub fn set_viewport(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Average colour of the focused card's poster, once sampled.
    pub fn set_poster_sample(&mut self, color: Option<Vec3>) {
        self.poster_sample = color;
    }

    /// Card under a world-space ray, if the spiral is interactive.
    pub fn pick(&self, origin: Vec3, dir: Vec3) -> Option<usize> {
        if self.scroll.mode() != Mode::Spiral {
            return None;
        }
        let slots = self.helix.layout(self.items.len(), self.scroll.focus().current());
        let hover: Vec<f32> = (0..self.items.len())
            .map(|i| self.tweens.value_or(TweenChannel::CardHover(i), 1.0))
            .collect();
        self.helix
            .pick(origin - self.config.helix.origin, dir, &slots, &hover)
    }

    /// Advance everything by `dt` seconds and describe the result.
    pub fn tick(&mut self, dt: f32) -> Frame {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_tick_secs)
        } else {
            0.0
        };
        self.elapsed += dt;

        if let Some(direction) = self.scroll.advance(dt) {
            self.start_transition(direction);
        }

        let step = self.transition.advance(dt);
        if let Some(direction) = step.swapped {
            match direction {
                Direction::Forward => self.scroll.enter_spiral(),
                Direction::Reverse => {
                    if let Some(stored) = self.transition.stored_scroll_z() {
                        self.scroll.restore_intro(stored);
                    }
                }
            }
            self.events.push(SceneEvent::LayersSwapped(direction.incoming()));
        }
        if let Some(direction) = step.finished {
            self.scroll.finish_transition(direction);
            info!(mode = ?self.scroll.mode(), "transition finished");
            self.events
                .push(SceneEvent::TransitionFinished(self.scroll.mode()));
        }

        self.update_focus();
        self.tweens.advance(dt);

        if self.transition.visible_layer() == Layer::Spiral {
            let alpha = smoothing_alpha(self.glow.smoothing(), dt, REFERENCE_HZ);
            self.glow.advance(self.poster_sample, alpha);
        }

        let mut frame = self.frame();
        frame.events = std::mem::take(&mut self.events);
        frame
    }

    fn update_focus(&mut self) {
        let focused = match self.transition.visible_layer() {
            Layer::Spiral => focus_index(self.scroll.focus().current(), self.items.len()),
            Layer::Intro => None,
        };
        if focused == self.focused {
            return;
        }
        self.events.push(SceneEvent::FocusChanged {
            from: self.focused,
            to: focused,
        });
        self.focused = focused;
        self.poster_sample = None;
        self.tweens.snap(TweenChannel::TitleOpacity, 0.0);
        if focused.is_some() {
            self.tweens.retarget(
                TweenChannel::TitleOpacity,
                1.0,
                self.config.helix.title_fade_secs,
                Easing::InOut,
                0.0,
            );
        }
    }

    /// Current state as a frame, without advancing time. Carries no events.
    pub fn frame(&self) -> Frame {
        let cfg = &self.config;
        let layer = self.transition.visible_layer();
        let ambient = ambient_at(&cfg.ambient, self.elapsed, cfg.effects.grain_frames);
        let scroll_z = self.scroll.scroll_z();
        let focus = self.scroll.focus();

        let (camera, intro, cards, lights, proximity) = match layer {
            Layer::Intro => {
                let dolly = self.scroll.dolly();
                let eased = dolly.eased(scroll_z.current());
                let intro = IntroFrame {
                    eased,
                    backdrop_scale: backdrop_scale(cfg, self.aspect, eased),
                    screen_push: eased,
                };
                (
                    dolly.pose(scroll_z.current()),
                    Some(intro),
                    Vec::new(),
                    intro_lights(&cfg.lighting, eased, ambient.flicker),
                    dolly.proximity(scroll_z.current()),
                )
            }
            Layer::Spiral => {
                let cards = self
                    .helix
                    .layout(self.items.len(), focus.current())
                    .into_iter()
                    .map(|transform| CardFrame {
                        hover: self
                            .tweens
                            .value_or(TweenChannel::CardHover(transform.index), 1.0),
                        transform,
                    })
                    .collect();
                (
                    spiral_camera(&cfg.helix),
                    None,
                    cards,
                    spiral_lights(&cfg.lighting, ambient.pulse),
                    1.0,
                )
            }
        };

        let focused_opacity = self
            .focused
            .and_then(|i| cards.get(i))
            .map_or(0.0, |c: &CardFrame| c.transform.opacity);
        let title_opacity =
            self.tweens.value_or(TweenChannel::TitleOpacity, 0.0) * focused_opacity;

        Frame {
            mode: self.scroll.mode(),
            layer,
            phase: self.transition.phase(),
            camera,
            blackout: self.transition.blackout(),
            scroll_z: scroll_z.current(),
            scroll_target: scroll_z.target(),
            focus: focus.current(),
            focus_target: focus.target(),
            intro,
            cards,
            lights,
            glow_color: self.glow.color(),
            ambient,
            proximity,
            focused: self.focused,
            title_opacity,
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::carousel::default_carousel;

    fn director() -> Director {
        Director::new(SceneConfig::default(), default_carousel()).unwrap()
    }

    fn run(d: &mut Director, secs: f32) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        let steps = (secs * 60.0) as usize;
        for _ in 0..steps {
            events.extend(d.tick(1.0 / 60.0).events);
        }
        events
    }

    fn into_spiral(d: &mut Director) {
        d.on_input(6000.0);
        run(d, 6.0);
        assert_eq!(d.mode(), Mode::Spiral);
    }

    #[test]
    fn empty_carousel_is_rejected() {
        let err = Director::new(SceneConfig::default(), Vec::new()).err().unwrap();
        assert_eq!(
            err.downcast_ref::<SceneError>(),
            Some(&SceneError::EmptyCarousel)
        );
    }

    #[test]
    fn intro_frame_only_until_swap() {
        let mut d = director();
        let f = d.tick(1.0 / 60.0);
        assert_eq!(f.layer, Layer::Intro);
        assert!(f.intro.is_some());
        assert!(f.cards.is_empty());
        assert_eq!(f.lights.spiral_key, 0.0);
    }

    #[test]
    fn input_blocked_while_transitioning() {
        let mut d = director();
        d.on_input(6000.0);
        let mut started = false;
        for _ in 0..600 {
            let f = d.tick(1.0 / 60.0);
            if f.events
                .contains(&SceneEvent::TransitionStarted(Direction::Forward))
            {
                started = true;
                break;
            }
        }
        assert!(started);
        assert_eq!(d.mode(), Mode::Transitioning);
        let frozen = d.tick(0.0).scroll_z;
        assert_eq!(d.on_input(100.0), InputOutcome::Blocked);
        let f = d.tick(1.0 / 60.0);
        assert!(f.events.contains(&SceneEvent::InputBlocked));
        assert_eq!(f.scroll_z, frozen);
    }

    #[test]
    fn forward_then_reverse_restores_camera() {
        let mut d = director();
        into_spiral(&mut d);
        let stored = d.transition().stored_scroll_z().unwrap();
        let expected = d.scroll().dolly().pose(stored);

        let outcome = d.on_input(-500.0);
        assert_eq!(outcome, InputOutcome::SwitchRequested(Direction::Reverse));
        let events = run(&mut d, 2.0);
        assert!(events.contains(&SceneEvent::TransitionFinished(Mode::Intro)));
        let f = d.tick(0.0);
        assert_eq!(f.mode, Mode::Intro);
        assert_eq!(f.scroll_z, stored);
        assert!((f.camera.position - expected.position).length() < 1e-6);
    }

    #[test]
    fn restored_intro_does_not_retrigger_without_new_input() {
        let mut d = director();
        into_spiral(&mut d);
        d.on_input(-500.0);
        run(&mut d, 2.0);
        let events = run(&mut d, 3.0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SceneEvent::TransitionStarted(_))));
        assert_eq!(d.mode(), Mode::Intro);
    }

    #[test]
    fn zero_dt_tick_is_idempotent() {
        let mut d = director();
        d.on_input(800.0);
        run(&mut d, 0.3);
        let a = d.tick(0.0);
        let b = d.tick(0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn spiral_focus_tracks_input_and_fades_title_in() {
        let mut d = director();
        into_spiral(&mut d);
        d.on_input(800.0);
        let events = run(&mut d, 3.0);
        let f = d.tick(0.0);
        assert_eq!(f.focused, Some(2));
        assert!(events.iter().any(|e| matches!(
            e,
            SceneEvent::FocusChanged { to: Some(2), .. }
        )));
        assert!(f.title_opacity > 0.9);
        assert_eq!(f.cards.len(), 8);
    }

    #[test]
    fn hover_lifts_card_and_picks_front_card() {
        let mut d = director();
        into_spiral(&mut d);
        let camera = d.tick(0.0).camera;
        let hit = d.pick(camera.position, camera.forward());
        assert_eq!(hit, Some(0));
        d.set_hovered(hit);
        run(&mut d, 0.5);
        let f = d.tick(0.0);
        let lift = 1.0 + d.config().helix.hover_lift;
        assert!((f.cards[0].hover - lift).abs() < 1e-5);
        assert_eq!(f.cards[1].hover, 1.0);
    }

    #[test]
    fn title_fade_freezes_once_reverse_starts() {
        let mut d = director();
        into_spiral(&mut d);
        d.on_input(800.0);
        let mut changed = false;
        for _ in 0..120 {
            let f = d.tick(1.0 / 60.0);
            if f.events.iter().any(|e| matches!(e, SceneEvent::FocusChanged { to: Some(1), .. })) {
                changed = true;
                break;
            }
        }
        assert!(changed);
        run(&mut d, 0.05);
        assert!(d.tweens().is_animating());

        assert_eq!(
            d.on_input(-5000.0),
            InputOutcome::SwitchRequested(Direction::Reverse)
        );
        let held = d.tick(0.0).title_opacity;
        assert!(held > 0.0 && held < 1.0);
        for _ in 0..5 {
            assert_eq!(d.tick(1.0 / 60.0).title_opacity, held);
        }
    }

    #[test]
    fn hover_ignored_in_intro() {
        let mut d = director();
        d.set_hovered(Some(0));
        assert_eq!(d.hovered(), None);
        assert_eq!(d.pick(Vec3::ZERO, Vec3::NEG_Z), None);
    }

    #[test]
    fn glow_color_eases_toward_poster_sample() {
        let mut d = director();
        into_spiral(&mut d);
        let red = Vec3::new(1.0, 0.0, 0.0);
        d.set_poster_sample(Some(red));
        let before = d.tick(0.0).glow_color.distance(red);
        run(&mut d, 1.0);
        let after = d.tick(0.0).glow_color.distance(red);
        assert!(after < before);
    }

    #[test]
    fn huge_dt_is_clamped() {
        let mut d = director();
        d.tick(100.0);
        assert!((d.elapsed() - d.config().max_tick_secs).abs() < 1e-6);
        d.tick(f32::NAN);
        assert!((d.elapsed() - d.config().max_tick_secs).abs() < 1e-6);
    }
}
