use tracing::debug;

use super::scroll::Direction;
use crate::data::config::{BlackoutStyle, TransitionConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Blackout,
    Swap,
    FadeIn,
}

/// Which scene subset is visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Intro,
    Spiral,
}

impl Direction {
    pub fn incoming(self) -> Layer {
        match self {
            Direction::Forward => Layer::Spiral,
            Direction::Reverse => Layer::Intro,
        }
    }
}

/// What happened during one `advance` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionStep {
    /// Layers were swapped; the caller must hand progress over this same tick.
    pub swapped: Option<Direction>,
    pub finished: Option<Direction>,
}

/// Cut-to-black, swap, fade-back sequencer.
#[derive(Clone, Debug)]
pub struct TransitionController {
    config: TransitionConfig,
    phase: Phase,
    direction: Direction,
    phase_elapsed: f32,
    blackout: f32,
    visible: Layer,
    stored_scroll_z: Option<f32>,
}

impl TransitionController {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            direction: Direction::Forward,
            phase_elapsed: 0.0,
            blackout: 0.0,
            visible: Layer::Intro,
            stored_scroll_z: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Opacity of the black overlay, `0` when idle.
    pub fn blackout(&self) -> f32 {
        self.blackout
    }

    pub fn visible_layer(&self) -> Layer {
        self.visible
    }

    /// Intro progress captured when the last forward transition fired.
    pub fn stored_scroll_z(&self) -> Option<f32> {
        self.stored_scroll_z
    }

    /// Start a transition. Returns `false` and changes nothing while one is
    /// already running, or for a reverse with no stored forward progress.
    pub fn trigger(&mut self, direction: Direction, scroll_z: f32) -> bool {
        if self.is_active() {
            debug!(?direction, "transition already running; trigger ignored");
            return false;
        }
        match direction {
            Direction::Forward => self.stored_scroll_z = Some(scroll_z),
            Direction::Reverse if self.stored_scroll_z.is_none() => {
                debug!("reverse transition without stored progress; ignored");
                return false;
            }
            Direction::Reverse => {}
        }
        self.direction = direction;
        self.phase_elapsed = 0.0;
        match self.config.style {
            BlackoutStyle::Cut => {
                self.blackout = 1.0;
                self.phase = Phase::Swap;
            }
            BlackoutStyle::Fade => {
                self.phase = Phase::Blackout;
            }
        }
        true
    }

    /// Advance timers by `dt`, carrying leftover time across phases.
    pub fn advance(&mut self, dt: f32) -> TransitionStep {
        let mut step = TransitionStep::default();
        if dt <= 0.0 || !self.is_active() {
            return step;
        }
        let mut remaining = dt;
        loop {
            let duration = match self.phase {
                Phase::Idle => break,
                Phase::Blackout => self.config.fade_out_secs,
                Phase::Swap => self.config.swap_delay_secs,
                Phase::FadeIn => self.config.fade_in_secs,
            };
            let needed = (duration - self.phase_elapsed).max(0.0);
            if remaining < needed {
                self.phase_elapsed += remaining;
                let f = self.phase_elapsed / duration;
                match self.phase {
                    Phase::Blackout => self.blackout = f,
                    Phase::FadeIn => self.blackout = 1.0 - f,
                    _ => {}
                }
                break;
            }
            remaining -= needed;
            self.phase_elapsed = 0.0;
            match self.phase {
                Phase::Blackout => {
                    self.blackout = 1.0;
                    self.phase = Phase::Swap;
                }
                Phase::Swap => {
                    self.visible = self.direction.incoming();
                    step.swapped = Some(self.direction);
                    self.phase = Phase::FadeIn;
                }
                Phase::FadeIn => {
                    self.blackout = 0.0;
                    self.phase = Phase::Idle;
                    step.finished = Some(self.direction);
                }
                Phase::Idle => {}
            }
        }
        step
    }
}
