use crate::motion::dolly::DollyPath;
use crate::motion::easing::smoothing_alpha;

/// Frame rate the per-frame smoothing factors were tuned at.
pub const REFERENCE_HZ: f32 = 60.0;

/// Top-level scene mode. Only `Transitioning` blocks input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Intro,
    Transitioning,
    Spiral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Intro → Spiral, through the screen.
    Forward,
    /// Spiral → Intro, back out of the screen.
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    Blocked,
    SwitchRequested(Direction),
}

/// `target` jumps with input, `current` chases it. Both stay inside `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothedScalar {
    target: f32,
    current: f32,
    min: f32,
    max: f32,
    k: f32,
}

impl SmoothedScalar {
    pub fn new(min: f32, max: f32, k: f32) -> Self {
        let max = max.max(min);
        Self {
            target: min,
            current: min,
            min,
            max,
            k,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Add to the target and clamp. Returns the unclamped value.
    pub fn push(&mut self, delta: f32) -> f32 {
        let raw = self.target + delta;
        self.target = raw.clamp(self.min, self.max);
        raw
    }

    /// Snap both target and current.
    pub fn set(&mut self, value: f32) {
        let v = value.clamp(self.min, self.max);
        self.target = v;
        self.current = v;
    }

    pub fn advance(&mut self, dt: f32) {
        let alpha = smoothing_alpha(self.k, dt, REFERENCE_HZ);
        self.current += (self.target - self.current) * alpha;
    }
}

/// Owns both progress scalars and the mode; decides when a mode switch is due.
#[derive(Clone, Debug)]
pub struct ScrollStateMachine {
    mode: Mode,
    scroll_z: SmoothedScalar,
    focus: SmoothedScalar,
    intro_sensitivity: f32,
    spiral_sensitivity: f32,
    forward_armed: bool,
    dolly: DollyPath,
}

impl ScrollStateMachine {
    pub fn new(
        dolly: DollyPath,
        intro_sensitivity: f32,
        intro_smoothing: f32,
        item_count: usize,
        spiral_sensitivity: f32,
        spiral_smoothing: f32,
    ) -> Self {
        let focus_max = item_count.saturating_sub(1) as f32;
        Self {
            mode: Mode::Intro,
            scroll_z: SmoothedScalar::new(0.0, dolly.max_scroll(), intro_smoothing),
            focus: SmoothedScalar::new(0.0, focus_max, spiral_smoothing),
            intro_sensitivity,
            spiral_sensitivity,
            forward_armed: false,
            dolly,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scroll_z(&self) -> &SmoothedScalar {
        &self.scroll_z
    }

    pub fn focus(&self) -> &SmoothedScalar {
        &self.focus
    }

    pub fn dolly(&self) -> &DollyPath {
        &self.dolly
    }

    pub fn on_input(&mut self, raw_delta: f32) -> InputOutcome {
        if !raw_delta.is_finite() {
            return InputOutcome::Accepted;
        }
        match self.mode {
            Mode::Transitioning => InputOutcome::Blocked,
            Mode::Intro => {
                self.scroll_z.push(raw_delta * self.intro_sensitivity);
                if raw_delta > 0.0 {
                    self.forward_armed = true;
                } else if raw_delta < 0.0 && !self.dolly.has_crossed(self.scroll_z.target()) {
                    // Backing off only disarms once the destination pose is in
                    // front of the screen again.
                    self.forward_armed = false;
                }
                InputOutcome::Accepted
            }
            Mode::Spiral => {
                let raw = self.focus.push(raw_delta * self.spiral_sensitivity);
                if raw_delta < 0.0 && raw < self.focus.min() {
                    InputOutcome::SwitchRequested(Direction::Reverse)
                } else {
                    InputOutcome::Accepted
                }
            }
        }
    }

    /// Smooth the active scalar, then report a due forward switch.
    ///
    /// The check runs on the eased camera Z of the smoothed value, i.e. what
    /// is actually rendered. Progress is frozen while transitioning.
    pub fn advance(&mut self, dt: f32) -> Option<Direction> {
        match self.mode {
            Mode::Transitioning => None,
            Mode::Spiral => {
                self.focus.advance(dt);
                None
            }
            Mode::Intro => {
                self.scroll_z.advance(dt);
                (self.forward_armed && self.dolly.has_crossed(self.scroll_z.current()))
                    .then_some(Direction::Forward)
            }
        }
    }

    pub fn begin_transition(&mut self) {
        self.mode = Mode::Transitioning;
        self.forward_armed = false;
    }

    /// Progress handoff at the swap instant of a forward transition.
    pub fn enter_spiral(&mut self) {
        self.focus.set(self.focus.min());
    }

    /// Progress handoff at the swap instant of a reverse transition.
    pub fn restore_intro(&mut self, stored_scroll_z: f32) {
        self.scroll_z.set(stored_scroll_z);
        self.forward_armed = false;
    }

    pub fn finish_transition(&mut self, direction: Direction) {
        self.mode = match direction {
            Direction::Forward => Mode::Spiral,
            Direction::Reverse => Mode::Intro,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::SceneConfig;

    fn machine() -> ScrollStateMachine {
        let cfg = SceneConfig::default();
        ScrollStateMachine::new(
            DollyPath::from_config(&cfg),
            cfg.dolly.sensitivity,
            cfg.dolly.smoothing,
            8,
            cfg.helix.sensitivity,
            cfg.helix.smoothing,
        )
    }

    #[test]
    fn target_never_leaves_range() {
        let mut m = machine();
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..5000 {
            let delta = (rng.f32() - 0.5) * 20_000.0;
            m.on_input(delta);
            let t = m.scroll_z().target();
            assert!((0.0..=2500.0).contains(&t), "target {t}");
        }
    }

    #[test]
    fn smoothing_approaches_without_overshoot() {
        let mut m = machine();
        m.on_input(1000.0);
        let target = m.scroll_z().target();
        let mut prev = m.scroll_z().current();
        for _ in 0..2000 {
            m.advance(1.0 / 60.0);
            let c = m.scroll_z().current();
            assert!(c >= prev && c <= target);
            prev = c;
        }
        assert!((target - prev).abs() < 1e-2);
    }

    #[test]
    fn transitioning_blocks_input() {
        let mut m = machine();
        m.begin_transition();
        assert_eq!(m.on_input(500.0), InputOutcome::Blocked);
        assert_eq!(m.scroll_z().target(), 0.0);
        assert_eq!(m.advance(1.0), None);
    }

    #[test]
    fn forward_needs_positive_input() {
        let mut m = machine();
        let past = m.dolly().threshold_progress() + 50.0;
        m.restore_intro(past);
        assert_eq!(m.advance(1.0 / 60.0), None);
        m.on_input(-1.0);
        assert_eq!(m.advance(1.0 / 60.0), None);
        m.on_input(1.0);
        assert_eq!(m.advance(1.0 / 60.0), Some(Direction::Forward));
    }

    #[test]
    fn small_pullback_past_the_screen_stays_armed() {
        let mut m = machine();
        m.on_input(6000.0);
        m.on_input(-1.0);
        assert!(m.dolly().has_crossed(m.scroll_z().target()));
        let mut fired = false;
        for _ in 0..600 {
            if m.advance(1.0 / 60.0) == Some(Direction::Forward) {
                fired = true;
                break;
            }
        }
        assert!(fired);
    }

    #[test]
    fn pulling_back_in_front_of_the_screen_disarms() {
        let mut m = machine();
        let threshold = m.dolly().threshold_progress();
        m.restore_intro(threshold + 50.0);
        m.on_input(1.0);
        // Destination lands in front of the threshold; the camera is still past it.
        m.on_input(-400.0);
        assert!(!m.dolly().has_crossed(m.scroll_z().target()));
        assert_eq!(m.advance(1.0 / 60.0), None);
        assert!(m.dolly().has_crossed(m.scroll_z().current()));
    }

    #[test]
    fn reverse_requested_only_below_start_with_negative_input() {
        let mut m = machine();
        m.begin_transition();
        m.enter_spiral();
        m.finish_transition(Direction::Forward);
        assert_eq!(m.mode(), Mode::Spiral);
        assert_eq!(m.on_input(400.0), InputOutcome::Accepted);
        assert_eq!(m.on_input(-200.0), InputOutcome::Accepted);
        assert_eq!(
            m.on_input(-400.0),
            InputOutcome::SwitchRequested(Direction::Reverse)
        );
        assert_eq!(m.focus().target(), 0.0);
    }

    #[test]
    fn zero_dt_leaves_current_alone() {
        let mut m = machine();
        m.on_input(800.0);
        m.advance(0.1);
        let before = *m.scroll_z();
        m.advance(0.0);
        assert_eq!(*m.scroll_z(), before);
    }
}
