use std::collections::HashMap;

use crate::motion::easing::Easing;

/// What a tween drives. One running tween per channel at most.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenChannel {
    /// Extra scale factor on a hovered card.
    CardHover(usize),
    /// Alpha of the focused card caption.
    TitleOpacity,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    channel: TweenChannel,
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl Tween {
    fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let p = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * self.easing.apply(p)
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// All short-lived animations, advanced together once per tick.
#[derive(Clone, Debug, Default)]
pub struct TweenList {
    running: Vec<Tween>,
    settled: HashMap<TweenChannel, f32>,
}

impl TweenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a channel, or `default` if it was never animated.
    pub fn value_or(&self, channel: TweenChannel, default: f32) -> f32 {
        self.running
            .iter()
            .find(|t| t.channel == channel)
            .map(Tween::value)
            .or_else(|| self.settled.get(&channel).copied())
            .unwrap_or(default)
    }

    /// Animate `channel` from wherever it is now to `to`.
    pub fn retarget(
        &mut self,
        channel: TweenChannel,
        to: f32,
        duration: f32,
        easing: Easing,
        default: f32,
    ) {
        let from = self.value_or(channel, default);
        self.running.retain(|t| t.channel != channel);
        self.settled.remove(&channel);
        if (from - to).abs() <= f32::EPSILON {
            self.settled.insert(channel, to);
            return;
        }
        self.running.push(Tween {
            channel,
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        });
    }

    /// Jump a channel to `value` with no animation.
    pub fn snap(&mut self, channel: TweenChannel, value: f32) {
        self.running.retain(|t| t.channel != channel);
        self.settled.insert(channel, value);
    }

    /// Stop a channel where it is.
    pub fn cancel(&mut self, channel: TweenChannel) {
        if let Some(pos) = self.running.iter().position(|t| t.channel == channel) {
            let t = self.running.remove(pos);
            self.settled.insert(channel, t.value());
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for t in self.running.iter_mut() {
            t.elapsed += dt;
        }
        let settled = &mut self.settled;
        self.running.retain(|t| {
            if t.done() {
                settled.insert(t.channel, t.to);
                false
            } else {
                true
            }
        });
    }

    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn running(&self) -> usize {
        self.running.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_reaches_target_and_settles() {
        let mut list = TweenList::new();
        let ch = TweenChannel::CardHover(3);
        list.retarget(ch, 1.08, 0.2, Easing::OutCubic, 1.0);
        assert!(list.is_animating());
        list.advance(0.1);
        let mid = list.value_or(ch, 1.0);
        assert!(mid > 1.0 && mid < 1.08);
        list.advance(0.2);
        assert!(!list.is_animating());
        assert_eq!(list.value_or(ch, 1.0), 1.08);
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut list = TweenList::new();
        let ch = TweenChannel::TitleOpacity;
        list.retarget(ch, 1.0, 1.0, Easing::Linear, 0.0);
        list.advance(0.5);
        list.retarget(ch, 0.0, 1.0, Easing::Linear, 0.0);
        assert!((list.value_or(ch, 0.0) - 0.5).abs() < 1e-5);
        assert_eq!(list.running(), 1);
    }

    #[test]
    fn cancel_freezes_channel() {
        let mut list = TweenList::new();
        let ch = TweenChannel::CardHover(0);
        list.retarget(ch, 2.0, 1.0, Easing::Linear, 1.0);
        list.advance(0.25);
        list.cancel(ch);
        list.advance(1.0);
        assert!((list.value_or(ch, 1.0) - 1.25).abs() < 1e-5);
    }

    #[test]
    fn snap_replaces_running_tween() {
        let mut list = TweenList::new();
        let ch = TweenChannel::TitleOpacity;
        list.retarget(ch, 1.0, 1.0, Easing::Linear, 0.0);
        list.advance(0.5);
        list.snap(ch, 0.0);
        assert!(!list.is_animating());
        assert_eq!(list.value_or(ch, 1.0), 0.0);
    }

    #[test]
    fn zero_dt_is_idempotent() {
        let mut list = TweenList::new();
        let ch = TweenChannel::CardHover(1);
        list.retarget(ch, 2.0, 1.0, Easing::InOut, 1.0);
        list.advance(0.3);
        let v = list.value_or(ch, 1.0);
        list.advance(0.0);
        assert_eq!(list.value_or(ch, 1.0), v);
    }
}
