use crate::data::config::AudioConfig;
use crate::state::scroll::Mode;

/// Sink for the camera's closeness to the screen, `0` far to `1` at the glass.
pub trait ProximityOutput {
    fn set_proximity(&mut self, proximity: f32);
}

/// Play/pause control over a card's media.
pub trait MediaControl {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;

    fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }
}

/// Map proximity to an output gain.
pub fn proximity_gain(cfg: &AudioConfig, mode: Mode, proximity: f32) -> f32 {
    let p = match mode {
        Mode::Spiral => cfg.spiral_proximity,
        _ => proximity.clamp(0.0, 1.0),
    };
    cfg.min_gain + (cfg.max_gain - cfg.min_gain) * p
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<f32>);

    impl ProximityOutput for Recorder {
        fn set_proximity(&mut self, proximity: f32) {
            self.0.push(proximity);
        }
    }

    #[derive(Default)]
    struct Clip {
        playing: bool,
    }

    impl MediaControl for Clip {
        fn play(&mut self) {
            self.playing = true;
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
    }

    #[test]
    fn gain_spans_configured_range() {
        let cfg = AudioConfig::default();
        assert_eq!(proximity_gain(&cfg, Mode::Intro, 0.0), cfg.min_gain);
        assert_eq!(proximity_gain(&cfg, Mode::Intro, 1.0), cfg.max_gain);
        assert_eq!(proximity_gain(&cfg, Mode::Intro, 7.0), cfg.max_gain);
        let spiral = proximity_gain(&cfg, Mode::Spiral, 1.0);
        assert!(spiral > cfg.min_gain && spiral < cfg.max_gain);
    }

    #[test]
    fn trait_objects_receive_values() {
        let mut rec = Recorder(Vec::new());
        let out: &mut dyn ProximityOutput = &mut rec;
        out.set_proximity(0.25);
        assert_eq!(rec.0, vec![0.25]);

        let mut clip = Clip::default();
        clip.toggle();
        assert!(clip.is_playing());
        clip.toggle();
        assert!(!clip.is_playing());
    }
}
