use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Liveness flag shared with anything that may finish after teardown.
#[derive(Clone, Debug)]
pub struct SceneLifetime {
    alive: Arc<AtomicBool>,
}

impl Default for SceneLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLifetime {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn token(&self) -> LiveToken {
        LiveToken {
            alive: self.alive.clone(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn teardown(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Handed to late callbacks; they must check it before touching the scene.
#[derive(Clone, Debug)]
pub struct LiveToken {
    alive: Arc<AtomicBool>,
}

impl LiveToken {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Run `f` only while the scene is alive.
    pub fn guard<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        self.is_alive().then(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_callbacks_are_dropped_after_teardown() {
        let lifetime = SceneLifetime::new();
        let token = lifetime.token();
        let mut writes = 0;
        token.guard(|| writes += 1);
        lifetime.teardown();
        token.guard(|| writes += 1);
        assert_eq!(writes, 1);
        assert!(!token.is_alive());
    }
}
