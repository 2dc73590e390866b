use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed,
}

/// A build step whose dependencies have all resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadyStep<S, K> {
    pub step: S,
    /// Dependencies that failed; the step should run without them.
    pub failed: Vec<K>,
}

impl<S, K> ReadyStep<S, K> {
    pub fn degraded(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Clone, Debug)]
struct StepEntry<S, K> {
    step: S,
    deps: Vec<K>,
    done: bool,
}

/// Dependency graph between asynchronous loads and the construction that
/// needs them. A step is released exactly once, when every dependency is
/// either ready or failed.
#[derive(Clone, Debug)]
pub struct LoadGraph<S, K> {
    states: HashMap<K, LoadState>,
    steps: Vec<StepEntry<S, K>>,
}

impl<S, K> Default for LoadGraph<S, K> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            steps: Vec::new(),
        }
    }
}

impl<S, K> LoadGraph<S, K>
where
    S: Clone + std::fmt::Debug,
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: S, deps: impl IntoIterator<Item = K>) {
        let deps: Vec<K> = deps.into_iter().collect();
        for dep in &deps {
            self.states.entry(dep.clone()).or_insert(LoadState::Pending);
        }
        self.steps.push(StepEntry {
            step,
            deps,
            done: false,
        });
    }

    pub fn state(&self, key: &K) -> Option<LoadState> {
        self.states.get(key).copied()
    }

    /// Record a load result. Repeated results for the same key are ignored.
    pub fn resolve(&mut self, key: K, ok: bool) -> Vec<ReadyStep<S, K>> {
        match self.states.get(&key) {
            Some(LoadState::Pending) | None => {
                let state = if ok { LoadState::Ready } else { LoadState::Failed };
                if !ok {
                    warn!(?key, "asset failed to load; dependents will run degraded");
                }
                self.states.insert(key, state);
            }
            Some(_) => debug!(?key, "duplicate load result ignored"),
        }
        self.drain_ready()
    }

    /// Steps whose dependencies are all resolved and that have not run yet.
    pub fn drain_ready(&mut self) -> Vec<ReadyStep<S, K>> {
        let states = &self.states;
        let mut out = Vec::new();
        for entry in self.steps.iter_mut().filter(|e| !e.done) {
            let resolved = entry
                .deps
                .iter()
                .all(|d| matches!(states.get(d), Some(LoadState::Ready | LoadState::Failed)));
            if !resolved {
                continue;
            }
            entry.done = true;
            let failed = entry
                .deps
                .iter()
                .filter(|d| states.get(*d) == Some(&LoadState::Failed))
                .cloned()
                .collect();
            out.push(ReadyStep {
                step: entry.step.clone(),
                failed,
            });
        }
        out
    }

    pub fn is_settled(&self) -> bool {
        self.steps.iter().all(|e| e.done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    enum Key {
        Font,
        Poster(usize),
    }

    #[test]
    fn step_waits_for_all_dependencies() {
        let mut g: LoadGraph<&str, Key> = LoadGraph::new();
        g.add_step("cards", [Key::Font, Key::Poster(0)]);
        assert!(g.drain_ready().is_empty());
        assert!(g.resolve(Key::Font, true).is_empty());
        let ready = g.resolve(Key::Poster(0), true);
        assert_eq!(ready.len(), 1);
        assert!(!ready[0].degraded());
        assert!(g.is_settled());
    }

    #[test]
    fn failures_release_degraded_steps_once() {
        let mut g: LoadGraph<&str, Key> = LoadGraph::new();
        g.add_step("titles", [Key::Font]);
        let ready = g.resolve(Key::Font, false);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].failed, vec![Key::Font]);
        assert!(g.resolve(Key::Font, true).is_empty());
        assert_eq!(g.state(&Key::Font), Some(LoadState::Failed));
    }

    #[test]
    fn steps_without_deps_run_immediately() {
        let mut g: LoadGraph<&str, Key> = LoadGraph::new();
        g.add_step("set", []);
        assert_eq!(g.drain_ready().len(), 1);
        assert!(g.drain_ready().is_empty());
    }
}
