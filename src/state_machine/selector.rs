//! Pluggable choice between interchangeable lines

use rand::Rng;

/// Picks one of several equivalent small-talk replies
pub trait LineSelector: Send + Sync {
    /// Index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl LineSelector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always the same index (clamped), for deterministic tests
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector(pub usize);

#[cfg(test)]
impl LineSelector for FixedSelector {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

/// Choose one entry of `options` through `selector`
pub fn choose<'a, T>(selector: &dyn LineSelector, options: &'a [T]) -> &'a T {
    let index = selector.pick(options.len()).min(options.len() - 1);
    &options[index]
}
