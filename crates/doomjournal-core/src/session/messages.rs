use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shown while the session is paused for inactivity.
pub const NUDGE_MESSAGES: [&str; 5] = [
    "keep writing...",
    "just let it flow",
    "no need to edit, just write",
    "still there? keep going",
    "your thoughts are waiting",
];

/// Shown once the writing time is used up.
pub const COMPLETE_MESSAGES: [&str; 4] = [
    "nice. enjoy your scroll.",
    "thoughts deposited. Twitter unlocked.",
    "you've earned this",
    "mind cleared. doom scroll responsibly.",
];

/// Source of message choices.
pub trait MessagePicker {
    /// Index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    fn choose<'a>(&mut self, options: &[&'a str]) -> &'a str {
        if options.is_empty() {
            return "";
        }
        let idx = self.pick(options.len()).min(options.len() - 1);
        options[idx]
    }
}

/// Uniform random choice.
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always the same index (modulo `len`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl MessagePicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}
