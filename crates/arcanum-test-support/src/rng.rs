//! Deterministic RNG doubles.

use arcanum_core::rng::DeterministicRng;

/// Always returns the lower bound of the requested range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_i32_range(&mut self, min: i32, _max: i32) -> i32 {
        min
    }
}

/// Plays back a scripted sequence of values, clamped into the requested
/// range. Falls back to the lower bound once exhausted.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<u32>,
    position: usize,
}

impl SequenceRng {
    /// Creates a sequence RNG over `values`.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    fn next(&mut self) -> Option<u32> {
        let value = self.values.get(self.position).copied();
        if value.is_some() {
            self.position += 1;
        }
        value
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.next().map_or(min, |v| v.clamp(min, max))
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        let value = self.next().map_or(min, |v| {
            i32::try_from(v).unwrap_or(i32::MAX)
        });
        value.clamp(min, max)
    }
}
