//! Execution settings passed to `Effect::apply`.

use utils::{Parallelism, Region};

/// Per-call execution settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyOptions {
    /// Sub-region to process; `None` covers the whole buffer. Regions are
    /// clipped to the buffer.
    pub region: Option<Region>,
    pub parallelism: Parallelism,
    /// Seed of the position-derived random streams (noise, dissolve).
    pub seed: u64,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn serial(self) -> Self {
        self.with_parallelism(Parallelism::Serial)
    }

    /// The region to process in a `width` x `height` buffer.
    pub fn region_for(&self, width: usize, height: usize) -> Region {
        self.region
            .unwrap_or(Region::full(width, height))
            .clip(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_whole_buffer_in_parallel() {
        let options = ApplyOptions::new();
        assert_eq!(options.region_for(4, 3), Region::full(4, 3));
        assert_eq!(options.parallelism, Parallelism::Rows);
    }

    #[test]
    fn region_is_clipped() {
        let options = ApplyOptions::new()
            .with_region(Region::new(2, 2, 10, 10))
            .serial();
        assert_eq!(options.region_for(4, 3), Region::new(2, 2, 2, 1));
        assert_eq!(options.parallelism, Parallelism::Serial);
    }
}
