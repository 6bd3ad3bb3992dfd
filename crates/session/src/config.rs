//! Session configuration.

/// Tunable knobs for one [`crate::Session`]. There is no ambient
/// "config file" concept in the system this mirrors — the original C
/// extension takes no configuration at all — so a small struct passed
/// by the caller, with sensible defaults, is the right amount of
/// ceremony, following the same pattern the teacher uses for its
/// builder-style construction.
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Cap on distinct dependency masks considered per scan before the
    /// dependency-mask closure falls back to a single OR-folded mask
    /// (spec.md §9). Default 12.
    pub max_distinct_masks: usize,
    /// Busy-timeout, in milliseconds, applied to the mirror connections.
    pub busy_timeout_ms: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_distinct_masks: advisor_synth::DEFAULT_MAX_DISTINCT_MASKS,
            busy_timeout_ms: 1_000,
        }
    }
}

impl AdvisorConfig {
    /// Creates a config with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dependency-mask cap.
    pub fn with_max_distinct_masks(mut self, max_distinct_masks: usize) -> Self {
        self.max_distinct_masks = max_distinct_masks;
        self
    }

    /// Sets the busy-timeout.
    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.max_distinct_masks, 12);
    }

    #[test]
    fn test_builder_setters() {
        let config = AdvisorConfig::new()
            .with_max_distinct_masks(4)
            .with_busy_timeout_ms(500);
        assert_eq!(config.max_distinct_masks, 4);
        assert_eq!(config.busy_timeout_ms, 500);
    }
}
