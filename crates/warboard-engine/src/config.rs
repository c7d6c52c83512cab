//! Engine configuration.

use warboard_rules::RevivePolicy;

/// Fixed-at-startup knobs for every session an engine spawns.
///
/// The defaults are what the demo server runs with; deployments override
/// individual fields:
///
/// ```rust
/// use warboard_engine::EngineConfig;
/// use warboard_rules::RevivePolicy;
///
/// let config = EngineConfig {
///     revive_policy: RevivePolicy::Full,
///     ..EngineConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How much health a revive restores. Default: half of max, rounded up.
    pub revive_policy: RevivePolicy,

    /// Name given to characters created without one.
    pub default_character_name: String,

    /// Command channel capacity per session actor. When a session's queue
    /// is full, senders wait (backpressure) rather than dropping actions.
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            revive_policy: RevivePolicy::default(),
            default_character_name: "Adventurer".to_string(),
            command_buffer: 64,
        }
    }
}
