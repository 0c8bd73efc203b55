use serde::{Deserialize, Serialize};

/// Toggles for the optional rules in the D-SNAP rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub conflicting_program_rule: bool,
    pub state_residency_rule: bool,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            conflicting_program_rule: true,
            state_residency_rule: true,
        }
    }
}
