use mill_api::CategoryKey;
use serde::{Deserialize, Serialize};

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Upper bound on concurrent category fetches.
    pub max_in_flight: usize,
    /// Breakdown focused after a reset.
    pub default_category: CategoryKey,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            max_in_flight: CategoryKey::ALL.len(),
            default_category: CategoryKey::Book,
        }
    }
}

impl DrillConfig {
    /// In-flight limit, never below one.
    pub fn limit(&self) -> usize {
        self.max_in_flight.max(1)
    }
}
