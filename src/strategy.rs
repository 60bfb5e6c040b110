use crate::models::{Priority, RetentionAction};
use serde::Serialize;

/// Text shown when the service recommends nothing.
pub const NO_RECOMMENDATIONS: &str = "No specific retention strategies recommended.";

/// Result of ranking: either nothing to show, or at least one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "actions", rename_all = "snake_case")]
pub enum Recommendations {
    None,
    Ranked(RankedActions),
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        matches!(self, Recommendations::None)
    }
}

/// Non-empty actions, kept in the service's order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedActions(Vec<RetentionAction>);

/// One priority section of the grouped presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityGroup<'a> {
    pub priority: Priority,
    pub actions: Vec<&'a RetentionAction>,
}

impl RankedActions {
    /// Actions exactly as the service ranked them.
    pub fn ordered(&self) -> &[RetentionAction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sections HIGH, MEDIUM, LOW, then unknown priorities. Service order is
    /// kept within a section and empty sections are left out.
    pub fn grouped(&self) -> Vec<PriorityGroup<'_>> {
        Priority::SECTION_ORDER
            .iter()
            .map(|&priority| PriorityGroup {
                priority,
                actions: self.0.iter().filter(|a| a.priority == priority).collect(),
            })
            .filter(|group| !group.actions.is_empty())
            .collect()
    }
}

/// Ranks recommended actions for display.
pub fn rank(actions: &[RetentionAction]) -> Recommendations {
    if actions.is_empty() {
        Recommendations::None
    } else {
        Recommendations::Ranked(RankedActions(actions.to_vec()))
    }
}
