use serde::{Deserialize, Serialize};

/// Instructional phase (quadrant) a description or a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Rule,
    Example,
    Recall,
    Practice,
    RemediationAfterRecall,
    RemediationAfterPractice,
}

impl Phase {
    /// Remediation markers are only ever search targets; content authored for
    /// remediation carries no phase at all.
    pub fn is_remediation(self) -> bool {
        matches!(
            self,
            Phase::RemediationAfterRecall | Phase::RemediationAfterPractice
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Rule => "Rule",
            Phase::Example => "Example",
            Phase::Recall => "Recall",
            Phase::Practice => "Practice",
            Phase::RemediationAfterRecall => "RemediationAfterRecall",
            Phase::RemediationAfterPractice => "RemediationAfterPractice",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
