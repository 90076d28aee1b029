// src/status/accuracy.rs - How trustworthy the time-left estimate is
use std::fmt;

/// Coarse confidence in the host's time-left estimate, derived from the
/// name of the estimator that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accuracy {
    NotAvailable,
    BestEstimate,
    Good,
    Medium,
    Poor,
    /// The host reported an estimator this table does not know.
    Unmapped,
}

impl Accuracy {
    pub fn classify(origin: Option<&str>) -> Self {
        match origin {
            None | Some("") => Accuracy::NotAvailable,
            Some("estimate") => Accuracy::BestEstimate,
            Some("average" | "genius") => Accuracy::Good,
            Some(tag) if tag == "analysis" || tag.starts_with("mixed") => Accuracy::Medium,
            Some("linear") => Accuracy::Poor,
            Some(_) => Accuracy::Unmapped,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Accuracy::NotAvailable => "N/A",
            Accuracy::BestEstimate => "best estimate",
            Accuracy::Good => "good",
            Accuracy::Medium => "medium",
            Accuracy::Poor => "poor",
            Accuracy::Unmapped => "ERR",
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
