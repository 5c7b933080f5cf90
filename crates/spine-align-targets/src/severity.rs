use std::fmt;

use serde::{Deserialize, Serialize};

use crate::norms::ExcessBreakpoints;

/// Ordinal deformity grade.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Normal => "Normal",
            SeverityTier::Mild => "Mild",
            SeverityTier::Moderate => "Moderate",
            SeverityTier::Severe => "Severe",
        }
    }

    /// Label used by the Schwab-graded lumbar parameters.
    pub fn schwab_label(self) -> &'static str {
        match self {
            SeverityTier::Normal => "Normal",
            SeverityTier::Mild => "Mild (Schwab +)",
            SeverityTier::Moderate => "Moderate (Schwab ++)",
            SeverityTier::Severe => "Severe (Schwab +++)",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade plus its clinical wording.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    pub text: String,
    pub tier: SeverityTier,
}

impl Severity {
    pub fn new(tier: SeverityTier, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tier,
        }
    }

    /// Plain wording: the tier name.
    pub fn plain(tier: SeverityTier) -> Self {
        Self::new(tier, tier.as_str())
    }

    /// Schwab wording, e.g. `"Moderate (Schwab ++)"`.
    pub fn schwab(tier: SeverityTier) -> Self {
        Self::new(tier, tier.schwab_label())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Grade a strictly positive excess beyond target.
pub(crate) fn grade_excess(excess: f64, bp: ExcessBreakpoints) -> SeverityTier {
    if excess < bp.mild {
        SeverityTier::Mild
    } else if excess < bp.moderate {
        SeverityTier::Moderate
    } else {
        SeverityTier::Severe
    }
}

/// Worst grade across a case.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OverallSeverity {
    /// Nothing graded yet.
    #[default]
    None,
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl From<SeverityTier> for OverallSeverity {
    fn from(tier: SeverityTier) -> Self {
        match tier {
            SeverityTier::Normal => OverallSeverity::Normal,
            SeverityTier::Mild => OverallSeverity::Mild,
            SeverityTier::Moderate => OverallSeverity::Moderate,
            SeverityTier::Severe => OverallSeverity::Severe,
        }
    }
}

impl OverallSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallSeverity::None => "none",
            OverallSeverity::Normal => "normal",
            OverallSeverity::Mild => "mild",
            OverallSeverity::Moderate => "moderate",
            OverallSeverity::Severe => "severe",
        }
    }
}

impl fmt::Display for OverallSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
