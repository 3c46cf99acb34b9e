//! Results of rule-based field detectors

/// Outcome of a rule-based detector
///
/// Replaces the legacy sentinel strings inside the pipeline. The strings
/// only reappear at the export boundary via [`Determination::to_legacy`].
///
/// `NeedsManualReview` and `Negative` are deliberately distinct: the former
/// routes the field to a human, the latter is a confident "No".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Determination {
    /// Confident "Yes"
    Affirmative,

    /// Confident "No"
    Negative,

    /// Evidence is ambiguous; a human must fill the field
    NeedsManualReview,

    /// The source did not mention the field at all
    NotStated,
}

impl Determination {
    /// Legacy export string for this outcome
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::Determination;
    ///
    /// assert_eq!(Determination::Affirmative.to_legacy("Filled manually"), "Yes");
    /// assert_eq!(Determination::NeedsManualReview.to_legacy("Filled manually"), "Filled manually");
    /// assert_eq!(Determination::NotStated.to_legacy("Filled manually"), "Unknown");
    /// ```
    pub fn to_legacy(&self, manual_sentinel: &str) -> String {
        match self {
            Determination::Affirmative => "Yes".to_string(),
            Determination::Negative => "No".to_string(),
            Determination::NeedsManualReview => manual_sentinel.to_string(),
            Determination::NotStated => "Unknown".to_string(),
        }
    }

    /// Whether the outcome is a confident answer either way
    pub fn is_decided(&self) -> bool {
        matches!(self, Determination::Affirmative | Determination::Negative)
    }

    /// Convert a boolean verdict
    pub fn from_bool(value: bool) -> Self {
        if value {
            Determination::Affirmative
        } else {
            Determination::Negative
        }
    }
}
