use std::fmt;

/// The two externally visible states of a time-gated element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Hidden => write!(f, "hidden"),
            Visibility::Visible => write!(f, "visible"),
        }
    }
}

/// Outcome of one visibility decision. Derived on every evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    pub visible: bool,
    /// `start <= end`, or a bound is unset.
    pub interval_valid: bool,
    /// Both bounds set and `start <= now <= end`.
    pub in_range: bool,
}

impl EvaluationResult {
    pub fn visibility(&self) -> Visibility {
        Visibility::from(self.visible)
    }
}
