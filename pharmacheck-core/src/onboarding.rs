//! First-run tutorial.

use serde::Serialize;

/// One page of the tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnboardingStep {
    pub title: &'static str,
    pub description: &'static str,
    pub tip: &'static str,
    /// Rendered with the warning palette.
    pub warning: bool,
}

pub const STEPS: &[OnboardingStep] = &[
    OnboardingStep {
        title: "Scan QR Code",
        description: "Find the scratch-off QR code on your medicine packaging. \
                      Use a coin to reveal the hidden QR code underneath.",
        tip: "The scratch layer ensures the code hasn't been used before!",
        warning: false,
    },
    OnboardingStep {
        title: "One-Time Verification",
        description: "Each QR code works ONLY ONCE. After scanning, the code becomes invalid. \
                      This prevents counterfeiters from copying and reselling fake medicines.",
        tip: "If you see 'Already Scanned' warning - BE CAREFUL! It may be a duplicate!",
        warning: true,
    },
    OnboardingStep {
        title: "Duplicate Protection",
        description: "If someone already scanned this QR code, you'll see a warning. \
                      This means the medicine may be counterfeit or resold. Don't buy it!",
        tip: "Trust the first scan only. If it's already used - walk away and report!",
        warning: true,
    },
    OnboardingStep {
        title: "Safe to Purchase",
        description: "If verification is successful and the QR is scanned for the first time - \
                      you're safe to buy! View complete product details and cheaper alternatives.",
        tip: "Green checkmark = Safe to buy. The QR is now marked as used.",
        warning: false,
    },
    OnboardingStep {
        title: "Trusted Partners",
        description: "We partner with verified pharmaceutical manufacturers who add our \
                      secure QR codes during production.",
        tip: "Look for the PharmaCheck seal on certified products!",
        warning: false,
    },
];

/// Result of advancing the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Step(usize),
    Completed,
}

/// Linear step-indexed wizard over [`STEPS`].
#[derive(Debug, Clone, Default)]
pub struct OnboardingWizard {
    index: usize,
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_count(&self) -> usize {
        STEPS.len()
    }

    pub fn current(&self) -> &'static OnboardingStep {
        &STEPS[self.index]
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == STEPS.len()
    }

    /// Move forward, or report completion when already on the last step.
    pub fn next(&mut self) -> Advance {
        if self.is_last() {
            Advance::Completed
        } else {
            self.index += 1;
            Advance::Step(self.index)
        }
    }

    /// Move back; stays on the first step.
    pub fn prev(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }
}

/// Step by index, for callers that keep the index themselves.
pub fn step(index: usize) -> Option<&'static OnboardingStep> {
    STEPS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_forward_to_completion() {
        let mut wizard = OnboardingWizard::new();
        assert!(wizard.is_first());
        for expected in 1..STEPS.len() {
            assert_eq!(wizard.next(), Advance::Step(expected));
        }
        assert!(wizard.is_last());
        assert_eq!(wizard.next(), Advance::Completed);
        assert_eq!(wizard.index(), STEPS.len() - 1);
    }

    #[test]
    fn test_prev_saturates() {
        let mut wizard = OnboardingWizard::new();
        assert_eq!(wizard.prev(), 0);
        wizard.next();
        wizard.next();
        assert_eq!(wizard.prev(), 1);
        assert_eq!(wizard.current().title, "One-Time Verification");
    }

    #[test]
    fn test_step_lookup() {
        assert_eq!(step(0).map(|s| s.title), Some("Scan QR Code"));
        assert!(step(STEPS.len()).is_none());
        assert_eq!(STEPS.iter().filter(|s| s.warning).count(), 2);
    }
}
