//! Prompt and aspect-ratio inputs.

use crate::params::AspectRatio;

/// Free-text scene description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptField {
    text: String,
}

impl PromptField {
    /// Replace the prompt text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Current prompt text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Only the empty string counts as missing; whitespace is sent as typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Holds exactly one selected [`AspectRatio`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatioSelector {
    selected: AspectRatio,
}

impl RatioSelector {
    /// Selector starting at `ratio` instead of the default.
    #[must_use]
    pub fn with(ratio: AspectRatio) -> Self {
        Self { selected: ratio }
    }

    /// Change the selected ratio.
    pub fn select(&mut self, ratio: AspectRatio) {
        self.selected = ratio;
    }

    /// The selected ratio.
    #[must_use]
    pub fn selected(&self) -> AspectRatio {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_starts_empty() {
        let prompt = PromptField::default();
        assert!(prompt.is_empty());
        assert_eq!(prompt.text(), "");
    }

    #[test]
    fn prompt_keeps_text_verbatim() {
        let mut prompt = PromptField::default();
        prompt.set_text("  mug on wooden table ");
        assert_eq!(prompt.text(), "  mug on wooden table ");
        assert!(!prompt.is_empty());
        prompt.set_text("");
        assert!(prompt.is_empty());
    }

    #[test]
    fn selector_defaults_to_square() {
        assert_eq!(RatioSelector::default().selected(), AspectRatio::Square);
    }

    #[test]
    fn selector_changes() {
        let mut selector = RatioSelector::with(AspectRatio::Portrait);
        assert_eq!(selector.selected(), AspectRatio::Portrait);
        selector.select(AspectRatio::Landscape);
        assert_eq!(selector.selected(), AspectRatio::Landscape);
    }
}
