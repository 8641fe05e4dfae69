//! Prompt templates for engraving-friendly line art.

use std::fmt;

/// Longest theme accepted from the user, in characters.
pub const MAX_THEME_CHARS: usize = 20;

const SURPRISE_TEMPLATE: &str = "Generate a unique, hand-drawn vector-style illustration in the style of minimalist tattoo line art, using bold and thick black strokes only. The artwork should be playful, emotionally expressive, and symbolically rich—like stroke tattoos or flash tattoos. Avoid any shading, gradients, textures, or color fills. Design must be optimized for laser engraving on jewellery: 2D, high contrast, clean outlines, no noise, no background, no text unless instructed. Output must feel raw, iconic, and artistically imperfect—yet refined enough for engraving. Format must resemble black color on white background with visible vector stroke quality.";

const THEMED_PREFIX: &str = "Generate a unique, hand-drawn vector-style illustration of ";

const THEMED_SUFFIX: &str = " in the style of minimalist tattoo line art, using bold and thick black strokes only. No detailed thin lines. The artwork should be playful, emotionally expressive, and symbolically rich—like stroke tattoos or flash tattoos. Avoid any shading, gradients, textures, or color fills. Design must be optimized for laser engraving on jewellery: 2D, high contrast, clean outlines, no noise, no background, no text unless instructed. Output must feel raw, iconic, and artistically imperfect—yet refined enough for engraving. Format must resemble black color on white background with visible vector stroke quality.";

/// A complete prompt ready to send to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// The fixed prompt used when the user skips theme entry.
    #[must_use]
    pub fn surprise() -> Self {
        Self(SURPRISE_TEMPLATE.to_string())
    }

    /// Interpolate a theme into the themed template.
    ///
    /// Returns `None` for blank themes.
    #[must_use]
    pub fn themed(theme: &str) -> Option<Self> {
        let theme = theme.trim();
        if theme.is_empty() {
            return None;
        }
        Some(Self(format!("{THEMED_PREFIX}{theme}{THEMED_SUFFIX}")))
    }

    /// Whether this is the fixed surprise prompt.
    #[must_use]
    pub fn is_surprise(&self) -> bool {
        self.0 == SURPRISE_TEMPLATE
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clamp user input to the theme length limit.
#[must_use]
pub fn clamp_theme(input: &str) -> String {
    input.chars().take(MAX_THEME_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themed_prompt_interpolates_trimmed_theme() {
        let prompt = Prompt::themed("  dog ").unwrap();
        assert!(prompt.as_str().contains("illustration of dog in the style"));
        assert!(!prompt.is_surprise());
    }

    #[test]
    fn blank_theme_has_no_prompt() {
        assert!(Prompt::themed("").is_none());
        assert!(Prompt::themed(" \t\n").is_none());
    }

    #[test]
    fn surprise_prompt_has_no_theme_slot() {
        let prompt = Prompt::surprise();
        assert!(prompt.is_surprise());
        assert!(prompt.as_str().starts_with("Generate a unique, hand-drawn vector-style illustration in the style"));
    }

    #[test]
    fn clamp_counts_chars_not_bytes() {
        assert_eq!(clamp_theme("ünïcödé-wörds-are-fine-here"), "ünïcödé-wörds-are-fi");
        assert_eq!(clamp_theme("owl"), "owl");
    }
}
