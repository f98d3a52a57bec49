//! Optional syntax-highlighting capability.
//!
//! Highlighting is probed and registered once per process: the first call to
//! [`register`] installs the handler into a process-wide registry that every
//! later render call reads. Registration is idempotent and absence is a
//! valid terminal state; the capability result is an explicit enum, never
//! inferred from failures during rendering.

/// Default theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Whether syntax highlighting is available in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightCapability {
    Enabled,
    Disabled,
}

impl HighlightCapability {
    pub fn is_enabled(self) -> bool {
        matches!(self, HighlightCapability::Enabled)
    }
}

pub use registry::{highlight_block, register};

#[cfg(feature = "highlight")]
mod registry {
    use std::sync::OnceLock;

    use log::{debug, warn};
    use syntect::highlighting::{Theme, ThemeSet};
    use syntect::html::highlighted_html_for_string;
    use syntect::parsing::SyntaxSet;

    use super::{HighlightCapability, DEFAULT_THEME};

    struct Highlighter {
        syntax_set: SyntaxSet,
        theme: Theme,
    }

    static REGISTRY: OnceLock<Highlighter> = OnceLock::new();

    /// Register the highlighting handler for the rest of the process. The
    /// first call wins; later calls (including with a different theme) are
    /// no-ops.
    pub fn register(theme_name: &str) -> HighlightCapability {
        REGISTRY.get_or_init(|| {
            let syntax_set = SyntaxSet::load_defaults_newlines();
            let mut theme_set = ThemeSet::load_defaults();
            let theme = match theme_set.themes.remove(theme_name) {
                Some(theme) => theme,
                None => {
                    warn!("unknown highlight theme '{}', using '{}'", theme_name, DEFAULT_THEME);
                    theme_set.themes.remove(DEFAULT_THEME).unwrap_or_default()
                }
            };
            debug!("registered syntax highlighting");
            Highlighter { syntax_set, theme }
        });
        HighlightCapability::Enabled
    }

    /// Render a code block to highlighted HTML. Returns `None` when nothing
    /// is registered or the highlighter fails, in which case the caller
    /// falls back to escaped preformatted text. An unknown language name
    /// falls back to the plain-text syntax.
    pub fn highlight_block(language: &str, code: &str) -> Option<String> {
        let highlighter = REGISTRY.get()?;

        let syntax = highlighter
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| highlighter.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| highlighter.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &highlighter.syntax_set, syntax, &highlighter.theme) {
            Ok(html) => Some(html),
            Err(err) => {
                warn!("highlighting failed for a {} block: {}", language, err);
                None
            }
        }
    }
}

#[cfg(not(feature = "highlight"))]
mod registry {
    use super::HighlightCapability;

    pub fn register(_theme_name: &str) -> HighlightCapability {
        HighlightCapability::Disabled
    }

    pub fn highlight_block(_language: &str, _code: &str) -> Option<String> {
        None
    }
}

#[cfg(all(test, feature = "highlight"))]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        assert_eq!(register(DEFAULT_THEME), HighlightCapability::Enabled);
        assert_eq!(register("base16-ocean.dark"), HighlightCapability::Enabled);
    }

    #[test]
    fn python_code_gets_styled_spans() {
        register(DEFAULT_THEME);
        let html = highlight_block("python", "def greet():\n    return True\n").unwrap();

        assert!(html.contains("<pre"), "should produce a pre block");
        assert!(html.contains("style="), "should carry inline styles");
        assert!(html.contains("greet"), "should contain the code text");
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        register(DEFAULT_THEME);
        let html = highlight_block("no-such-language", "plain words\n").unwrap();

        assert!(html.contains("plain words"));
    }
}

#[cfg(all(test, not(feature = "highlight")))]
mod tests {
    use super::*;

    #[test]
    fn capability_is_disabled_without_the_feature() {
        assert_eq!(register(DEFAULT_THEME), HighlightCapability::Disabled);
        assert!(highlight_block("python", "code").is_none());
    }
}
