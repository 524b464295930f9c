//! Syntax highlighting for fenced code blocks.

use syntect::{highlighting::ThemeSet, html::highlighted_html_for_string, parsing::SyntaxSet};
use tracing::warn;

use crate::markdown::html_escape;

/// Theme used when none is configured or the configured one is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Syntax highlighter using syntect.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter with the given theme.
    ///
    /// Unknown themes fall back to [`DEFAULT_THEME`] with a warning.
    pub fn new(theme: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme = if theme_set.themes.contains_key(theme) {
            theme.to_string()
        } else {
            warn!(theme, fallback = DEFAULT_THEME, "unknown syntax theme");
            DEFAULT_THEME.to_string()
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme,
        }
    }

    /// Active theme name.
    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Highlight code for a language token such as `rust` or `py`.
    ///
    /// Unrecognized languages render as an escaped `<pre><code>` block.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang.and_then(|l| self.syntax_set.find_syntax_by_token(l));
        let theme = self.theme_set.themes.get(&self.theme);

        if let (Some(syntax), Some(theme)) = (syntax, theme)
            && let Ok(html) = highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
        {
            return html;
        }

        plain_block(code, lang)
    }
}

fn plain_block(code: &str, lang: Option<&str>) -> String {
    let lang_class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{}</code></pre>\n", html_escape(code))
}
