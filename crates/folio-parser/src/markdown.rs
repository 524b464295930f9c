//! Markdown parser and compiler using pulldown-cmark.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::syntax::SyntaxHighlighter;

/// Markdown parser with syntax highlighting support.
#[derive(Debug)]
pub struct MarkdownParser {
    highlighter: SyntaxHighlighter,
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    /// Create a new markdown parser with default options.
    pub fn new() -> Self {
        Self::with_highlighter(SyntaxHighlighter::default())
    }

    /// Create a parser with a custom syntax theme.
    pub fn with_theme(theme: &str) -> Self {
        Self::with_highlighter(SyntaxHighlighter::new(theme))
    }

    fn with_highlighter(highlighter: SyntaxHighlighter) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            highlighter,
            options,
        }
    }

    /// Render a Markdown body to HTML.
    ///
    /// Headings without an explicit `{#id}` get a slug id, and fenced code
    /// blocks are syntax highlighted.
    pub fn render(&self, body: &str) -> String {
        let events: Vec<Event<'_>> = Parser::new_ext(body, self.options).collect();
        let events = assign_heading_ids(events);
        let events = self.highlight_code_blocks(events);

        let mut out = String::with_capacity(body.len() + body.len() / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Replace code block events with pre-rendered highlighted HTML.
    fn highlight_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut code_lang: Option<Option<String>> = None;
        let mut code = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_lang = Some(lang);
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(lang) = code_lang.take() {
                        let highlighted = self.highlighter.highlight(&code, lang.as_deref());
                        out.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_lang.is_some() => code.push_str(&text),
                other => out.push(other),
            }
        }

        out
    }
}

/// Give every heading without an explicit id a unique slug id.
fn assign_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut used: HashMap<String, usize> = HashMap::new();
    let mut open_heading: Option<usize> = None;
    let mut text = String::new();

    for event in events {
        match &event {
            Event::Start(Tag::Heading { id: None, .. }) => {
                open_heading = Some(out.len());
                text.clear();
            }
            Event::Text(t) | Event::Code(t) if open_heading.is_some() => text.push_str(t),
            Event::End(TagEnd::Heading(_)) => {
                if let Some(idx) = open_heading.take()
                    && let Event::Start(Tag::Heading { id, .. }) = &mut out[idx]
                {
                    let slug = unique_slug(slugify(&text), &mut used);
                    if !slug.is_empty() {
                        *id = Some(CowStr::from(slug));
                    }
                }
            }
            _ => {}
        }
        out.push(event);
    }

    out
}

fn unique_slug(slug: String, used: &mut HashMap<String, usize>) -> String {
    if slug.is_empty() {
        return slug;
    }
    let count = used.entry(slug.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        slug
    } else {
        format!("{slug}-{}", *count - 1)
    }
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Convert text to a URL-safe slug.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let parser = MarkdownParser::new();
        let html = parser.render("# Hello World\n\nThis is *a* test.");

        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<p>This is <em>a</em> test.</p>"));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let parser = MarkdownParser::new();
        let html = parser.render("## Setup {#install}");

        assert!(html.contains("<h2 id=\"install\">Setup</h2>"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let parser = MarkdownParser::new();
        let html = parser.render("## Notes\n\n## Notes\n\n## Notes");

        assert!(html.contains("id=\"notes\""));
        assert!(html.contains("id=\"notes-1\""));
        assert!(html.contains("id=\"notes-2\""));
    }

    #[test]
    fn test_code_block_highlighted() {
        let parser = MarkdownParser::new();
        let html = parser.render("```rust\nfn main() {}\n```");

        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_indented_code_block_escaped() {
        let parser = MarkdownParser::new();
        let html = parser.render("Para\n\n    a < b\n");

        assert!(html.contains("<pre><code>a &lt; b\n</code></pre>"));
    }

    #[test]
    fn test_table_rendering() {
        let parser = MarkdownParser::new();
        let html = parser.render(
            r#"| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |"#,
        );

        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<td>Cell 1</td>"));
    }

    #[test]
    fn test_task_list() {
        let parser = MarkdownParser::new();
        let html = parser.render("- [x] Done\n- [ ] Not done");

        assert!(html.contains("checkbox"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Test 123 Post"), "test-123-post");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("Special!@#Chars"), "specialchars");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & \"b\""), "a &amp; &quot;b&quot;");
    }
}
