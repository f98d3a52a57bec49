//! AST-to-HTML renderer.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::highlight;
use crate::parser::{ParsedDocument, RstNode};

lazy_static! {
    static ref REF_RE: Regex = Regex::new(r"`([^`]+)`_").unwrap();
    static ref DOUBLE_CODE_RE: Regex = Regex::new(r"``([^`]+)``").unwrap();
    static ref SINGLE_CODE_RE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BOLD_RE: Regex = Regex::new(r"\*\*([^*]+)\*\*").unwrap();
    static ref ITALIC_RE: Regex = Regex::new(r"\*([^*]+)\*").unwrap();
}

/// HTML renderer for parsed documents. Code-block directives are routed
/// through the process-wide highlight registry.
pub struct HtmlRenderer;

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the document body, wrapping content in hierarchical section
    /// tags based on title levels.
    pub fn render_body(&self, document: &ParsedDocument) -> String {
        let mut html = String::new();
        let mut open_sections: Vec<usize> = Vec::new();

        for node in &document.nodes {
            if let RstNode::Title { level, text } = node {
                let level = (*level).clamp(1, 6);
                while let Some(&open_level) = open_sections.last() {
                    if open_level >= level {
                        html.push_str("</section>\n");
                        open_sections.pop();
                    } else {
                        break;
                    }
                }
                html.push_str(&format!("<section id=\"{}\">\n", slugify(text)));
                open_sections.push(level);
            }

            let rendered = self.render_node(node);
            if rendered.is_empty() {
                continue;
            }
            html.push_str(&rendered);
            html.push('\n');
        }

        for _ in open_sections {
            html.push_str("</section>\n");
        }

        html
    }

    fn render_node(&self, node: &RstNode) -> String {
        match node {
            RstNode::Title { text, level } => {
                let level = (*level).clamp(1, 6);
                let slug = slugify(text);
                let rendered = self.render_inline(text);
                format!(
                    "<h{level}>{text}<a class=\"headerlink\" href=\"#{slug}\" title=\"Link to this heading\">\u{b6}</a></h{level}>",
                    level = level,
                    slug = slug,
                    text = rendered
                )
            }

            RstNode::Paragraph { content } => {
                format!("<p>{}</p>", self.render_inline(content))
            }

            RstNode::LiteralBlock { content } => {
                format!(
                    "<pre class=\"literal-block\">{}</pre>",
                    html_escape::encode_text(content)
                )
            }

            RstNode::List { items, ordered } => {
                let items_html: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", self.render_inline(item)))
                    .collect::<Vec<_>>()
                    .join("\n");
                if *ordered {
                    format!("<ol>\n{}\n</ol>", items_html)
                } else {
                    format!("<ul class=\"simple\">\n{}\n</ul>", items_html)
                }
            }

            RstNode::BlockQuote { content } => {
                format!(
                    "<blockquote>\n<p>{}</p>\n</blockquote>",
                    self.render_inline(content)
                )
            }

            RstNode::LinkTarget { name } => {
                format!("<span id=\"{}\"></span>", html_escape::encode_text(name))
            }

            RstNode::Transition => "<hr />".to_string(),

            RstNode::Directive {
                name,
                args,
                options,
                content,
                line,
            } => self.render_directive(name, args, options, content, *line),
        }
    }

    fn render_directive(
        &self,
        name: &str,
        args: &[String],
        options: &HashMap<String, String>,
        content: &str,
        line: usize,
    ) -> String {
        match name {
            "code-block" | "sourcecode" => {
                let Some(language) = args.first() else {
                    warn!("code-block directive at line {} has no language argument", line);
                    return plain_code_block(content);
                };
                match highlight::highlight_block(language, content) {
                    // Raw highlighted HTML, spliced without re-escaping
                    Some(html) => {
                        format!("<div class=\"highlight-{}\">\n{}</div>", slugify(language), html)
                    }
                    None => plain_code_block(content),
                }
            }

            "raw" => {
                if args.first().map(String::as_str) == Some("html") {
                    content.to_string()
                } else {
                    debug!("ignoring raw directive for format {:?} at line {}", args.first(), line);
                    String::new()
                }
            }

            "image" => {
                let Some(source) = args.first() else {
                    return String::new();
                };
                let alt = options.get("alt").map(String::as_str).unwrap_or("");
                format!(
                    "<img src=\"{}\" alt=\"{}\" />",
                    html_escape::encode_double_quoted_attribute(source),
                    html_escape::encode_double_quoted_attribute(alt)
                )
            }

            _ => {
                debug!("ignoring unhandled directive '{}' at line {}", name, line);
                String::new()
            }
        }
    }

    /// Render inline markup: references, inline literals, strong, emphasis.
    pub fn render_inline(&self, text: &str) -> String {
        let mut replacements: Vec<String> = Vec::new();

        // References are processed before escaping to preserve the angle
        // brackets of the `text <url>`_ form; the produced HTML is hidden
        // behind placeholders until the end.
        let with_refs = REF_RE
            .replace_all(text, |caps: &regex::Captures| {
                let reference = &caps[1];
                let html = render_reference(reference);
                push_placeholder(&mut replacements, html)
            })
            .to_string();

        let mut result = html_escape::encode_text(&with_refs).to_string();

        result = DOUBLE_CODE_RE
            .replace_all(&result, |caps: &regex::Captures| {
                let html = format!("<code>{}</code>", &caps[1]);
                push_placeholder(&mut replacements, html)
            })
            .to_string();

        result = SINGLE_CODE_RE
            .replace_all(&result, |caps: &regex::Captures| {
                let html = format!(
                    "<code class=\"docutils literal\"><span class=\"pre\">{}</span></code>",
                    &caps[1]
                );
                push_placeholder(&mut replacements, html)
            })
            .to_string();

        result = BOLD_RE.replace_all(&result, "<strong>$1</strong>").to_string();
        result = ITALIC_RE.replace_all(&result, "<em>$1</em>").to_string();

        for (index, html) in replacements.iter().enumerate() {
            result = result.replace(&placeholder(index), html);
        }

        result
    }
}

fn push_placeholder(replacements: &mut Vec<String>, html: String) -> String {
    let token = placeholder(replacements.len());
    replacements.push(html);
    token
}

fn placeholder(index: usize) -> String {
    format!("\x00INL{}\x00", index)
}

fn render_reference(reference: &str) -> String {
    if let Some(angle) = reference.rfind('<') {
        if reference.ends_with('>') {
            let text = reference[..angle].trim();
            let url = &reference[angle + 1..reference.len() - 1];
            return format!(
                "<a class=\"reference external\" href=\"{}\">{}</a>",
                html_escape::encode_double_quoted_attribute(url),
                html_escape::encode_text(text)
            );
        }
    }
    format!(
        "<a class=\"reference internal\" href=\"#{}\">{}</a>",
        slugify(reference),
        html_escape::encode_text(reference)
    )
}

fn plain_code_block(content: &str) -> String {
    format!(
        "<pre class=\"literal-block\">{}</pre>",
        html_escape::encode_text(content)
    )
}

/// Convert text to a URL-safe slug for anchor IDs.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn render(content: &str) -> String {
        let parser = Parser::new().unwrap();
        HtmlRenderer::new().render_body(&parser.parse(content))
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("foo_bar"), "foo-bar");
        assert_eq!(slugify("Action.button"), "action-button");
    }

    #[test]
    fn title_renders_with_section_and_headerlink() {
        let html = render("Introduction\n============\n\nBody text.\n");
        assert!(html.contains("<section id=\"introduction\">"));
        assert!(html.contains("<h1>Introduction<a class=\"headerlink\" href=\"#introduction\""));
        assert!(html.contains("<p>Body text.</p>"));
    }

    #[test]
    fn sibling_sections_are_closed() {
        let html = render("One\n===\n\nfirst\n\nTwo\n===\n\nsecond\n");
        assert_eq!(html.matches("<section").count(), 2);
        assert_eq!(html.matches("</section>").count(), 2);
    }

    #[test]
    fn inline_markup() {
        let renderer = HtmlRenderer::new();
        let result = renderer.render_inline("**bold** and *italic* and ``code``");
        assert!(result.contains("<strong>bold</strong>"));
        assert!(result.contains("<em>italic</em>"));
        assert!(result.contains("<code>code</code>"));
    }

    #[test]
    fn single_backticks_are_inline_literals() {
        let renderer = HtmlRenderer::new();
        let result = renderer.render_inline("Use `run()` here.");
        assert!(result
            .contains("<code class=\"docutils literal\"><span class=\"pre\">run()</span></code>"));
    }

    #[test]
    fn external_reference() {
        let renderer = HtmlRenderer::new();
        let result = renderer.render_inline("See the `manual <https://example.org/doc.html>`_ now.");
        assert!(result.contains(
            "<a class=\"reference external\" href=\"https://example.org/doc.html\">manual</a>"
        ));
    }

    #[test]
    fn internal_reference() {
        let renderer = HtmlRenderer::new();
        let result = renderer.render_inline("See `My Section`_ for details.");
        assert!(result
            .contains("<a class=\"reference internal\" href=\"#my-section\">My Section</a>"));
    }

    #[test]
    fn literal_block_is_escaped() {
        let html = render("Example::\n\n   a < b && c > d\n");
        assert!(html.contains("<pre class=\"literal-block\">"));
        assert!(html.contains("a &lt; b"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn lists_render() {
        let html = render("- one\n- two\n");
        assert!(html.contains("<ul class=\"simple\">"));
        assert!(html.contains("<li>one</li>"));

        let html = render("1. first\n2. second\n");
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>first</li>"));
    }

    #[test]
    fn raw_html_directive_is_spliced_verbatim() {
        let html = render("Before.\n\n.. raw:: html\n\n   <div class=\"widget\">x</div>\n\nAfter.\n");
        assert!(html.contains("<div class=\"widget\">x</div>"));
        assert!(!html.contains(".. raw::"));
    }

    #[test]
    fn unknown_directive_produces_no_output() {
        let html = render("Before.\n\n.. mystery:: arg\n   :opt: v\n\n   hidden\n\nAfter.\n");
        assert!(!html.contains("mystery"));
        assert!(!html.contains("hidden"));
        assert!(html.contains("Before."));
        assert!(html.contains("After."));
    }

    #[test]
    fn link_target_becomes_anchor() {
        let html = render(".. _install-guide:\n\nInstall here.\n");
        assert!(html.contains("<span id=\"install-guide\"></span>"));
        assert!(!html.contains(".. _install-guide"));
    }

    #[test]
    fn code_block_without_language_falls_back_to_pre() {
        let html = render(".. code-block::\n\n   some code\n");
        assert!(html.contains("<pre class=\"literal-block\">some code</pre>"));
    }

    #[cfg(feature = "highlight")]
    #[test]
    fn code_block_is_highlighted() {
        crate::highlight::register(crate::highlight::DEFAULT_THEME);
        let html = render(".. code-block:: python\n\n   def greet():\n       return True\n");
        assert!(html.contains("<div class=\"highlight-python\">"));
        assert!(html.contains("<pre"));
        assert!(html.contains("greet"));
    }
}
