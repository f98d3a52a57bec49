//! Line-oriented parser for the reStructuredText subset the documentation
//! corpus uses: section titles, paragraphs, literal blocks, directives,
//! lists, block quotes, hyperlink targets, comments and transitions.

use std::collections::HashMap;

use anyhow::Result;
use log::debug;
use regex::Regex;

/// Characters accepted as section underline / transition adornments.
const ADORNMENT_CHARS: &str = "=-~^\"'*+#<>";

/// A block-level node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum RstNode {
    Title {
        text: String,
        level: usize,
    },
    Paragraph {
        content: String,
    },
    LiteralBlock {
        content: String,
    },
    List {
        items: Vec<String>,
        ordered: bool,
    },
    BlockQuote {
        content: String,
    },
    LinkTarget {
        name: String,
    },
    Transition,
    Directive {
        name: String,
        args: Vec<String>,
        options: HashMap<String, String>,
        content: String,
        line: usize,
    },
}

/// Parse result: the block nodes plus the document title (text of the first
/// section title, `Untitled` when there is none).
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub title: String,
    pub nodes: Vec<RstNode>,
}

pub struct Parser {
    directive_re: Regex,
    enumerated_re: Regex,
}

impl Parser {
    pub fn new() -> Result<Self> {
        // Directive names may contain hyphens (code-block, csv-table)
        let directive_re = Regex::new(r"^\s*\.\.\s+([\w-]+)::\s*(.*)$")?;
        let enumerated_re = Regex::new(r"^\d+\.\s+(.*)$")?;

        Ok(Self {
            directive_re,
            enumerated_re,
        })
    }

    pub fn parse(&self, content: &str) -> ParsedDocument {
        let lines: Vec<&str> = content.lines().collect();
        let mut nodes = Vec::new();
        // Underline characters are assigned levels in order of first use
        let mut adornments: Vec<char> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if trimmed.is_empty() {
                i += 1;
                continue;
            }

            if let Some(captures) = self.directive_re.captures(line) {
                let name = captures[1].to_string();
                let arg = captures[2].trim().to_string();
                let (node, consumed) = self.parse_directive(&lines[i..], name, arg, i + 1);
                nodes.push(node);
                i += consumed;
                continue;
            }

            if let Some(name) = parse_link_target(trimmed) {
                nodes.push(RstNode::LinkTarget { name });
                i += 1;
                continue;
            }

            // Comment: ".." explanation lines, including indented continuation
            if trimmed == ".." || trimmed.starts_with(".. ") {
                i += 1;
                while i < lines.len()
                    && (lines[i].trim().is_empty() || is_indented(lines[i]))
                {
                    if lines[i].trim().is_empty()
                        && lines.get(i + 1).map_or(true, |next| !is_indented(next))
                    {
                        break;
                    }
                    i += 1;
                }
                continue;
            }

            // Section title underlined with an adornment character
            if i + 1 < lines.len() && is_underline(lines[i + 1], trimmed) {
                let marker = lines[i + 1].trim().chars().next().unwrap();
                let level = adornment_level(&mut adornments, marker);
                nodes.push(RstNode::Title {
                    text: trimmed.to_string(),
                    level,
                });
                i += 2;
                continue;
            }

            // Transition line like "----"
            if trimmed.chars().count() >= 4
                && trimmed.chars().all(|c| ADORNMENT_CHARS.contains(c))
            {
                nodes.push(RstNode::Transition);
                i += 1;
                continue;
            }

            if let Some((items, ordered, consumed)) = self.parse_list(&lines[i..]) {
                nodes.push(RstNode::List { items, ordered });
                i += consumed;
                continue;
            }

            // Indented text outside any directive is a block quote
            if is_indented(line) {
                let (content, consumed) = parse_indented_block(&lines[i..]);
                if !content.trim().is_empty() {
                    nodes.push(RstNode::BlockQuote { content });
                }
                i += consumed.max(1);
                continue;
            }

            // Paragraph; a trailing "::" introduces a literal block
            let (content, consumed) = parse_paragraph(&lines[i..]);
            i += consumed.max(1);
            if let Some(stripped) = content.strip_suffix("::") {
                let text = stripped.trim_end();
                if !text.is_empty() {
                    let paragraph = if text.ends_with(':') {
                        text.to_string()
                    } else {
                        format!("{}:", text)
                    };
                    nodes.push(RstNode::Paragraph { content: paragraph });
                }
                let (literal, block_consumed) = parse_indented_block(&lines[i..]);
                if !literal.is_empty() {
                    nodes.push(RstNode::LiteralBlock { content: literal });
                }
                i += block_consumed;
            } else {
                nodes.push(RstNode::Paragraph { content });
            }
        }

        let title = extract_title(&nodes);
        debug!("parsed {} block nodes", nodes.len());

        ParsedDocument { title, nodes }
    }

    fn parse_directive(
        &self,
        lines: &[&str],
        name: String,
        arg: String,
        line_number: usize,
    ) -> (RstNode, usize) {
        let mut options = HashMap::new();
        let mut i = 1;

        // Option lines ":key: value" directly after the directive marker
        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() {
                break;
            }
            let trimmed = line.trim_start();
            if !is_indented(line) || !trimmed.starts_with(':') {
                break;
            }
            if let Some(colon) = trimmed[1..].find(':') {
                let key = &trimmed[1..colon + 1];
                let value = trimmed[colon + 2..].trim();
                options.insert(key.to_string(), value.to_string());
            }
            i += 1;
        }

        let (content, consumed) = parse_indented_block(&lines[i..]);

        let args = if arg.is_empty() { Vec::new() } else { vec![arg] };
        let node = RstNode::Directive {
            name,
            args,
            options,
            content,
            line: line_number,
        };
        (node, i + consumed)
    }

    fn parse_list(&self, lines: &[&str]) -> Option<(Vec<String>, bool, usize)> {
        let (first, ordered) = self.list_item(lines[0].trim())?;
        let mut items = vec![first];
        let mut consumed = 1;

        while consumed < lines.len() {
            let line = lines[consumed];
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            match self.list_item(trimmed) {
                Some((text, item_ordered)) if item_ordered == ordered => {
                    items.push(text);
                    consumed += 1;
                }
                Some(_) => break,
                None if is_indented(line) => {
                    // Continuation line folded into the previous item
                    let last = items.last_mut().unwrap();
                    last.push(' ');
                    last.push_str(trimmed);
                    consumed += 1;
                }
                None => break,
            }
        }

        Some((items, ordered, consumed))
    }

    fn list_item(&self, trimmed: &str) -> Option<(String, bool)> {
        for marker in ["- ", "* ", "+ "] {
            if let Some(rest) = trimmed.strip_prefix(marker) {
                return Some((rest.to_string(), false));
            }
        }
        if let Some(rest) = trimmed.strip_prefix("#. ") {
            return Some((rest.to_string(), true));
        }
        if let Some(captures) = self.enumerated_re.captures(trimmed) {
            return Some((captures[1].to_string(), true));
        }
        None
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with("   ") || line.starts_with('\t')
}

fn is_underline(line: &str, title: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.chars().all(|c| ADORNMENT_CHARS.contains(c))
        && trimmed.chars().count() >= title.chars().count()
}

fn adornment_level(adornments: &mut Vec<char>, marker: char) -> usize {
    match adornments.iter().position(|&c| c == marker) {
        Some(index) => index + 1,
        None => {
            adornments.push(marker);
            adornments.len()
        }
    }
}

/// Parse an internal hyperlink target like `.. _link-name:`.
fn parse_link_target(trimmed: &str) -> Option<String> {
    let name = trimmed.strip_prefix(".. _")?.strip_suffix(':')?;
    if !name.is_empty() && !name.contains(' ') {
        Some(name.to_string())
    } else {
        None
    }
}

/// Consume a run of indented lines (plus interior blanks) and return the
/// dedented content.
fn parse_indented_block(lines: &[&str]) -> (String, usize) {
    let mut index = 0;
    let mut consumed = 0;
    let mut raw: Vec<&str> = Vec::new();
    let mut pending_blanks = 0;

    while index < lines.len() {
        let line = lines[index];
        if line.trim().is_empty() {
            pending_blanks += 1;
            index += 1;
            continue;
        }
        if !is_indented(line) {
            break;
        }
        if !raw.is_empty() {
            for _ in 0..pending_blanks {
                raw.push("");
            }
        }
        pending_blanks = 0;
        raw.push(line);
        index += 1;
        consumed = index;
    }

    if raw.is_empty() {
        return (String::new(), 0);
    }

    let indent = raw
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let content = raw
        .iter()
        .map(|line| if line.len() >= indent { &line[indent..] } else { "" })
        .collect::<Vec<_>>()
        .join("\n");

    (content, consumed)
}

fn parse_paragraph(lines: &[&str]) -> (String, usize) {
    let mut content = String::new();
    let mut consumed = 0;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if !content.is_empty() {
            content.push(' ');
        }
        content.push_str(trimmed);
        consumed += 1;
    }

    (content, consumed)
}

fn extract_title(nodes: &[RstNode]) -> String {
    for node in nodes {
        if let RstNode::Title { text, .. } = node {
            return text.clone();
        }
    }
    "Untitled".to_string()
}
