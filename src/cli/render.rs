// src/cli/render.rs — Turn Session state into terminal output

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::core::{Session, SessionPhase};
use crate::util::format_bytes;

/// Printable summary of a Session. Leaves the base64 payload out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub image: Option<ImageView>,
    pub analysis: String,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub mime_type: String,
    pub bytes: usize,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            phase: s.phase(),
            image: s.image.as_ref().map(|i| ImageView {
                mime_type: i.mime_type.clone(),
                bytes: i.byte_len,
            }),
            analysis: s.analysis.clone(),
            loading: s.loading,
            error: s.error.clone(),
        }
    }
}

/// One-line status for menus and prompts.
pub fn status_line(s: &Session) -> String {
    match &s.image {
        Some(img) => format!(
            "[{}] {} ({})",
            s.phase(),
            img.mime_type,
            format_bytes(img.byte_len)
        ),
        None => format!("[{}] no image selected", s.phase()),
    }
}

/// Render a full Session for the terminal.
pub fn render_session(s: &Session, raw: bool) -> String {
    let mut out = status_line(s);
    if s.loading {
        out.push_str("\nAnalyzing...");
    }
    if let Some(err) = &s.error {
        out.push_str("\nerror: ");
        out.push_str(err);
    }
    if !s.analysis.is_empty() {
        out.push_str("\n\n");
        if raw {
            out.push_str(s.analysis.trim());
        } else {
            out.push_str(&markdown_to_terminal(&s.analysis));
        }
    }
    out
}

/// Flatten markdown into plain text that reads well in a terminal.
pub fn markdown_to_terminal(md: &str) -> String {
    let mut out = String::new();
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut heading: Option<(HeadingLevel, usize)> = None;
    let mut links: Vec<String> = Vec::new();
    let mut in_code_block = false;
    let mut cell = 0usize;

    for event in Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                blank_line(&mut out);
                heading = Some((level, out.len()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, start)) = heading.take() {
                    let width = out[start..].chars().count();
                    let rule = if level == HeadingLevel::H1 { '=' } else { '-' };
                    out.push('\n');
                    out.extend(std::iter::repeat(rule).take(width));
                    out.push('\n');
                }
            }
            Event::Start(Tag::Paragraph) => {
                if lists.is_empty() {
                    blank_line(&mut out);
                }
            }
            Event::End(TagEnd::Paragraph) => newline(&mut out),
            Event::Start(Tag::List(first)) => {
                if lists.is_empty() {
                    blank_line(&mut out);
                } else {
                    newline(&mut out);
                }
                lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                newline(&mut out);
            }
            Event::Start(Tag::Item) => {
                newline(&mut out);
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{}. ", n));
                        *n += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::End(TagEnd::Item) => newline(&mut out),
            Event::Start(Tag::CodeBlock(_)) => {
                blank_line(&mut out);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::Table(_)) => blank_line(&mut out),
            Event::End(TagEnd::Table) => newline(&mut out),
            Event::Start(Tag::TableHead | Tag::TableRow) => cell = 0,
            Event::End(TagEnd::TableHead | TagEnd::TableRow) => out.push('\n'),
            Event::Start(Tag::TableCell) => {
                if cell > 0 {
                    out.push_str(" | ");
                }
                cell += 1;
            }
            Event::Start(Tag::Link { dest_url, .. }) => links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = links.pop() {
                    out.push_str(&format!(" ({})", url));
                }
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => {
                blank_line(&mut out);
                out.push_str("────────\n");
            }
            _ => {}
        }
    }

    out.trim().to_string()
}

fn newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    newline(out);
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
}
