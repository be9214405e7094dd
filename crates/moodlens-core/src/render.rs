//! Result rendering
//!
//! Turns an [`AnalysisResult`] into something displayable. Only two markup constructs
//! are honored in suggestion text: `**bold**` and line breaks. A single
//! `[text](url)` link is lifted out so it can be shown as a button.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::analysis::AnalysisResult;
use crate::emotion::display_for;

fn link_pattern() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    pub text: String,
    pub url: String,
}

/// Pull out the first `[text](url)` link, returning it with a copy of the text that
/// has the link removed. Text without a link comes back unchanged.
pub fn extract_link(suggestion: &str) -> (Option<ExtractedLink>, String) {
    match link_pattern().captures(suggestion) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let link = ExtractedLink {
                text: caps[1].to_string(),
                url: caps[2].to_string(),
            };
            let mut cleaned = String::with_capacity(suggestion.len());
            cleaned.push_str(&suggestion[..whole.start]);
            cleaned.push_str(&suggestion[whole.end..]);
            (Some(link), cleaned)
        }
        None => (None, suggestion.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    Text(String),
    Bold(String),
    LineBreak,
}

/// Split text into plain, bold and line-break segments, preserving order.
///
/// An unmatched `**` is kept as literal text.
pub fn render_markup(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            segments.push(Segment::LineBreak);
        }
        push_bold_spans(line.trim_end_matches('\r'), &mut segments);
    }
    segments
}

fn push_bold_spans(line: &str, segments: &mut Vec<Segment>) {
    let mut rest = line;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };
        if open > 0 {
            segments.push(Segment::Text(rest[..open].to_string()));
        }
        if close > 0 {
            segments.push(Segment::Bold(after[..close].to_string()));
        }
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }
}

pub fn segments_to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            Segment::Text(t) => html.push_str(&escape_html(t)),
            Segment::Bold(t) => {
                html.push_str("<strong>");
                html.push_str(&escape_html(t));
                html.push_str("</strong>");
            }
            Segment::LineBreak => html.push_str("<br />"),
        }
    }
    html
}

pub fn segments_to_terminal(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::Bold(t) => {
                out.push_str("\x1b[1m");
                out.push_str(t);
                out.push_str("\x1b[0m");
            }
            Segment::LineBreak => out.push('\n'),
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Badges {
    pub music: bool,
    pub poem: bool,
}

/// Category badges from a case-insensitive scan of the original suggestion
pub fn detect_badges(suggestion: &str) -> Badges {
    let lower = suggestion.to_lowercase();
    Badges {
        music: lower.contains("música"),
        poem: lower.contains("poema"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub emotion: String,
    pub title: String,
    pub glyph: &'static str,
    pub gradient: &'static str,
    pub body: Vec<Segment>,
    pub link: Option<ExtractedLink>,
    pub badges: Badges,
}

impl DisplayModel {
    pub fn body_html(&self) -> String {
        segments_to_html(&self.body)
    }

    /// Plain-terminal rendering with ANSI bold
    pub fn to_terminal(&self) -> String {
        let mut out = format!("{}  {}\n\n", self.glyph, self.title);
        out.push_str("Sugestão Para Você\n");
        out.push_str(&segments_to_terminal(&self.body));
        if let Some(link) = &self.link {
            out.push_str(&format!("\n\n▶ {} - {}", link.text, link.url));
        }
        let mut tags = Vec::new();
        if self.badges.music {
            tags.push("🎵 Sugestão Musical");
        }
        if self.badges.poem {
            tags.push("📖 Poema");
        }
        if !tags.is_empty() {
            out.push_str("\n\n");
            out.push_str(&tags.join("   "));
        }
        out
    }
}

/// Build the display model for a result; never fails, whatever the label
pub fn render(result: &AnalysisResult) -> DisplayModel {
    let (glyph, gradient) = display_for(&result.emotion);
    let (link, cleaned) = extract_link(&result.suggestion);

    DisplayModel {
        emotion: result.emotion.to_string(),
        title: capitalize(result.emotion.as_str()),
        glyph,
        gradient,
        body: render_markup(&cleaned),
        link,
        badges: detect_badges(&result.suggestion),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
