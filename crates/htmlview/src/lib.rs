//! Renders course content HTML to ratatui text.
//!
//! Only a safe subset is shown: scripts, embeds, forms and the like are dropped with
//! everything inside them, and only web/mail links are kept. Links are returned
//! separately, and marked in the text as `[n]` so they can be opened by number.
use std::mem;

use log::{debug, error};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};
use tl::{HTMLTag, Node, NodeHandle, Parser};

/// Elements dropped along with all their children
const DROPPED: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "button", "select",
    "textarea", "noscript", "template", "svg", "head", "title", "link", "meta",
];

/// Elements which start and end on their own line
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "aside", "nav", "table",
    "tr", "thead", "tbody", "figure", "figcaption", "dl", "dt", "dd",
];

/// Link schemes we're happy to hand to a browser
const SAFE_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

/// Render the given HTML to a paragraph, returning it and the links referenced in it.
pub fn render(html: &str) -> (Paragraph<'static>, Vec<String>) {
    let (text, links) = render_text(html);
    (Paragraph::new(text).wrap(Wrap { trim: false }), links)
}

/// Render the given HTML to text, returning it and the links referenced in it.
pub fn render_text(html: &str) -> (Text<'static>, Vec<String>) {
    let dom = match tl::parse(html, tl::ParserOptions::default()) {
        Ok(d) => d,
        Err(e) => {
            error!("error parsing content html: {:?}", e);
            return (
                Text::styled("This content could not be displayed.", error_style()),
                vec![],
            );
        }
    };

    let mut r = Renderer::new(dom.parser());
    for handle in dom.children() {
        r.node(handle, Style::default());
    }

    r.finish()
}

/// Whether we would show `href` as a link
pub fn is_safe_link(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    SAFE_SCHEMES.iter().any(|s| lower.starts_with(s))
}

fn error_style() -> Style {
    Style::new().fg(Color::Red)
}

fn link_style() -> Style {
    Style::new().fg(Color::Blue)
}

#[derive(Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered(usize),
}

struct Renderer<'p, 'a> {
    parser: &'p Parser<'a>,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    links: Vec<String>,
    lists: Vec<ListKind>,
    preformatted: bool,
}

impl<'p, 'a> Renderer<'p, 'a> {
    fn new(parser: &'p Parser<'a>) -> Self {
        Self {
            parser,
            lines: vec![],
            current: vec![],
            links: vec![],
            lists: vec![],
            preformatted: false,
        }
    }

    fn finish(mut self) -> (Text<'static>, Vec<String>) {
        self.soft_break();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }

        (Text::from(self.lines), self.links)
    }

    /// End the current line, even if it's empty
    fn hard_break(&mut self) {
        self.lines.push(Line::from(mem::take(&mut self.current)));
    }

    /// End the current line, if anything is on it
    fn soft_break(&mut self) {
        if !self.current.is_empty() {
            self.hard_break();
        }
    }

    fn push(&mut self, s: impl Into<String>, style: Style) {
        let s = s.into();
        if !s.is_empty() {
            self.current.push(Span::styled(s, style));
        }
    }

    fn node(&mut self, handle: &NodeHandle, style: Style) {
        let Some(node) = handle.get(self.parser) else {
            return;
        };

        match node {
            Node::Tag(t) => self.tag(t, style),
            Node::Raw(b) => self.raw(&b.as_utf8_str(), style),
            Node::Comment(_) => (),
        }
    }

    fn children(&mut self, t: &HTMLTag, style: Style) {
        for child in t.children().top().iter() {
            self.node(child, style);
        }
    }

    fn raw(&mut self, s: &str, style: Style) {
        let s = html_escape::decode_html_entities(s);
        if self.preformatted {
            for (i, part) in s.split('\n').enumerate() {
                if i > 0 {
                    self.hard_break();
                }
                self.push(part, style);
            }
        } else if s.contains('\n') {
            for (i, part) in s.split('\n').enumerate() {
                if i > 0 {
                    self.soft_break();
                }
                self.push(part.trim(), style);
            }
        } else if !(s.trim().is_empty() && self.current.is_empty()) {
            self.push(s.into_owned(), style);
        }
    }

    fn tag(&mut self, t: &HTMLTag, style: Style) {
        let name = t.name().as_utf8_str().to_ascii_lowercase();
        let name = name.as_str();
        if DROPPED.contains(&name) {
            debug!("dropping <{}>", name);
            return;
        }

        match name {
            "br" => self.hard_break(),
            "hr" => {
                self.soft_break();
                self.push("────────", Style::new().fg(Color::DarkGray));
                self.hard_break();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let style = match name {
                    "h1" | "h2" | "h3" => style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    _ => style.add_modifier(Modifier::BOLD),
                };
                self.soft_break();
                self.children(t, style);
                self.soft_break();
            }
            "strong" | "b" => self.children(t, style.add_modifier(Modifier::BOLD)),
            "em" | "i" => self.children(t, style.add_modifier(Modifier::ITALIC)),
            "u" => self.children(t, style.add_modifier(Modifier::UNDERLINED)),
            "code" => self.children(t, style.fg(Color::Yellow)),
            "pre" => {
                self.soft_break();
                let was = mem::replace(&mut self.preformatted, true);
                self.children(t, style.fg(Color::Yellow));
                self.preformatted = was;
                self.soft_break();
            }
            "blockquote" => {
                self.soft_break();
                self.push("│ ", Style::new().fg(Color::DarkGray));
                self.children(t, style.add_modifier(Modifier::ITALIC));
                self.soft_break();
            }
            "ul" | "ol" => {
                self.soft_break();
                self.lists.push(match name {
                    "ul" => ListKind::Bullet,
                    _ => ListKind::Numbered(0),
                });
                self.children(t, style);
                self.lists.pop();
                self.soft_break();
            }
            "li" => {
                self.soft_break();
                let marker = self.next_marker();
                self.push(marker, style);
                self.children(t, style);
                self.soft_break();
            }
            "a" => self.link(t, style),
            "img" => {
                let alt = attr(t, "alt").filter(|a| !a.is_empty());
                let s = match alt {
                    Some(alt) => format!("[image: {}]", alt),
                    None => "[image]".to_string(),
                };
                self.push(s, style.add_modifier(Modifier::DIM));
            }
            _ if BLOCKS.contains(&name) => {
                self.soft_break();
                self.children(t, style);
                self.soft_break();
            }
            _ => self.children(t, style),
        }
    }

    fn link(&mut self, t: &HTMLTag, style: Style) {
        match attr(t, "href") {
            Some(href) if is_safe_link(&href) => {
                let style = style.patch(link_style());
                self.children(t, style);
                self.push(format!("[{}]", self.links.len()), style);
                self.links.push(href.trim().to_string());
            }
            Some(href) => {
                debug!("not linking to {}", href);
                self.children(t, style);
            }
            None => self.children(t, style),
        }
    }

    fn next_marker(&mut self) -> String {
        let depth = self.lists.len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        match self.lists.last_mut() {
            Some(ListKind::Numbered(i)) => {
                *i += 1;
                format!("{}{}. ", indent, i)
            }
            Some(ListKind::Bullet) | None => format!("{}- ", indent),
        }
    }
}

fn attr(t: &HTMLTag, name: &str) -> Option<String> {
    t.attributes()
        .get(name)
        .flatten()
        .map(|v| html_escape::decode_html_entities(&v.as_utf8_str()).into_owned())
}
