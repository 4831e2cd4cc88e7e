use ratatui::{
    prelude::Text,
    style::{Color, Modifier, Style},
    text::Span,
};

pub fn error_text(t: impl Into<Text<'static>>) -> Text<'static> {
    let mut t = t.into();
    t.patch_style(Style::default().fg(Color::Red));
    t
}

/// A key binding, as shown in help text
pub fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::new().fg(Color::Blue))
}

pub fn heading() -> Style {
    Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::new().fg(Color::DarkGray)
}

pub fn selected() -> Style {
    Style::new().add_modifier(Modifier::REVERSED)
}
