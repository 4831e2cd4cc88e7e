use htmlview::render_text;
use pretty_assertions::assert_eq;
use ratatui::prelude::*;

#[test]
fn test_h1() {
    assert_eq!(
        render_text("<h1>Groups</h1>text").0,
        Text::from(vec![
            Line::from(vec![Span::styled(
                "Groups",
                Style::new().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            )]),
            Line::from(vec![Span::styled("text", Style::new())]),
        ])
    );
}

#[test]
fn test_h5() {
    assert_eq!(
        render_text("before<h5>Small</h5>after").0,
        Text::from(vec![
            Line::from(vec![Span::styled("before", Style::new())]),
            Line::from(vec![Span::styled(
                "Small",
                Style::new().add_modifier(Modifier::BOLD)
            )]),
            Line::from(vec![Span::styled("after", Style::new())]),
        ])
    );
}
