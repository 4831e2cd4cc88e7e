use htmlview::render_text;
use pretty_assertions::assert_eq;
use ratatui::prelude::*;

fn line(spans: &[&'static str]) -> Line<'static> {
    Line::from(
        spans
            .iter()
            .map(|s| Span::styled(*s, Style::new()))
            .collect::<Vec<_>>(),
    )
}

#[test]
fn test_ul() {
    assert_eq!(
        render_text("<ul><li>one</li><li>two</li></ul>").0,
        Text::from(vec![line(&["- ", "one"]), line(&["- ", "two"])])
    );
}

#[test]
fn test_ol() {
    assert_eq!(
        render_text("<ol>\n  <li>one</li>\n  <li>two</li>\n  <li>three</li>\n</ol>").0,
        Text::from(vec![
            line(&["1. ", "one"]),
            line(&["2. ", "two"]),
            line(&["3. ", "three"]),
        ])
    );
}

#[test]
fn test_nested() {
    assert_eq!(
        render_text("<ul><li>outer<ol><li>inner</li></ol></li><li>next</li></ul>").0,
        Text::from(vec![
            line(&["- ", "outer"]),
            line(&["  1. ", "inner"]),
            line(&["- ", "next"]),
        ])
    );
}

#[test]
fn test_list_after_text() {
    assert_eq!(
        render_text("Steps:<ul><li>a</li></ul>done").0,
        Text::from(vec![line(&["Steps:"]), line(&["- ", "a"]), line(&["done"])])
    );
}
