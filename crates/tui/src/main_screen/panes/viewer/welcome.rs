use ratatui::{
    prelude::Rect,
    style::Stylize,
    text::Span,
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{panes::Pane, Action},
    store::Store,
    styles::heading,
};

#[derive(Debug, Default)]
pub struct WelcomeViewer {}

impl Pane for WelcomeViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        frame.render_widget(welcome_message(store.session().map(|s| s.username.as_str())), area);
    }

    fn handle_event(&mut self, _: &mut Store, _: Event) -> Action {
        Action::None
    }
}

fn welcome_message(username: Option<&str>) -> Paragraph<'static> {
    let greeting = match username {
        Some(u) => format!("Welcome to AcadMe, {u}!\n"),
        None => "Welcome to AcadMe!\n".to_string(),
    };

    Paragraph::new(vec![
        vec![Span::styled(greeting, heading())].into(),
        vec![
            "Use ".into(),
            "j/k or ↓/↑".blue(),
            " to navigate up and down, then ".into(),
            "Enter".blue(),
            " to select an item.".into(),
        ]
        .into(),
        vec![
            "Pick a category to browse its courses, ".into(),
            "n".blue(),
            " loads more of them. Or search by name, tutor, category and date.".into(),
        ]
        .into(),
        vec![
            "In a course, ".into(),
            "e".blue(),
            " enrolls you and ".into(),
            "m".blue(),
            " marks the selected item complete.".into(),
        ]
        .into(),
        vec![
            "Links have ".into(),
            "blue".blue(),
            " text and a number after them. Hit ".into(),
            "f".blue(),
            " then type the number to open them.".into(),
        ]
        .into(),
        vec![
            "Go back with ".into(),
            "q".blue(),
            " or ".into(),
            "Esc".blue(),
            ", and use ".into(),
            "L".blue(),
            " to log in or out.".into(),
        ]
        .into(),
        vec!["Use ".into(), "Ctrl-C".blue(), " to quit.".into()].into(),
    ])
    .wrap(Wrap { trim: false })
}
