use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action,
    },
    store::{PageStatus, Store},
    styles::{dim, error_text, heading, key, selected},
    widgets::StatefulList,
};

/// Lists the courses in one category, loading more pages on request
#[derive(Debug)]
pub struct CategoryViewer {
    category_id: String,
    list: StatefulList,
}

impl CategoryViewer {
    pub fn new(category_id: String) -> Self {
        Self {
            category_id,
            list: StatefulList::default(),
        }
    }
}

impl Pane for CategoryViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let Some(entry) = store.categories().get(&self.category_id) else {
            frame.render_widget(Paragraph::new(error_text("Unknown category")), area);
            return;
        };

        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(Line::styled(entry.category.name.clone(), heading())),
            layout[0],
        );

        let items: Vec<_> = entry
            .courses
            .iter()
            .map(|c| {
                let mut line = Line::raw(c.name.clone());
                if !c.description.is_empty() {
                    line.spans
                        .push(Span::styled(format!("  {}", c.description), dim()));
                }
                ListItem::new(line)
            })
            .collect();
        if !items.is_empty() && self.list.selected().is_none() {
            self.list.select(Some(0));
        }
        self.list.render_to(
            frame,
            layout[1],
            List::new(items).highlight_style(selected()),
        );

        let status = match &entry.status {
            PageStatus::Idle => Line::raw(""),
            PageStatus::Loading { .. } => Line::styled("Loading...", dim()),
            PageStatus::Failed { error, .. } => Line::from(vec![
                Span::styled(
                    format!("Error loading courses: {error}. "),
                    Style::new().fg(Color::Red),
                ),
                key("r"),
                " to retry".into(),
            ]),
            PageStatus::Loaded { pages } if entry.has_more() => Line::from(vec![
                format!("Page {} of {}, ", pages, entry.total_pages).into(),
                key("n"),
                " for more".into(),
            ]),
            PageStatus::Loaded { .. } if entry.courses.is_empty() => {
                Line::styled("No courses here yet", dim())
            }
            PageStatus::Loaded { .. } => {
                Line::styled(format!("{} courses", entry.courses.len()), dim())
            }
        };
        frame.render_widget(Paragraph::new(status), layout[2]);
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.list.next(),
            KeyCode::Up | KeyCode::Char('k') => self.list.previous(),
            KeyCode::Char('n') | KeyCode::Char('r') => store.load_more(&self.category_id),
            KeyCode::Enter => {
                let Some(course_id) = self.list.selected().and_then(|i| {
                    store
                        .categories()
                        .get(&self.category_id)?
                        .courses
                        .get(i)
                        .map(|c| c.id.clone())
                }) else {
                    return Action::None;
                };

                store.open_course(&course_id);
                return Action::Show(Document::Course(course_id));
            }
            _ => (),
        }

        Action::None
    }
}
