use acadme_client::content::CourseDetail;
use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action,
    },
    store::{CourseView, Store},
    styles::{dim, heading, key, selected},
    widgets::StatefulList,
};

/// Shows a course's details, and its chapters with their content
#[derive(Debug)]
pub struct CourseViewer {
    course_id: String,
    list: StatefulList,
}

/// A line in the chapter list
enum Row<'a> {
    Chapter(&'a str),
    Item { id: &'a str, name: &'a str },
}

/// Chapters and their content, in position order
fn rows(detail: &CourseDetail) -> Vec<Row<'_>> {
    let mut rows = vec![];
    for (chapter, items) in detail.ordered() {
        rows.push(Row::Chapter(&chapter.name));
        rows.extend(items.into_iter().map(|c| Row::Item {
            id: &c.id,
            name: &c.name,
        }));
    }

    rows
}

impl CourseViewer {
    pub fn new(course_id: String) -> Self {
        Self {
            course_id,
            list: StatefulList::default(),
        }
    }

    fn view<'a>(&self, store: &'a Store) -> Option<&'a CourseView> {
        store.course().filter(|c| c.course_id() == self.course_id)
    }

    /// The ID of the selected content item, if a content item is selected
    fn selected_content(&self, store: &Store) -> Option<String> {
        let detail = self.view(store)?.detail()?;
        match rows(detail).get(self.list.selected()?)? {
            Row::Item { id, .. } => Some(id.to_string()),
            Row::Chapter(_) => None,
        }
    }

    fn header(view: &CourseView, detail: &CourseDetail, store: &Store) -> Vec<Line<'static>> {
        let mut lines = vec![Line::styled(detail.name.clone(), heading())];
        if !detail.description.is_empty() {
            lines.push(Line::raw(detail.description.clone()));
        }

        let tutors = detail
            .tutors
            .iter()
            .map(|t| t.tutor.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        if !tutors.is_empty() {
            lines.push(Line::styled(format!("Taught by {tutors}"), dim()));
        }
        lines.push(Line::styled(
            format!("{} enrolled", detail.enrolled_count),
            dim(),
        ));

        let session = store.session();
        let status = if session.is_none() {
            Line::from(vec![
                Span::raw("Log in to enroll and track your progress ("),
                key("L"),
                Span::raw(")"),
            ])
        } else if view.is_enrolled() {
            Line::styled(
                format!("Enrolled, {} completed", view.completed_count()),
                Style::new().fg(Color::Green),
            )
        } else if view.can_enroll(session) {
            Line::from(vec![Span::raw("Not enrolled. "), key("e"), Span::raw(" to enroll")])
        } else if !view.has_progress() {
            Line::styled("Loading your progress...", dim())
        } else {
            Line::styled("Only learners can enroll", dim())
        };
        lines.push(status);

        lines
    }
}

impl Pane for CourseViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let Some(view) = self.view(store) else {
            frame.render_widget(Paragraph::new("Loading..."), area);
            return;
        };
        let Some(detail) = view.detail() else {
            let p = match view.error() {
                Some(e) => Paragraph::new(vec![
                    Line::styled(format!("Error loading course: {e}"), Style::new().fg(Color::Red)),
                    Line::from(vec![key("r"), Span::raw(" to try again")]),
                ]),
                None => Paragraph::new(Line::styled("Loading course...", dim())),
            };
            frame.render_widget(p.wrap(Wrap { trim: true }), area);
            return;
        };

        let header = Self::header(view, detail, store);
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(header.len() as u16 + 1),
                Constraint::Min(1),
            ],
        )
        .split(area);
        frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), layout[0]);

        let items: Vec<_> = rows(detail)
            .into_iter()
            .map(|r| match r {
                Row::Chapter(name) => ListItem::new(Line::styled(name.to_string(), heading())),
                Row::Item { id, name } => {
                    let mark = if view.is_completed(id) {
                        Span::styled("  ✓ ", Style::new().fg(Color::Green))
                    } else {
                        Span::raw("    ")
                    };
                    ListItem::new(Line::from(vec![mark, Span::raw(name.to_string())]))
                }
            })
            .collect();

        if items.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("This course has no content yet", dim())),
                layout[1],
            );
            return;
        }
        self.list.render_to(
            frame,
            layout[1],
            List::new(items).highlight_style(selected()),
        );
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.list.next(),
            KeyCode::Up | KeyCode::Char('k') => self.list.previous(),
            KeyCode::Char('e') => return store.enroll(),
            KeyCode::Char('r') => {
                if self.view(store).is_some_and(|v| v.detail().is_none()) {
                    store.open_course(&self.course_id);
                }
            }
            KeyCode::Char('m') => {
                if let Some(id) = self.selected_content(store) {
                    return store.mark_complete(&id);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_content(store) {
                    store.open_content(&id);
                    return Action::Show(Document::Content(id));
                }
            }
            _ => (),
        }

        Action::None
    }
}
