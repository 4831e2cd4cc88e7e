use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use super::{Action, Document, Pane};
use crate::{
    event::Event,
    store::{PageStatus, Store},
    styles::{dim, error_text, key, selected},
    widgets::StatefulList,
};

/// Fixed entries above the categories
const FIXED: usize = 3;

/// The navigation pane, which lists the welcome page, search, the user's profile, then every category
#[derive(Debug, Default)]
pub struct Navigation {
    list: StatefulList,
}

enum Entry {
    Welcome,
    Search,
    Profile,
    Category(String),
}

impl Navigation {
    fn entry(&self, store: &Store) -> Option<Entry> {
        Some(match self.list.selected()? {
            0 => Entry::Welcome,
            1 => Entry::Search,
            2 => Entry::Profile,
            i => Entry::Category(
                store
                    .categories()
                    .entries()
                    .get(i - FIXED)?
                    .category
                    .id
                    .clone(),
            ),
        })
    }
}

impl Pane for Navigation {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let layout = Layout::new(
            Direction::Vertical,
            [Constraint::Min(1), Constraint::Length(1)],
        )
        .split(area);

        let mut items = vec![
            ListItem::new("Welcome"),
            ListItem::new("Search courses"),
            ListItem::new(match store.session() {
                Some(s) => format!("Profile ({})", s.username),
                None => "Profile".to_string(),
            }),
        ];

        let categories = store.categories();
        if categories.is_loading() {
            items.push(ListItem::new(Line::styled("Loading categories...", dim())));
        } else if categories.entries().is_empty() {
            items.push(ListItem::new(error_text("No categories. r to retry")));
        }
        for entry in categories.entries() {
            let mut line = Line::raw(entry.category.name.clone());
            match &entry.status {
                PageStatus::Loading { .. } => line.spans.push(Span::styled(" ...", dim())),
                PageStatus::Failed { .. } => line.spans.push(" !".red()),
                _ => (),
            }
            items.push(ListItem::new(line));
        }

        if self.list.selected().is_none() {
            self.list.select(Some(0));
        }
        self.list.render_to(
            frame,
            layout[0],
            List::new(items)
                .highlight_style(selected())
                .highlight_symbol(">> "),
        );

        let hint = match store.session() {
            Some(_) => vec![key("L"), " to log out".into()],
            None => vec![key("L"), " to log in".into()],
        };
        frame.render_widget(Paragraph::new(Line::from(hint)), layout[1]);
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Action::Exit,
            KeyCode::Down | KeyCode::Char('j') => self.list.next(),
            KeyCode::Up | KeyCode::Char('k') => self.list.previous(),
            KeyCode::Char('L') => return Action::Login,
            KeyCode::Char('r') => store.request_categories(),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                return match self.entry(store) {
                    Some(Entry::Welcome) => Action::Show(Document::Welcome),
                    Some(Entry::Search) => Action::Show(Document::Search),
                    Some(Entry::Profile) => match store.open_profile() {
                        Action::None => Action::Show(Document::Profile),
                        a => a,
                    },
                    Some(Entry::Category(id)) => {
                        store.select_category(&id);
                        Action::Show(Document::Category(id))
                    }
                    None => Action::None,
                };
            }
            _ => (),
        };

        Action::None
    }
}
