use std::time::Instant;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action,
    },
    store::Store,
    styles::{dim, key, selected},
    widgets::{StatefulList, TextInput},
};

const NAME: usize = 0;
const TUTOR: usize = 1;
const CATEGORY: usize = 2;
const DATES: usize = 3;
const START: usize = 4;
const END: usize = 5;
const RESULTS: usize = 6;
const FOCUS_COUNT: usize = 7;

/// The search form, with results underneath.
/// Edits go straight to the store's search engine, which decides when to actually search.
pub struct SearchViewer {
    focus: usize,
    name: TextInput,
    start: TextInput,
    end: TextInput,

    /// Index into the store's tutors, or `None` for any
    tutor: Option<usize>,
    /// Index into the store's categories, or `None` for any
    category: Option<usize>,

    results: StatefulList,
}

impl Default for SearchViewer {
    fn default() -> Self {
        Self {
            focus: NAME,
            name: TextInput::new("Course"),
            start: TextInput::new("From"),
            end: TextInput::new("To"),
            tutor: None,
            category: None,
            results: StatefulList::default(),
        }
    }
}

/// Step through `None, Some(0), ..., Some(len - 1)`, wrapping around
fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }

    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) if i + 1 >= len => None,
        (Some(i), true) => Some(i + 1),
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    }
}

/// Parse a date as typed. Anything incomplete or invalid means no date.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

impl SearchViewer {
    fn choice_line(&self, label: &str, value: String, focus: usize) -> Line<'static> {
        let focused = self.focus == focus;
        let label_style = if focused {
            Style::new().add_modifier(Modifier::BOLD)
        } else {
            Style::new()
        };
        let mut spans = vec![
            Span::styled(format!("{:>12}: ", label), label_style),
            Span::raw(value),
        ];
        if focused {
            spans.push(Span::styled("  (←/→ to change)", dim()));
        }

        Line::from(spans)
    }

    fn form(&self, store: &Store) -> Vec<Line<'static>> {
        let search = store.search();
        let tutor = self
            .tutor
            .and_then(|i| store.tutors().get(i))
            .map(|t| t.display_name())
            .unwrap_or_else(|| "Any".to_string());
        let category = self
            .category
            .and_then(|i| store.categories().entries().get(i))
            .map(|e| e.category.name.clone())
            .unwrap_or_else(|| "Any".to_string());
        let dates = if search.dates_enabled() {
            "On"
        } else {
            "Off"
        };

        let mut lines = vec![
            self.name.to_line(self.focus == NAME),
            self.choice_line("Tutor", tutor, TUTOR),
            self.choice_line("Category", category, CATEGORY),
            self.choice_line("Date range", dates.to_string(), DATES),
        ];
        if search.dates_enabled() {
            lines.push(self.start.to_line(self.focus == START));
            lines.push(self.end.to_line(self.focus == END));
        }

        lines
    }

    fn next_focus(&self, store: &Store, forward: bool) -> usize {
        let mut f = self.focus;
        loop {
            f = if forward {
                (f + 1) % FOCUS_COUNT
            } else {
                (f + FOCUS_COUNT - 1) % FOCUS_COUNT
            };

            if !matches!(f, START | END) || store.search().dates_enabled() {
                return f;
            }
        }
    }

    fn edit(&mut self, store: &mut Store, key: KeyEvent) -> Action {
        let now = Instant::now();
        match self.focus {
            NAME => {
                if self.name.handle_key(key) {
                    store
                        .search_mut()
                        .set_course(self.name.value().to_string(), now);
                }
            }
            TUTOR | CATEGORY => {
                let forward = match key.code {
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => true,
                    KeyCode::Left | KeyCode::Char('h') => false,
                    _ => return Action::None,
                };

                if self.focus == TUTOR {
                    self.tutor = cycle(self.tutor, store.tutors().len(), forward);
                    let id = self.tutor.and_then(|i| store.tutors().get(i)).map(|t| t.id.clone());
                    store.search_mut().set_tutor(id, now);
                } else {
                    self.category =
                        cycle(self.category, store.categories().entries().len(), forward);
                    let name = self
                        .category
                        .and_then(|i| store.categories().entries().get(i))
                        .map(|e| e.category.name.clone());
                    store.search_mut().set_category(name, now);
                }
            }
            DATES => {
                if let KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right = key.code {
                    self.start.clear();
                    self.end.clear();
                    store.search_mut().toggle_dates(now);
                }
            }
            START => {
                if self.start.handle_key(key) {
                    let date = parse_date(self.start.value());
                    store.search_mut().set_start_date(date, now);
                }
            }
            END => {
                if self.end.handle_key(key) {
                    let date = parse_date(self.end.value());
                    store.search_mut().set_end_date(date, now);
                }
            }
            _ => return self.results_key(store, key),
        }

        Action::None
    }

    fn results_key(&mut self, store: &mut Store, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.results.next(),
            KeyCode::Up | KeyCode::Char('k') => self.results.previous(),
            KeyCode::Char('q') => return Action::FocusNavigation,
            KeyCode::Char('L') => return Action::Login,
            KeyCode::Enter => {
                let Some(course_id) = self
                    .results
                    .selected()
                    .and_then(|i| store.search().results().get(i))
                    .map(|c| c.id.clone())
                else {
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

impl Pane for SearchViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let form = self.form(store);
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(form.len() as u16 + 1),
                Constraint::Min(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        frame.render_widget(Paragraph::new(form), layout[0]);

        let search = store.search();
        let title = if search.is_loading() || search.is_pending() {
            " Results (searching...) ".to_string()
        } else {
            format!(" Results ({}) ", search.results().len())
        };
        let block = Block::default().borders(Borders::TOP).title(title);
        let items: Vec<_> = search
            .results()
            .iter()
            .map(|c| {
                let mut line = Line::raw(c.name.clone());
                if !c.category_name.is_empty() {
                    line.spans
                        .push(Span::styled(format!("  {}", c.category_name), dim()));
                }
                ListItem::new(line)
            })
            .collect();

        let highlight = if self.focus == RESULTS {
            selected()
        } else {
            Style::new()
        };
        if self.focus == RESULTS && self.results.selected().is_none() && !items.is_empty() {
            self.results.select(Some(0));
        }
        self.results.render_to(
            frame,
            layout[1],
            List::new(items).block(block).highlight_style(highlight),
        );

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                key("Tab"),
                Span::raw(" next field, "),
                key("Enter"),
                Span::raw(" open course, "),
                key("Esc"),
                Span::raw(" back"),
            ])),
            layout[2],
        );
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc => return Action::FocusNavigation,
            KeyCode::Tab => self.focus = self.next_focus(store, true),
            KeyCode::BackTab => self.focus = self.next_focus(store, false),
            KeyCode::Down if self.focus != RESULTS => self.focus = self.next_focus(store, true),
            KeyCode::Up if self.focus != RESULTS && self.focus != NAME => {
                self.focus = self.next_focus(store, false)
            }
            KeyCode::Enter if self.focus != RESULTS => self.focus = RESULTS,
            _ => return self.edit(store, key),
        }

        Action::None
    }
}
