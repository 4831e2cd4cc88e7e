use std::collections::BTreeMap;

use crossterm::event::KeyCode;
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::{
    event::Event,
    main_screen::{
        panes::{Document, Pane},
        Action,
    },
    store::Store,
    styles::{dim, error_text, heading, selected},
    widgets::StatefulList,
};

/// Shows the logged in user's details, their courses, and how much they've completed each day
#[derive(Debug, Default)]
pub struct ProfileViewer {
    courses: StatefulList,
}

/// Bars for the completion chart, oldest first, labelled by month and day
fn chart_bars(by_date: &BTreeMap<String, u64>) -> Vec<(String, u64)> {
    by_date
        .iter()
        .map(|(date, count)| {
            let label = date.get(5..).unwrap_or(date).to_string();
            (label, *count)
        })
        .collect()
}

impl Pane for ProfileViewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        let Some(view) = store.profile() else {
            frame.render_widget(Paragraph::new("Log in to see your profile."), area);
            return;
        };
        let Some(profile) = &view.profile else {
            let p = match &view.error {
                Some(e) => Paragraph::new(error_text(format!("Error loading profile: {e}"))),
                None => Paragraph::new(Line::styled("Loading...", dim())),
            };
            frame.render_widget(p, area);
            return;
        };

        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(3),
                Constraint::Percentage(40),
                Constraint::Min(6),
            ],
        )
        .split(area);

        frame.render_widget(
            Paragraph::new(vec![
                Line::styled(
                    format!("{} {}", profile.first_name, profile.last_name),
                    heading(),
                ),
                Line::styled(format!("@{}", profile.username), dim()),
            ]),
            layout[0],
        );

        let items: Vec<_> = profile
            .enrolled_courses
            .iter()
            .map(|e| ListItem::new(e.course.name.clone()))
            .collect();
        let courses_block = Block::default()
            .borders(Borders::TOP)
            .title(format!(" Enrolled courses ({}) ", items.len()));
        self.courses.render_to(
            frame,
            layout[1],
            List::new(items)
                .block(courses_block)
                .highlight_style(selected()),
        );

        let chart_block = Block::default()
            .borders(Borders::TOP)
            .title(" Content completed ");
        let bars = chart_bars(&profile.content_completion_by_date);
        if bars.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Nothing completed yet", dim())).block(chart_block),
                layout[2],
            );
            return;
        }

        let data: Vec<(&str, u64)> = bars.iter().map(|(l, c)| (l.as_str(), *c)).collect();
        frame.render_widget(
            BarChart::default()
                .block(chart_block)
                .data(data.as_slice())
                .bar_width(5)
                .bar_gap(1)
                .bar_style(Style::new().fg(Color::Blue))
                .value_style(Style::new().fg(Color::Black).bg(Color::Blue)),
            layout[2],
        );
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.courses.next(),
            KeyCode::Up | KeyCode::Char('k') => self.courses.previous(),
            KeyCode::Char('r') => return store.open_profile(),
            KeyCode::Enter => {
                let Some(course_id) = self.courses.selected().and_then(|i| {
                    let profile = store.profile()?.profile.as_ref()?;
                    profile.enrolled_courses.get(i).map(|e| e.course.id.clone())
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
