use ratatui::{prelude::*, widgets::*};

/// Selection state for a list whose items are only known at render time
#[derive(Debug, Default)]
pub struct StatefulList {
    state: ListState,
    last_item_count: usize,
}

impl StatefulList {
    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn select(&mut self, i: Option<usize>) {
        self.state.select(i);
    }

    pub fn next(&mut self) {
        if self.last_item_count == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i >= self.last_item_count - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.last_item_count == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(0) => self.last_item_count - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Update the item count without drawing, so the selection can be kept in range
    pub fn set_item_count(&mut self, count: usize) {
        self.last_item_count = count;
        match self.state.selected() {
            Some(_) if count == 0 => self.state.select(None),
            Some(i) if i >= count => self.state.select(Some(count - 1)),
            _ => (),
        }
    }

    pub fn render_to(&mut self, frame: &mut Frame, target: Rect, list: List) {
        self.set_item_count(list.len());
        frame.render_stateful_widget(list, target, &mut self.state);
    }
}
