use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
};

/// A single line text field
#[derive(Default)]
pub struct TextInput {
    label: &'static str,
    value: String,
    masked: bool,
}

impl TextInput {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    /// A field whose contents are never shown
    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            masked: true,
            ..Default::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Apply a key press. Returns true if the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.value.is_empty();
                self.value.clear();
                changed
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn to_line(&self, focused: bool) -> Line<'static> {
        let shown = if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        };

        let label = Span::styled(
            format!("{:>12}: ", self.label),
            if focused {
                Style::new().add_modifier(Modifier::BOLD)
            } else {
                Style::new()
            },
        );
        let mut spans = vec![label, Span::raw(shown)];
        if focused {
            spans.push("_".slow_blink());
        }

        Line::from(spans)
    }
}

impl std::fmt::Debug for TextInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("TextInput");
        d.field("label", &self.label);
        if !self.masked {
            d.field("value", &self.value);
        }
        d.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_deleting() {
        let mut input = TextInput::new("Username");
        assert!(input.handle_key(press(KeyCode::Char('a'))));
        assert!(input.handle_key(press(KeyCode::Char('b'))));
        assert!(input.handle_key(press(KeyCode::Backspace)));
        assert_eq!(input.value(), "a");

        assert!(input.handle_key(press(KeyCode::Backspace)));
        assert!(!input.handle_key(press(KeyCode::Backspace)));
        assert!(!input.handle_key(press(KeyCode::Tab)));
    }

    #[test]
    fn control_keys_are_not_typed() {
        let mut input = TextInput::new("Username");
        input.set("abc");
        assert!(!input.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)));
        assert!(input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn masked_fields_hide_their_value() {
        let mut input = TextInput::masked("Password");
        input.set("hunter2");

        let line = input.to_line(false);
        assert_eq!(line.spans[1].content, "*******");
        assert!(!format!("{:?}", input).contains("hunter2"));
    }
}
