use acadme_client::{Password, Role, SignupForm};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    style::Stylize,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::{
    event::Event,
    main_screen::MainScreen,
    store::Store,
    styles::{dim, error_text, heading, key},
    widgets::TextInput,
    ExitState, Screen,
};

const USERNAME: usize = 0;
const FIRST_NAME: usize = 1;
const LAST_NAME: usize = 2;
const PASSWORD: usize = 3;
const PASSWORD_CONFIRM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Login,
    Signup,
}

impl Mode {
    /// Which fields are shown, in order
    fn fields(&self) -> &'static [usize] {
        match self {
            Mode::Login => &[USERNAME, PASSWORD],
            Mode::Signup => &[USERNAME, FIRST_NAME, LAST_NAME, PASSWORD, PASSWORD_CONFIRM],
        }
    }
}

/// Asks the user to log in or sign up, or carry on without an account
pub struct LoginPrompt {
    mode: Mode,
    role: Role,
    fields: [TextInput; 5],
    /// Index into `mode.fields()`
    focus: usize,
    msg: Option<Text<'static>>,
}

impl Default for LoginPrompt {
    fn default() -> Self {
        Self {
            mode: Mode::Login,
            role: Role::Learner,
            fields: [
                TextInput::new("Username"),
                TextInput::new("First name"),
                TextInput::new("Last name"),
                TextInput::masked("Password"),
                TextInput::masked("Confirm"),
            ],
            focus: 0,
            msg: None,
        }
    }
}

impl LoginPrompt {
    pub fn new_with_msg(msg: impl Into<Text<'static>>) -> Self {
        Self {
            msg: Some(msg.into()),
            ..Default::default()
        }
    }

    fn focused_field(&self) -> usize {
        self.mode.fields()[self.focus]
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Login => Mode::Signup,
            Mode::Signup => Mode::Login,
        };
        self.focus = 0;
        self.msg = None;
        self.fields[PASSWORD].clear();
        self.fields[PASSWORD_CONFIRM].clear();
    }

    /// Problems with the signup form we can point out as the user types
    fn live_validation(&self) -> Option<&'static str> {
        if self.mode != Mode::Signup {
            return None;
        }

        let confirm = self.fields[PASSWORD_CONFIRM].value();
        if !confirm.is_empty() && confirm != self.fields[PASSWORD].value() {
            Some("Passwords do not match")
        } else {
            None
        }
    }

    fn submit(&mut self, store: &mut Store) -> Result<ExitState> {
        match self.mode {
            Mode::Login => self.login(store),
            Mode::Signup => {
                self.signup(store);
                Ok(ExitState::Running)
            }
        }
    }

    fn login(&mut self, store: &mut Store) -> Result<ExitState> {
        let username = self.fields[USERNAME].value().trim().to_string();
        if username.is_empty() {
            self.msg = Some(error_text("Enter your username"));
            return Ok(ExitState::Running);
        }

        // the password field is emptied whatever happens
        let password = Password::from(self.fields[PASSWORD].take());
        match store.login(&username, &password) {
            Ok(()) => Ok(ExitState::ChangeScreen(Box::new(MainScreen::new(store)))),
            Err(e) => {
                error!("error logging in: {}", e);
                self.msg = Some(error_text(e.to_string()));
                self.focus = self
                    .mode
                    .fields()
                    .iter()
                    .position(|f| *f == PASSWORD)
                    .unwrap_or(0);
                Ok(ExitState::Running)
            }
        }
    }

    fn signup(&mut self, store: &Store) {
        let form = SignupForm {
            username: self.fields[USERNAME].value().trim().to_string(),
            first_name: self.fields[FIRST_NAME].value().trim().to_string(),
            last_name: self.fields[LAST_NAME].value().trim().to_string(),
            password: Password::from(self.fields[PASSWORD].value()),
            password_confirm: Password::from(self.fields[PASSWORD_CONFIRM].value()),
        };

        match store.signup(self.role, &form) {
            Ok(()) => {
                debug!("created account for {}", form.username);
                self.toggle_mode();
                self.fields[FIRST_NAME].clear();
                self.fields[LAST_NAME].clear();
                self.focus = 1;
                self.msg = Some("Account created, please log in".green().into());
            }
            Err(e) => {
                error!("error signing up: {}", e);
                self.msg = Some(error_text(e.to_string()));
            }
        }
    }

    fn handle_key(&mut self, store: &mut Store, key: KeyEvent) -> Result<ExitState> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') if ctrl => return Ok(ExitState::Quit),
            KeyCode::Char('s') | KeyCode::Char('S') if ctrl => self.toggle_mode(),
            KeyCode::Char('r') | KeyCode::Char('R') if ctrl && self.mode == Mode::Signup => {
                self.role = match self.role {
                    Role::Learner => Role::Tutor,
                    _ => Role::Learner,
                };
            }
            KeyCode::Esc => {
                debug!("continuing as guest");
                return Ok(ExitState::ChangeScreen(Box::new(MainScreen::new(store))));
            }
            KeyCode::Enter => return self.submit(store),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.mode.fields().len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                let n = self.mode.fields().len();
                self.focus = (self.focus + n - 1) % n;
            }
            _ => {
                let field = self.focused_field();
                self.fields[field].handle_key(key);
            }
        };

        Ok(ExitState::Running)
    }
}

impl Screen for LoginPrompt {
    fn draw(&mut self, _: &Store, frame: &mut Frame) {
        let size = frame.size();
        let width = 60.min(size.width);
        let height = 16.min(size.height);
        let area = Rect {
            x: size.x + (size.width - width) / 2,
            y: size.y + (size.height - height) / 2,
            width,
            height,
        };

        let title = match self.mode {
            Mode::Login => " Log in to AcadMe ",
            Mode::Signup => " Create an AcadMe account ",
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::new(
            Direction::Vertical,
            [Constraint::Min(1), Constraint::Length(3)],
        )
        .split(inner);

        let mut lines: Vec<Line> = vec![];
        for (i, &field) in self.mode.fields().iter().enumerate() {
            lines.push(self.fields[field].to_line(i == self.focus));
        }
        if self.mode == Mode::Signup {
            let role = match self.role {
                Role::Tutor => "Tutor",
                _ => "Learner",
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{:>12}: ", "Role")),
                Span::styled(role, heading()),
                Span::styled("  (", dim()),
                key("Ctrl-R"),
                Span::styled(" to change)", dim()),
            ]));
        }
        lines.push(Line::raw(""));

        if let Some(problem) = self.live_validation() {
            lines.extend(error_text(problem).lines);
        } else if let Some(msg) = &self.msg {
            lines.extend(msg.lines.iter().cloned());
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[0]);

        let toggle_hint = match self.mode {
            Mode::Login => " to sign up instead, ",
            Mode::Signup => " to log in instead, ",
        };
        let help = Paragraph::new(vec![
            Line::from(vec![
                key("Tab"),
                " to switch fields, ".into(),
                key("Enter"),
                " to submit".into(),
            ]),
            Line::from(vec![
                key("Ctrl-S"),
                toggle_hint.into(),
                key("Esc"),
                " to browse as a guest".into(),
            ]),
        ])
        .wrap(Wrap { trim: false });
        frame.render_widget(help, layout[1]);
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Result<ExitState> {
        match event {
            // results may still be arriving for the main screen
            Event::Store(e) => {
                store.event(e);
                Ok(ExitState::Running)
            }
            Event::Key(key) => self.handle_key(store, key),
            _ => Ok(ExitState::Running),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use acadme_client::{Client, SessionStore};

    use super::*;
    use crate::event::EventBus;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(prompt: &mut LoginPrompt, store: &mut Store, s: &str) {
        for c in s.chars() {
            prompt.handle_key(store, press(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn failed_login_clears_password() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        // nothing listens on the discard port, so the login fails
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let mut store = Store::new(
            &bus,
            client,
            SessionStore::open(dir.path().join("session.json")),
            Duration::from_millis(300),
        );

        let mut prompt = LoginPrompt::default();
        type_str(&mut prompt, &mut store, "aargeee");
        prompt.handle_key(&mut store, press(KeyCode::Tab)).unwrap();
        type_str(&mut prompt, &mut store, "hunter2");
        assert_eq!(prompt.fields[PASSWORD].value(), "hunter2");

        let state = prompt.handle_key(&mut store, press(KeyCode::Enter)).unwrap();
        assert!(matches!(state, ExitState::Running));
        assert_eq!(prompt.fields[PASSWORD].value(), "");
        assert_eq!(prompt.fields[USERNAME].value(), "aargeee");
        assert!(prompt.msg.is_some());
        assert!(store.session().is_none());
    }

    #[test]
    fn signup_shows_mismatched_passwords() {
        let mut prompt = LoginPrompt::default();
        prompt.toggle_mode();
        assert_eq!(prompt.mode, Mode::Signup);
        assert_eq!(prompt.live_validation(), None);

        prompt.fields[PASSWORD].set("hunter2");
        prompt.fields[PASSWORD_CONFIRM].set("hunter");
        assert_eq!(prompt.live_validation(), Some("Passwords do not match"));

        prompt.fields[PASSWORD_CONFIRM].set("hunter2");
        assert_eq!(prompt.live_validation(), None);
    }

    #[test]
    fn switching_modes_clears_passwords() {
        let mut prompt = LoginPrompt::default();
        prompt.fields[USERNAME].set("aargeee");
        prompt.fields[PASSWORD].set("hunter2");
        prompt.focus = 1;

        prompt.toggle_mode();
        assert_eq!(prompt.focus, 0);
        assert_eq!(prompt.fields[USERNAME].value(), "aargeee");
        assert_eq!(prompt.fields[PASSWORD].value(), "");
        assert_eq!(prompt.focused_field(), USERNAME);
    }
}
