use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error};
use ratatui::{
    prelude::{Constraint, Direction, Layout, Rect},
    text::Text,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{event::Event, login_prompt::LoginPrompt, store::Store, ExitState, Screen};

pub mod panes;
use panes::{Document, Navigation, Pane, Viewer};

/// An action that a [`Pane`] or the [`Store`] can request to be taken
pub enum Action {
    /// Do nothing
    None,

    /// Quit the application
    Exit,

    /// Tell the viewer to show something, and focus the viewer
    Show(Document),

    /// Focus the navigation pane
    FocusNavigation,

    /// Log out if needed, then go to the login screen
    Login,

    /// The session is gone, so go back to the login screen
    Reauthenticate,

    /// Display the given string at the bottom of the screen
    Flash(Text<'static>),
}

/// The main screen of the application
/// The bulk of the UI logic is handled by the [`self::panes`], this just contains shared state.
pub struct MainScreen {
    navigation: Navigation,
    viewer: Viewer,
    viewer_focused: bool,

    flash: Text<'static>,
}

impl MainScreen {
    pub fn new(store: &mut Store) -> Self {
        store.request_categories();

        Self {
            navigation: Navigation::default(),
            viewer: Viewer::default(),
            viewer_focused: false,
            flash: Text::raw(""),
        }
    }
}

impl Screen for MainScreen {
    fn draw(&mut self, store: &Store, frame: &mut Frame) {
        let size = frame.size();
        if size.width < 4 || size.height < 4 {
            return;
        }

        // Add margin for borders
        let content_rect = Rect {
            x: size.x + 1,
            y: size.y + 1,
            width: size.width - 2,
            height: size.height - 2,
        };

        // 30/70 split the two panes
        let layout = Layout::new(
            Direction::Horizontal,
            [
                Constraint::Percentage(30),
                Constraint::Length(1),
                Constraint::Percentage(70),
            ],
        )
        .split(content_rect);

        self.navigation.draw(store, frame, layout[0]);
        self.viewer.draw(store, frame, layout[2]);

        // Draw a focus rectangle around one of them.
        let focus_rect = if !self.viewer_focused {
            Rect {
                x: size.x,
                y: size.y,
                width: layout[2].x - size.x,
                height: size.height,
            }
        } else {
            Rect {
                x: layout[1].x,
                y: size.y,
                width: size.width - layout[1].x,
                height: size.height,
            }
        };

        frame.render_widget(Block::default().borders(Borders::ALL), focus_rect);

        let bottom_bar = Paragraph::new(self.flash.clone());
        frame.render_widget(
            bottom_bar,
            Rect {
                x: layout[2].x + 1,
                y: size.height.saturating_sub(1),
                width: layout[2].width.saturating_sub(1),
                height: 1,
            },
        )
    }

    /// Handle the given event
    fn handle_event(&mut self, store: &mut Store, event: Event) -> Result<ExitState> {
        // C-C always exits
        if matches!(
            event,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c') | KeyCode::Char('C'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        ) {
            return Ok(ExitState::Quit);
        }

        // Only key presses clear the flash, so results arriving don't hide it
        if let Event::Key(_) = event {
            self.flash = Text::raw("");
        }

        // Dispatch to pane or store
        let action = match event {
            Event::Store(s) => store.event(s),
            Event::Tick => Action::None,
            x => match self.viewer_focused {
                true => self.viewer.handle_event(store, x),
                false => self.navigation.handle_event(store, x),
            },
        };

        // Perform action if needed
        match action {
            Action::None => (),
            Action::Exit => {
                return Ok(ExitState::Quit);
            }
            Action::Show(doc) => {
                self.viewer.show(doc);
                self.viewer_focused = true;
            }
            Action::FocusNavigation => self.viewer_focused = false,
            Action::Login => {
                if store.session().is_some() {
                    debug!("logging out");
                    if let Err(e) = store.logout() {
                        error!("error logging out: {}", e);
                    }
                }
                return Ok(ExitState::ChangeScreen(Box::<LoginPrompt>::default()));
            }
            Action::Reauthenticate => {
                return Ok(ExitState::ChangeScreen(Box::new(LoginPrompt::new_with_msg(
                    "Your session has expired, please log in again.",
                ))));
            }
            Action::Flash(s) => {
                self.flash = s;
            }
        };

        Ok(ExitState::Running)
    }
}
