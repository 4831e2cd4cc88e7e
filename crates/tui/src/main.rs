use std::{fs::File, time::Instant};

use acadme_client::{Client, SessionStore};
use anyhow::{Context, Result};
use log::{debug, info};
use ratatui::Frame;
use simplelog::WriteLogger;
use xdg::BaseDirectories;

mod config;
mod event;
mod login_prompt;
mod main_screen;
mod store;
mod styles;
mod tui;
mod widgets;

use config::{Config, XDG_PREFIX};
use event::{Event, EventBus};
use login_prompt::LoginPrompt;
use main_screen::MainScreen;
use store::Store;
use tui::Tui;

fn main() -> Result<()> {
    let dirs = BaseDirectories::with_prefix(XDG_PREFIX).context("error finding xdg directories")?;
    let config = Config::load(&dirs)?;

    let log_path = dirs
        .place_cache_file("acadme-tui.log")
        .context("error creating cache directory")?;
    WriteLogger::init(
        config.log_level(),
        simplelog::Config::default(),
        File::create(&log_path).context("error creating log file")?,
    )
    .context("error initialising logger")?;
    info!("using api at {}", config.base_url);

    let session = SessionStore::open(
        dirs.place_cache_file("session.json")
            .context("error creating cache directory")?,
    );
    let client = Client::new(&config.base_url).context("error creating http client")?;

    // the store must be dropped before the bus, so the worker can exit before we join it
    let bus = EventBus::new();
    let mut store = Store::new(&bus, client, session, config.debounce());

    let mut screen: Box<dyn Screen> = if store.session().is_some() {
        Box::new(MainScreen::new(&mut store))
    } else {
        Box::<LoginPrompt>::default()
    };

    let mut tui = Tui::enter()?;
    bus.spawn_terminal_listener();

    loop {
        tui.draw(|f| screen.draw(&store, f))?;

        let event = bus.next()?;
        match dispatch(&mut store, screen.as_mut(), event, Instant::now())? {
            ExitState::Running => (),
            ExitState::Quit => break,
            ExitState::ChangeScreen(s) => {
                debug!("changing screen");
                screen = s;
            }
        }
    }

    Ok(())
}

/// Handle one event from the bus
fn dispatch(
    store: &mut Store,
    screen: &mut dyn Screen,
    event: Event,
    now: Instant,
) -> Result<ExitState> {
    // a busy mouse means no ticks, so check for settled searches on every event
    store.tick(now);
    screen.handle_event(store, event)
}

/// A full-screen view of the application
pub trait Screen {
    fn draw(&mut self, store: &Store, frame: &mut Frame);
    fn handle_event(&mut self, store: &mut Store, event: Event) -> Result<ExitState>;
}

/// What to do after handling an event
pub enum ExitState {
    Running,
    Quit,
    ChangeScreen(Box<dyn Screen>),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind};

    use super::*;

    #[test]
    fn mouse_movement_still_sends_searches() {
        let dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new();
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let mut store = Store::new(
            &bus,
            client,
            SessionStore::open(dir.path().join("session.json")),
            Duration::from_millis(300),
        );
        let mut screen = LoginPrompt::default();

        let moved = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        let later = Instant::now() + Duration::from_secs(1);
        let state = dispatch(&mut store, &mut screen, moved, later).unwrap();

        assert!(matches!(state, ExitState::Running));
        assert!(!store.search().is_pending());
        assert!(store.search().is_loading());
    }
}
