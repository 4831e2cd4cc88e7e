use crossterm::event::KeyCode;
use ratatui::{prelude::Rect, Frame};

use crate::{event::Event, store::Store};

use super::{Action, Pane};

mod category;
mod content;
mod course;
mod profile;
mod search;
mod welcome;

use category::CategoryViewer;
use content::ContentViewer;
use course::CourseViewer;
use profile::ProfileViewer;
use search::SearchViewer;
use welcome::WelcomeViewer;

/// Something we want to show in the viewer
#[derive(Debug, Default)]
pub enum Document {
    /// The welcome message
    #[default]
    Welcome,

    /// The courses in a category, by category ID
    Category(String),

    /// The search form and its results
    Search,

    /// A course's details and contents, by course ID
    Course(String),

    /// A content item, by ID. It should already be opened in the store.
    Content(String),

    /// The logged in user's profile
    Profile,
}

/// Shows [`Document`]s to the user.
/// Most of the view logic is in submodules, to keep things clean.
pub enum Viewer {
    Welcome(WelcomeViewer),
    Category(CategoryViewer),
    Search(SearchViewer),
    Course(CourseViewer),
    Content(ContentViewer),
    Profile(ProfileViewer),
}

impl Default for Viewer {
    fn default() -> Self {
        Self::Welcome(Default::default())
    }
}

impl Viewer {
    /// Set the content that we will show from next draw.
    pub fn show(&mut self, d: Document) {
        *self = match d {
            Document::Welcome => Self::Welcome(Default::default()),
            Document::Category(id) => Self::Category(CategoryViewer::new(id)),
            Document::Search => Self::Search(Default::default()),
            Document::Course(id) => Self::Course(CourseViewer::new(id)),
            Document::Content(id) => Self::Content(ContentViewer::new(id)),
            Document::Profile => Self::Profile(Default::default()),
        };
    }
}

impl Pane for Viewer {
    fn draw(&mut self, store: &Store, frame: &mut Frame, area: Rect) {
        match self {
            Viewer::Welcome(viewer) => viewer.draw(store, frame, area),
            Viewer::Category(viewer) => viewer.draw(store, frame, area),
            Viewer::Search(viewer) => viewer.draw(store, frame, area),
            Viewer::Course(viewer) => viewer.draw(store, frame, area),
            Viewer::Content(viewer) => viewer.draw(store, frame, area),
            Viewer::Profile(viewer) => viewer.draw(store, frame, area),
        }
    }

    fn handle_event(&mut self, store: &mut Store, event: Event) -> Action {
        let Event::Key(key) = event else {
            return Action::None;
        };

        // the search form takes typed characters, and content goes back to its course
        match (&*self, key.code) {
            (Viewer::Search(_) | Viewer::Content(_), _) => (),
            (_, KeyCode::Char('q') | KeyCode::Esc) => return Action::FocusNavigation,
            (_, KeyCode::Char('L')) => return Action::Login,
            _ => (),
        };

        match self {
            Viewer::Welcome(viewer) => viewer.handle_event(store, event),
            Viewer::Category(viewer) => viewer.handle_event(store, event),
            Viewer::Search(viewer) => viewer.handle_event(store, event),
            Viewer::Course(viewer) => viewer.handle_event(store, event),
            Viewer::Content(viewer) => viewer.handle_event(store, event),
            Viewer::Profile(viewer) => viewer.handle_event(store, event),
        }
    }
}
