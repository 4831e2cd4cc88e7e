use std::{
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use acadme_client::{
    categories::Category,
    content::{ContentDetail, CourseDetail, CourseProgress},
    course::{CoursePage, SearchFilter},
    users::{Profile, Tutor},
    Bearer, Client, Error, Password, Role, Session, SessionStore, SignupForm,
};
use log::{debug, error, warn};

mod categories;
mod course;
mod search;
mod worker;

pub use categories::{CategoryEntry, CategoryLoader, PageStatus};
pub use course::{ContentState, ContentView, CourseView, Gate, ProfileView};
pub use search::SearchEngine;
use worker::Worker;

use crate::{event::EventBus, main_screen::Action, styles::error_text};

/// Requests sent to the worker thread
#[derive(Debug)]
pub enum Request {
    Categories,
    Tutors,
    CoursePage {
        category_id: String,
        category_name: String,
        page: u32,
    },
    Search {
        seq: u64,
        filter: SearchFilter,
    },
    CourseDetail {
        course_id: String,
    },
    CourseProgress {
        course_id: String,
        token: Bearer,
    },
    Content {
        content_id: String,
        token: Bearer,
    },
    MarkComplete {
        course_id: String,
        content_id: String,
        token: Bearer,
    },
    Enroll {
        course_id: String,
        token: Bearer,
    },
    Profile {
        username: String,
    },
}

/// Results sent back by the worker thread, tagged with what they were for
#[derive(Debug)]
pub enum Event {
    Categories(Result<Vec<Category>, Error>),
    Tutors(Result<Vec<Tutor>, Error>),
    CoursePage {
        category_id: String,
        page: u32,
        result: Result<CoursePage, Error>,
    },
    Search {
        seq: u64,
        result: Result<CoursePage, Error>,
    },
    CourseDetail {
        course_id: String,
        result: Result<CourseDetail, Error>,
    },
    CourseProgress {
        course_id: String,
        result: Result<CourseProgress, Error>,
    },
    Content {
        content_id: String,
        result: Result<ContentDetail, Error>,
    },
    MarkedComplete {
        course_id: String,
        content_id: String,
        result: Result<(), Error>,
    },
    Enrolled {
        course_id: String,
        result: Result<bool, Error>,
    },
    Profile {
        username: String,
        result: Result<Profile, Error>,
    },
}

/// Global data store.
///
/// Owned by the UI thread. Anything that needs the network goes to the worker as a [`Request`],
/// and comes back later as an [`Event`]. By then the user may have moved on, so every result is
/// checked against what's currently open before it's applied.
pub struct Store {
    client: Client,
    session: SessionStore,

    categories: CategoryLoader,
    tutors: Option<Vec<Tutor>>,
    search: SearchEngine,

    course: Option<CourseView>,
    content: Option<ContentView>,
    profile: Option<ProfileView>,

    worker_channel: Sender<Request>,
}

impl Store {
    pub fn new(bus: &EventBus, client: Client, session: SessionStore, debounce: Duration) -> Self {
        let worker_channel = Worker::spawn_on(bus, client.clone());

        Self {
            client,
            session,
            categories: Default::default(),
            tutors: None,
            search: SearchEngine::new(debounce, Instant::now()),
            course: None,
            content: None,
            profile: None,
            worker_channel,
        }
    }

    fn send(&self, req: Request) {
        if let Err(e) = self.worker_channel.send(req) {
            error!("store worker has gone away, dropping {:?}", e.0);
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.session()
    }

    /// Log in, then fetch anything that depends on who's logged in
    pub fn login(&mut self, username: &str, password: &Password) -> Result<(), Error> {
        self.session.login(&self.client, username, password)?;

        if let Some(r) = self
            .course
            .as_ref()
            .and_then(|c| c.refresh_progress(self.session.session()))
        {
            self.send(r);
        }

        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), Error> {
        self.forget_user();
        self.session.logout()
    }

    pub fn signup(&self, role: Role, form: &SignupForm) -> Result<(), Error> {
        self.client.signup(role, form)
    }

    fn forget_user(&mut self) {
        if let Some(c) = self.course.as_mut() {
            c.forget_progress();
        }
        self.content = None;
    }

    pub fn categories(&self) -> &CategoryLoader {
        &self.categories
    }

    /// Request the category and tutor lists, unless we have them or they're on the way
    pub fn request_categories(&mut self) {
        if self.categories.entries().is_empty() && !self.categories.is_loading() {
            let req = self.categories.request_categories();
            self.send(req);
        }

        if self.tutors.is_none() {
            self.send(Request::Tutors);
        }
    }

    pub fn select_category(&mut self, category_id: &str) {
        if let Some(r) = self.categories.load_page(category_id, 1) {
            self.send(r);
        }
    }

    pub fn load_more(&mut self, category_id: &str) {
        if let Some(r) = self.categories.load_next_page(category_id) {
            self.send(r);
        }
    }

    pub fn tutors(&self) -> &[Tutor] {
        self.tutors.as_deref().unwrap_or_default()
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchEngine {
        &mut self.search
    }

    /// Called regularly, to send any searches that have settled
    pub fn tick(&mut self, now: Instant) {
        if let Some(r) = self.search.poll(now) {
            self.send(r);
        }
    }

    pub fn course(&self) -> Option<&CourseView> {
        self.course.as_ref()
    }

    pub fn open_course(&mut self, course_id: &str) {
        if self
            .course
            .as_ref()
            .is_some_and(|c| c.course_id() == course_id && c.detail().is_some())
        {
            return;
        }

        let (view, req) = CourseView::open(course_id.to_string());
        self.course = Some(view);
        self.content = None;
        self.send(req);
    }

    pub fn enroll(&mut self) -> Action {
        let Some(course) = self.course.as_ref() else {
            return Action::None;
        };

        match course.enroll(self.session.session()) {
            Gate::Open(r) => {
                self.send(r);
                Action::Flash("Enrolling...".into())
            }
            Gate::LoginRequired => login_required(),
            Gate::Unavailable => Action::None,
        }
    }

    pub fn content(&self) -> Option<&ContentView> {
        self.content.as_ref()
    }

    /// Open a content item. If nobody is logged in, nothing is requested and the content is marked as needing a login.
    pub fn open_content(&mut self, content_id: &str) {
        let Some(course) = self.course.as_ref() else {
            return;
        };

        let gate = course.open_content(content_id, self.session.session());
        let content_id = content_id.to_string();
        let state = match gate {
            Gate::Open(r) => {
                self.send(r);
                ContentState::Loading
            }
            Gate::LoginRequired | Gate::Unavailable => ContentState::LoginRequired,
        };
        self.content = Some(ContentView { content_id, state });
    }

    pub fn close_content(&mut self) {
        self.content = None;
    }

    pub fn mark_complete(&mut self, content_id: &str) -> Action {
        let Some(course) = self.course.as_ref() else {
            return Action::None;
        };

        match course.mark_complete(content_id, self.session.session()) {
            Gate::Open(r) => {
                self.send(r);
                Action::None
            }
            Gate::LoginRequired => login_required(),
            Gate::Unavailable => Action::None,
        }
    }

    pub fn profile(&self) -> Option<&ProfileView> {
        self.profile.as_ref()
    }

    /// Load the logged in user's profile
    pub fn open_profile(&mut self) -> Action {
        let Some(username) = self.session.session().map(|s| s.username.clone()) else {
            self.profile = None;
            return login_required();
        };

        self.profile = Some(ProfileView {
            username: username.clone(),
            profile: None,
            error: None,
        });
        self.send(Request::Profile { username });

        Action::None
    }

    pub fn event(&mut self, e: Event) -> Action {
        match e {
            Event::Categories(Ok(cs)) => {
                if let Some(r) = self.categories.categories_loaded(cs) {
                    self.send(r);
                }
            }
            Event::Categories(Err(e)) => {
                self.categories.categories_failed();
                return self.report(e);
            }

            Event::Tutors(Ok(ts)) => self.tutors = Some(ts),
            Event::Tutors(Err(e)) => return self.report(e),

            Event::CoursePage {
                category_id,
                page,
                result: Ok(p),
            } => {
                self.categories.page_loaded(&category_id, page, p);
            }
            Event::CoursePage {
                category_id,
                page,
                result: Err(e),
            } => {
                self.categories.page_failed(&category_id, page, &e);
                return self.report(e);
            }

            Event::Search { seq, result } => {
                if let Some(e) = self.search.finished(seq, result) {
                    return self.report(e);
                }
            }

            Event::CourseDetail { course_id, result } => {
                let Some(course) = self.course.as_mut().filter(|c| c.course_id() == course_id)
                else {
                    debug!("dropping detail for closed course {}", course_id);
                    return Action::None;
                };

                match result {
                    Ok(detail) => {
                        if let Some(r) = course.detail_loaded(detail, self.session.session()) {
                            self.send(r);
                        }
                    }
                    Err(e) => {
                        course.detail_failed(e.to_string());
                        return self.report(e);
                    }
                }
            }

            Event::CourseProgress { course_id, result } => {
                let Some(course) = self.course.as_mut().filter(|c| c.course_id() == course_id)
                else {
                    debug!("dropping progress for closed course {}", course_id);
                    return Action::None;
                };
                if self.session.session().is_none() {
                    debug!("dropping progress, no longer logged in");
                    return Action::None;
                }

                match result {
                    Ok(p) => course.progress_loaded(p),
                    Err(e) => return self.report(e),
                }
            }

            Event::Content { content_id, result } => {
                let Some(content) = self
                    .content
                    .as_mut()
                    .filter(|c| c.content_id == content_id)
                else {
                    debug!("dropping closed content {}", content_id);
                    return Action::None;
                };

                match result {
                    Ok(c) => content.state = ContentState::Loaded(c),
                    Err(e) => {
                        content.state = ContentState::Failed(e.to_string());
                        return self.report(e);
                    }
                }
            }

            Event::MarkedComplete {
                course_id,
                content_id,
                result,
            } => match result {
                Ok(()) => {
                    debug!("marked {} complete", content_id);
                    self.refresh_progress(&course_id);
                    return Action::Flash("Marked as complete".into());
                }
                Err(e) => return self.report(e),
            },

            Event::Enrolled { course_id, result } => match result {
                Ok(true) => {
                    if let Some(c) = self.course.as_mut().filter(|c| c.course_id() == course_id) {
                        c.enrolled(true);
                    }
                    self.refresh_progress(&course_id);
                    return Action::Flash("Enrolled!".into());
                }
                Ok(false) => {
                    return Action::Flash(error_text("Enrollment was not accepted"));
                }
                Err(e) => return self.report(e),
            },

            Event::Profile { username, result } => {
                let Some(view) = self.profile.as_mut().filter(|p| p.username == username) else {
                    return Action::None;
                };

                match result {
                    Ok(p) => view.profile = Some(p),
                    Err(e) => {
                        view.error = Some(e.to_string());
                        return self.report(e);
                    }
                }
            }
        };

        Action::None
    }

    /// Re-fetch progress for the given course, if it's still open
    fn refresh_progress(&self, course_id: &str) {
        if let Some(r) = self
            .course
            .as_ref()
            .filter(|c| c.course_id() == course_id)
            .and_then(|c| c.refresh_progress(self.session.session()))
        {
            self.send(r);
        }
    }

    /// Turn an error into something to show the user
    fn report(&mut self, e: Error) -> Action {
        match e {
            Error::Unauthorized => self.reauthenticate(),
            e => {
                error!("{}", e);
                Action::Flash(error_text(e.to_string()))
            }
        }
    }

    /// Our access token was rejected. Try to refresh once, and give up on the session if we can't.
    fn reauthenticate(&mut self) -> Action {
        let can_refresh = self
            .session
            .session()
            .is_some_and(|s| s.refresh_token.is_some());

        if can_refresh {
            match self.session.refresh(&self.client) {
                Ok(()) => return Action::Flash("Session refreshed, please try again".into()),
                Err(e) => warn!("refresh failed: {}", e),
            }
        } else if let Err(e) = self.session.logout() {
            error!("error removing session: {}", e);
        }

        self.forget_user();
        Action::Reauthenticate
    }
}

fn login_required() -> Action {
    Action::Flash(error_text("Log in to continue (press L)"))
}

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        sync::mpsc::{self, Receiver},
    };

    use acadme_client::content::{Chapter, ContentItem, ContentKind};

    use super::*;

    /// A store whose requests go to the returned receiver instead of a worker.
    /// The client points at the discard port, so anything it sends itself fails.
    fn store(dir: &Path, session: Option<Session>) -> (Store, Receiver<Request>) {
        let path = dir.join("session.json");
        if let Some(s) = session {
            std::fs::write(&path, serde_json::to_string(&s).unwrap()).unwrap();
        }

        let (tx, rx) = mpsc::channel();
        let store = Store {
            client: Client::new("http://127.0.0.1:9").unwrap(),
            session: SessionStore::open(path),
            categories: Default::default(),
            tutors: None,
            search: SearchEngine::new(Duration::from_millis(300), Instant::now()),
            course: None,
            content: None,
            profile: None,
            worker_channel: tx,
        };
        (store, rx)
    }

    fn learner(refresh_token: Option<&str>) -> Session {
        Session {
            username: "aargeee".to_string(),
            access_token: "access".to_string(),
            refresh_token: refresh_token.map(str::to_string),
            role: Role::Learner,
        }
    }

    fn detail(id: &str) -> CourseDetail {
        CourseDetail {
            id: id.to_string(),
            name: "Algebra".to_string(),
            description: String::new(),
            category: None,
            chapters: vec![Chapter {
                id: "ch1".to_string(),
                name: "Basics".to_string(),
                position: 0,
                content: vec![ContentItem {
                    id: "a".to_string(),
                    name: "Sets".to_string(),
                    position: 0,
                }],
            }],
            tutors: vec![],
            enrolled_count: 0,
            enrolled: false,
        }
    }

    fn content(id: &str) -> ContentDetail {
        ContentDetail {
            id: id.to_string(),
            name: "Sets".to_string(),
            content: "<p>hi</p>".to_string(),
            position: 0,
            chapter: "ch1".to_string(),
            kind: ContentKind::Html,
        }
    }

    fn sent(rx: &Receiver<Request>) -> Vec<Request> {
        rx.try_iter().collect()
    }

    #[test]
    fn unauthorized_without_refresh_token_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, _rx) = store(dir.path(), Some(learner(None)));
        assert!(store.session().is_some());

        let action = store.event(Event::Tutors(Err(Error::Unauthorized)));
        assert!(matches!(action, Action::Reauthenticate));
        assert!(store.session().is_none());
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn failed_refresh_logs_out() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), Some(learner(Some("refresh"))));
        store.open_course("c1");
        store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Ok(detail("c1")),
        });
        store.event(Event::CourseProgress {
            course_id: "c1".to_string(),
            result: Ok(CourseProgress {
                enrolled: true,
                content_id: vec!["a".to_string()],
            }),
        });
        assert!(store.course().is_some_and(|c| c.is_enrolled()));
        sent(&rx);

        // the refresh goes to the discard port, so it fails
        let action = store.event(Event::CourseProgress {
            course_id: "c1".to_string(),
            result: Err(Error::Unauthorized),
        });
        assert!(matches!(action, Action::Reauthenticate));
        assert!(store.session().is_none());
        assert!(!dir.path().join("session.json").exists());
        assert!(store.course().is_some_and(|c| !c.has_progress()));
        assert!(sent(&rx).is_empty());
    }

    #[test]
    fn results_for_closed_courses_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), Some(learner(None)));
        store.open_course("c1");
        store.open_course("c2");
        assert_eq!(sent(&rx).len(), 2);

        store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Ok(detail("c1")),
        });
        let course = store.course().unwrap();
        assert_eq!(course.course_id(), "c2");
        assert!(course.detail().is_none());
        // no progress request for the closed course either
        assert!(sent(&rx).is_empty());

        store.event(Event::CourseProgress {
            course_id: "c1".to_string(),
            result: Ok(CourseProgress {
                enrolled: true,
                content_id: vec![],
            }),
        });
        assert!(!store.course().unwrap().has_progress());
    }

    #[test]
    fn progress_after_logout_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), Some(learner(None)));
        store.open_course("c1");
        store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Ok(detail("c1")),
        });
        assert!(matches!(
            sent(&rx).as_slice(),
            [Request::CourseDetail { .. }, Request::CourseProgress { .. }]
        ));

        store.logout().unwrap();
        store.event(Event::CourseProgress {
            course_id: "c1".to_string(),
            result: Ok(CourseProgress {
                enrolled: true,
                content_id: vec!["a".to_string()],
            }),
        });
        assert!(!store.course().unwrap().has_progress());
    }

    #[test]
    fn closed_content_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, _rx) = store(dir.path(), Some(learner(None)));
        store.open_course("c1");
        store.open_content("a");
        store.open_content("b");

        store.event(Event::Content {
            content_id: "a".to_string(),
            result: Ok(content("a")),
        });
        let view = store.content().unwrap();
        assert_eq!(view.content_id, "b");
        assert!(matches!(view.state, ContentState::Loading));

        store.event(Event::Content {
            content_id: "b".to_string(),
            result: Ok(content("b")),
        });
        assert!(matches!(
            store.content().unwrap().state,
            ContentState::Loaded(_)
        ));
    }

    #[test]
    fn logged_out_users_send_nothing_protected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), None);
        store.open_course("c1");
        store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Ok(detail("c1")),
        });
        assert!(matches!(
            sent(&rx).as_slice(),
            [Request::CourseDetail { .. }]
        ));

        assert!(matches!(store.enroll(), Action::Flash(_)));
        assert!(matches!(store.mark_complete("a"), Action::Flash(_)));
        store.open_content("a");
        assert!(matches!(
            store.content().unwrap().state,
            ContentState::LoginRequired
        ));
        assert!(sent(&rx).is_empty());
    }

    #[test]
    fn enrolled_learners_cannot_enroll_again() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), Some(learner(None)));
        store.open_course("c1");
        store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Ok(detail("c1")),
        });
        store.event(Event::CourseProgress {
            course_id: "c1".to_string(),
            result: Ok(CourseProgress {
                enrolled: true,
                content_id: vec![],
            }),
        });
        sent(&rx);

        assert!(matches!(store.enroll(), Action::None));
        assert!(sent(&rx).is_empty());
    }

    #[test]
    fn failed_course_detail_is_shown_and_retried() {
        let dir = tempfile::tempdir().unwrap();
        let (mut store, rx) = store(dir.path(), None);
        store.open_course("c1");

        let action = store.event(Event::CourseDetail {
            course_id: "c1".to_string(),
            result: Err(Error::Validation("course went away".to_string())),
        });
        assert!(matches!(action, Action::Flash(_)));
        assert_eq!(store.course().unwrap().error(), Some("course went away"));
        sent(&rx);

        // nothing was loaded, so opening it again asks again
        store.open_course("c1");
        assert!(matches!(
            sent(&rx).as_slice(),
            [Request::CourseDetail { course_id }] if course_id == "c1"
        ));
        assert_eq!(store.course().unwrap().error(), None);
    }
}
