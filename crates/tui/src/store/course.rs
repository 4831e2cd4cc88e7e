use acadme_client::{
    content::{ContentDetail, CourseDetail, CourseProgress},
    users::Profile,
    Session,
};
use log::debug;

use super::Request;

/// Whether a protected operation may go ahead
#[derive(Debug)]
pub enum Gate {
    /// Send this request
    Open(Request),

    /// Nobody is logged in, so nothing was sent
    LoginRequired,

    /// Logged in, but this doesn't apply (already enrolled, not a learner, still loading)
    Unavailable,
}

/// The course currently open in the viewer
#[derive(Debug)]
pub struct CourseView {
    course_id: String,
    detail: Option<CourseDetail>,
    progress: Option<CourseProgress>,
    /// Why the detail couldn't be loaded
    error: Option<String>,
}

impl CourseView {
    pub fn open(course_id: String) -> (Self, Request) {
        let req = Request::CourseDetail {
            course_id: course_id.clone(),
        };
        (
            Self {
                course_id,
                detail: None,
                progress: None,
                error: None,
            },
            req,
        )
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn detail(&self) -> Option<&CourseDetail> {
        self.detail.as_ref()
    }

    /// Store the course detail, and ask for the user's progress if someone is logged in
    pub fn detail_loaded(
        &mut self,
        detail: CourseDetail,
        session: Option<&Session>,
    ) -> Option<Request> {
        self.detail = Some(detail);
        self.error = None;
        self.refresh_progress(session)
    }

    pub fn detail_failed(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn refresh_progress(&self, session: Option<&Session>) -> Option<Request> {
        let session = session?;
        self.detail.as_ref()?;

        Some(Request::CourseProgress {
            course_id: self.course_id.clone(),
            token: session.bearer(),
        })
    }

    pub fn progress_loaded(&mut self, progress: CourseProgress) {
        self.progress = Some(progress);
    }

    /// Drop anything specific to the logged in user
    pub fn forget_progress(&mut self) {
        self.progress = None;
    }

    pub fn has_progress(&self) -> bool {
        self.progress.is_some()
    }

    pub fn is_enrolled(&self) -> bool {
        self.progress.as_ref().is_some_and(|p| p.enrolled)
    }

    pub fn is_completed(&self, content_id: &str) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|p| p.content_id.iter().any(|c| c == content_id))
    }

    pub fn completed_count(&self) -> usize {
        self.progress.as_ref().map_or(0, |p| p.content_id.len())
    }

    /// Whether enrolling should be offered to the given user
    pub fn can_enroll(&self, session: Option<&Session>) -> bool {
        session.is_some_and(|s| s.is_learner())
            && self.detail.is_some()
            && self.progress.is_some()
            && !self.is_enrolled()
    }

    pub fn enroll(&self, session: Option<&Session>) -> Gate {
        let Some(s) = session else {
            return Gate::LoginRequired;
        };
        if !self.can_enroll(session) {
            debug!("not offering enrollment in {}", self.course_id);
            return Gate::Unavailable;
        }

        Gate::Open(Request::Enroll {
            course_id: self.course_id.clone(),
            token: s.bearer(),
        })
    }

    pub fn enrolled(&mut self, enrolled: bool) {
        self.progress.get_or_insert_with(Default::default).enrolled = enrolled;
    }

    pub fn open_content(&self, content_id: &str, session: Option<&Session>) -> Gate {
        match session {
            Some(s) => Gate::Open(Request::Content {
                content_id: content_id.to_string(),
                token: s.bearer(),
            }),
            None => Gate::LoginRequired,
        }
    }

    pub fn mark_complete(&self, content_id: &str, session: Option<&Session>) -> Gate {
        match session {
            Some(s) => Gate::Open(Request::MarkComplete {
                course_id: self.course_id.clone(),
                content_id: content_id.to_string(),
                token: s.bearer(),
            }),
            None => Gate::LoginRequired,
        }
    }

    /// The content item after the given one, in the order the course is shown
    pub fn next_content(&self, content_id: &str) -> Option<&str> {
        let mut ids = self.detail.as_ref()?.content_ids();
        ids.find(|id| *id == content_id)?;
        ids.next()
    }
}

#[derive(Debug)]
pub enum ContentState {
    Loading,
    LoginRequired,
    Loaded(ContentDetail),
    Failed(String),
}

/// The content item currently open in the viewer
#[derive(Debug)]
pub struct ContentView {
    pub content_id: String,
    pub state: ContentState,
}

/// The profile currently open in the viewer
#[derive(Debug)]
pub struct ProfileView {
    pub username: String,
    pub profile: Option<Profile>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use acadme_client::{
        content::{Chapter, ContentItem},
        Role,
    };

    use super::*;

    fn session(role: Role) -> Session {
        Session {
            username: "aargeee".to_string(),
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            role,
        }
    }

    fn detail() -> CourseDetail {
        let item = |id: &str| ContentItem {
            id: id.to_string(),
            name: format!("item {id}"),
            position: 0,
        };
        CourseDetail {
            id: "c1".to_string(),
            name: "Algebra".to_string(),
            description: String::new(),
            category: None,
            chapters: vec![
                Chapter {
                    id: "ch1".to_string(),
                    name: "Basics".to_string(),
                    position: 0,
                    content: vec![item("a"), item("b")],
                },
                Chapter {
                    id: "ch2".to_string(),
                    name: "More".to_string(),
                    position: 1,
                    content: vec![item("c")],
                },
            ],
            tutors: vec![],
            enrolled_count: 3,
            enrolled: false,
        }
    }

    fn progress(enrolled: bool, done: &[&str]) -> CourseProgress {
        CourseProgress {
            enrolled,
            content_id: done.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn progress_is_only_requested_when_logged_in() {
        let (mut view, req) = CourseView::open("c1".to_string());
        assert!(matches!(req, Request::CourseDetail { ref course_id } if course_id == "c1"));

        assert!(view.detail_loaded(detail(), None).is_none());

        let s = session(Role::Learner);
        assert!(matches!(
            view.detail_loaded(detail(), Some(&s)),
            Some(Request::CourseProgress { ref course_id, .. }) if course_id == "c1"
        ));
    }

    #[test]
    fn completion_comes_from_progress() {
        let (mut view, _) = CourseView::open("c1".to_string());
        view.detail_loaded(detail(), None);
        assert!(!view.is_completed("a"));

        view.progress_loaded(progress(true, &["a"]));
        assert!(view.is_completed("a"));
        assert!(!view.is_completed("b"));
        assert_eq!(view.completed_count(), 1);

        view.forget_progress();
        assert!(!view.is_completed("a"));
    }

    #[test]
    fn enroll_needs_login() {
        let (mut view, _) = CourseView::open("c1".to_string());
        view.detail_loaded(detail(), None);
        assert!(matches!(view.enroll(None), Gate::LoginRequired));
    }

    #[test]
    fn enroll_only_for_unenrolled_learners() {
        let learner = session(Role::Learner);
        let tutor = session(Role::Tutor);
        let (mut view, _) = CourseView::open("c1".to_string());
        view.detail_loaded(detail(), Some(&learner));

        // progress not here yet
        assert!(matches!(view.enroll(Some(&learner)), Gate::Unavailable));

        view.progress_loaded(progress(false, &[]));
        assert!(view.can_enroll(Some(&learner)));
        assert!(!view.can_enroll(Some(&tutor)));
        assert!(matches!(view.enroll(Some(&tutor)), Gate::Unavailable));
        assert!(matches!(
            view.enroll(Some(&learner)),
            Gate::Open(Request::Enroll { ref course_id, .. }) if course_id == "c1"
        ));

        view.enrolled(true);
        assert!(view.is_enrolled());
        assert!(matches!(view.enroll(Some(&learner)), Gate::Unavailable));
    }

    #[test]
    fn content_and_completion_need_login() {
        let (view, _) = CourseView::open("c1".to_string());
        let s = session(Role::Learner);

        assert!(matches!(view.open_content("a", None), Gate::LoginRequired));
        assert!(matches!(view.mark_complete("a", None), Gate::LoginRequired));
        assert!(matches!(
            view.open_content("a", Some(&s)),
            Gate::Open(Request::Content { ref content_id, .. }) if content_id == "a"
        ));
        assert!(matches!(
            view.mark_complete("a", Some(&s)),
            Gate::Open(Request::MarkComplete { ref course_id, ref content_id, .. })
                if course_id == "c1" && content_id == "a"
        ));
    }

    #[test]
    fn next_content_crosses_chapters() {
        let (mut view, _) = CourseView::open("c1".to_string());
        assert_eq!(view.next_content("a"), None);

        view.detail_loaded(detail(), None);
        assert_eq!(view.next_content("a"), Some("b"));
        assert_eq!(view.next_content("b"), Some("c"));
        assert_eq!(view.next_content("c"), None);
        assert_eq!(view.next_content("zzz"), None);
    }

    #[test]
    fn next_content_follows_positions() {
        let item = |id: &str, position| ContentItem {
            id: id.to_string(),
            name: format!("item {id}"),
            position,
        };
        let mut unsorted = detail();
        unsorted.chapters = vec![
            Chapter {
                id: "ch2".to_string(),
                name: "Second".to_string(),
                position: 1,
                content: vec![item("c", 0)],
            },
            Chapter {
                id: "ch1".to_string(),
                name: "First".to_string(),
                position: 0,
                content: vec![item("b", 1), item("a", 0)],
            },
        ];

        let (mut view, _) = CourseView::open("c1".to_string());
        view.detail_loaded(unsorted, None);
        assert_eq!(view.next_content("a"), Some("b"));
        assert_eq!(view.next_content("b"), Some("c"));
        assert_eq!(view.next_content("c"), None);
    }
}
