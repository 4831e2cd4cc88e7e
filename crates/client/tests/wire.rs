//! Parsing the shapes the API sends back
use acadme_client::{
    content::{ContentDetail, ContentKind, CourseDetail, CourseProgress},
    course::CoursePage,
    users::Profile,
    Error, Password, Role, SignupForm,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn course_page_with_pagination() {
    let page: CoursePage = serde_json::from_value(json!({
        "courses": [
            {"id": "c1", "name": "Algebra", "description": "x", "categoryname": "maths"},
            {"id": "c2", "name": "Calculus", "description": "y", "category_name": "maths"},
        ],
        "pagination": {"total_pages": 4},
    }))
    .unwrap();

    assert_eq!(page.courses.len(), 2);
    assert_eq!(page.courses[0].category_name, "maths");
    assert_eq!(page.courses[1].category_name, "maths");
    assert_eq!(page.pagination.total_pages, 4);
}

#[test]
fn course_page_without_pagination_is_one_page() {
    let page: CoursePage = serde_json::from_value(json!({"courses": []})).unwrap();
    assert_eq!(page.pagination.total_pages, 1);
}

#[test]
fn course_detail() {
    let detail: CourseDetail = serde_json::from_value(json!({
        "id": "c1",
        "name": "Algebra",
        "description": "groups and rings",
        "category": "cat1",
        "chapters": [
            {"id": "ch1", "name": "Groups", "position": 0, "content": [
                {"id": "x1", "name": "Intro", "position": 0, "completed": false},
                {"id": "x2", "name": "Lagrange", "position": 1},
            ]},
        ],
        "tutors": [{"tutor": {"id": "t1", "username": "emmy", "first_name": "Emmy", "last_name": "Noether"}}],
        "enrolled_count": 12,
        "enrolled": false,
    }))
    .unwrap();

    assert_eq!(detail.chapters[0].content[1].name, "Lagrange");
    assert_eq!(detail.tutors[0].tutor.display_name(), "Emmy Noether");
    assert_eq!(detail.enrolled_count, 12);
}

#[test]
fn chapters_are_walked_by_position() {
    let detail: CourseDetail = serde_json::from_value(json!({
        "id": "c1",
        "name": "Algebra",
        "chapters": [
            {"id": "ch2", "name": "Rings", "position": 1, "content": [
                {"id": "c", "name": "Ideals", "position": 0},
            ]},
            {"id": "ch1", "name": "Groups", "position": 0, "content": [
                {"id": "b", "name": "Lagrange", "position": 1},
                {"id": "a", "name": "Intro", "position": 0},
            ]},
        ],
    }))
    .unwrap();

    let chapters: Vec<_> = detail
        .ordered()
        .into_iter()
        .map(|(chapter, _)| chapter.name.as_str())
        .collect();
    assert_eq!(chapters, vec!["Groups", "Rings"]);
    assert_eq!(detail.content_ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn progress() {
    let progress: CourseProgress =
        serde_json::from_value(json!({"enrolled": true, "content_id": ["x1"]})).unwrap();
    assert!(progress.enrolled);
    assert_eq!(progress.content_id, vec!["x1".to_string()]);
}

#[test]
fn content_kinds() {
    let html: ContentDetail = serde_json::from_value(json!({
        "id": "x1", "name": "Intro", "content": "<p>hi</p>", "position": 0, "chapter": "ch1", "type": "HTML",
    }))
    .unwrap();
    assert_eq!(html.kind, ContentKind::Html);
    assert_eq!(html.video_url(), None);

    let video: ContentDetail = serde_json::from_value(json!({
        "id": "x2", "name": "Lecture", "content": "https://video.example/embed/abc", "position": 1, "chapter": "ch1", "type": "VIDEO",
    }))
    .unwrap();
    assert_eq!(video.kind, ContentKind::Video);
    assert_eq!(
        video.video_url().as_deref(),
        Some("https://video.example/embed/abc?rel=0&autoplay=1")
    );
}

#[test]
fn profile_completion_is_date_ordered() {
    let profile: Profile = serde_json::from_value(json!({
        "id": "u1",
        "username": "aargeee",
        "first_name": "Sonam",
        "last_name": "Bajwa",
        "enrolled_courses": [{"course": {"id": "c1", "name": "Algebra", "description": "", "category_name": "maths"}}],
        "content_completion_by_date": {"2024-03-02": 1, "2024-03-01": 3},
    }))
    .unwrap();

    assert_eq!(profile.enrolled_courses[0].course.name, "Algebra");
    assert_eq!(
        profile
            .content_completion_by_date
            .iter()
            .map(|(d, n)| (d.as_str(), *n))
            .collect::<Vec<_>>(),
        vec![("2024-03-01", 3), ("2024-03-02", 1)]
    );
}

#[test]
fn roles() {
    assert_eq!(serde_json::from_value::<Role>(json!("LEARNER")).unwrap(), Role::Learner);
    assert_eq!(serde_json::from_value::<Role>(json!("TUTOR")).unwrap(), Role::Tutor);
    assert_eq!(serde_json::from_value::<Role>(json!("ADMIN")).unwrap(), Role::Other);
    assert_eq!(Role::Learner.signup_path(), Some("learner"));
    assert_eq!(Role::Other.signup_path(), None);
}

fn form(password: &str, confirm: &str) -> SignupForm {
    SignupForm {
        username: "aargeee".to_string(),
        first_name: "Sonam".to_string(),
        last_name: "Bajwa".to_string(),
        password: Password::from(password),
        password_confirm: Password::from(confirm),
    }
}

#[test]
fn signup_validation() {
    assert!(form("hunter2", "hunter2").validate().is_ok());
    assert!(matches!(
        form("hunter2", "hunter3").validate(),
        Err(Error::Validation(m)) if m == "passwords do not match"
    ));
    assert!(matches!(
        form("", "").validate(),
        Err(Error::Validation(_))
    ));

    let mut missing_name = form("hunter2", "hunter2");
    missing_name.first_name.clear();
    assert!(matches!(missing_name.validate(), Err(Error::Validation(_))));
}

#[test]
fn invalid_signup_never_sends() {
    // nothing listens on this port; a request would be an HTTP error rather than a validation one
    let client = acadme_client::Client::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        client.signup(Role::Learner, &form("a", "b")),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        client.signup(Role::Other, &form("a", "a")),
        Err(Error::Validation(_))
    ));
}
