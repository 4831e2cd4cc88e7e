use log::debug;
use serde::Deserialize;

use crate::{users::Tutor, Bearer, Client, Result};

/// A course, with its chapters and who teaches it
#[derive(Clone, Debug, Deserialize)]
pub struct CourseDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The ID of the course's category
    pub category: Option<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub tutors: Vec<CourseTutor>,
    #[serde(default)]
    pub enrolled_count: u64,
    /// Only meaningful in the authenticated view, see [`CourseProgress`]
    #[serde(default)]
    pub enrolled: bool,
}

impl CourseDetail {
    /// Chapters and their content, each sorted by position.
    /// The server doesn't promise any order, so anything that walks the course should use this.
    pub fn ordered(&self) -> Vec<(&Chapter, Vec<&ContentItem>)> {
        let mut chapters: Vec<_> = self.chapters.iter().collect();
        chapters.sort_by_key(|c| c.position);

        chapters
            .into_iter()
            .map(|chapter| {
                let mut items: Vec<_> = chapter.content.iter().collect();
                items.sort_by_key(|c| c.position);
                (chapter, items)
            })
            .collect()
    }

    /// Every content item in the order it's shown
    pub fn content_ids(&self) -> impl Iterator<Item = &str> {
        self.ordered()
            .into_iter()
            .flat_map(|(_, items)| items.into_iter().map(|c| c.id.as_str()))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CourseTutor {
    pub tutor: Tutor,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub name: String,
    /// Zero-based position within the course
    pub position: i32,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// An entry in a chapter's list of content
#[derive(Clone, Debug, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub name: String,
    pub position: i32,
}

/// A logged in user's view of a course
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CourseProgress {
    pub enrolled: bool,
    /// IDs of the content this user has completed
    #[serde(default)]
    pub content_id: Vec<String>,
}

/// The body of a content item
#[derive(Clone, Debug, Deserialize)]
pub struct ContentDetail {
    pub id: String,
    pub name: String,
    /// HTML, or a video URL, depending on `kind`
    pub content: String,
    pub position: i32,
    pub chapter: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "HTML")]
    Html,
    #[serde(other)]
    Video,
}

impl ContentDetail {
    /// The URL to play this content from, if it is a video
    pub fn video_url(&self) -> Option<String> {
        match self.kind {
            ContentKind::Video => Some(format!("{}?rel=0&autoplay=1", self.content)),
            ContentKind::Html => None,
        }
    }
}

#[derive(Deserialize)]
struct EnrollResp {
    enrolled: bool,
}

impl Client {
    /// Get a course's public details
    pub fn course_detail(&self, course_id: &str) -> Result<CourseDetail> {
        self.get(&format!("/courses/{}/content", course_id))
    }

    /// Get the logged in user's enrollment and completion state for a course
    pub fn course_progress(&self, course_id: &str, token: &Bearer) -> Result<CourseProgress> {
        self.post_authed(&format!("/courses/{}/content/", course_id), token)
    }

    pub fn content(&self, content_id: &str, token: &Bearer) -> Result<ContentDetail> {
        self.get_authed(&format!("/courses/content/{}", content_id), token)
    }

    pub fn mark_complete(&self, content_id: &str, token: &Bearer) -> Result<()> {
        let path = format!("/courses/content/{}/markcomplete", content_id);
        self.send(
            self.http.get(self.url(&path)).bearer_auth(token.as_ref()),
            true,
        )?;
        debug!("marked {} complete", content_id);

        Ok(())
    }

    /// Enroll the logged in user, returning whether they are now enrolled
    pub fn enroll(&self, course_id: &str, token: &Bearer) -> Result<bool> {
        self.get_authed::<EnrollResp>(&format!("/courses/{}/enroll/", course_id), token)
            .map(|r| r.enrolled)
    }
}
