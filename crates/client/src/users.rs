use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{course::Course, Client, Result};

/// Someone who teaches courses
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Tutor {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl Tutor {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user's public profile
#[derive(Clone, Debug, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub enrolled_courses: Vec<Enrollment>,
    /// Number of content items completed, keyed by `YYYY-MM-DD`
    #[serde(default)]
    pub content_completion_by_date: BTreeMap<String, u64>,
}

/// Ties a user to a course
#[derive(Clone, Debug, Deserialize)]
pub struct Enrollment {
    pub course: Course,
}

impl Client {
    /// Get everyone who can be searched for as a tutor
    pub fn tutors(&self) -> Result<Vec<Tutor>> {
        self.get("/iam/tutors")
    }

    pub fn profile(&self, username: &str) -> Result<Profile> {
        self.get(&format!("/iam/profile/{}", username))
    }
}
