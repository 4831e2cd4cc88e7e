use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Client, Result};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "categoryname", default)]
    pub category_name: String,
}

/// One page of search results
#[derive(Debug, Deserialize)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { total_pages: 1 }
    }
}

/// Filters for a course search. Empty strings and lists match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    /// Zero or one tutor IDs
    pub tutor: Vec<String>,
    /// Category name
    pub category: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Substring of the course name
    pub course: String,
}

#[derive(Serialize)]
struct SearchReq<'a> {
    #[serde(flatten)]
    filter: &'a SearchFilter,
    page: u32,
}

#[derive(Serialize)]
struct CategoryPageReq<'a> {
    category: &'a str,
    page: u32,
}

impl Client {
    /// Search for courses matching the given filter. Pages start at 1.
    pub fn search(&self, filter: &SearchFilter, page: u32) -> Result<CoursePage> {
        self.post("/courses/search/", &SearchReq { filter, page })
    }

    /// Get one page of the courses in a category. Pages start at 1.
    pub fn category_page(&self, category: &str, page: u32) -> Result<CoursePage> {
        self.post("/courses/search/", &CategoryPageReq { category, page })
    }
}
