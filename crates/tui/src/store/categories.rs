use acadme_client::{categories::Category, course::Course, course::CoursePage, Error};
use log::debug;

use super::Request;

/// How far through loading a category's courses we are
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Nothing requested yet
    Idle,

    /// Waiting on a page, with `loaded` pages already here
    Loading { loaded: u32 },

    /// The first `pages` pages are loaded
    Loaded { pages: u32 },

    /// The last request failed. Asking for the next page again retries it.
    Failed { loaded: u32, error: String },
}

impl PageStatus {
    pub fn loaded_pages(&self) -> u32 {
        match self {
            PageStatus::Idle => 0,
            PageStatus::Loading { loaded } | PageStatus::Failed { loaded, .. } => *loaded,
            PageStatus::Loaded { pages } => *pages,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageStatus::Loading { .. })
    }
}

/// A category, and however many of its courses we've loaded so far
#[derive(Debug)]
pub struct CategoryEntry {
    pub category: Category,
    pub courses: Vec<Course>,
    /// Unknown until the first page arrives, so we assume there's one
    pub total_pages: u32,
    pub status: PageStatus,
}

impl CategoryEntry {
    fn new(category: Category) -> Self {
        Self {
            category,
            courses: vec![],
            total_pages: 1,
            status: PageStatus::Idle,
        }
    }

    pub fn loaded_pages(&self) -> u32 {
        self.status.loaded_pages()
    }

    pub fn has_more(&self) -> bool {
        self.loaded_pages() < self.total_pages
    }
}

/// Loads the list of categories once, then pages of courses within each category on demand.
#[derive(Debug, Default)]
pub struct CategoryLoader {
    entries: Vec<CategoryEntry>,
    loading: bool,
}

impl CategoryLoader {
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn get(&self, category_id: &str) -> Option<&CategoryEntry> {
        self.entries.iter().find(|e| e.category.id == category_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn request_categories(&mut self) -> Request {
        self.loading = true;
        Request::Categories
    }

    /// Replace our categories with the given ones, and start loading the first one's courses
    pub fn categories_loaded(&mut self, categories: Vec<Category>) -> Option<Request> {
        self.loading = false;
        self.entries = categories.into_iter().map(CategoryEntry::new).collect();
        debug!("loaded {} categories", self.entries.len());

        let first = self.entries.first()?.category.id.clone();
        self.load_page(&first, 1)
    }

    pub fn categories_failed(&mut self) {
        self.loading = false;
    }

    /// Request the given (1-based) page of a category's courses, unless it's unknown, out of range, or already loaded.
    pub fn load_page(&mut self, category_id: &str, page: u32) -> Option<Request> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.category.id == category_id)?;

        let loaded = entry.loaded_pages();
        if page > entry.total_pages || page <= loaded {
            debug!(
                "not loading page {} of {} (loaded {}/{})",
                page, entry.category.name, loaded, entry.total_pages
            );
            return None;
        }

        entry.status = PageStatus::Loading { loaded };
        Some(Request::CoursePage {
            category_id: entry.category.id.clone(),
            category_name: entry.category.name.clone(),
            page,
        })
    }

    pub fn load_next_page(&mut self, category_id: &str) -> Option<Request> {
        let next = self.get(category_id)?.loaded_pages() + 1;
        self.load_page(category_id, next)
    }

    /// Apply a page of courses. Returns false if the page was already superseded.
    pub fn page_loaded(&mut self, category_id: &str, page: u32, resp: CoursePage) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.category.id == category_id)
        else {
            return false;
        };

        // state may have moved on while this was in flight
        if page <= entry.loaded_pages() {
            debug!(
                "discarding page {} of {}, already have {}",
                page,
                entry.category.name,
                entry.loaded_pages()
            );
            return false;
        }

        entry.courses.extend(resp.courses);
        entry.total_pages = resp.pagination.total_pages;
        entry.status = PageStatus::Loaded { pages: page };

        true
    }

    pub fn page_failed(&mut self, category_id: &str, page: u32, error: &Error) {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.category.id == category_id)
        else {
            return;
        };

        let loaded = entry.loaded_pages();
        if page <= loaded {
            return;
        }

        entry.status = PageStatus::Failed {
            loaded,
            error: error.to_string(),
        };
    }
}
