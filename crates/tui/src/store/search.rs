use std::time::{Duration, Instant};

use acadme_client::{
    course::{Course, CoursePage, SearchFilter},
    Error,
};
use chrono::NaiveDate;
use log::debug;

use super::Request;

/// Debounced course search.
///
/// Every edit to the filter restarts the window. Once it has passed with no further edits,
/// [`SearchEngine::poll`] gives back a request for the newest filter. Each request is numbered,
/// and results for anything but the newest request are discarded.
#[derive(Debug)]
pub struct SearchEngine {
    filter: SearchFilter,
    dates_enabled: bool,
    window: Duration,
    last_edit: Option<Instant>,
    latest: u64,
    results: Vec<Course>,
    loading: bool,
}

impl SearchEngine {
    /// Create a new engine, with a search for everything scheduled.
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            filter: SearchFilter::default(),
            dates_enabled: false,
            window,
            last_edit: Some(now),
            latest: 0,
            results: vec![],
            loading: false,
        }
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn results(&self) -> &[Course] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    pub fn dates_enabled(&self) -> bool {
        self.dates_enabled
    }

    pub fn set_course(&mut self, course: String, now: Instant) {
        self.filter.course = course;
        self.edited(now);
    }

    /// Restrict results to one tutor, or none to allow any
    pub fn set_tutor(&mut self, tutor_id: Option<String>, now: Instant) {
        self.filter.tutor = tutor_id.into_iter().collect();
        self.edited(now);
    }

    pub fn set_category(&mut self, category: Option<String>, now: Instant) {
        self.filter.category = category.unwrap_or_default();
        self.edited(now);
    }

    /// Turn the date range on or off. Either way, both dates are cleared.
    pub fn toggle_dates(&mut self, now: Instant) {
        self.dates_enabled = !self.dates_enabled;
        self.filter.start_date = None;
        self.filter.end_date = None;
        self.edited(now);
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>, now: Instant) {
        if self.dates_enabled {
            self.filter.start_date = date;
            self.edited(now);
        }
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>, now: Instant) {
        if self.dates_enabled {
            self.filter.end_date = date;
            self.edited(now);
        }
    }

    fn edited(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// If the filter has settled, return a request for it.
    pub fn poll(&mut self, now: Instant) -> Option<Request> {
        let last_edit = self.last_edit?;
        if now.saturating_duration_since(last_edit) < self.window {
            return None;
        }

        self.last_edit = None;
        self.latest += 1;
        self.loading = true;
        debug!("searching (#{}) for {:?}", self.latest, self.filter);

        Some(Request::Search {
            seq: self.latest,
            filter: self.filter.clone(),
        })
    }

    /// Apply the result of search number `seq`, returning the error if it failed.
    /// Results of old searches are dropped.
    pub fn finished(&mut self, seq: u64, result: Result<CoursePage, Error>) -> Option<Error> {
        if seq != self.latest {
            debug!("discarding stale search #{} (latest #{})", seq, self.latest);
            return None;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.results = page.courses;
                None
            }
            Err(e) => Some(e),
        }
    }
}
