use serde::Deserialize;

use crate::{Client, Result};

/// A named group of courses
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Client {
    /// Get every course category
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.get("/courses/category")
    }
}
