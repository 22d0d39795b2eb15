//! Movie Record Entity
//!
//! A movie as the catalog provider describes it. Records are immutable once
//! fetched; a refresh replaces the whole record.

use kernel::id::MovieId;
use serde::{Deserialize, Serialize};

/// Movie metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Provider-assigned identifier
    pub id: MovieId,
    pub title: String,
    /// Year of first release, when known
    #[serde(default)]
    pub release_year: Option<i32>,
    /// Poster reference, resolved to a URL by `ImageResolver`
    #[serde(default)]
    pub poster_ref: Option<String>,
    /// Average rating on a 0-10 scale
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub synopsis: String,
}

impl MovieRecord {
    /// Create a record with only the required fields set
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            release_year: None,
            poster_ref: None,
            rating: 0.0,
            synopsis: String::new(),
        }
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_poster_ref(mut self, poster_ref: impl Into<String>) -> Self {
        self.poster_ref = Some(poster_ref.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }
}

/// Extract the year from a `YYYY-MM-DD` (or bare `YYYY`) release date
pub fn release_year_from_date(date: &str) -> Option<i32> {
    let year = date.trim().get(..4)?;
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}
