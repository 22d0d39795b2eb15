//! Discover Query
//!
//! Filters for browsing the catalog by genre and release year.

use serde::{Deserialize, Serialize};

/// Catalog discover filters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    #[serde(default)]
    pub genre_id: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    /// 1-based result page
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub include_adult: bool,
}

fn first_page() -> u32 {
    1
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self {
            genre_id: None,
            year: None,
            page: first_page(),
            include_adult: false,
        }
    }
}

impl DiscoverQuery {
    pub fn genre(mut self, genre_id: u32) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Pages below 1 are clamped to 1
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}
