//! Image Resolver
//!
//! Turns the poster references stored on [`MovieRecord`]s into fetchable
//! URLs on the image CDN.

use reqwest::Url;

use crate::domain::entity::movie::MovieRecord;
use crate::domain::value_object::size_class::SizeClass;
use crate::error::{CatalogError, CatalogResult};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "svg", "webp"];

/// Image URL resolver
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a reference to a URL at the requested size.
    ///
    /// Accepts a provider path such as `/qJ2tW6WMUDux911r6m7haRef0WH.jpg`
    /// or an absolute `http(s)` URL, which is returned unchanged.
    pub fn resolve(&self, reference: &str, size: SizeClass) -> CatalogResult<String> {
        let reference = reference.trim();

        if reference.starts_with("http://") || reference.starts_with("https://") {
            let url = Url::parse(reference)
                .map_err(|e| CatalogError::InvalidReference(format!("{reference}: {e}")))?;
            return Ok(url.to_string());
        }

        if !is_image_path(reference) {
            return Err(CatalogError::InvalidReference(format!(
                "Unrecognized image reference: {reference:?}"
            )));
        }

        Ok(format!("{}/{}{}", self.base_url, size.path_segment(), reference))
    }

    /// Poster URL for a record, if it has a usable poster
    pub fn resolve_record(&self, record: &MovieRecord, size: SizeClass) -> Option<String> {
        let reference = record.poster_ref.as_deref()?;
        match self.resolve(reference, size) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(movie_id = %record.id, error = %e, "Skipping poster");
                None
            }
        }
    }
}

/// `/<name>.<ext>`: one path segment with a known image extension
fn is_image_path(reference: &str) -> bool {
    let Some(name) = reference.strip_prefix('/') else {
        return false;
    };
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };

    !stem.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}
