//! Image Size Class
//!
//! Requested rendering size for a poster or backdrop.

use std::fmt;
use std::str::FromStr;

use kernel::error::app_error::AppError;
use serde::{Deserialize, Serialize};

/// Size class requested by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// List thumbnails
    Thumbnail,
    Small,
    /// Grid cards
    #[default]
    Medium,
    /// Detail screen
    Large,
    /// Backdrops
    XLarge,
    /// Full resolution
    Original,
}

impl SizeClass {
    /// Path segment understood by the image CDN
    pub const fn path_segment(&self) -> &'static str {
        match self {
            SizeClass::Thumbnail => "w92",
            SizeClass::Small => "w185",
            SizeClass::Medium => "w342",
            SizeClass::Large => "w500",
            SizeClass::XLarge => "w780",
            SizeClass::Original => "original",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Thumbnail => "thumbnail",
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
            SizeClass::XLarge => "xlarge",
            SizeClass::Original => "original",
        }
    }
}

impl FromStr for SizeClass {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thumbnail" => Ok(SizeClass::Thumbnail),
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            "xlarge" => Ok(SizeClass::XLarge),
            "original" => Ok(SizeClass::Original),
            other => Err(AppError::invalid_reference(format!(
                "Unknown image size class: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_class() {
        assert_eq!("Large".parse::<SizeClass>().unwrap(), SizeClass::Large);
        assert_eq!(" thumbnail ".parse::<SizeClass>().unwrap(), SizeClass::Thumbnail);
        assert!("huge".parse::<SizeClass>().is_err());
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(SizeClass::Thumbnail.path_segment(), "w92");
        assert_eq!(SizeClass::default().path_segment(), "w342");
        assert_eq!(SizeClass::Original.path_segment(), "original");
    }
}
