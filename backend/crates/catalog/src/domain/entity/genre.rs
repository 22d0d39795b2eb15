//! Genre Entity

use serde::{Deserialize, Serialize};

/// Movie genre as listed by the catalog provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}
