use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A catalogued study resource: book, notes, or past paper. Immutable once
/// created except for deletion; other records refer to it by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: String,
    pub title: String,
    pub level: String,
    pub grade: String,
    pub subject: String,
    pub category: MaterialCategory,
    pub file_location: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_digital: bool,
    /// Embedded plain text for born-digital materials; paginated binaries
    /// carry none and get text through viewer extraction instead.
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Book,
    Notes,
    PastPaper,
}

impl Entity for Material {
    const COLLECTION: &'static str = "materials";

    fn id(&self) -> &str {
        &self.id
    }
}
