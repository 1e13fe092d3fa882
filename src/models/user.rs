use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// Local account record, created on first authentication. Download and
/// favorite lists are real sets so a duplicate id cannot be stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub district: String,
    pub grade: String,
    pub bio: String,
    pub downloaded_ids: BTreeSet<String>,
    pub favorite_ids: BTreeSet<String>,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(id: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            email: email.to_string(),
            role: Role::User,
            name: String::new(),
            district: String::new(),
            grade: String::new(),
            bio: String::new(),
            downloaded_ids: BTreeSet::new(),
            favorite_ids: BTreeSet::new(),
            is_profile_complete: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for UserAccount {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}
