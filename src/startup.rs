use chrono::Utc;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, prelude::*};

use crate::models::community::Announcement;
use crate::models::material::{Material, MaterialCategory};
use crate::models::user::{Role, UserAccount};

pub fn init_logging() {
    let file_appender = tracing_appender::rolling::daily("logs", "studyshelf.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_filter = EnvFilter::new("info");

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_timer(UtcTime::rfc_3339())
        .compact()
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(non_blocking_file)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    std::mem::forget(_guard);
}

/// Sample catalog shipped with the app. Seeding inserts only the entries a
/// device has never seen, so user-added materials are untouched.
pub fn demo_materials() -> Vec<Material> {
    vec![
        Material {
            id: "demo-algebra-notes".to_string(),
            title: "Algebra Revision Notes".to_string(),
            level: "O-Level".to_string(),
            grade: "Form 4".to_string(),
            subject: "Mathematics".to_string(),
            category: MaterialCategory::Notes,
            file_location: String::new(),
            file_name: "algebra-notes.txt".to_string(),
            uploaded_at: Utc::now(),
            is_digital: true,
            content: Some("Linear equations, factorisation, quadratic formula.".to_string()),
        },
        Material {
            id: "demo-biology-paper".to_string(),
            title: "Biology Past Paper 2023".to_string(),
            level: "O-Level".to_string(),
            grade: "Form 4".to_string(),
            subject: "Biology".to_string(),
            category: MaterialCategory::PastPaper,
            file_location: String::new(),
            file_name: "bio-2023.pdf".to_string(),
            uploaded_at: Utc::now(),
            is_digital: false,
            content: None,
        },
    ]
}

pub fn welcome_announcement() -> Announcement {
    Announcement {
        id: "welcome".to_string(),
        title: "Welcome to StudyShelf".to_string(),
        body: "Browse the library, read offline, and track your progress.".to_string(),
        created_at: Utc::now(),
    }
}

pub fn default_admin() -> UserAccount {
    let mut admin = UserAccount::new("admin", "admin@studyshelf.local");
    admin.role = Role::Admin;
    admin.name = "Administrator".to_string();
    admin.is_profile_complete = true;
    admin
}
