use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    pub id: String,
    pub material_id: String,
    pub title: String,
    pub questions: Vec<ExamQuestion>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Exam {
    const COLLECTION: &'static str = "exams";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamResult {
    pub id: String,
    pub exam_id: String,
    pub user_id: String,
    pub score: u32,
    pub total: u32,
    pub taken_at: DateTime<Utc>,
}

impl Entity for ExamResult {
    const COLLECTION: &'static str = "exam_results";

    fn id(&self) -> &str {
        &self.id
    }
}
