use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{AiError, StoreError};
use crate::models::exam::{Exam, ExamQuestion, ExamResult};
use crate::models::material::Material;
use crate::models::new_id;
use crate::remote::{GeneratedContent, TextGenerator};
use crate::store::LocalStore;

const QUESTION_SCHEMA: &str = r#"{
  "type": "array",
  "items": {
    "type": "object",
    "properties": {
      "prompt": { "type": "string" },
      "choices": { "type": "array", "items": { "type": "string" } },
      "answer_index": { "type": "integer" }
    },
    "required": ["prompt", "choices", "answer_index"]
  }
}"#;

/// Quiz generation, grading, and the tutor chat. The text service is a pure
/// request/response collaborator; a failed generation surfaces exactly once
/// to the caller, with nothing synthesized locally in its place.
pub struct ExamService {
    store: Arc<LocalStore>,
    generator: Arc<dyn TextGenerator>,
}

impl ExamService {
    pub fn new(store: Arc<LocalStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    pub async fn generate_exam(
        &self,
        material: &Material,
        question_count: usize,
    ) -> Result<Exam, AiError> {
        let prompt = exam_prompt(material, question_count);
        let schema = serde_json::from_str(QUESTION_SCHEMA)
            .map_err(|e| AiError::Malformed(e.to_string()))?;

        let questions = match self.generator.generate(&prompt, Some(schema)).await? {
            GeneratedContent::Structured(value) => parse_questions(value)?,
            GeneratedContent::Text(text) => {
                let value = serde_json::from_str(&text)
                    .map_err(|e| AiError::Malformed(e.to_string()))?;
                parse_questions(value)?
            }
        };

        let exam = Exam {
            id: new_id("exam"),
            material_id: material.id.clone(),
            title: format!("Quiz: {}", material.title),
            questions,
            created_at: Utc::now(),
        };
        self.store.upsert(&exam).await?;
        info!(exam_id = %exam.id, material_id = %material.id, "exam generated");
        Ok(exam)
    }

    /// Grades submitted answers against the stored key and records the
    /// result. Missing or out-of-range answers count as wrong.
    pub async fn grade(
        &self,
        exam: &Exam,
        answers: &[usize],
        user_id: &str,
    ) -> Result<ExamResult, StoreError> {
        let score = score_answers(&exam.questions, answers);
        let result = ExamResult {
            id: new_id("res"),
            exam_id: exam.id.clone(),
            user_id: user_id.to_string(),
            score,
            total: exam.questions.len() as u32,
            taken_at: Utc::now(),
        };
        self.store.upsert(&result).await?;
        Ok(result)
    }

    pub async fn ask_tutor(&self, question: &str, material: &Material) -> Result<String, AiError> {
        let prompt = tutor_prompt(question, material);
        match self.generator.generate(&prompt, None).await? {
            GeneratedContent::Text(text) => Ok(text),
            GeneratedContent::Structured(value) => Ok(value.to_string()),
        }
    }
}

fn exam_prompt(material: &Material, question_count: usize) -> String {
    let context = material.content.as_deref().unwrap_or("");
    format!(
        "Write {question_count} multiple-choice questions for a {} {} student \
         studying \"{}\" ({}). Use the material content where given.\n\n{}",
        material.grade, material.subject, material.title, material.level, context
    )
}

fn tutor_prompt(question: &str, material: &Material) -> String {
    format!(
        "You are a patient tutor helping with \"{}\" ({} {}). \
         Answer the student's question:\n{}",
        material.title, material.grade, material.subject, question
    )
}

fn parse_questions(value: serde_json::Value) -> Result<Vec<ExamQuestion>, AiError> {
    // Some services wrap the array in an envelope object.
    let value = match value {
        serde_json::Value::Object(mut map) => match map.remove("questions") {
            Some(inner) => inner,
            None => serde_json::Value::Object(map),
        },
        other => other,
    };
    let questions: Vec<ExamQuestion> =
        serde_json::from_value(value).map_err(|e| AiError::Malformed(e.to_string()))?;
    if questions.is_empty() {
        return Err(AiError::Malformed("empty question list".to_string()));
    }
    for q in &questions {
        if q.answer_index >= q.choices.len() {
            return Err(AiError::Malformed(format!(
                "answer index {} outside {} choices",
                q.answer_index,
                q.choices.len()
            )));
        }
    }
    Ok(questions)
}

fn score_answers(questions: &[ExamQuestion], answers: &[usize]) -> u32 {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i) == Some(&q.answer_index))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer_index: usize) -> ExamQuestion {
        ExamQuestion {
            prompt: "q".to_string(),
            choices: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            answer_index,
        }
    }

    #[test]
    fn scores_correct_answers_only() {
        let questions = vec![question(0), question(2), question(1)];
        assert_eq!(score_answers(&questions, &[0, 2, 0]), 2);
    }

    #[test]
    fn short_answer_sheet_counts_missing_as_wrong() {
        let questions = vec![question(0), question(1)];
        assert_eq!(score_answers(&questions, &[0]), 1);
    }

    #[test]
    fn rejects_answer_index_outside_choices() {
        let value = serde_json::json!([
            { "prompt": "q", "choices": ["a", "b"], "answer_index": 5 }
        ]);
        assert!(parse_questions(value).is_err());
    }

    #[test]
    fn unwraps_question_envelope() {
        let value = serde_json::json!({
            "questions": [
                { "prompt": "q", "choices": ["a", "b"], "answer_index": 1 }
            ]
        });
        let parsed = parse_questions(value).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].answer_index, 1);
    }
}
