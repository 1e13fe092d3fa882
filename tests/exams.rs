mod common;

use std::sync::Arc;

use common::FakeGenerator;
use serde_json::json;

use studyshelf::error::AiError;
use studyshelf::exams::ExamService;
use studyshelf::models::exam::{Exam, ExamResult};
use studyshelf::models::material::{Material, MaterialCategory};
use studyshelf::remote::GeneratedContent;
use studyshelf::store::LocalStore;

fn notes() -> Material {
    Material {
        id: "m1".to_string(),
        title: "Photosynthesis".to_string(),
        level: "O-Level".to_string(),
        grade: "Form 4".to_string(),
        subject: "Biology".to_string(),
        category: MaterialCategory::Notes,
        file_location: String::new(),
        file_name: "photo.txt".to_string(),
        uploaded_at: chrono::Utc::now(),
        is_digital: true,
        content: Some("Plants convert light into chemical energy.".to_string()),
    }
}

fn questions_json() -> serde_json::Value {
    json!([
        {
            "prompt": "Where does photosynthesis occur?",
            "choices": ["Mitochondria", "Chloroplast", "Nucleus"],
            "answer_index": 1
        },
        {
            "prompt": "What gas is produced?",
            "choices": ["Oxygen", "Nitrogen"],
            "answer_index": 0
        }
    ])
}

#[tokio::test]
async fn generates_exam_from_structured_reply_and_stores_it() {
    let store = Arc::new(LocalStore::open_in_memory().await.unwrap());
    let generator = Arc::new(FakeGenerator::with_reply(GeneratedContent::Structured(
        questions_json(),
    )));
    let service = ExamService::new(Arc::clone(&store), generator);

    let exam = service.generate_exam(&notes(), 2).await.unwrap();
    assert_eq!(exam.questions.len(), 2);
    assert_eq!(exam.material_id, "m1");

    let stored: Vec<Exam> = store.get_all().await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn raw_text_reply_is_parsed_as_json() {
    let store = Arc::new(LocalStore::open_in_memory().await.unwrap());
    let generator = Arc::new(FakeGenerator::with_reply(GeneratedContent::Text(
        questions_json().to_string(),
    )));
    let service = ExamService::new(store, generator);

    let exam = service.generate_exam(&notes(), 2).await.unwrap();
    assert_eq!(exam.questions.len(), 2);
}

#[tokio::test]
async fn generation_failure_surfaces_once_with_nothing_stored() {
    let store = Arc::new(LocalStore::open_in_memory().await.unwrap());
    let generator = Arc::new(FakeGenerator::default());
    generator
        .fail
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let service = ExamService::new(Arc::clone(&store), generator);

    let err = service.generate_exam(&notes(), 2).await.unwrap_err();
    assert!(matches!(err, AiError::Rejected { status: 500 }));

    let stored: Vec<Exam> = store.get_all().await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn grading_stores_a_result() {
    let store = Arc::new(LocalStore::open_in_memory().await.unwrap());
    let generator = Arc::new(FakeGenerator::with_reply(GeneratedContent::Structured(
        questions_json(),
    )));
    let service = ExamService::new(Arc::clone(&store), generator);

    let exam = service.generate_exam(&notes(), 2).await.unwrap();
    let result = service.grade(&exam, &[1, 1], "u1").await.unwrap();

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 2);

    let stored: Vec<ExamResult> = store.get_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, "u1");
}

#[tokio::test]
async fn tutor_returns_plain_text() {
    let store = Arc::new(LocalStore::open_in_memory().await.unwrap());
    let generator = Arc::new(FakeGenerator::with_reply(GeneratedContent::Text(
        "Light reactions happen in the thylakoid.".to_string(),
    )));
    let service = ExamService::new(store, generator);

    let notes = notes();
    let reply = service.ask_tutor("Where do light reactions happen?", &notes);
    assert!(reply.await.unwrap().contains("thylakoid"));
}
