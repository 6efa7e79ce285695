mod common;

use std::sync::Arc;

use quiz_core::model::{QuizDraft, QuizDraftError, QuizId};
use services::{AuthoringError, QuizApiError, QuizAuthoringService, SaveOutcome};

use common::{FakeQuizApi, quiz_id, quiz_with};

fn filled_draft() -> QuizDraft {
    let mut draft = QuizDraft::new();
    draft.set_title("Rust basics");
    draft.set_question_text(0, "Owned string type?").unwrap();
    for (i, option) in ["&str", "String", "char", "Box"].iter().enumerate() {
        draft.set_option(0, i, *option).unwrap();
    }
    draft.set_correct_option(0, 1).unwrap();
    draft
}

#[tokio::test]
async fn new_draft_is_created() {
    let api = Arc::new(FakeQuizApi::default());
    let authoring = QuizAuthoringService::new(Arc::clone(&api) as Arc<dyn services::QuizApi>);

    let outcome = authoring.save(None, &filled_draft()).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Created(QuizId::new("new-quiz").unwrap()));
    assert_eq!(outcome.message(), "Quiz created successfully");
    let created = api.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].questions[0].correct_option, 1);
}

#[tokio::test]
async fn existing_quiz_round_trips_through_a_draft() {
    let api = Arc::new(FakeQuizApi::serving(quiz_with(&[2, 0])));
    let authoring = QuizAuthoringService::new(Arc::clone(&api) as Arc<dyn services::QuizApi>);

    let mut draft = authoring.load_draft(&quiz_id()).await.unwrap();
    assert_eq!(draft.title, "General Knowledge");
    assert_eq!(draft.questions.len(), 2);
    assert_eq!(draft.questions[0].correct_option, 2);

    draft.remove_question(1).unwrap();
    let outcome = authoring.save(Some(&quiz_id()), &draft).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Updated(quiz_id()));
    let updated = api.updated();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].1.questions.len(), 1);
}

#[tokio::test]
async fn incomplete_draft_is_not_sent() {
    let api = Arc::new(FakeQuizApi::default());
    let authoring = QuizAuthoringService::new(Arc::clone(&api) as Arc<dyn services::QuizApi>);

    let mut draft = filled_draft();
    draft.add_question();
    let err = authoring.save(None, &draft).await.unwrap_err();

    assert!(matches!(
        err,
        AuthoringError::Draft(QuizDraftError::EmptyQuestion { index: 1 })
    ));
    assert!(api.created().is_empty());
}

#[tokio::test]
async fn missing_quiz_cannot_be_edited() {
    let api = Arc::new(FakeQuizApi::default());
    let authoring = QuizAuthoringService::new(Arc::clone(&api) as Arc<dyn services::QuizApi>);

    let err = authoring.load_draft(&quiz_id()).await.unwrap_err();
    assert!(matches!(err, AuthoringError::Api(QuizApiError::NotFound)));
}
