
use quizmaster::error::{AccountError, QuizError};
use quizmaster::service::SubmitRequest;
use quizmaster::store::QuizCatalog;
use quizmaster::UserRegistry;
use serde_json::json;
use test_utils::{harness, quiz_with_answers};

#[tokio::test]
async fn registered_users_can_sign_in() {
    let registry = UserRegistry::new();
    assert!(registry.is_empty().await);

    let name = registry.register("  marie ", "radium").await.unwrap();
    assert_eq!(name, "marie");
    assert_eq!(registry.len().await, 1);

    assert!(registry.authenticate("marie", "radium").await);
    assert!(registry.authenticate(" marie ", "radium").await);
    assert!(!registry.authenticate("marie", "polonium").await);
    assert!(!registry.authenticate("Marie", "radium").await);
    assert!(!registry.authenticate("pierre", "radium").await);
    assert!(!registry.authenticate("", "radium").await);
    assert!(!registry.authenticate("marie", "").await);
}

#[tokio::test]
async fn usernames_need_three_characters() {
    let registry = UserRegistry::new();
    for short in ["", "  ", "ab", " ab "] {
        assert_eq!(
            registry.register(short, "pw").await,
            Err(AccountError::UsernameTooShort { min: 3 })
        );
    }
    assert_eq!(registry.register("abc", "pw").await, Ok("abc".to_string()));
}

#[tokio::test]
async fn duplicate_names_and_empty_passwords_are_rejected() {
    let registry = UserRegistry::new();
    registry.register("grace", "cobol").await.unwrap();

    assert_eq!(
        registry.register(" grace", "other").await,
        Err(AccountError::UsernameTaken("grace".to_string()))
    );
    assert_eq!(registry.register("alan", "").await, Err(AccountError::EmptyPassword));
    assert!(registry.authenticate("grace", "cobol").await);
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn signed_in_players_own_their_history() {
    let h = harness(vec![]);
    h.master.register("linus", "penguin").await.unwrap();

    let err = h.master.login("linus", "walrus").await.unwrap_err();
    assert!(matches!(err, QuizError::Account(AccountError::InvalidCredentials)));
    assert_eq!(err.status_code(), 400);

    let user = h.master.login(" linus ", "penguin").await.unwrap();
    assert_eq!(user, "linus");

    let quiz = quiz_with_answers(&[0, 1]);
    let id = quiz.id();
    h.catalog.insert(quiz).await.unwrap();
    h.master
        .submit(SubmitRequest {
            quiz_id: Some(id.to_string()),
            answers: Some(json!([0, 1])),
            user: Some(user.clone()),
        })
        .await
        .unwrap();

    let history = h.master.history(Some(&user)).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 100);
    assert!(h.master.history(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn registration_errors_are_client_errors() {
    let h = harness(vec![]);
    let err = h.master.register("al", "pw").await.unwrap_err();
    assert!(matches!(err, QuizError::Account(AccountError::UsernameTooShort { .. })));
    assert_eq!(err.status_code(), 400);
}
