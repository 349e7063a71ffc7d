
use std::time::Duration;

use quizmaster::clients::mock::{canned_quiz, MockClient, MockResponse};
use quizmaster::error::{AIError, QuizError, UpstreamFormatError, ValidationError};
use quizmaster::generation::{build_prompt, GenerationPlan, QuizGenerationService};
use quizmaster::model::Difficulty;
use test_utils::{limits, mock_service, quiz_reply};

#[tokio::test]
async fn returns_exactly_the_requested_questions() {
    for count in 5..=10 {
        let (service, handle) = mock_service(vec![MockResponse::success(quiz_reply(count))]);
        let questions = service
            .generate("Photosynthesis", count as i64, Some("easy"))
            .await
            .unwrap();

        assert_eq!(questions.len(), count);
        for question in &questions {
            assert_eq!(question.options().len(), 4);
            assert!(question.options().iter().any(|o| o == question.correct_answer()));
        }
        assert_eq!(handle.call_count(), 1);
    }
}

#[tokio::test]
async fn fenced_chatty_replies_are_accepted() {
    let (service, _handle) = mock_service(vec![MockResponse::success(canned_quiz("Rust", 5))]);
    let questions = service.generate("Rust", 5, None).await.unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[1].correct_answer(), "Right answer 2");
}

#[tokio::test]
async fn prompt_carries_the_validated_request() {
    let (service, handle) = mock_service(vec![MockResponse::success(quiz_reply(7))]);
    service.generate("  Volcanoes ", 7, Some("HARD")).await.unwrap();

    let prompts = handle.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("\"Volcanoes\""));
    assert!(prompt.contains("exactly 7 questions"));
    assert!(prompt.contains("difficulty of hard"));
    assert!(prompt.contains("correctAnswerIndex"));
    assert!(prompt.contains("## Response Format"));
}

#[tokio::test]
async fn count_below_minimum_never_calls_the_generator() {
    let (client, handle) = MockClient::with_responses(vec![MockResponse::success(quiz_reply(3))]);
    let service = QuizGenerationService::new(client, limits(5, 10));

    let err = service.generate("History", 3, None).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Validation(ValidationError::InvalidQuestionCount { min: 5, max: 10 })
    ));
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn each_precondition_has_its_own_failure() {
    let (service, handle) = mock_service(vec![]);

    assert!(matches!(
        service.generate("   ", 5, None).await,
        Err(QuizError::Validation(ValidationError::InvalidTopic))
    ));
    assert!(matches!(
        service.generate("Chess", 11, None).await,
        Err(QuizError::Validation(ValidationError::InvalidQuestionCount { .. }))
    ));
    assert!(matches!(
        service.generate("Chess", -5, None).await,
        Err(QuizError::Validation(ValidationError::InvalidQuestionCount { .. }))
    ));
    assert!(matches!(
        service.generate("Chess", 5, Some("impossible")).await,
        Err(QuizError::Validation(ValidationError::InvalidDifficulty(_)))
    ));
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn non_json_reply_is_malformed_output() {
    let (service, _handle) = mock_service(vec![MockResponse::success(
        "I'm sorry, I can't produce a quiz on that topic.",
    )]);
    let err = service.generate("Chess", 5, None).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::UpstreamFormat(UpstreamFormatError::MalformedGenerationOutput(..))
    ));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn short_reply_is_rejected_not_padded() {
    let (service, _handle) = mock_service(vec![MockResponse::success(quiz_reply(4))]);
    let err = service.generate("Chess", 5, None).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::UpstreamFormat(UpstreamFormatError::InvalidResponseShape(_))
    ));
}

#[tokio::test]
async fn reply_without_questions_key_is_a_shape_error() {
    let (service, _handle) = mock_service(vec![MockResponse::success("{\"quiz\": []}")]);
    let err = service.generate("Chess", 5, None).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::UpstreamFormat(UpstreamFormatError::InvalidResponseShape(_))
    ));
}

#[tokio::test]
async fn generator_errors_propagate_without_retry() {
    let (service, handle) = mock_service(vec![
        MockResponse::Error("upstream unavailable".to_string()),
        MockResponse::success(quiz_reply(5)),
    ]);
    let err = service.generate("Chess", 5, None).await.unwrap_err();
    assert!(matches!(err, QuizError::Ai(AIError::Mock(_))));
    assert_eq!(handle.call_count(), 1);
}

#[tokio::test]
async fn replies_queued_after_construction_are_used() {
    let (service, handle) = mock_service(vec![]);
    handle.push(MockResponse::success(quiz_reply(5)));

    let questions = service.generate("Chess", 5, None).await.unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(handle.call_count(), 1);
}

#[tokio::test]
async fn slow_generator_times_out() {
    let (service, _handle) = mock_service(vec![MockResponse::Delayed(
        Duration::from_secs(5),
        quiz_reply(5),
    )]);
    let service = service.with_timeout(Some(Duration::from_millis(20)));

    let err = service.generate("Chess", 5, None).await.unwrap_err();
    assert!(matches!(err, QuizError::GenerationTimeout(_)));
    assert_eq!(err.status_code(), 504);
}

#[test]
fn prompt_mentions_every_constraint() {
    let prompt = build_prompt(&GenerationPlan {
        topic: "Jazz".to_string(),
        question_count: 6,
        difficulty: Difficulty::Medium,
    });
    assert!(prompt.contains("\"Jazz\""));
    assert!(prompt.contains("exactly 6 questions"));
    assert!(prompt.contains("exactly 4 answer options"));
    assert!(prompt.contains("0-based"));
    assert!(prompt.contains("\"questions\""));
}
