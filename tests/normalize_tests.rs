
use quizmaster::error::UpstreamFormatError;
use quizmaster::normalize::normalize;
use serde_json::{json, Value};
use test_utils::{raw_question, raw_questions};

fn invalid_index(result: Result<Vec<quizmaster::Question>, UpstreamFormatError>) -> usize {
    match result {
        Err(UpstreamFormatError::InvalidQuestion { index, .. }) => index,
        other => panic!("expected InvalidQuestion, got {other:?}"),
    }
}

#[test]
fn well_formed_list_keeps_order_and_answers() {
    let raw = Value::Array(raw_questions(6));
    let questions = normalize(&raw, 6).unwrap();

    assert_eq!(questions.len(), 6);
    for (i, question) in questions.iter().enumerate() {
        assert_eq!(question.text(), format!("Question {}?", i + 1));
        assert_eq!(question.options().len(), 4);
        assert_eq!(question.correct_answer(), question.options()[i % 4]);
        assert_eq!(question.correct_index(), Some(i % 4));
    }
}

#[test]
fn text_and_options_are_trimmed_and_stringified() {
    let raw = json!([{
        "question": "  What is 2 + 2?  ",
        "options": [" 3 ", 4, true, null],
        "correctAnswerIndex": 1,
    }]);
    let questions = normalize(&raw, 1).unwrap();

    assert_eq!(questions[0].text(), "What is 2 + 2?");
    assert_eq!(questions[0].options(), ["3", "4", "true", "null"]);
    assert_eq!(questions[0].correct_answer(), "4");
}

#[test]
fn numeric_string_index_is_accepted() {
    let raw = json!([{ "question": "Q?", "options": ["a", "b", "c", "d"], "correctAnswerIndex": "3" }]);
    assert_eq!(normalize(&raw, 1).unwrap()[0].correct_answer(), "d");
}

#[test]
fn non_array_is_a_shape_error() {
    for raw in [Value::Null, json!({"question": "Q?"}), json!("questions")] {
        assert!(matches!(
            normalize(&raw, 5),
            Err(UpstreamFormatError::InvalidResponseShape(_))
        ));
    }
}

#[test]
fn wrong_length_is_a_shape_error_never_truncated() {
    let too_many = Value::Array(raw_questions(7));
    assert!(matches!(
        normalize(&too_many, 5),
        Err(UpstreamFormatError::InvalidResponseShape(_))
    ));

    let too_few = Value::Array(raw_questions(4));
    assert!(matches!(
        normalize(&too_few, 5),
        Err(UpstreamFormatError::InvalidResponseShape(_))
    ));
}

#[test]
fn missing_or_blank_text_is_reported_with_its_index() {
    let mut items = raw_questions(3);
    items[1]["question"] = json!("   ");
    assert_eq!(invalid_index(normalize(&Value::Array(items), 3)), 1);

    let mut items = raw_questions(3);
    items[2].as_object_mut().unwrap().remove("question");
    assert_eq!(invalid_index(normalize(&Value::Array(items), 3)), 2);
}

#[test]
fn option_count_must_be_exactly_four() {
    let mut items = raw_questions(2);
    items[0]["options"] = json!(["a", "b", "c"]);
    assert_eq!(invalid_index(normalize(&Value::Array(items), 2)), 0);

    let mut items = raw_questions(2);
    items[1]["options"] = json!(["a", "b", "c", "d", "e"]);
    assert_eq!(invalid_index(normalize(&Value::Array(items), 2)), 1);
}

#[test]
fn correct_index_must_be_an_in_range_integer() {
    for bad in [json!(4), json!(-1), json!(1.5), json!("two"), Value::Null] {
        let mut items = raw_questions(2);
        items[1]["correctAnswerIndex"] = bad.clone();
        assert_eq!(invalid_index(normalize(&Value::Array(items), 2)), 1, "index value {bad}");
    }
}

#[test]
fn first_invalid_question_is_reported() {
    let items = vec![
        raw_question("Fine?", 0),
        json!("not an object"),
        json!({ "question": "", "options": [] }),
    ];
    assert_eq!(invalid_index(normalize(&Value::Array(items), 3)), 1);
}

#[test]
fn invalid_question_message_is_one_based() {
    let mut items = raw_questions(1);
    items[0]["correctAnswerIndex"] = json!(9);
    let err = normalize(&Value::Array(items), 1).unwrap_err();
    assert_eq!(err.to_string(), "Question 1 has an invalid correctAnswerIndex");
}
