// src/models/answer.rs

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use validator::Validate;

/// A submitted answer once its JSON shape has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// One option, used by single-choice and ranked-choice questions.
    Single(String),
    /// Any subset of options, used by multi-choice questions.
    Multiple(BTreeSet<String>),
}

impl AnswerValue {
    pub fn shape(&self) -> &'static str {
        match self {
            AnswerValue::Single(_) => "a single option",
            AnswerValue::Multiple(_) => "a list of options",
        }
    }
}

/// DTO for submitting a questionnaire.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[validate(length(
        min = 1,
        max = 128,
        message = "User id length must be between 1 and 128 characters."
    ))]
    pub user_id: String,

    /// Raw answers keyed by question id.
    /// Value: a string, a list of strings, or null for "no answer".
    /// May be empty: every question then scores 0.
    pub answers: HashMap<i64, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_accepts_string_question_ids() {
        let req: SubmitRequest = serde_json::from_value(serde_json::json!({
            "userId": "12",
            "answers": { "1": "Yes", "2": ["AWS", "GCP"], "3": null }
        }))
        .unwrap();

        assert_eq!(req.user_id, "12");
        assert_eq!(req.answers.len(), 3);
        assert!(req.answers[&2].is_array());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_user_fails_validation_but_empty_answers_do_not() {
        let req = SubmitRequest {
            user_id: String::new(),
            answers: HashMap::new(),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_id"));
        assert!(!fields.contains_key("answers"));

        let nothing_answered = SubmitRequest {
            user_id: "12".to_string(),
            answers: HashMap::new(),
        };
        assert!(nothing_answered.validate().is_ok());
    }
}
