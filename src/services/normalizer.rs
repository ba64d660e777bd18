// src/services/normalizer.rs

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::Value;

use crate::{
    models::{answer::AnswerValue, question::Question},
    services::scoring::{ErrorPolicy, ScoringError},
};

/// Answers ready for scoring, plus whatever had to be dropped on the way.
#[derive(Debug, Default)]
pub struct NormalizedAnswers {
    pub answers: HashMap<i64, AnswerValue>,
    pub warnings: Vec<ScoringError>,
}

/// Resolves raw JSON answers into [`AnswerValue`]s.
///
/// * `null` is "no answer" and is dropped silently.
/// * A string becomes [`AnswerValue::Single`].
/// * An array of strings becomes [`AnswerValue::Multiple`].
/// * Anything else is a `MalformedAnswer`.
///
/// The shape is not checked against the question kind here; the scoring
/// engine reports mismatches. Answers to questions missing from the catalog
/// are ignored.
pub fn normalize(
    raw: &HashMap<i64, Value>,
    questions: &[Question],
    policy: ErrorPolicy,
) -> Result<NormalizedAnswers, ScoringError> {
    let known: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    let mut normalized = NormalizedAnswers::default();

    // Sorted so warnings (and the first strict error) are deterministic.
    let ordered: BTreeMap<&i64, &Value> = raw.iter().collect();

    for (&question_id, value) in ordered {
        if !known.contains(&question_id) {
            tracing::debug!(question_id, "Ignoring answer to unknown question");
            continue;
        }

        match normalize_value(question_id, value) {
            Ok(Some(answer)) => {
                normalized.answers.insert(question_id, answer);
            }
            Ok(None) => {}
            Err(err) => match policy {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::SkipAndWarn => normalized.warnings.push(err),
            },
        }
    }

    Ok(normalized)
}

/// Resolves one raw value. `Ok(None)` means the question was left unanswered.
pub fn normalize_value(question_id: i64, value: &Value) -> Result<Option<AnswerValue>, ScoringError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(AnswerValue::Single(s.clone()))),
        Value::Array(items) => {
            let mut selected = BTreeSet::new();
            for item in items {
                match item {
                    Value::String(s) => {
                        selected.insert(s.clone());
                    }
                    other => {
                        return Err(ScoringError::MalformedAnswer {
                            question_id,
                            reason: format!("list contains a non-string element {}", other),
                        });
                    }
                }
            }
            Ok(Some(AnswerValue::Multiple(selected)))
        }
        other => Err(ScoringError::MalformedAnswer {
            question_id,
            reason: format!("expected a string or a list of strings, got {}", other),
        }),
    }
}
