// src/services/scoring.rs

//! Answer evaluation.
//!
//! Every question contributes between `0` and its `weight`:
//!
//! * single-choice: the full weight for the affirmative answer, nothing otherwise;
//! * multi-choice: `weight * selected / options`, floored;
//! * ranked-choice: `weight * (position + 1) / options`, floored.
//!
//! The total is mapped onto a policy tier through a [`PolicyLadder`].

use std::collections::HashMap;
use std::fmt;

use crate::{
    config::{AFFIRMATIVE_ANSWER, CATCH_ALL_POLICY, POLICY_TIERS},
    models::{
        answer::AnswerValue,
        question::{Question, SelectionKind},
        result::ScoreResult,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The submitted value cannot be scored against the question.
    MalformedAnswer { question_id: i64, reason: String },
    /// The question itself cannot be scored (no options, negative weight).
    InvalidQuestion { question_id: i64, reason: String },
}

impl ScoringError {
    pub fn question_id(&self) -> i64 {
        match self {
            ScoringError::MalformedAnswer { question_id, .. }
            | ScoringError::InvalidQuestion { question_id, .. } => *question_id,
        }
    }

    fn malformed(question_id: i64, reason: impl Into<String>) -> Self {
        ScoringError::MalformedAnswer {
            question_id,
            reason: reason.into(),
        }
    }

    fn invalid(question_id: i64, reason: impl Into<String>) -> Self {
        ScoringError::InvalidQuestion {
            question_id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ScoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::MalformedAnswer {
                question_id,
                reason,
            } => write!(f, "malformed answer for question {}: {}", question_id, reason),
            ScoringError::InvalidQuestion {
                question_id,
                reason,
            } => write!(f, "invalid question {}: {}", question_id, reason),
        }
    }
}

impl std::error::Error for ScoringError {}

/// What to do when a single question cannot be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Score the question as 0, keep a warning, carry on with the rest.
    #[default]
    SkipAndWarn,
    /// Fail the whole evaluation with the first error.
    Abort,
}

/// Ordered `(upper_bound_exclusive, label)` table with a catch-all label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLadder {
    tiers: Vec<(i64, String)>,
    catch_all: String,
}

impl PolicyLadder {
    /// Tiers are sorted by bound so lookup can stop at the first match.
    pub fn new(mut tiers: Vec<(i64, String)>, catch_all: impl Into<String>) -> Self {
        tiers.sort_by_key(|(bound, _)| *bound);
        Self {
            tiers,
            catch_all: catch_all.into(),
        }
    }

    pub fn assign(&self, total_score: i64) -> &str {
        self.tiers
            .iter()
            .find(|(bound, _)| total_score < *bound)
            .map(|(_, label)| label.as_str())
            .unwrap_or(self.catch_all.as_str())
    }
}

impl Default for PolicyLadder {
    fn default() -> Self {
        Self::new(
            POLICY_TIERS
                .iter()
                .map(|(bound, label)| (*bound, label.to_string()))
                .collect(),
            CATCH_ALL_POLICY,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub ladder: PolicyLadder,
    pub error_policy: ErrorPolicy,
    /// Treat a ranked-choice answer missing from the options as the first option.
    pub lax_ranked_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub question_id: i64,
    pub score: i64,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub total_score: i64,
    pub policy: String,
    /// One entry per catalog question, in catalog order.
    pub contributions: Vec<Contribution>,
    pub warnings: Vec<ScoringError>,
}

impl Evaluation {
    pub fn result(&self) -> ScoreResult {
        ScoreResult {
            total_score: self.total_score,
            policy: self.policy.clone(),
        }
    }
}

/// Scores `answers` against `questions`.
///
/// Unanswered questions contribute 0. Errors are collected as warnings or
/// returned immediately depending on `config.error_policy`.
pub fn evaluate(
    answers: &HashMap<i64, AnswerValue>,
    questions: &[Question],
    config: &ScoringConfig,
) -> Result<Evaluation, ScoringError> {
    let mut contributions = Vec::with_capacity(questions.len());
    let mut warnings = Vec::new();

    for question in questions {
        let score = match answers.get(&question.id) {
            None => 0,
            Some(answer) => match score_question(question, answer, config) {
                Ok((score, note)) => {
                    warnings.extend(note);
                    score
                }
                Err(err) => match config.error_policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::SkipAndWarn => {
                        warnings.push(err);
                        0
                    }
                },
            },
        };
        contributions.push(Contribution {
            question_id: question.id,
            score,
        });
    }

    let total_score = contributions
        .iter()
        .fold(0i64, |total, c| total.saturating_add(c.score));
    let policy = config.ladder.assign(total_score).to_string();

    Ok(Evaluation {
        total_score,
        policy,
        contributions,
        warnings,
    })
}

/// Scores a single answered question.
/// The optional warning is a non-fatal note (lax ranked fallback).
fn score_question(
    question: &Question,
    answer: &AnswerValue,
    config: &ScoringConfig,
) -> Result<(i64, Option<ScoringError>), ScoringError> {
    if question.weight < 0 {
        return Err(ScoringError::invalid(
            question.id,
            format!("negative weight {}", question.weight),
        ));
    }

    match (question.kind, answer) {
        (SelectionKind::SingleChoice, AnswerValue::Single(value)) => {
            let score = if value == AFFIRMATIVE_ANSWER {
                question.weight
            } else {
                0
            };
            Ok((score, None))
        }
        (SelectionKind::MultiChoice, AnswerValue::Multiple(selected)) => {
            let total = option_count(question)?;
            if let Some(unknown) = selected.iter().find(|s| !question.options.contains(*s)) {
                return Err(ScoringError::malformed(
                    question.id,
                    format!("'{}' is not one of the options", unknown),
                ));
            }
            Ok((scaled(question, selected.len() as i64, total)?, None))
        }
        (SelectionKind::RankedChoice, AnswerValue::Single(value)) => {
            let total = option_count(question)?;
            match question.options.iter().position(|o| o == value) {
                Some(index) => Ok((scaled(question, index as i64 + 1, total)?, None)),
                None if config.lax_ranked_fallback => Ok((
                    question.weight / total,
                    Some(ScoringError::malformed(
                        question.id,
                        format!("'{}' is not one of the options, scored as the first", value),
                    )),
                )),
                None => Err(ScoringError::malformed(
                    question.id,
                    format!("'{}' is not one of the options", value),
                )),
            }
        }
        (kind, answer) => Err(ScoringError::malformed(
            question.id,
            format!("{} question answered with {}", kind, answer.shape()),
        )),
    }
}

/// `weight * numerator / total`, floored. A weight too large to scale is a broken question.
fn scaled(question: &Question, numerator: i64, total: i64) -> Result<i64, ScoringError> {
    question
        .weight
        .checked_mul(numerator)
        .map(|product| product / total)
        .ok_or_else(|| {
            ScoringError::invalid(
                question.id,
                format!("weight {} overflows when scaled", question.weight),
            )
        })
}

/// Denominator for the proportional kinds; an empty option list cannot be scored.
fn option_count(question: &Question) -> Result<i64, ScoringError> {
    match question.options.len() {
        0 => Err(ScoringError::invalid(question.id, "question has no options")),
        n => Ok(n as i64),
    }
}
