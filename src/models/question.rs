// src/models/question.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// How a question is answered.
///
/// The wire names are the widget names the questionnaire front-end uses:
/// `radio` (one option, yes/no style), `checkbox` (any subset of options)
/// and `dropdown` (one option out of an ordered list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKind {
    #[serde(rename = "radio", alias = "single")]
    SingleChoice,
    #[serde(rename = "checkbox", alias = "multiple")]
    MultiChoice,
    #[serde(rename = "dropdown", alias = "ranked")]
    RankedChoice,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::SingleChoice => "radio",
            SelectionKind::MultiChoice => "checkbox",
            SelectionKind::RankedChoice => "dropdown",
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "radio" | "single" => Ok(SelectionKind::SingleChoice),
            "checkbox" | "multiple" => Ok(SelectionKind::MultiChoice),
            "dropdown" | "ranked" => Ok(SelectionKind::RankedChoice),
            other => Err(format!("unknown selector '{}'", other)),
        }
    }
}

/// A questionnaire item as handed out by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Paradigm (thematic category) the question belongs to.
    pub paradigm: String,

    pub text: String,

    #[serde(rename = "selector")]
    pub kind: SelectionKind,

    /// Maximum contribution of this question to the total score.
    pub weight: i64,

    /// Ordered options. Order matters for ranked-choice scoring.
    pub options: Vec<String>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub paradigm_id: i64,
    pub text: String,
    pub selector: String,

    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    pub weight: i64,
}

impl TryFrom<QuestionRow> for Question {
    type Error = String;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let kind = row.selector.parse::<SelectionKind>()?;
        Ok(Question {
            id: row.id,
            paradigm: row.paradigm_id.to_string(),
            text: row.text,
            kind,
            weight: row.weight,
            options: row.options.0,
        })
    }
}

/// Represents the 'paradigms' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Paradigm {
    pub id: i64,
    pub name: String,
    pub description: String,
}
