pub mod catalog;
pub mod select;

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

static BANK_DIR: Dir = include_dir!("src/bank/content");

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("no embedded bank named `{0}`")]
    NotFound(String),
    #[error("failed to read bank file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse bank json")]
    Json(#[from] serde_json::Error),
    #[error("bank `{0}` has no questions")]
    Empty(String),
    #[error("bank `{bank}` question `{question}` needs at least two choices")]
    TooFewChoices { bank: String, question: String },
    #[error("bank `{bank}` question `{question}` must have exactly one correct choice, found {found}")]
    CorrectCount {
        bank: String,
        question: String,
        found: usize,
    },
    #[error("bank `{bank}` has duplicate id `{id}`")]
    DuplicateId { bank: String, id: String },
    #[error("bank `{0}` contains an empty id")]
    EmptyId(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

impl Question {
    pub fn correct_choice(&self) -> &Choice {
        // Guaranteed by Bank::validate before a question reaches gameplay.
        self.choices
            .iter()
            .find(|c| c.is_correct)
            .unwrap_or(&self.choices[0])
    }

    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }
}

/// A question bank: one playable unit of content.
///
/// Banks are embedded in the binary as json and validated on load, so a
/// malformed bank fails at startup rather than mid-game.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bank {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub audience: String,
    #[serde(default)]
    pub sequence: u32,
    #[serde(default)]
    pub coins_per_correct: Option<u32>,
    #[serde(default)]
    pub pass_mark: Option<usize>,
    pub questions: Vec<Question>,
}

impl Bank {
    /// Loads an embedded bank by id.
    pub fn load(id: &str) -> Result<Self, BankError> {
        let file = BANK_DIR
            .get_file(format!("{}.json", id))
            .ok_or_else(|| BankError::NotFound(id.to_string()))?;
        Self::from_json(file.contents())
    }

    /// Loads a bank from a user-supplied json file.
    pub fn from_path(path: &Path) -> Result<Self, BankError> {
        let contents = std::fs::read(path)?;
        Self::from_json(&contents)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, BankError> {
        let bank: Bank = serde_json::from_slice(bytes)?;
        bank.validate()?;
        Ok(bank)
    }

    /// Enforces the structural rules gameplay relies on: every question has
    /// at least two choices and exactly one marked correct, and all ids
    /// within the bank are unique and non-empty.
    pub fn validate(&self) -> Result<(), BankError> {
        if self.id.is_empty() {
            return Err(BankError::EmptyId(self.title.clone()));
        }
        if self.questions.is_empty() {
            return Err(BankError::Empty(self.id.clone()));
        }
        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if question.id.is_empty() {
                return Err(BankError::EmptyId(self.id.clone()));
            }
            if !question_ids.insert(question.id.as_str()) {
                return Err(BankError::DuplicateId {
                    bank: self.id.clone(),
                    id: question.id.clone(),
                });
            }
            if question.choices.len() < 2 {
                return Err(BankError::TooFewChoices {
                    bank: self.id.clone(),
                    question: question.id.clone(),
                });
            }
            let mut choice_ids = HashSet::new();
            for choice in &question.choices {
                if choice.id.is_empty() {
                    return Err(BankError::EmptyId(self.id.clone()));
                }
                if !choice_ids.insert(choice.id.as_str()) {
                    return Err(BankError::DuplicateId {
                        bank: self.id.clone(),
                        id: choice.id.clone(),
                    });
                }
            }
            let found = question.choices.iter().filter(|c| c.is_correct).count();
            if found != 1 {
                return Err(BankError::CorrectCount {
                    bank: self.id.clone(),
                    question: question.id.clone(),
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Ids of every embedded bank, unsorted.
    pub fn embedded_ids() -> Vec<String> {
        BANK_DIR
            .files()
            .filter_map(|f| {
                f.path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .collect()
    }

    pub fn load_all() -> Result<Vec<Self>, BankError> {
        Self::embedded_ids()
            .iter()
            .map(|id| Self::load(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn bank_json(questions: &str) -> String {
        format!(
            r#"{{
                "id": "test-bank",
                "title": "Test Bank",
                "topic": "finance",
                "audience": "kids",
                "questions": [{}]
            }}"#,
            questions
        )
    }

    #[test]
    fn loads_every_embedded_bank() {
        let banks = Bank::load_all().unwrap();
        assert!(!banks.is_empty());
        for bank in &banks {
            assert!(!bank.questions.is_empty(), "{} is empty", bank.id);
        }
    }

    #[test]
    fn unknown_embedded_id_is_not_found() {
        assert_matches!(Bank::load("no-such-bank"), Err(BankError::NotFound(_)));
    }

    #[test]
    fn each_embedded_question_has_one_correct_choice() {
        for bank in Bank::load_all().unwrap() {
            for question in &bank.questions {
                assert_eq!(
                    question.choices.iter().filter(|c| c.is_correct).count(),
                    1,
                    "{} {}",
                    bank.id,
                    question.id
                );
            }
        }
    }

    #[test]
    fn rejects_question_with_no_correct_choice() {
        let json = bank_json(
            r#"{
                "id": "q1",
                "prompt": "pick one",
                "choices": [
                    { "id": "a", "label": "first" },
                    { "id": "b", "label": "second" }
                ]
            }"#,
        );
        assert_matches!(
            Bank::from_json(json.as_bytes()),
            Err(BankError::CorrectCount { found: 0, .. })
        );
    }

    #[test]
    fn rejects_question_with_two_correct_choices() {
        let json = bank_json(
            r#"{
                "id": "q1",
                "prompt": "pick one",
                "choices": [
                    { "id": "a", "label": "first", "is_correct": true },
                    { "id": "b", "label": "second", "is_correct": true }
                ]
            }"#,
        );
        assert_matches!(
            Bank::from_json(json.as_bytes()),
            Err(BankError::CorrectCount { found: 2, .. })
        );
    }

    #[test]
    fn rejects_question_with_a_single_choice() {
        let json = bank_json(
            r#"{
                "id": "q1",
                "prompt": "pick one",
                "choices": [{ "id": "a", "label": "only", "is_correct": true }]
            }"#,
        );
        assert_matches!(
            Bank::from_json(json.as_bytes()),
            Err(BankError::TooFewChoices { .. })
        );
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let q = r#"{
            "id": "q1",
            "prompt": "pick one",
            "choices": [
                { "id": "a", "label": "first", "is_correct": true },
                { "id": "b", "label": "second" }
            ]
        }"#;
        let json = bank_json(&format!("{},{}", q, q));
        assert_matches!(
            Bank::from_json(json.as_bytes()),
            Err(BankError::DuplicateId { .. })
        );
    }

    #[test]
    fn rejects_empty_bank() {
        assert_matches!(
            Bank::from_json(bank_json("").as_bytes()),
            Err(BankError::Empty(_))
        );
    }

    #[test]
    fn correct_choice_finds_the_marked_one() {
        let bank = Bank::load("finance-kids-spending").unwrap();
        for question in &bank.questions {
            assert!(question.correct_choice().is_correct);
        }
    }

    #[test]
    fn choice_lookup_by_id() {
        let bank = Bank::load("finance-kids-spending").unwrap();
        let question = &bank.questions[0];
        assert!(question.choice("b").is_some());
        assert!(question.choice("zz").is_none());
    }

    #[test]
    fn per_bank_overrides_deserialize() {
        let teens = Bank::load("finance-teens-budgeting").unwrap();
        assert_eq!(teens.coins_per_correct, Some(3));
        let brain = Bank::load("brain-teens-habits").unwrap();
        assert_eq!(brain.pass_mark, Some(4));
    }
}
