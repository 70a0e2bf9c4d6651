use std::{fs, path::Path, sync::Arc};

use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};

use super::{QuestionSource, SourceError, SourceResult};
use crate::question::{AnnounceStyle, RawQuestion};

/// Default location of the local question bank.
pub const DEFAULT_BANK_PATH: &str = "config/questions.json";
const BANK_NAME: &str = "bank";

/// Offline provider drawing random questions from a fixed list.
#[derive(Clone)]
pub struct QuestionBank {
    questions: Arc<[RawQuestion]>,
}

impl QuestionBank {
    /// Build a bank from in-memory records.
    pub fn new(questions: Vec<RawQuestion>) -> Self {
        Self {
            questions: questions.into(),
        }
    }

    /// Load a JSON array of `{question, answer, category}` objects.
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SourceError::BankRead {
            path: path.to_path_buf(),
            source,
        })?;
        let questions = serde_json::from_str::<Vec<RawQuestion>>(&contents).map_err(|source| {
            SourceError::BankParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::new(questions))
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no question at all.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionSource for QuestionBank {
    fn name(&self) -> &str {
        BANK_NAME
    }

    fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
        let picked = self.questions.choose(&mut rng()).cloned();
        Box::pin(async move {
            picked
                .map(|raw| raw.tagged(BANK_NAME, AnnounceStyle::Plain))
                .ok_or_else(|| SourceError::Empty {
                    provider: BANK_NAME.into(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_tagged_question() {
        let bank = QuestionBank::new(vec![RawQuestion::new("2 + 2?", "4", Some("Math"))]);
        let raw = bank.fetch().await.unwrap();
        assert_eq!(raw.question.as_deref(), Some("2 + 2?"));
        assert_eq!(raw.source, "bank");
    }

    #[tokio::test]
    async fn empty_bank_is_an_error() {
        let bank = QuestionBank::new(Vec::new());
        assert!(matches!(bank.fetch().await, Err(SourceError::Empty { .. })));
    }

    #[test]
    fn parses_json_records() {
        let records: Vec<RawQuestion> = serde_json::from_str(
            r#"[{"question": "Capital of Norway?", "answer": "Oslo"}, {"question": "Broken"}]"#,
        )
        .unwrap();
        let bank = QuestionBank::new(records);
        assert_eq!(bank.len(), 2);
    }
}
