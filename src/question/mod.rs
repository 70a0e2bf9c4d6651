//! Question records as they travel from a provider to the active session.

pub mod hint;
pub mod memory;
pub mod normalizer;

use serde::{Deserialize, Deserializer};

pub use self::memory::RecencyMemory;
pub use self::normalizer::{QuestionNormalizer, Rejection};

/// How the announcement for a question is phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnounceStyle {
    /// Question text only; the category is mentioned when one is known.
    #[default]
    Plain,
    /// The provider always files questions under a category and the announcement requires it.
    Categorized,
}

/// Unvalidated question record as returned by a [`QuestionSource`](crate::sources::QuestionSource).
///
/// Every field is optional because providers regularly hand back partial payloads; the
/// [`QuestionNormalizer`] decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    /// Question (or clue) text.
    #[serde(default)]
    pub question: Option<String>,
    /// Expected answer before normalization.
    #[serde(default)]
    pub answer: Option<String>,
    /// Provider category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional media attachment (image URL and the like); carried but never announced.
    #[serde(default)]
    pub media: Option<String>,
    /// Provider-side flag marking the question as withdrawn.
    #[serde(default)]
    pub disabled: bool,
    /// Provider-side record id; numeric ids are kept in their decimal form.
    #[serde(default, rename = "id", deserialize_with = "deserialize_record_id")]
    pub source_id: Option<String>,
    /// Name of the provider that produced the record.
    #[serde(skip)]
    pub source: String,
    /// Announcement style dictated by the provider.
    #[serde(skip)]
    pub style: AnnounceStyle,
}

impl RawQuestion {
    /// Build a complete raw record, mostly useful for fixed banks and tests.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category: Option<&str>,
    ) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            category: category.map(str::to_owned),
            ..Self::default()
        }
    }

    /// Tag the record with the provider that produced it.
    pub fn tagged(mut self, source: &str, style: AnnounceStyle) -> Self {
        self.source = source.to_owned();
        self.style = style;
        self
    }
}

/// Normalized question owned by the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Question text, used verbatim for recency checks.
    pub text: String,
    /// Normalized answer shown in hints and reveals.
    pub answer: String,
    /// Category label, if the provider supplied one.
    pub category: Option<String>,
    /// Provider name the question came from.
    pub source: String,
    /// Record id within the provider, when it exposes one.
    pub source_id: Option<String>,
    /// Announcement style dictated by the provider.
    pub style: AnnounceStyle,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RecordId>::deserialize(deserializer)?.map(|id| match id {
        RecordId::Text(text) => text,
        RecordId::Number(number) => number.to_string(),
    }))
}
