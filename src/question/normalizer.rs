//! Cleans raw provider records into [`Question`]s and vetoes the ones unfit for open chat play.

use thiserror::Error;

use super::{Question, RawQuestion};

/// Inline emphasis markup some providers leave in their answers.
const EMPHASIS_TAGS: [&str; 8] = [
    "<i>", "</i>", "<b>", "</b>", "<em>", "</em>", "<strong>", "</strong>",
];

/// Phrases rejected when no blacklist is configured. Multiple-choice phrasing and links make
/// no sense when the options are never shown.
pub const DEFAULT_BLACKLIST: [&str; 4] = [
    "href=",
    "which of these",
    "which one of these",
    "which of the following",
];

/// Reason a raw question was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The payload lacked a mandatory field.
    #[error("payload is missing the `{0}` field")]
    MissingField(&'static str),
    /// The provider flagged the question as disabled.
    #[error("question is disabled by its provider")]
    Disabled,
    /// The question text is empty.
    #[error("question text is empty")]
    EmptyQuestion,
    /// Nothing is left of the answer once cleaned.
    #[error("answer is empty after normalization")]
    EmptyAnswer,
    /// The question or answer contains a blacklisted phrase.
    #[error("contains blacklisted phrase `{0}`")]
    Blacklisted(String),
}

/// Pure cleaning and veto logic applied to every fetched candidate.
#[derive(Debug, Clone)]
pub struct QuestionNormalizer {
    blacklist: Vec<String>,
}

impl Default for QuestionNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BLACKLIST)
    }
}

impl QuestionNormalizer {
    /// Build a normalizer rejecting any question or answer containing one of `blacklist`
    /// (case-insensitive).
    pub fn new<I, S>(blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist = blacklist
            .into_iter()
            .map(|phrase| phrase.as_ref().trim().to_lowercase())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        Self { blacklist }
    }

    /// Validate and clean `raw`, returning the playable question or the reason it was vetoed.
    pub fn normalize(&self, raw: RawQuestion) -> Result<Question, Rejection> {
        if raw.disabled {
            return Err(Rejection::Disabled);
        }

        let text = raw.question.ok_or(Rejection::MissingField("question"))?;
        let raw_answer = raw.answer.ok_or(Rejection::MissingField("answer"))?;

        let text = text.trim().to_owned();
        if text.is_empty() {
            return Err(Rejection::EmptyQuestion);
        }

        if let Some(phrase) = self.blacklisted_phrase(&text, &raw_answer) {
            return Err(Rejection::Blacklisted(phrase.to_owned()));
        }

        let answer = clean_answer(&raw_answer);
        if answer.is_empty() {
            return Err(Rejection::EmptyAnswer);
        }

        let category = raw
            .category
            .map(|category| category.replace('_', " ").trim().to_owned())
            .filter(|category| !category.is_empty());

        Ok(Question {
            text,
            answer,
            category,
            source: raw.source,
            source_id: raw.source_id,
            style: raw.style,
        })
    }

    fn blacklisted_phrase(&self, text: &str, answer: &str) -> Option<&str> {
        let text = text.to_lowercase();
        let answer = answer.to_lowercase();
        self.blacklist
            .iter()
            .find(|phrase| text.contains(phrase.as_str()) || answer.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

/// Strip markup, parentheticals, and a leading article from a provider answer.
pub fn clean_answer(answer: &str) -> String {
    let mut cleaned = answer.to_owned();
    for tag in EMPHASIS_TAGS {
        cleaned = cleaned.replace(tag, "").replace(&tag.to_uppercase(), "");
    }
    cleaned.retain(|c| c != '\\');

    let cleaned = drop_parentheticals(&cleaned);
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = trim_decorations(&cleaned);

    let cleaned = strip_prefix_ignore_case(cleaned, "a ")
        .or_else(|| strip_prefix_ignore_case(cleaned, "an "))
        .unwrap_or(cleaned);
    let cleaned = strip_prefix_ignore_case(cleaned, "the ").unwrap_or(cleaned);

    trim_decorations(cleaned).to_owned()
}

fn drop_parentheticals(value: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn trim_decorations(value: &str) -> &str {
    value.trim_matches(|c: char| c == '"' || c == '.' || c.is_whitespace())
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &value[prefix.len()..])
}
