use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};
use reqwest::Client;
use serde::Deserialize;

use super::{QuestionSource, SourceError, SourceResult, http};
use crate::question::{AnnounceStyle, RawQuestion};

const NAME: &str = "opentdb";
const BASE_URL: &str = "https://opentdb.com/api.php";
/// General knowledge, books, video games, science & nature, computers, mathematics,
/// mythology, sports, geography, history, politics, animals, comics and gadgets.
const CATEGORIES: [u32; 14] = [9, 11, 15, 17, 18, 20, 21, 22, 23, 24, 26, 27, 29, 30];

/// Open Trivia Database client asking for one base64-encoded question per call.
#[derive(Clone)]
pub struct OpenTdbSource {
    client: Client,
    base_url: Arc<str>,
    categories: Arc<[u32]>,
}

#[derive(Debug, Deserialize)]
struct OpenTdbResponse {
    #[serde(default)]
    results: Vec<OpenTdbQuestion>,
}

#[derive(Debug, Deserialize)]
struct OpenTdbQuestion {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    correct_answer: Option<String>,
}

impl OpenTdbSource {
    /// Client against the public endpoint with the default category mix.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            client: http::client()?,
            base_url: Arc::from(BASE_URL),
            categories: Arc::from(CATEGORIES.as_slice()),
        })
    }
}

impl QuestionSource for OpenTdbSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
        let source = self.clone();
        let category = self.categories.choose(&mut rng()).copied().unwrap_or(9);
        Box::pin(async move {
            let query = [
                ("amount", "1".to_string()),
                ("category", category.to_string()),
                ("type", "multiple".to_string()),
                ("encode", "base64".to_string()),
            ];
            let response: OpenTdbResponse =
                http::get_json(&source.client, &source.base_url, &query).await?;
            let question = response
                .results
                .into_iter()
                .next()
                .ok_or_else(|| SourceError::Empty {
                    provider: NAME.into(),
                })?;
            decode_question(question)
        })
    }
}

fn decode_question(question: OpenTdbQuestion) -> SourceResult<RawQuestion> {
    Ok(RawQuestion {
        question: question.question.as_deref().map(decode_field).transpose()?,
        answer: question.correct_answer.as_deref().map(decode_field).transpose()?,
        category: question.category.as_deref().map(decode_field).transpose()?,
        ..RawQuestion::default()
    }
    .tagged(NAME, AnnounceStyle::Plain))
}

fn decode_field(value: &str) -> SourceResult<String> {
    let malformed = |reason: String| SourceError::Malformed {
        provider: NAME.into(),
        reason,
    };
    let bytes = STANDARD
        .decode(value)
        .map_err(|err| malformed(format!("invalid base64: {err}")))?;
    String::from_utf8(bytes).map_err(|err| malformed(format!("invalid utf-8: {err}")))
}
