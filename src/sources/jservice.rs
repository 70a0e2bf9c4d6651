use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use super::{QuestionSource, SourceError, SourceResult, http};
use crate::question::{AnnounceStyle, RawQuestion};

const NAME: &str = "jservice";
const BASE_URL: &str = "http://jservice.io/api/random";

/// jService client returning random Jeopardy clues.
#[derive(Clone)]
pub struct JServiceSource {
    client: Client,
    base_url: Arc<str>,
}

#[derive(Debug, Deserialize)]
struct Clue {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    category: Option<ClueCategory>,
}

#[derive(Debug, Deserialize)]
struct ClueCategory {
    #[serde(default)]
    title: Option<String>,
}

impl From<Clue> for RawQuestion {
    fn from(clue: Clue) -> Self {
        RawQuestion {
            question: clue.question,
            answer: clue.answer,
            category: clue.category.and_then(|category| category.title),
            source_id: clue.id.map(|id| id.to_string()),
            ..RawQuestion::default()
        }
        .tagged(NAME, AnnounceStyle::Categorized)
    }
}

impl JServiceSource {
    /// Client against the public endpoint.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            client: http::client()?,
            base_url: Arc::from(BASE_URL),
        })
    }
}

impl QuestionSource for JServiceSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
        let source = self.clone();
        Box::pin(async move {
            let clues: Vec<Clue> = http::get_json(&source.client, &source.base_url, &[]).await?;
            clues
                .into_iter()
                .next()
                .map(RawQuestion::from)
                .ok_or_else(|| SourceError::Empty {
                    provider: NAME.into(),
                })
        })
    }
}
