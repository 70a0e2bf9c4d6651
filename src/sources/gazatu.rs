use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;

use super::{QuestionSource, SourceError, SourceResult, http};
use crate::question::{AnnounceStyle, RawQuestion};

const NAME: &str = "gazatu";
const BASE_URL: &str = "https://api.gazatu.xyz/trivia/questions";
const CATEGORIES: [&str; 24] = [
    "W_OMEGALUL_W",
    "Vietnam",
    "Video_Games",
    "Video Games",
    "Twitch",
    "Sports",
    "Spongebob",
    "Jokes",
    "Science",
    "Programming",
    "Music",
    "Memes",
    "Math",
    "Maths",
    "Movies",
    "Languages",
    "History",
    "Geography",
    "Gachimuchi",
    "Gachi",
    "Emotes",
    "Bees",
    "Country",
    "Books",
];

/// Gazatu community trivia client. Questions are always filed under a category.
#[derive(Clone)]
pub struct GazatuSource {
    client: Client,
    base_url: Arc<str>,
    include: Arc<str>,
}

impl GazatuSource {
    /// Client against the public endpoint including every known category.
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            client: http::client()?,
            base_url: Arc::from(BASE_URL),
            include: Arc::from(format!("[{}]", CATEGORIES.join(","))),
        })
    }
}

impl QuestionSource for GazatuSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
        let source = self.clone();
        Box::pin(async move {
            let query = [
                ("count", "1".to_string()),
                ("include", source.include.to_string()),
            ];
            let questions: Vec<RawQuestion> =
                http::get_json(&source.client, &source.base_url, &query).await?;
            questions
                .into_iter()
                .next()
                .map(|raw| raw.tagged(NAME, AnnounceStyle::Categorized))
                .ok_or_else(|| SourceError::Empty {
                    provider: NAME.into(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_maps_onto_raw_question() {
        let questions: Vec<RawQuestion> = serde_json::from_str(
            r#"[{"id": "1", "question": "Best bee?", "answer": "Bumblebee",
                 "category": "Bees", "disabled": true, "submitter": "someone"}]"#,
        )
        .unwrap();
        let raw = questions[0].clone().tagged(NAME, AnnounceStyle::Categorized);
        assert!(raw.disabled);
        assert_eq!(raw.category.as_deref(), Some("Bees"));
        assert_eq!(raw.style, AnnounceStyle::Categorized);
        assert_eq!(raw.source_id.as_deref(), Some("1"));
    }

    #[test]
    fn numeric_record_id_is_kept_as_text() {
        let raw: RawQuestion =
            serde_json::from_str(r#"{"id": 731, "question": "q", "answer": "a"}"#).unwrap();
        assert_eq!(raw.source_id.as_deref(), Some("731"));
    }
}
