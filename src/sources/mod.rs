//! Question providers and the policy choosing which one to ask.

mod bank;
mod error;
#[cfg(feature = "http-sources")]
mod gazatu;
#[cfg(feature = "http-sources")]
mod http;
#[cfg(feature = "http-sources")]
mod jservice;
#[cfg(feature = "http-sources")]
mod opentdb;

use std::{path::Path, sync::Arc};

use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};
use serde::Deserialize;
use tracing::warn;

use crate::question::RawQuestion;

pub use self::bank::QuestionBank;
pub use self::error::{SourceError, SourceResult};
#[cfg(feature = "http-sources")]
pub use self::{gazatu::GazatuSource, jservice::JServiceSource, opentdb::OpenTdbSource};

/// Capability of producing one raw question per call.
///
/// Implementations never retry on their own; the acquisition loop decides what to do with a
/// failure.
pub trait QuestionSource: Send + Sync {
    /// Short provider name used in logs and on the produced questions.
    fn name(&self) -> &str;
    /// Fetch a single raw question.
    fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>>;
}

/// Provider families that can be enabled from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Open Trivia Database.
    Opentdb,
    /// Gazatu community trivia API.
    Gazatu,
    /// jService (Jeopardy clues).
    Jservice,
    /// Local JSON question bank.
    Bank,
}

/// A provider together with its relative selection weight.
#[derive(Clone)]
pub struct WeightedSource {
    /// The provider.
    pub source: Arc<dyn QuestionSource>,
    /// Relative weight; zero disables the provider.
    pub weight: u32,
}

/// How the acquisition loop picks a provider for each attempt.
#[derive(Clone)]
pub enum SourcePolicy {
    /// Always ask the same provider.
    Fixed(Arc<dyn QuestionSource>),
    /// Weighted random choice among several providers.
    Weighted(Vec<WeightedSource>),
}

impl SourcePolicy {
    /// Build a policy from weighted providers, collapsing to [`SourcePolicy::Fixed`] when only
    /// one remains.
    pub fn from_weighted(mut sources: Vec<WeightedSource>) -> Option<Self> {
        sources.retain(|entry| entry.weight > 0);
        match sources.len() {
            0 => None,
            1 => sources.pop().map(|entry| SourcePolicy::Fixed(entry.source)),
            _ => Some(SourcePolicy::Weighted(sources)),
        }
    }

    /// Choose the provider for the next attempt.
    pub fn pick(&self) -> Option<Arc<dyn QuestionSource>> {
        match self {
            SourcePolicy::Fixed(source) => Some(source.clone()),
            SourcePolicy::Weighted(sources) => {
                match sources.choose_weighted(&mut rng(), |entry| entry.weight) {
                    Ok(entry) => Some(entry.source.clone()),
                    Err(err) => {
                        warn!(error = %err, "weighted provider choice failed; using first provider");
                        sources.first().map(|entry| entry.source.clone())
                    }
                }
            }
        }
    }
}

/// Instantiate the provider for `kind`.
///
/// `bank_path` is required for [`ProviderKind::Bank`].
pub fn build_source(
    kind: ProviderKind,
    bank_path: Option<&Path>,
) -> SourceResult<Arc<dyn QuestionSource>> {
    match kind {
        ProviderKind::Bank => {
            let path = bank_path.unwrap_or_else(|| Path::new(bank::DEFAULT_BANK_PATH));
            Ok(Arc::new(QuestionBank::from_path(path)?))
        }
        #[cfg(feature = "http-sources")]
        ProviderKind::Opentdb => Ok(Arc::new(OpenTdbSource::new()?)),
        #[cfg(feature = "http-sources")]
        ProviderKind::Gazatu => Ok(Arc::new(GazatuSource::new()?)),
        #[cfg(feature = "http-sources")]
        ProviderKind::Jservice => Ok(Arc::new(JServiceSource::new()?)),
        #[cfg(not(feature = "http-sources"))]
        other => Err(SourceError::Malformed {
            provider: format!("{other:?}").to_lowercase(),
            reason: "built without the `http-sources` feature".into(),
        }),
    }
}
