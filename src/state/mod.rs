//! Shared engine state.

pub mod session;
pub mod supervisor;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::{
    config::TriviaConfig,
    dao::score_store::ScoreStore,
    error::ServiceError,
    question::QuestionNormalizer,
    services::chat::ChatSink,
    sources::{self, SourcePolicy, WeightedSource},
};

pub use self::session::{SessionPhase, TriviaSession};
pub use self::supervisor::{Supervisor, SupervisorAction};

/// Shared handle passed to every service function.
pub type SharedState = Arc<TriviaState>;

/// Central engine state: the single trivia session of a chat context and its collaborators.
///
/// Every mutation of the session goes through [`TriviaState::session`]; provider fetches
/// happen with that lock released.
pub struct TriviaState {
    config: TriviaConfig,
    session: Mutex<TriviaSession>,
    supervisor: Mutex<Supervisor>,
    sources: SourcePolicy,
    normalizer: QuestionNormalizer,
    chat: Arc<dyn ChatSink>,
    scores: Arc<dyn ScoreStore>,
    live: watch::Sender<bool>,
}

impl TriviaState {
    /// Construct a new [`TriviaState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The hosting context starts out as not live.
    pub fn new(
        config: TriviaConfig,
        sources: SourcePolicy,
        chat: Arc<dyn ChatSink>,
        scores: Arc<dyn ScoreStore>,
    ) -> SharedState {
        let (live_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            session: Mutex::new(TriviaSession::new(config.session_settings())),
            supervisor: Mutex::new(Supervisor::new(config.auto_start)),
            normalizer: QuestionNormalizer::new(&config.blacklist),
            config,
            sources,
            chat,
            scores,
            live: live_tx,
        })
    }

    /// Build the configured providers and the state around them.
    ///
    /// Providers that fail to initialise are skipped; at least one must remain.
    pub fn from_config(
        config: TriviaConfig,
        chat: Arc<dyn ChatSink>,
        scores: Arc<dyn ScoreStore>,
    ) -> Result<SharedState, ServiceError> {
        let mut weighted = Vec::with_capacity(config.providers.len());
        for provider in &config.providers {
            match sources::build_source(provider.kind, config.bank_path.as_deref()) {
                Ok(source) => {
                    info!(provider = source.name(), weight = provider.weight, "question provider enabled");
                    weighted.push(WeightedSource {
                        source,
                        weight: provider.weight,
                    });
                }
                Err(err) => {
                    warn!(kind = ?provider.kind, error = %err, "question provider unavailable; skipping");
                }
            }
        }

        let sources = SourcePolicy::from_weighted(weighted).ok_or(ServiceError::NoProvider)?;
        Ok(Self::new(config, sources, chat, scores))
    }

    /// Immutable configuration.
    pub fn config(&self) -> &TriviaConfig {
        &self.config
    }

    /// The trivia session guarded by its single-writer lock.
    pub fn session(&self) -> &Mutex<TriviaSession> {
        &self.session
    }

    /// Liveness supervisor bookkeeping.
    pub fn supervisor(&self) -> &Mutex<Supervisor> {
        &self.supervisor
    }

    /// Provider selection policy.
    pub fn sources(&self) -> &SourcePolicy {
        &self.sources
    }

    /// Question normalizer.
    pub fn normalizer(&self) -> &QuestionNormalizer {
        &self.normalizer
    }

    /// Outbound chat.
    pub fn chat(&self) -> &dyn ChatSink {
        self.chat.as_ref()
    }

    /// Participant point balances.
    pub fn scores(&self) -> &dyn ScoreStore {
        self.scores.as_ref()
    }

    /// Current liveness of the hosting context.
    pub fn is_live(&self) -> bool {
        *self.live.borrow()
    }

    /// Update the liveness signal observed by the supervisor.
    pub fn set_live(&self, live: bool) {
        let previous = self.live.send_replace(live);
        if previous != live {
            info!(live, "hosting context liveness changed");
        }
    }
}
