//! Orchestration of the question lifecycle around the session lock.
//!
//! Every function locks the session only for synchronous state transitions. Provider fetches
//! and score-store calls always run with the lock released.

use std::time::Instant;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    question::Question,
    services::messages,
    state::{
        SharedState, TriviaState,
        session::{Consolation, Poll, StepOutcome, TicketId, TriviaSession},
    },
};

/// Result of one bounded acquisition loop.
#[derive(Debug)]
enum Acquisition {
    Adopted(Question),
    Exhausted { attempts: u32 },
}

/// Run one lifecycle tick at the current time.
pub async fn tick(state: &SharedState) {
    tick_at(state, Instant::now()).await;
}

/// Run one lifecycle tick as if it happened at `now`.
pub async fn tick_at(state: &SharedState, now: Instant) {
    let mut session = state.session().lock().await;
    match session.poll(now) {
        Poll::Inert => {}
        Poll::Acquire(ticket) => {
            drop(session);
            acquire(state, ticket, now).await;
        }
        Poll::Step(outcome) => {
            let owed = publish_step(state, &mut session, outcome);
            drop(session);
            pay_consolation(state, owed).await;
        }
    }
}

/// Check a chat message against the current question.
///
/// Returns `true` when the message resolved the question.
pub async fn handle_chat_message(state: &SharedState, participant: &str, message: &str) -> bool {
    handle_chat_message_at(state, participant, message, Instant::now()).await
}

/// [`handle_chat_message`] with an explicit clock.
pub async fn handle_chat_message_at(
    state: &SharedState,
    participant: &str,
    message: &str,
    now: Instant,
) -> bool {
    let correct = state
        .session()
        .lock()
        .await
        .try_answer(participant, message, now);
    let Some(correct) = correct else {
        return false;
    };

    info!(
        participant = %correct.participant,
        bounty = correct.bounty,
        count = correct.count,
        "question answered"
    );

    let balance = if correct.bounty > 0 {
        match state
            .scores()
            .credit(&correct.participant, correct.bounty)
            .await
        {
            Ok(balance) => Some(balance),
            Err(err) => {
                warn!(participant = %correct.participant, error = %err, "failed to credit bounty");
                None
            }
        }
    } else {
        None
    };

    state
        .chat()
        .say(&messages::correct_answer(&correct, balance));
    true
}

/// Fetch a question for `ticket` with the session unlocked, then commit it.
async fn acquire(state: &SharedState, ticket: TicketId, now: Instant) {
    let fetch_timeout = state.config().fetch_timeout;
    let fetched = timeout(fetch_timeout, fetch_candidate(state)).await;

    let mut session = state.session().lock().await;
    match fetched {
        Ok(Acquisition::Adopted(question)) => {
            // callers may run ahead of the wall clock; the fetch itself takes real time
            let committed_at = now.max(Instant::now());
            match session.commit(ticket, question, committed_at) {
                Ok(outcome) => {
                    let owed = publish_step(state, &mut session, outcome);
                    drop(session);
                    pay_consolation(state, owed).await;
                }
                Err(err) => debug!(error = %err, "discarding question fetched for a stale acquisition"),
            }
        }
        Ok(Acquisition::Exhausted { attempts }) => {
            warn!(attempts, "no acceptable question found; retrying next tick");
            session.abandon(ticket);
        }
        Err(_) => {
            warn!(
                timeout_secs = fetch_timeout.as_secs(),
                "question acquisition timed out; retrying next tick"
            );
            session.abandon(ticket);
        }
    }
}

/// Try up to `max_fetch_attempts` candidates, skipping failures, rejections and repeats.
async fn fetch_candidate(state: &TriviaState) -> Acquisition {
    let attempts = state.config().max_fetch_attempts;
    for attempt in 1..=attempts {
        let Some(source) = state.sources().pick() else {
            break;
        };

        let raw = match source.fetch().await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(source = source.name(), attempt, error = %err, "question fetch failed");
                continue;
            }
        };

        let question = match state.normalizer().normalize(raw) {
            Ok(question) => question,
            Err(rejection) => {
                debug!(source = source.name(), attempt, reason = %rejection, "question rejected");
                continue;
            }
        };

        if state.session().lock().await.seen(&question.text) {
            debug!(
                source = source.name(),
                source_id = ?question.source_id,
                attempt,
                "question asked recently; skipping"
            );
            continue;
        }

        return Acquisition::Adopted(question);
    }
    Acquisition::Exhausted { attempts }
}

/// Emit the chat text of a step. Returns the consolation owed by a forced reveal.
fn publish_step(
    state: &TriviaState,
    session: &mut TriviaSession,
    outcome: StepOutcome,
) -> Option<Consolation> {
    match outcome {
        StepOutcome::Announce(question) => {
            match messages::announcement(&question) {
                Ok(text) => {
                    info!(
                        source = %question.source,
                        source_id = ?question.source_id,
                        "question announced"
                    );
                    state.chat().announce(&text);
                }
                Err(err) => {
                    warn!(error = %err, "cannot announce question; discarding it");
                    session.discard_current();
                }
            }
            None
        }
        StepOutcome::Hint(masked) => {
            state.chat().say(&messages::hint(&masked));
            None
        }
        StepOutcome::Reveal(reveal) => {
            info!("question timed out");
            state.chat().say(&messages::reveal(&reveal));
            reveal.consolation
        }
    }
}

/// Credit the fallback account after a forced reveal.
pub(crate) async fn pay_consolation(state: &TriviaState, owed: Option<Consolation>) {
    let Some(consolation) = owed.filter(|c| c.amount > 0) else {
        return;
    };
    if let Err(err) = state
        .scores()
        .credit(&consolation.account, consolation.amount)
        .await
    {
        warn!(account = %consolation.account, error = %err, "failed to credit consolation");
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::TriviaConfig,
        dao::{
            score_store::{MemoryScoreStore, ScoreStore},
            storage::{StorageError, StorageResult},
        },
        question::{AnnounceStyle, RawQuestion},
        services::chat::{ChannelChatSink, ChatLine},
        sources::{QuestionSource, SourceError, SourcePolicy, SourceResult},
        state::SessionPhase,
    };

    struct Fixed(RawQuestion);

    impl QuestionSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
            let raw = self.0.clone();
            Box::pin(async move { Ok(raw) })
        }
    }

    struct Broken;

    impl QuestionSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch(&self) -> BoxFuture<'static, SourceResult<RawQuestion>> {
            Box::pin(async {
                Err(SourceError::Empty {
                    provider: "broken".into(),
                })
            })
        }
    }

    fn state_with(
        source: Arc<dyn QuestionSource>,
    ) -> (
        SharedState,
        tokio::sync::mpsc::UnboundedReceiver<ChatLine>,
        MemoryScoreStore,
    ) {
        let (chat, rx) = ChannelChatSink::new();
        let scores = MemoryScoreStore::new();
        let state = TriviaState::new(
            TriviaConfig::default(),
            SourcePolicy::Fixed(source),
            Arc::new(chat),
            Arc::new(scores.clone()),
        );
        (state, rx, scores)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ChatLine>) -> Vec<ChatLine> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn tick_announces_and_answer_credits_bounty() {
        let raw = RawQuestion::new("Capital of France?", "Paris", Some("Geography"))
            .tagged("fixed", AnnounceStyle::Categorized);
        let (state, mut rx, scores) = state_with(Arc::new(Fixed(raw)));
        state.session().lock().await.start(50, true).unwrap();

        let t0 = Instant::now();
        tick_at(&state, t0).await;
        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 1);
        assert!(matches!(&lines[0], ChatLine::Announce(text) if text.contains("Geography")));

        assert!(!handle_chat_message_at(&state, "user", "london", t0).await);
        assert!(handle_chat_message_at(&state, "user", "paris", t0 + Duration::from_secs(1)).await);
        assert_eq!(scores.balance("user").await.unwrap(), 50);
        let lines = drain(&mut rx);
        assert!(lines[0].text().contains("now have 50 points"));
    }

    struct Offline;

    impl ScoreStore for Offline {
        fn credit(&self, _: &str, _: u32) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(async { Err(StorageError::Unavailable("offline".into())) })
        }

        fn balance(&self, _: &str) -> BoxFuture<'static, StorageResult<i64>> {
            Box::pin(async { Err(StorageError::Unavailable("offline".into())) })
        }
    }

    #[tokio::test]
    async fn storage_failure_still_reports_the_answer() {
        let raw = RawQuestion::new("Capital of France?", "Paris", None).tagged("fixed", AnnounceStyle::Plain);
        let (chat, mut rx) = ChannelChatSink::new();
        let state = TriviaState::new(
            TriviaConfig::default(),
            SourcePolicy::Fixed(Arc::new(Fixed(raw))),
            Arc::new(chat),
            Arc::new(Offline),
        );
        state.session().lock().await.start(50, true).unwrap();

        let t0 = Instant::now();
        tick_at(&state, t0).await;
        drain(&mut rx);
        assert!(handle_chat_message_at(&state, "user", "Paris", t0).await);
        let lines = drain(&mut rx);
        assert!(lines[0].text().ends_with("They get 50 points!"));
    }

    #[tokio::test]
    async fn failing_provider_leaves_session_idle() {
        let (state, mut rx, _) = state_with(Arc::new(Broken));
        state.session().lock().await.start(0, true).unwrap();

        tick_at(&state, Instant::now()).await;
        assert_eq!(state.session().lock().await.phase(), SessionPhase::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn repeated_question_is_not_asked_twice() {
        let raw = RawQuestion::new("Only question", "answer", None).tagged("fixed", AnnounceStyle::Plain);
        let (state, mut rx, _) = state_with(Arc::new(Fixed(raw)));
        state.session().lock().await.start(0, true).unwrap();

        let t0 = Instant::now();
        tick_at(&state, t0).await;
        state.session().lock().await.skip().unwrap();
        drain(&mut rx);

        tick_at(&state, t0 + Duration::from_secs(1)).await;
        assert_eq!(state.session().lock().await.phase(), SessionPhase::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn missing_category_discards_question() {
        let raw = RawQuestion::new("Uncategorized?", "answer", None)
            .tagged("fixed", AnnounceStyle::Categorized);
        let (state, mut rx, _) = state_with(Arc::new(Fixed(raw)));
        state.session().lock().await.start(0, true).unwrap();

        tick_at(&state, Instant::now()).await;
        let session = state.session().lock().await;
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.question().is_none());
        assert!(drain(&mut rx).is_empty());
    }
}
