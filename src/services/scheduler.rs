//! Periodic drivers: the fast lifecycle tick and the slow liveness supervisor.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    services::{commands, engine},
    state::{SharedState, SupervisorAction},
};

/// Handles of the spawned periodic tasks.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the tick loop and, when enabled, the supervisor loop.
    pub fn spawn(state: SharedState) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let mut tasks = vec![tokio::spawn(run_ticker(state.clone(), rx.clone()))];
        if state.config().auto_start {
            tasks.push(tokio::spawn(run_supervisor(state, rx)));
        } else {
            info!("automatic start disabled; supervisor not running");
        }
        Self { shutdown, tasks }
    }

    /// Stop the loops, letting a tick in progress finish first.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "scheduler task ended abnormally");
            }
        }
    }
}

/// Drive the question lifecycle. A tick never overlaps the previous one.
async fn run_ticker(state: SharedState, shutdown: watch::Receiver<bool>) {
    run_every(state.config().tick_interval, shutdown, || engine::tick(&state)).await;
    debug!("tick loop stopped");
}

/// Start and stop sessions from the hosting context's liveness.
async fn run_supervisor(state: SharedState, shutdown: watch::Receiver<bool>) {
    run_every(state.config().supervisor_interval, shutdown, || {
        supervise_at(&state, Instant::now())
    })
    .await;
    debug!("supervisor loop stopped");
}

async fn run_every<F, Fut>(period: Duration, mut shutdown: watch::Receiver<bool>, mut body: F)
where
    F: FnMut() -> Fut,
    Fut: Future,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                body().await;
            }
        }
    }
}

/// One supervisor observation at `now`.
pub async fn supervise_at(state: &SharedState, now: Instant) -> Option<SupervisorAction> {
    let (running, started_manually) = {
        let session = state.session().lock().await;
        (session.is_running(), session.started_manually())
    };
    let live = state.is_live();
    let action = state
        .supervisor()
        .lock()
        .await
        .observe(live, running, started_manually)?;

    info!(?action, live, "supervisor transition");
    let result = match action {
        SupervisorAction::Start => commands::start_session(state, None, false).await.map(|_| ()),
        SupervisorAction::Stop => commands::stop_session(state, false, now).await.map(|_| ()),
    };
    if let Err(err) = result {
        debug!(?action, error = %err, "supervisor transition not applied");
    }
    Some(action)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::TriviaConfig,
        dao::score_store::MemoryScoreStore,
        services::chat::ChannelChatSink,
        sources::{QuestionBank, SourcePolicy},
        state::TriviaState,
    };

    fn state() -> SharedState {
        let (chat, _rx) = ChannelChatSink::new();
        TriviaState::new(
            TriviaConfig::default(),
            SourcePolicy::Fixed(Arc::new(QuestionBank::new(Vec::new()))),
            Arc::new(chat),
            Arc::new(MemoryScoreStore::new()),
        )
    }

    #[tokio::test]
    async fn offline_context_starts_and_live_context_stops() {
        let state = state();
        let now = Instant::now();
        assert_eq!(supervise_at(&state, now).await, Some(SupervisorAction::Start));
        assert!(state.session().lock().await.is_running());
        assert!(!state.session().lock().await.started_manually());

        state.set_live(true);
        assert_eq!(supervise_at(&state, now).await, Some(SupervisorAction::Stop));
        assert!(!state.session().lock().await.is_running());
        assert_eq!(supervise_at(&state, now).await, None);
    }

    #[tokio::test]
    async fn manual_stop_is_respected_while_offline() {
        let state = state();
        let now = Instant::now();
        supervise_at(&state, now).await;
        commands::stop(&state).await.unwrap();
        assert_eq!(supervise_at(&state, now).await, None);
        assert!(!state.session().lock().await.is_running());
    }

    #[tokio::test]
    async fn scheduler_shuts_down() {
        let scheduler = Scheduler::spawn(state());
        scheduler.shutdown().await;
    }
}
