//! Chat trivia binary: runs the engine against a line-oriented console chat.
//!
//! Each stdin line is `participant: message`. Besides trivia commands the console accepts
//! `!live on|off` to simulate the hosting context going live.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_trivia::{
    config::TriviaConfig,
    dao::score_store::MemoryScoreStore,
    services::{
        chat::{ChannelChatSink, ChatLine},
        commands::{self, Command},
        engine,
        scheduler::Scheduler,
    },
    state::{SharedState, TriviaState},
};

const LIVE_ENV: &str = "TRIVIA_LIVE";
const CONSOLE_PARTICIPANT: &str = "console";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TriviaConfig::load();
    let (chat, mut chat_rx) = ChannelChatSink::new();
    let state = TriviaState::from_config(config, Arc::new(chat), Arc::new(MemoryScoreStore::new()))
        .context("building trivia engine")?;
    state.set_live(initial_liveness());

    tokio::spawn(async move {
        while let Some(line) = chat_rx.recv().await {
            match line {
                ChatLine::Announce(text) => println!(">>> {text}"),
                ChatLine::Say(text) => println!("{text}"),
            }
        }
    });

    let scheduler = Scheduler::spawn(state.clone());
    info!("trivia engine running; type `name: message` lines");

    tokio::select! {
        _ = run_console(state.clone()) => info!("console closed"),
        _ = shutdown_signal() => info!("shutdown requested"),
    }

    scheduler.shutdown().await;
    if state.session().lock().await.is_running() {
        commands::stop(&state)
            .await
            .context("stopping trivia on shutdown")?;
    }
    Ok(())
}

/// Read chat lines from stdin until EOF.
async fn run_console(state: SharedState) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "failed to read console input");
                break;
            }
        };
        let (participant, message) = match line.split_once(':') {
            Some((participant, message)) if !participant.trim().is_empty() => {
                (participant.trim(), message.trim())
            }
            _ => (CONSOLE_PARTICIPANT, line.trim()),
        };
        handle_line(&state, participant, message).await;
    }
}

async fn handle_line(state: &SharedState, participant: &str, message: &str) {
    if let Some(live) = message.strip_prefix("!live") {
        match live.trim() {
            "on" => state.set_live(true),
            "off" => state.set_live(false),
            other => warn!(argument = other, "expected `!live on` or `!live off`"),
        }
        return;
    }

    match Command::parse(message) {
        Some(command) => {
            if let Err(err) = commands::dispatch(state, participant, command).await {
                info!(participant, error = %err, "command rejected");
            }
        }
        None => {
            engine::handle_chat_message(state, participant, message).await;
        }
    }
}

fn initial_liveness() -> bool {
    env::var(LIVE_ENV)
        .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
