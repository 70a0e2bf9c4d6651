//! Start, stop and skip commands, issued either by a participant or by the supervisor.
//!
//! Callers are expected to have authorized the participant already.

use std::time::Instant;

use tracing::{debug, info};

use crate::{
    error::ServiceError,
    services::{engine, messages},
    state::{
        SharedState,
        session::{Skipped, StopReport},
    },
};

const COMMAND_PREFIX: &str = "!trivia";
const POINTS_COMMAND: &str = "!points";

/// A chat command understood by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!trivia start [bounty]`
    Start(Option<String>),
    /// `!trivia stop`
    Stop,
    /// `!trivia skip`
    Skip,
    /// `!points`: report the caller's balance.
    Points,
}

impl Command {
    /// Parse a chat line; `None` when the line is not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        match words.next()? {
            POINTS_COMMAND => Some(Command::Points),
            COMMAND_PREFIX => match words.next()?.to_lowercase().as_str() {
                "start" => Some(Command::Start(words.next().map(str::to_owned))),
                "stop" => Some(Command::Stop),
                "skip" => Some(Command::Skip),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Bounty override from a command argument.
///
/// Missing or non-numeric arguments fall back to `default`; negative values clamp to zero.
pub fn parse_bounty(argument: Option<&str>, default: u32) -> u32 {
    let Some(argument) = argument else {
        return default;
    };
    match argument.trim().parse::<i64>() {
        Ok(value) => value.clamp(0, i64::from(u32::MAX)) as u32,
        Err(_) => {
            debug!(argument, "invalid bounty argument; using default");
            default
        }
    }
}

/// Run `command` on behalf of `participant`, answering in chat either way.
pub async fn dispatch(
    state: &SharedState,
    participant: &str,
    command: Command,
) -> Result<(), ServiceError> {
    let result = match command {
        Command::Start(bounty) => start(state, bounty.as_deref()).await.map(|_| ()),
        Command::Stop => stop(state).await.map(|_| ()),
        Command::Skip => skip(state).await.map(|_| ()),
        Command::Points => {
            let balance = state.scores().balance(participant).await?;
            state
                .chat()
                .say(&format!("{participant}, you have {balance} points."));
            Ok(())
        }
    };

    if let Err(ServiceError::Session(err)) = &result {
        state
            .chat()
            .say(&messages::command_rejected(participant, err));
    }
    result
}

/// Start a session by command. Returns the bounty in effect.
pub async fn start(state: &SharedState, bounty: Option<&str>) -> Result<u32, ServiceError> {
    start_session(state, bounty, true).await
}

/// Stop the session by command.
pub async fn stop(state: &SharedState) -> Result<StopReport, ServiceError> {
    stop_session(state, true, Instant::now()).await
}

/// Skip the current question by command.
pub async fn skip(state: &SharedState) -> Result<Skipped, ServiceError> {
    let skipped = state.session().lock().await.skip()?;
    info!(pending = matches!(skipped, Skipped::PendingAcquisition), "question skipped");
    state.chat().say(&messages::skipped(&skipped));
    Ok(skipped)
}

pub(crate) async fn start_session(
    state: &SharedState,
    bounty: Option<&str>,
    manual: bool,
) -> Result<u32, ServiceError> {
    let bounty = parse_bounty(bounty, state.config().default_point_bounty);
    state.session().lock().await.start(bounty, manual)?;
    if manual {
        state.supervisor().lock().await.manual_command();
    }

    info!(bounty, manual, "trivia started");
    state.chat().say(&messages::started(bounty));
    Ok(bounty)
}

/// Stop the session, revealing any running question and printing the summary.
pub(crate) async fn stop_session(
    state: &SharedState,
    manual: bool,
    now: Instant,
) -> Result<StopReport, ServiceError> {
    let report = state.session().lock().await.stop(now)?;
    if manual {
        state.supervisor().lock().await.manual_command();
    }

    info!(manual, participants = report.summary.len(), "trivia stopped");
    if let Some(reveal) = &report.reveal {
        state.chat().say(&messages::reveal(reveal));
        engine::pay_consolation(state, reveal.consolation.clone()).await;
    }
    state.chat().say(&messages::stopped(&report.summary));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::TriviaConfig,
        dao::score_store::MemoryScoreStore,
        question::{AnnounceStyle, RawQuestion},
        services::chat::{ChannelChatSink, ChatLine},
        sources::{QuestionBank, SourcePolicy},
        state::{TriviaState, session::SessionError},
    };

    fn state() -> (SharedState, tokio::sync::mpsc::UnboundedReceiver<ChatLine>) {
        let bank = QuestionBank::new(vec![
            RawQuestion::new("Capital of France?", "Paris", Some("Geography"))
                .tagged("bank", AnnounceStyle::Plain),
        ]);
        let (chat, rx) = ChannelChatSink::new();
        let config = TriviaConfig {
            default_point_bounty: 10,
            ..TriviaConfig::default()
        };
        let state = TriviaState::new(
            config,
            SourcePolicy::Fixed(Arc::new(bank)),
            Arc::new(chat),
            Arc::new(MemoryScoreStore::new()),
        );
        (state, rx)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse("!trivia start 50"),
            Some(Command::Start(Some("50".into())))
        );
        assert_eq!(Command::parse("!trivia START"), Some(Command::Start(None)));
        assert_eq!(Command::parse("!trivia stop"), Some(Command::Stop));
        assert_eq!(Command::parse("!trivia skip now"), Some(Command::Skip));
        assert_eq!(Command::parse("!points"), Some(Command::Points));
        assert_eq!(Command::parse("!trivia"), None);
        assert_eq!(Command::parse("paris"), None);
    }

    #[test]
    fn bounty_argument_falls_back_or_clamps() {
        assert_eq!(parse_bounty(None, 10), 10);
        assert_eq!(parse_bounty(Some("50"), 10), 50);
        assert_eq!(parse_bounty(Some("lots"), 10), 10);
        assert_eq!(parse_bounty(Some("-5"), 10), 0);
    }

    #[tokio::test]
    async fn duplicate_commands_get_feedback() {
        let (state, mut rx) = state();
        assert_eq!(start(&state, Some("abc")).await.unwrap(), 10);
        assert!(rx.try_recv().unwrap().text().contains("10 points for each right answer"));

        let err = dispatch(&state, "mod", Command::Start(None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Session(SessionError::AlreadyRunning)));
        assert_eq!(
            rx.try_recv().unwrap().text(),
            "mod, a trivia is already running"
        );

        dispatch(&state, "mod", Command::Skip).await.unwrap_err();
        assert_eq!(rx.try_recv().unwrap().text(), "mod, there is no question to skip");

        dispatch(&state, "mod", Command::Stop).await.unwrap();
        dispatch(&state, "mod", Command::Stop).await.unwrap_err();
        let lines: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            lines.last().map(ChatLine::text),
            Some("mod, no trivia is active right now")
        );
    }

    #[tokio::test]
    async fn stop_reveals_running_question() {
        let (state, mut rx) = state();
        start(&state, None).await.unwrap();
        engine::tick_at(&state, Instant::now()).await;

        let report = stop(&state).await.unwrap();
        assert_eq!(report.reveal.map(|r| r.answer), Some("Paris".into()));
        let lines: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(lines.iter().any(|line| line.text().contains("The answer was \"Paris\"")));
        assert!(lines.last().unwrap().text().starts_with("The trivia has been stopped"));
    }
}
