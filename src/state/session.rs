//! Question lifecycle of a single trivia session.
//!
//! The session is a plain synchronous state machine: every operation receives the current
//! [`Instant`] and returns what happened, leaving chat output, score crediting and provider
//! fetches to the caller. Fetches are split into [`TriviaSession::poll`] handing out an
//! acquisition ticket and [`TriviaSession::commit`] consuming it, so the caller can release
//! the session lock while a provider is being queried.

use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    matcher::AnswerMatcher,
    question::{Question, RecencyMemory, hint, memory},
    scoreboard::{ScoreBoard, StreakNote, WinStreak},
};

/// Identifier handed out for an in-flight question acquisition.
pub type TicketId = Uuid;

/// Lifecycle phase of the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No question; the next tick may start an acquisition once the cooldown elapsed.
    Idle,
    /// A provider fetch identified by the ticket is in flight.
    AwaitingQuestion(TicketId),
    /// The question was announced (step 1).
    Announced,
    /// Hint `step` was shown.
    Hinting(u8),
    /// The last question was answered or revealed; waiting for the cooldown.
    Resolved,
}

/// Points credited to a fallback account when nobody answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consolation {
    /// Account receiving the credit.
    pub account: String,
    /// Credited amount.
    pub amount: u32,
}

/// Tunables of the question lifecycle.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Hints shown between the announcement and the forced reveal.
    pub hint_count: u8,
    /// Minimum delay between two steps of the same question.
    pub step_delay: Duration,
    /// Minimum delay between a resolution and the next acquisition.
    pub question_cooldown: Duration,
    /// Capacity of the recency memory.
    pub q_memory: usize,
    /// Streak length that earns a note.
    pub min_streak: u32,
    /// Streak length that earns the egregious note instead.
    pub egregious_streak: u32,
    /// Answer matching policy.
    pub matcher: AnswerMatcher,
    /// Credit handed out on a forced reveal.
    pub consolation: Option<Consolation>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            hint_count: 2,
            step_delay: Duration::from_secs(10),
            question_cooldown: Duration::from_secs(12),
            q_memory: memory::DEFAULT_CAPACITY,
            min_streak: 3,
            egregious_streak: 12,
            matcher: AnswerMatcher::default(),
            consolation: None,
        }
    }
}

/// Errors raised by session commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `start` while a session is already running.
    #[error("a trivia is already running")]
    AlreadyRunning,
    /// `stop` or `skip` while nothing is running.
    #[error("no trivia is active right now")]
    NotRunning,
    /// `skip` without a current question.
    #[error("there is no question to skip")]
    NothingToSkip,
}

/// Error returned when a fetched question can no longer be adopted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("acquisition {ticket} is stale (session is {phase:?})")]
pub struct CommitError {
    /// Ticket presented by the caller.
    pub ticket: TicketId,
    /// Phase found when committing.
    pub phase: SessionPhase,
}

/// Result of a scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Nothing to do on this tick.
    Inert,
    /// Fetch a question and [`commit`](TriviaSession::commit) it with this ticket.
    Acquire(TicketId),
    /// The current question moved to its next step.
    Step(StepOutcome),
}

/// Visible effect of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step 1: the question must be announced.
    Announce(Question),
    /// A progressive hint.
    Hint(String),
    /// All hints exhausted: the answer is revealed.
    Reveal(Reveal),
}

/// Forced reveal of an unanswered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    /// The answer nobody found.
    pub answer: String,
    /// Credit owed to the fallback account, if configured.
    pub consolation: Option<Consolation>,
}

/// A correct answer and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectAnswer {
    /// Who answered.
    pub participant: String,
    /// The normalized answer.
    pub answer: String,
    /// Points owed to the participant.
    pub bounty: u32,
    /// Correct answers of the participant in this session.
    pub count: u64,
    /// Streak note to append, if any.
    pub streak: Option<StreakNote>,
}

/// What `skip` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// An announced question.
    Question(Question),
    /// An acquisition that had not completed yet.
    PendingAcquisition,
}

/// Outcome of stopping a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// Reveal of the question that was running, if any.
    pub reveal: Option<Reveal>,
    /// Top participants, best first.
    pub summary: Vec<(String, u64)>,
}

/// State of one trivia game in one chat context.
#[derive(Debug)]
pub struct TriviaSession {
    settings: SessionSettings,
    running: bool,
    started_manually: bool,
    bounty: u32,
    phase: SessionPhase,
    question: Option<Question>,
    step: u8,
    last_step: Option<Instant>,
    last_resolved: Option<Instant>,
    memory: RecencyMemory,
    scoreboard: ScoreBoard,
    streak: WinStreak,
}

impl Default for TriviaSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl TriviaSession {
    /// Create a stopped session.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            memory: RecencyMemory::new(settings.q_memory),
            streak: WinStreak::new(settings.min_streak, settings.egregious_streak),
            settings,
            running: false,
            started_manually: false,
            bounty: 0,
            phase: SessionPhase::Idle,
            question: None,
            step: 0,
            last_step: None,
            last_resolved: None,
            scoreboard: ScoreBoard::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a session is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the running session was started by a command rather than the supervisor.
    pub fn started_manually(&self) -> bool {
        self.started_manually
    }

    /// Points awarded per correct answer.
    pub fn bounty(&self) -> u32 {
        self.bounty
    }

    /// Question currently being asked.
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Current step of the question lifecycle.
    pub fn step(&self) -> u8 {
        self.step
    }

    /// Lifecycle settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Tally of correct answers in the running session.
    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scoreboard
    }

    /// Running win streak.
    pub fn streak(&self) -> &WinStreak {
        &self.streak
    }

    /// Whether `text` was asked recently.
    pub fn seen(&self, text: &str) -> bool {
        self.memory.seen(text)
    }

    /// Start a session paying `bounty` points per correct answer.
    pub fn start(&mut self, bounty: u32, manual: bool) -> Result<(), SessionError> {
        if self.running {
            return Err(SessionError::AlreadyRunning);
        }
        self.running = true;
        self.started_manually = manual;
        self.bounty = bounty;
        self.phase = SessionPhase::Idle;
        Ok(())
    }

    /// Stop the session, revealing the current question and draining the tally.
    pub fn stop(&mut self, now: Instant) -> Result<StopReport, SessionError> {
        if !self.running {
            return Err(SessionError::NotRunning);
        }

        let reveal = match self.phase {
            SessionPhase::Announced | SessionPhase::Hinting(_) => self.force_reveal(now),
            _ => None,
        };

        self.running = false;
        self.started_manually = false;
        self.phase = SessionPhase::Idle;
        self.question = None;
        self.step = 0;
        self.last_step = None;
        self.streak.clear();

        Ok(StopReport {
            reveal,
            summary: self.scoreboard.drain_summary(),
        })
    }

    /// Drop the current question (or pending acquisition) without awarding anything.
    ///
    /// The next acquisition is not delayed by the cooldown.
    pub fn skip(&mut self) -> Result<Skipped, SessionError> {
        if !self.running {
            return Err(SessionError::NotRunning);
        }

        let skipped = match self.phase {
            SessionPhase::Announced | SessionPhase::Hinting(_) => self
                .question
                .take()
                .map(Skipped::Question)
                .ok_or(SessionError::NothingToSkip)?,
            SessionPhase::AwaitingQuestion(_) => Skipped::PendingAcquisition,
            SessionPhase::Idle | SessionPhase::Resolved => {
                return Err(SessionError::NothingToSkip);
            }
        };

        self.phase = SessionPhase::Idle;
        self.step = 0;
        self.last_step = None;
        self.last_resolved = None;
        Ok(skipped)
    }

    /// Advance the lifecycle for a scheduler tick at `now`.
    pub fn poll(&mut self, now: Instant) -> Poll {
        if !self.running {
            return Poll::Inert;
        }

        match self.phase {
            SessionPhase::AwaitingQuestion(_) => Poll::Inert,
            SessionPhase::Idle | SessionPhase::Resolved => {
                if !elapsed(self.last_resolved, self.settings.question_cooldown, now) {
                    return Poll::Inert;
                }
                let ticket = Uuid::new_v4();
                self.phase = SessionPhase::AwaitingQuestion(ticket);
                Poll::Acquire(ticket)
            }
            SessionPhase::Announced | SessionPhase::Hinting(_) => {
                if !elapsed(self.last_step, self.settings.step_delay, now) {
                    return Poll::Inert;
                }
                match self.advance_step(now) {
                    Some(outcome) => Poll::Step(outcome),
                    None => Poll::Inert,
                }
            }
        }
    }

    /// Adopt a fetched question for `ticket` and announce it.
    ///
    /// Fails when the session moved on while the fetch was in flight (stop, skip, or a newer
    /// acquisition); the question must then be discarded.
    pub fn commit(
        &mut self,
        ticket: TicketId,
        question: Question,
        now: Instant,
    ) -> Result<StepOutcome, CommitError> {
        if !self.running || self.phase != SessionPhase::AwaitingQuestion(ticket) {
            return Err(CommitError {
                ticket,
                phase: self.phase,
            });
        }

        self.memory.record(question.text.clone());
        self.question = Some(question);
        self.step = 0;
        self.last_step = None;
        self.phase = SessionPhase::Announced;

        self.advance_step(now).ok_or(CommitError {
            ticket,
            phase: self.phase,
        })
    }

    /// Give up on the acquisition for `ticket`, returning to idle if it is still current.
    pub fn abandon(&mut self, ticket: TicketId) -> bool {
        if self.phase == SessionPhase::AwaitingQuestion(ticket) {
            self.phase = SessionPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Discard the current question after it could not be announced.
    pub fn discard_current(&mut self) -> Option<Question> {
        let question = self.question.take()?;
        self.phase = SessionPhase::Idle;
        self.step = 0;
        self.last_step = None;
        Some(question)
    }

    /// Check a chat message against the current question and resolve it on a match.
    pub fn try_answer(
        &mut self,
        participant: &str,
        message: &str,
        now: Instant,
    ) -> Option<CorrectAnswer> {
        if !self.running
            || !matches!(
                self.phase,
                SessionPhase::Announced | SessionPhase::Hinting(_)
            )
        {
            return None;
        }

        let question = self.question.as_ref()?;
        if !self.settings.matcher.matches(&question.answer, message) {
            return None;
        }

        let question = self.question.take()?;
        self.resolve(now);

        let count = self.scoreboard.record(participant);
        let streak = self.streak.record(participant);

        Some(CorrectAnswer {
            participant: participant.to_owned(),
            answer: question.answer,
            bounty: self.bounty,
            count,
            streak,
        })
    }

    fn advance_step(&mut self, now: Instant) -> Option<StepOutcome> {
        let question = self.question.as_ref()?;
        self.step = self.step.saturating_add(1);
        self.last_step = Some(now);

        let hint_count = self.settings.hint_count;
        if self.step == 1 {
            self.phase = SessionPhase::Announced;
            Some(StepOutcome::Announce(question.clone()))
        } else if self.step < hint_count.saturating_add(2) {
            let hint = hint::render(&question.answer, self.step, hint_count);
            self.phase = SessionPhase::Hinting(self.step);
            Some(StepOutcome::Hint(hint))
        } else {
            self.force_reveal(now).map(StepOutcome::Reveal)
        }
    }

    fn force_reveal(&mut self, now: Instant) -> Option<Reveal> {
        let question = self.question.take()?;
        self.resolve(now);
        Some(Reveal {
            answer: question.answer,
            consolation: self.settings.consolation.clone(),
        })
    }

    fn resolve(&mut self, now: Instant) {
        self.phase = SessionPhase::Resolved;
        self.step = 0;
        self.last_step = None;
        self.last_resolved = Some(now);
    }
}

fn elapsed(since: Option<Instant>, delay: Duration, now: Instant) -> bool {
    since.is_none_or(|since| now.saturating_duration_since(since) >= delay)
}
