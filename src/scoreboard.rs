//! Per-session tally of correct answers and the running win streak.

use indexmap::IndexMap;

/// Number of participants listed in the stop summary.
pub const SUMMARY_SIZE: usize = 5;

/// Correct-answer counts for the running session, in first-achieved order.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    tally: IndexMap<String, u64>,
}

impl ScoreBoard {
    /// Count one more correct answer for `participant`, returning the new count.
    pub fn record(&mut self, participant: &str) -> u64 {
        let count = self.tally.entry(participant.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count for `participant`.
    pub fn count(&self, participant: &str) -> u64 {
        self.tally.get(participant).copied().unwrap_or(0)
    }

    /// Best `n` participants by count; ties keep first-achieved order.
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .tally
            .iter()
            .map(|(participant, count)| (participant.clone(), *count))
            .collect();
        // stable sort: equal counts stay in insertion order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    /// Return the top [`SUMMARY_SIZE`] participants and empty the tally.
    pub fn drain_summary(&mut self) -> Vec<(String, u64)> {
        let summary = self.top(SUMMARY_SIZE);
        self.tally.clear();
        summary
    }

    /// Whether nobody has answered yet.
    pub fn is_empty(&self) -> bool {
        self.tally.is_empty()
    }
}

/// Note appended to a result message when a streak is long enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakNote {
    /// The holder reached the regular streak threshold.
    Streak(u32),
    /// The holder reached the egregious streak threshold.
    Egregious(u32),
}

/// Consecutive first-correct answers by the same participant.
#[derive(Debug, Clone)]
pub struct WinStreak {
    holder: Option<String>,
    length: u32,
    min_streak: u32,
    egregious_streak: u32,
}

impl WinStreak {
    /// Create an empty streak tracker. `egregious_streak` is raised to `min_streak` if lower.
    pub fn new(min_streak: u32, egregious_streak: u32) -> Self {
        let min_streak = min_streak.max(1);
        Self {
            holder: None,
            length: 0,
            min_streak,
            egregious_streak: egregious_streak.max(min_streak),
        }
    }

    /// Register a correct answer and return the note the result message should carry.
    pub fn record(&mut self, participant: &str) -> Option<StreakNote> {
        if self.holder.as_deref() == Some(participant) {
            self.length += 1;
        } else {
            self.holder = Some(participant.to_owned());
            self.length = 1;
        }

        if self.length >= self.egregious_streak {
            Some(StreakNote::Egregious(self.length))
        } else if self.length >= self.min_streak {
            Some(StreakNote::Streak(self.length))
        } else {
            None
        }
    }

    /// Current holder and length.
    pub fn current(&self) -> Option<(&str, u32)> {
        self.holder.as_deref().map(|holder| (holder, self.length))
    }

    /// Forget the current streak.
    pub fn clear(&mut self) {
        self.holder = None;
        self.length = 0;
    }
}
