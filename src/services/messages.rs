//! User-visible chat text.

use thiserror::Error;

use crate::{
    question::{AnnounceStyle, Question},
    scoreboard::StreakNote,
    state::session::{CorrectAnswer, Reveal, Skipped},
};

/// The announcement for a question could not be composed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A categorized provider delivered a question without its category.
    #[error("question from `{provider}` has no category")]
    MissingCategory {
        /// Provider that produced the question.
        provider: String,
    },
}

/// Step 1 text.
pub fn announcement(question: &Question) -> Result<String, FormatError> {
    match (question.style, question.category.as_deref()) {
        (AnnounceStyle::Categorized, None) => Err(FormatError::MissingCategory {
            provider: question.source.clone(),
        }),
        (_, Some(category)) => Ok(format!(
            "A new question has begun! In the category \"{category}\", the question is: \"{}\"",
            question.text
        )),
        (AnnounceStyle::Plain, None) => Ok(format!(
            "A new question has begun! The question is: \"{}\"",
            question.text
        )),
    }
}

/// Progressive hint text.
pub fn hint(masked: &str) -> String {
    format!("Here's a hint: \"{masked}\"")
}

/// Forced reveal, mentioning the consolation credit when one is configured.
pub fn reveal(reveal: &Reveal) -> String {
    let mut text = format!(
        "No one could answer the trivia! The answer was \"{}\".",
        reveal.answer
    );
    if let Some(consolation) = reveal.consolation.as_ref().filter(|c| c.amount > 0) {
        text.push_str(&format!(
            " Since no one got it, {} gets {}.",
            consolation.account,
            points(consolation.amount.into())
        ));
    }
    text
}

/// Result of a correct answer. `balance` is the answerer's balance after crediting, when known.
pub fn correct_answer(correct: &CorrectAnswer, balance: Option<i64>) -> String {
    let mut text = format!(
        "{} got the answer right! The answer was \"{}\".",
        correct.participant, correct.answer
    );
    if correct.bounty > 0 {
        text.push_str(&format!(" They get {}", points(correct.bounty.into())));
        match balance {
            Some(balance) => text.push_str(&format!(" and now have {}!", points(balance))),
            None => text.push('!'),
        }
    }
    match correct.streak {
        Some(StreakNote::Streak(length)) => {
            text.push_str(&format!(
                " {} is on a streak of {length} correct answers in a row!",
                correct.participant
            ));
        }
        Some(StreakNote::Egregious(length)) => {
            text.push_str(&format!(
                " {} has answered {length} in a row. Does anyone else even know anything?",
                correct.participant
            ));
        }
        None => {}
    }
    text
}

/// Session start text.
pub fn started(bounty: u32) -> String {
    if bounty > 0 {
        format!(
            "The trivia has started! {} for each right answer!",
            points(bounty.into())
        )
    } else {
        "The trivia has started!".to_owned()
    }
}

/// Stop text with the top participants, best first.
pub fn stopped(summary: &[(String, u64)]) -> String {
    if summary.is_empty() {
        return "The trivia has been stopped. Nobody answered anything this round.".to_owned();
    }
    let ranking = summary
        .iter()
        .map(|(participant, count)| format!("{participant} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("The trivia has been stopped. Top results: {ranking}")
}

/// Skip acknowledgement.
pub fn skipped(skipped: &Skipped) -> String {
    match skipped {
        Skipped::Question(question) => {
            format!("Question skipped! The answer was \"{}\".", question.answer)
        }
        Skipped::PendingAcquisition => "Question skipped! Fetching another one.".to_owned(),
    }
}

/// Feedback addressed to whoever issued a rejected command.
pub fn command_rejected(participant: &str, reason: &impl std::fmt::Display) -> String {
    format!("{participant}, {reason}")
}

fn points(amount: i64) -> String {
    if amount == 1 {
        "1 point".to_owned()
    } else {
        format!("{amount} points")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::Consolation;

    fn question(style: AnnounceStyle, category: Option<&str>) -> Question {
        Question {
            text: "Capital of France?".into(),
            answer: "Paris".into(),
            category: category.map(str::to_owned),
            source: "gazatu".into(),
            source_id: None,
            style,
        }
    }

    fn correct(bounty: u32, streak: Option<StreakNote>) -> CorrectAnswer {
        CorrectAnswer {
            participant: "user".into(),
            answer: "Paris".into(),
            bounty,
            count: 1,
            streak,
        }
    }

    #[test]
    fn announcement_includes_category_when_present() {
        let text = announcement(&question(AnnounceStyle::Plain, Some("Geography"))).unwrap();
        assert!(text.contains("\"Geography\""));
        assert!(text.contains("Capital of France?"));

        let plain = announcement(&question(AnnounceStyle::Plain, None)).unwrap();
        assert!(!plain.contains("category"));
    }

    #[test]
    fn categorized_question_without_category_fails() {
        assert_eq!(
            announcement(&question(AnnounceStyle::Categorized, None)),
            Err(FormatError::MissingCategory {
                provider: "gazatu".into()
            })
        );
    }

    #[test]
    fn result_mentions_bounty_and_balance() {
        let text = correct_answer(&correct(50, None), Some(150));
        assert!(text.contains("They get 50 points and now have 150 points!"));

        let unknown_balance = correct_answer(&correct(50, None), None);
        assert!(unknown_balance.contains("They get 50 points!"));

        let free = correct_answer(&correct(0, None), None);
        assert!(!free.contains("points"));
    }

    #[test]
    fn streak_notes_differ() {
        let regular = correct_answer(&correct(0, Some(StreakNote::Streak(3))), None);
        let egregious = correct_answer(&correct(0, Some(StreakNote::Egregious(12))), None);
        assert!(regular.contains("streak of 3"));
        assert!(egregious.contains("12 in a row"));
        assert!(!egregious.contains("streak of"));
    }

    #[test]
    fn reveal_mentions_consolation() {
        let with = reveal(&Reveal {
            answer: "Lima".into(),
            consolation: Some(Consolation {
                account: "fallback".into(),
                amount: 1,
            }),
        });
        assert!(with.ends_with("fallback gets 1 point."));

        let without = reveal(&Reveal {
            answer: "Lima".into(),
            consolation: None,
        });
        assert_eq!(without, "No one could answer the trivia! The answer was \"Lima\".");
    }

    #[test]
    fn stop_summary_lists_ranking() {
        let text = stopped(&[("A".into(), 5), ("B".into(), 3)]);
        assert_eq!(text, "The trivia has been stopped. Top results: A (5), B (3)");
    }
}
