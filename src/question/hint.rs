//! Progressive answer masking used between the announcement and the forced reveal.

/// Placeholder shown for a hidden character.
pub const MASK: char = '_';

/// Offset added to the hint count so the last hint never reaches the full reveal fraction.
const REVEAL_SLACK: f64 = 1.2;

/// Number of non-space characters disclosed at `step`.
///
/// Grows with `step` up to, but never reaching, half of the answer length at the last hint.
pub fn reveal_quota(answer_len: usize, step: u8, hint_count: u8) -> usize {
    let half = (answer_len / 2) as f64;
    let fraction = f64::from(step) / (f64::from(hint_count) + REVEAL_SLACK);
    (fraction * half).floor() as usize
}

/// Render the hint for `answer` at `step`.
///
/// Characters are disclosed left to right, skipping spaces which are always shown. When the
/// rendered hint would be a single repeated glyph (all masks, or an answer made of one
/// repeated letter) only the first character is disclosed.
pub fn render(answer: &str, step: u8, hint_count: u8) -> String {
    let chars: Vec<char> = answer.chars().collect();
    let non_space = chars.iter().filter(|c| **c != ' ').count();
    let quota = reveal_quota(chars.len(), step, hint_count).min(non_space.saturating_sub(1));

    let mut revealed = 0;
    let hint: String = chars
        .iter()
        .map(|&c| {
            if c == ' ' {
                ' '
            } else if revealed < quota {
                revealed += 1;
                c
            } else {
                MASK
            }
        })
        .collect();

    let repeated_letter = is_uniform(answer.chars().flat_map(char::to_lowercase));
    if non_space > 1 && (is_uniform(hint.chars()) || repeated_letter) {
        return first_only(&chars);
    }

    hint
}

/// Whether every non-space character yielded by `glyphs` is the same.
fn is_uniform(glyphs: impl Iterator<Item = char>) -> bool {
    let mut glyphs = glyphs.filter(|c| *c != ' ');
    match glyphs.next() {
        Some(first) => glyphs.all(|c| c == first),
        None => false,
    }
}

fn first_only(chars: &[char]) -> String {
    let mut disclosed = false;
    chars
        .iter()
        .map(|&c| match c {
            ' ' => ' ',
            _ if !disclosed => {
                disclosed = true;
                c
            }
            _ => MASK,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revealed(hint: &str) -> usize {
        hint.chars().filter(|c| *c != ' ' && *c != MASK).count()
    }

    #[test]
    fn quota_follows_step_fraction_of_half_length() {
        assert_eq!(reveal_quota(13, 2, 2), 3);
        assert_eq!(reveal_quota(13, 3, 2), 5);
        assert_eq!(reveal_quota(5, 2, 2), 1);
        assert_eq!(reveal_quota(1, 3, 2), 0);
    }

    #[test]
    fn spaces_are_shown_and_not_counted() {
        assert_eq!(render("Mount Everest", 2, 2), "Mou__ _______");
        assert_eq!(render("Mount Everest", 3, 2), "Mount _______");
    }

    #[test]
    fn reveal_is_monotonic_and_never_complete() {
        for answer in ["Paris", "Mount Everest", "ab", "New York City", "Leonardo da Vinci"] {
            for hint_count in 0..=4u8 {
                let mut previous = 0;
                for step in 1..=hint_count + 1 {
                    let hint = render(answer, step, hint_count);
                    let count = revealed(&hint);
                    assert!(count >= previous, "{answer} step {step}");
                    assert!(hint.contains(MASK), "{answer} fully revealed at step {step}");
                    previous = count;
                }
            }
        }
    }

    #[test]
    fn fully_masked_hint_discloses_first_character() {
        assert_eq!(render("Paris", 1, 4), "P____");
        assert_eq!(render("a a", 1, 2), "a _");
    }

    #[test]
    fn repeated_letter_answer_shows_one_character_only() {
        for step in 0..=12 {
            assert_eq!(render("AAAA", step, 2), "A___");
        }
    }

    #[test]
    fn single_character_answer_stays_masked() {
        assert_eq!(render("X", 3, 2), "_");
    }
}
