//! Answer matching and first-correct-guess arbitration.

use crate::state::state_machine::RoomPhase;

/// Result of comparing a guess with the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The guess designates the answer.
    Match,
    /// The guess is wrong.
    NoMatch,
}

/// Decision returned for a guess submitted to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ruling {
    /// The round is not open anymore (already won, expired, or not started); drop the guess.
    Late,
    /// The round is open but the guess is wrong.
    Miss,
    /// First correct guess of the round.
    Win,
}

/// Compare a guess with a target title.
///
/// Case-insensitive symmetric containment: either trimmed text containing the other is a
/// match, so "eminem show" matches "The Eminem Show" and the other way round. Blank guesses
/// never match.
pub fn evaluate(submitted: &str, target_title: &str) -> Verdict {
    let guess = normalize(submitted);
    let title = normalize(target_title);

    if guess.is_empty() || title.is_empty() {
        return Verdict::NoMatch;
    }

    if title.contains(&guess) || guess.contains(&title) {
        Verdict::Match
    } else {
        Verdict::NoMatch
    }
}

/// Judge a guess against the room's phase at the time it is processed.
///
/// Guesses are processed one at a time, so the first match flips the room out of
/// [`RoomPhase::Playing`] and every later guess of that round is [`Ruling::Late`], whenever
/// the player typed it.
pub fn judge(phase: RoomPhase, submitted: &str, target_title: &str) -> Ruling {
    if phase != RoomPhase::Playing {
        return Ruling::Late;
    }

    match evaluate(submitted, target_title) {
        Verdict::Match => Ruling::Win,
        Verdict::NoMatch => Ruling::Miss,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_title_matches() {
        assert_eq!(evaluate("Eminem Show", "The Eminem Show"), Verdict::Match);
    }

    #[test]
    fn unrelated_title_does_not_match() {
        assert_eq!(evaluate("Encore", "The Eminem Show"), Verdict::NoMatch);
    }

    #[test]
    fn containment_is_symmetric() {
        assert_eq!(
            evaluate("the eminem show deluxe edition", "The Eminem Show"),
            Verdict::Match
        );
    }

    #[test]
    fn matching_ignores_case_and_surrounding_spaces() {
        assert_eq!(evaluate("  DISCOVERY ", "Discovery"), Verdict::Match);
    }

    #[test]
    fn blank_guess_never_matches() {
        assert_eq!(evaluate("   ", "Discovery"), Verdict::NoMatch);
        assert_eq!(evaluate("", "Discovery"), Verdict::NoMatch);
    }

    #[test]
    fn short_guesses_are_accepted_permissively() {
        assert_eq!(evaluate("show", "The Eminem Show"), Verdict::Match);
    }

    #[test]
    fn guesses_outside_playing_are_late() {
        for phase in [
            RoomPhase::Waiting,
            RoomPhase::Starting,
            RoomPhase::RoundEnd,
            RoomPhase::Finished,
        ] {
            assert_eq!(judge(phase, "Discovery", "Discovery"), Ruling::Late);
        }
    }

    #[test]
    fn judge_while_playing() {
        assert_eq!(judge(RoomPhase::Playing, "Discovery", "Discovery"), Ruling::Win);
        assert_eq!(judge(RoomPhase::Playing, "Homework", "Discovery"), Ruling::Miss);
    }
}
