//! The rule deciding when the conversation loop stops.

use crate::tripchat::transcript::Transcript;

/// Why a run reached its terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The marker token appeared in the most recently appended message.
    MarkerMentioned,
    /// The turn budget was exhausted.
    MaxTurnsReached,
    /// A client call failed; the message is the error's display form.
    Error(String),
    /// The run was cancelled from outside, e.g. by ctrl-c.
    Cancelled,
}

/// A pure predicate over the growing transcript: stop once the marker token
/// appears in the latest message, or once the turn budget is spent.
///
/// Marker detection is a plain substring search, so a participant merely
/// quoting the marker also stops the conversation. That matches how the
/// text-mention condition behaves everywhere this pattern comes from, and is
/// left as is.
#[derive(Clone, Debug)]
pub struct TerminationCondition {
    marker_token: String,
    max_turns: usize,
}

impl TerminationCondition {
    pub fn new(marker_token: impl Into<String>, max_turns: usize) -> Self {
        TerminationCondition {
            marker_token: marker_token.into(),
            max_turns,
        }
    }

    pub fn marker_token(&self) -> &str {
        &self.marker_token
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Evaluate the predicate after a message append.
    ///
    /// The marker check runs before the turn-budget check: when both hold at
    /// once the stop is attributed to the marker.
    pub fn should_stop(
        &self,
        transcript: &Transcript,
        turns_taken: usize,
    ) -> Option<TerminationReason> {
        if let Some(entry) = transcript.last() {
            if entry.content.contains(&self.marker_token) {
                return Some(TerminationReason::MarkerMentioned);
            }
        }

        if turns_taken >= self.max_turns {
            return Some(TerminationReason::MaxTurnsReached);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tripchat::transcript::TranscriptEntry;

    fn transcript_with(content: &str) -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::from_participant("a", content));
        transcript
    }

    #[test]
    fn marker_substring_stops() {
        let condition = TerminationCondition::new("TERMINATE", 10);
        let transcript = transcript_with("Here is the final plan. TERMINATE");
        assert_eq!(
            condition.should_stop(&transcript, 3),
            Some(TerminationReason::MarkerMentioned)
        );
    }

    #[test]
    fn quoted_marker_also_stops() {
        // Substring search by design: quoting the marker counts as mentioning it.
        let condition = TerminationCondition::new("TERMINATE", 10);
        let transcript = transcript_with("Never say \"TERMINATE\" prematurely.");
        assert_eq!(
            condition.should_stop(&transcript, 1),
            Some(TerminationReason::MarkerMentioned)
        );
    }

    #[test]
    fn turn_budget_stops() {
        let condition = TerminationCondition::new("TERMINATE", 3);
        let transcript = transcript_with("still going");
        assert_eq!(condition.should_stop(&transcript, 2), None);
        assert_eq!(
            condition.should_stop(&transcript, 3),
            Some(TerminationReason::MaxTurnsReached)
        );
    }

    #[test]
    fn marker_wins_when_both_hold() {
        let condition = TerminationCondition::new("TERMINATE", 3);
        let transcript = transcript_with("done, TERMINATE");
        assert_eq!(
            condition.should_stop(&transcript, 3),
            Some(TerminationReason::MarkerMentioned)
        );
    }

    #[test]
    fn empty_transcript_only_stops_on_budget() {
        let condition = TerminationCondition::new("TERMINATE", 0);
        let transcript = Transcript::new();
        assert_eq!(
            condition.should_stop(&transcript, 0),
            Some(TerminationReason::MaxTurnsReached)
        );
    }
}
