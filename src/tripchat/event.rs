//! Conversation loop events.
//!
//! The loop publishes [`ChatEvent`]s through a bounded tokio mpsc channel so
//! a sink (normally [`crate::tripchat::console::render`]) can draw the
//! conversation while a model call is still streaming. The loop never blocks
//! on a missing sink: without a registered sender events are dropped, and a
//! closed receiver is ignored.

use tokio::sync::mpsc;

use crate::tripchat::client_wrapper::TokenUsage;
use crate::tripchat::termination::TerminationReason;

/// Events emitted by [`RoundRobinChat::run`](crate::tripchat::group_chat::RoundRobinChat::run).
///
/// # Event flow (one run)
///
/// ```text
/// RunStarted
///   └─ TurnStarted { turn: 1 }
///   └─ MessageChunk*           (only when the client streams)
///   └─ MessageCompleted { turn: 1 }
///   └─ ...repeats per turn...
/// RunTerminated
/// ```
#[derive(Clone, Debug)]
pub enum ChatEvent {
    /// Fired once, after the task has been appended to the transcript.
    RunStarted {
        /// The seed task text.
        task: String,
        /// Participant names in turn order.
        participants: Vec<String>,
    },

    /// A participant was selected and its model call is about to start.
    TurnStarted {
        /// 1-based turn counter.
        turn: usize,
        /// Name of the participant taking this turn.
        participant: String,
    },

    /// An incremental piece of the in-flight message.
    MessageChunk {
        participant: String,
        content: String,
    },

    /// A turn finished and its message was appended to the transcript.
    MessageCompleted {
        turn: usize,
        participant: String,
        /// The full message content (also the concatenation of this turn's
        /// chunks, when the client streamed).
        content: String,
        /// Token usage for this turn, when the backend reported it.
        tokens_used: Option<TokenUsage>,
    },

    /// The terminal event of every run, whatever the outcome.
    RunTerminated {
        reason: TerminationReason,
        turns_taken: usize,
    },
}

pub type EventSender = mpsc::Sender<ChatEvent>;
pub type EventReceiver = mpsc::Receiver<ChatEvent>;
