//! Round-robin conversation loop.
//!
//! [`RoundRobinChat`] owns an ordered list of [`Participant`]s and a running
//! [`Transcript`]. It advances by invoking the next participant in strict
//! cyclic order, appending its output, and evaluating the
//! [`TerminationCondition`] after every append, so termination can occur
//! mid-round. Round-robin is inherently sequential: at most one model call is
//! in flight, which keeps turn order deterministic and causally consistent.
//!
//! Three things end a run besides the termination condition:
//! - a client failure (`Transport`/`Provider`), which halts the loop
//!   immediately with no retry and no transcript rollback;
//! - cancellation through a [`CancelHandle`], which abandons the in-flight
//!   call and discards its partial output;
//! - the per-call timeout, surfaced as a transport error.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripchat::clients::openai::OpenAIClient;
//! use tripchat::{Participant, RoundRobinChat, TerminationCondition};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(OpenAIClient::new_with_model_string("key", "gpt-4o-mini"));
//! let participants = vec![
//!     Participant::new("writer", "Drafts text.", "You draft text.", Arc::clone(&client)),
//!     Participant::new("editor", "Edits text.", "You edit text; say DONE when satisfied.", client),
//! ];
//!
//! let mut chat = RoundRobinChat::new(participants, TerminationCondition::new("DONE", 8))?;
//! let summary = chat.run("Draft a two-line poem.").await?;
//! println!("{:?}", summary.reason);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use crate::tripchat::error::ChatError;
use crate::tripchat::event::ChatEvent;
use crate::tripchat::participant::Participant;
use crate::tripchat::termination::{TerminationCondition, TerminationReason};
use crate::tripchat::transcript::{Transcript, TranscriptEntry};

/// Upper bound on a single model call. The transport beneath keeps its own
/// 300 second ceiling; this one exists so a stalled stream cannot hold a
/// turn open indefinitely.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Lifecycle of a chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatState {
    /// Constructed, not yet run.
    Idle,
    /// A run is in progress.
    Running,
    /// The run ended. This state is absorbing: no further participant
    /// invocations occur.
    Terminated(TerminationReason),
}

/// Cloneable handle that cancels a running chat from outside.
///
/// Cancelling abandons the in-flight model call; its partial output is
/// discarded rather than appended.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// What a completed (or cancelled) run amounted to.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub reason: TerminationReason,
    pub turns_taken: usize,
    /// Aggregated token usage across all turns that reported it.
    pub total_tokens_used: usize,
}

pub struct RoundRobinChat {
    /// Fixed turn order; index = turns_taken mod len.
    participants: Vec<Participant>,
    termination: TerminationCondition,
    state: ChatState,
    transcript: Transcript,
    turns_taken: usize,
    call_timeout: Duration,
    events: Option<mpsc::Sender<ChatEvent>>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl RoundRobinChat {
    /// Create a chat over the given participants, in the given turn order.
    ///
    /// Returns a configuration error for an empty list or a duplicate
    /// participant name.
    pub fn new(
        participants: Vec<Participant>,
        termination: TerminationCondition,
    ) -> Result<Self, ChatError> {
        if participants.is_empty() {
            return Err(ChatError::Configuration(
                "at least one participant is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for participant in &participants {
            if !seen.insert(participant.name.clone()) {
                return Err(ChatError::Configuration(format!(
                    "duplicate participant name '{}'",
                    participant.name
                )));
            }
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);

        Ok(RoundRobinChat {
            participants,
            termination,
            state: ChatState::Idle,
            transcript: Transcript::new(),
            turns_taken: 0,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            events: None,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        })
    }

    /// Override the per-call timeout (builder pattern).
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Attach an event sink (builder pattern). Without one the run is silent.
    pub fn with_event_sink(mut self, events: mpsc::Sender<ChatEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// A cloneable handle that cancels this chat from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turns_taken(&self) -> usize {
        self.turns_taken
    }

    /// Participant names in turn order.
    pub fn participant_names(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|participant| participant.name.clone())
            .collect()
    }

    /// Emit an event to the registered sink, if any.
    async fn emit(&self, event: ChatEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event).await;
        }
    }

    /// Run the conversation to its terminal state.
    ///
    /// Seeds the transcript with `task`, then takes turns until the
    /// termination condition holds, the run is cancelled, or a client call
    /// fails. A marker already present in the task terminates the run before
    /// any participant is invoked.
    ///
    /// On client failure the state becomes `Terminated(Error(..))`, the
    /// transcript keeps exactly the messages appended before the failure,
    /// and the error is returned.
    pub async fn run(&mut self, task: &str) -> Result<RunSummary, ChatError> {
        if self.state != ChatState::Idle {
            return Err(ChatError::Configuration(
                "this chat has already run; construct a new one to run again".to_string(),
            ));
        }

        self.state = ChatState::Running;
        self.transcript.push(TranscriptEntry::from_user(task));
        self.emit(ChatEvent::RunStarted {
            task: task.to_string(),
            participants: self.participant_names(),
        })
        .await;

        let mut total_tokens_used = 0usize;
        let mut cancel_rx = self.cancel_rx.clone();

        loop {
            let cancelled = *cancel_rx.borrow();
            if cancelled {
                return Ok(self
                    .finish(TerminationReason::Cancelled, total_tokens_used)
                    .await);
            }

            if let Some(reason) = self
                .termination
                .should_stop(&self.transcript, self.turns_taken)
            {
                return Ok(self.finish(reason, total_tokens_used).await);
            }

            let index = self.turns_taken % self.participants.len();
            let turn = self.turns_taken + 1;
            let participant_name = self.participants[index].name.clone();

            log::debug!("turn {}: invoking {}", turn, participant_name);
            self.emit(ChatEvent::TurnStarted {
                turn,
                participant: participant_name.clone(),
            })
            .await;

            // One suspension point: the model call. Cancellation wins over
            // both the call and its timeout; partial output never reaches
            // the transcript.
            let turn_result: Option<Result<String, ChatError>> = {
                let participant = &self.participants[index];
                let produce = async {
                    if participant.supports_streaming() {
                        self.stream_turn(participant).await
                    } else {
                        let entry = participant.produce_next(&self.transcript).await?;
                        Ok(entry.content)
                    }
                };

                tokio::select! {
                    biased;
                    _ = wait_for_cancel(&mut cancel_rx) => None,
                    produced = timeout(self.call_timeout, produce) => Some(match produced {
                        Ok(inner) => inner,
                        Err(_) => Err(ChatError::Transport(format!(
                            "model call timed out after {:?}",
                            self.call_timeout
                        ))),
                    }),
                }
            };

            match turn_result {
                None => {
                    return Ok(self
                        .finish(TerminationReason::Cancelled, total_tokens_used)
                        .await);
                }
                Some(Err(err)) => {
                    log::error!("turn {}: {} failed: {}", turn, participant_name, err);
                    self.finish(TerminationReason::Error(err.to_string()), total_tokens_used)
                        .await;
                    return Err(err);
                }
                Some(Ok(content)) => {
                    let tokens_used = self.participants[index].last_usage();
                    if let Some(usage) = &tokens_used {
                        total_tokens_used += usage.total_tokens;
                    }

                    self.transcript.push(TranscriptEntry::from_participant(
                        participant_name.as_str(),
                        content.clone(),
                    ));
                    self.turns_taken += 1;

                    self.emit(ChatEvent::MessageCompleted {
                        turn,
                        participant: participant_name,
                        content,
                        tokens_used,
                    })
                    .await;
                }
            }
        }
    }

    /// Drive one streamed model call, forwarding chunks to the event sink
    /// and returning the assembled content.
    async fn stream_turn(&self, participant: &Participant) -> Result<String, ChatError> {
        let mut stream = participant.stream_next(&self.transcript).await?;
        let mut content = String::new();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|err| ChatError::Transport(err.to_string()))?;
            if !chunk.content.is_empty() {
                self.emit(ChatEvent::MessageChunk {
                    participant: participant.name.clone(),
                    content: chunk.content.clone(),
                })
                .await;
                content.push_str(&chunk.content);
            }
            if chunk.is_final {
                break;
            }
        }

        Ok(content)
    }

    /// Record the terminal state, emit the terminal event, and build the
    /// run summary.
    async fn finish(&mut self, reason: TerminationReason, total_tokens_used: usize) -> RunSummary {
        log::info!(
            "conversation terminated after {} turn(s): {:?}",
            self.turns_taken,
            reason
        );
        self.state = ChatState::Terminated(reason.clone());
        self.emit(ChatEvent::RunTerminated {
            reason: reason.clone(),
            turns_taken: self.turns_taken,
        })
        .await;

        RunSummary {
            reason,
            turns_taken: self.turns_taken,
            total_tokens_used,
        }
    }
}

/// Resolve once the watch channel carries `true`. Never resolves if the
/// sender side disappears; the chat holds the sender for its lifetime.
async fn wait_for_cancel(rx: &mut watch::Receiver<bool>) {
    loop {
        let cancelled = *rx.borrow_and_update();
        if cancelled {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
