//! Scenario tests for the round-robin conversation loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tripchat::{
    ChatError, ChatState, ClientWrapper, Message, Participant, RequestCapabilities, Role,
    RoundRobinChat, TerminationCondition, TerminationReason,
};

/// A client that replays a fixed script of results, one per call, shared by
/// every participant in a chat, so replies land in turn order.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, ChatError>>) -> Arc<Self> {
        Arc::new(ScriptedClient {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    fn from_texts(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|text| Ok(text.to_string())).collect())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
        _options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted");
        next.map(|content| Message {
            role: Role::Assistant,
            content,
        })
    }
}

/// A client whose call never completes, for cancellation tests.
struct PendingClient;

#[async_trait]
impl ClientWrapper for PendingClient {
    fn model_name(&self) -> &str {
        "pending"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
        _options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

/// A client that takes ten hours per call, for timeout tests.
struct SlowClient;

#[async_trait]
impl ClientWrapper for SlowClient {
    fn model_name(&self) -> &str {
        "slow"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
        _options: Option<RequestCapabilities>,
    ) -> Result<Message, ChatError> {
        tokio::time::sleep(Duration::from_secs(36_000)).await;
        Ok(Message {
            role: Role::Assistant,
            content: "too late".to_string(),
        })
    }
}

fn team(names: &[&str], client: Arc<dyn ClientWrapper>) -> Vec<Participant> {
    names
        .iter()
        .map(|name| {
            Participant::new(
                *name,
                format!("test participant {}", name),
                format!("You are {}.", name),
                Arc::clone(&client),
            )
        })
        .collect()
}

fn transcript_pairs(chat: &RoundRobinChat) -> Vec<(Option<String>, String)> {
    chat.transcript()
        .entries()
        .iter()
        .map(|entry| (entry.sender.clone(), entry.content.clone()))
        .collect()
}

#[tokio::test]
async fn two_participants_alternate_until_turn_budget() {
    let client = ScriptedClient::from_texts(&["first", "second", "third"]);
    let mut chat = RoundRobinChat::new(
        team(&["a", "b"], client.clone()),
        TerminationCondition::new("TERMINATE", 3),
    )
    .unwrap();

    let summary = chat.run("task").await.unwrap();

    assert_eq!(summary.reason, TerminationReason::MaxTurnsReached);
    assert_eq!(summary.turns_taken, 3);
    assert_eq!(client.calls(), 3);

    // Invocation order is a, b, a.
    let senders: Vec<Option<String>> = chat
        .transcript()
        .entries()
        .iter()
        .map(|entry| entry.sender.clone())
        .collect();
    assert_eq!(
        senders,
        vec![
            None,
            Some("a".to_string()),
            Some("b".to_string()),
            Some("a".to_string()),
        ]
    );
    assert_eq!(
        chat.state(),
        &ChatState::Terminated(TerminationReason::MaxTurnsReached)
    );
}

#[tokio::test]
async fn turn_budget_of_ten_means_exactly_ten_invocations() {
    let texts: Vec<String> = (0..12).map(|i| format!("reply {}", i)).collect();
    let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
    let client = ScriptedClient::from_texts(&refs);

    let mut chat = RoundRobinChat::new(
        team(&["a", "b", "c"], client.clone()),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    let summary = chat.run("task").await.unwrap();

    assert_eq!(summary.reason, TerminationReason::MaxTurnsReached);
    assert_eq!(summary.turns_taken, 10);
    assert_eq!(client.calls(), 10);
}

#[tokio::test]
async fn marker_halts_mid_round_before_the_budget() {
    // Four participants, max_turns 10: the marker lands on turn 7, so the
    // run stops mid-round with three turns of budget left.
    let client = ScriptedClient::from_texts(&[
        "r1", "r2", "r3", "r4", "r5", "r6", "r7 TERMINATE", "never sent",
    ]);
    let names = ["a", "b", "c", "d"];
    let mut chat = RoundRobinChat::new(
        team(&names, client.clone()),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    let summary = chat.run("task").await.unwrap();

    assert_eq!(summary.reason, TerminationReason::MarkerMentioned);
    assert_eq!(summary.turns_taken, 7);
    assert_eq!(client.calls(), 7);
    assert_eq!(chat.transcript().len(), 8);

    // Cyclic order is exact and never skips: the sender of entry i is
    // participants[(i - 1) mod N].
    for (i, entry) in chat.transcript().entries().iter().enumerate().skip(1) {
        assert_eq!(entry.sender.as_deref(), Some(names[(i - 1) % names.len()]));
    }
}

#[tokio::test]
async fn transport_error_preserves_the_prior_transcript() {
    let client = ScriptedClient::new(vec![
        Ok("first".to_string()),
        Ok("second".to_string()),
        Err(ChatError::Transport("connection reset".to_string())),
    ]);
    let mut chat = RoundRobinChat::new(
        team(&["a", "b"], client.clone()),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    let err = chat.run("task").await.unwrap_err();
    assert_eq!(
        err,
        ChatError::Transport("connection reset".to_string())
    );

    // No rollback, no retry: exactly the messages appended before the failure.
    assert_eq!(chat.turns_taken(), 2);
    assert_eq!(chat.transcript().len(), 3);
    assert_eq!(client.calls(), 3);

    match chat.state() {
        ChatState::Terminated(TerminationReason::Error(message)) => {
            assert!(message.contains("connection reset"));
        }
        other => panic!("expected Terminated(Error), got {:?}", other),
    }
}

#[tokio::test]
async fn marker_in_the_seed_task_prevents_any_invocation() {
    let client = ScriptedClient::from_texts(&["never sent"]);
    let mut chat = RoundRobinChat::new(
        team(&["a", "b"], client.clone()),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    let summary = chat.run("please TERMINATE immediately").await.unwrap();

    assert_eq!(summary.reason, TerminationReason::MarkerMentioned);
    assert_eq!(summary.turns_taken, 0);
    assert_eq!(client.calls(), 0);
    assert_eq!(chat.transcript().len(), 1);
}

#[tokio::test]
async fn identical_scripts_produce_identical_runs() {
    let script = ["plan", "local tips", "language tips", "summary TERMINATE"];

    let mut first = RoundRobinChat::new(
        team(&["a", "b", "c", "d"], ScriptedClient::from_texts(&script)),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();
    let mut second = RoundRobinChat::new(
        team(&["a", "b", "c", "d"], ScriptedClient::from_texts(&script)),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    let first_summary = first.run("task").await.unwrap();
    let second_summary = second.run("task").await.unwrap();

    assert_eq!(first_summary.reason, second_summary.reason);
    assert_eq!(first_summary.turns_taken, second_summary.turns_taken);
    assert_eq!(transcript_pairs(&first), transcript_pairs(&second));
}

#[tokio::test]
async fn a_terminated_chat_cannot_run_again() {
    let client = ScriptedClient::from_texts(&["only"]);
    let mut chat = RoundRobinChat::new(
        team(&["a"], client),
        TerminationCondition::new("TERMINATE", 1),
    )
    .unwrap();

    chat.run("task").await.unwrap();
    let err = chat.run("task again").await.unwrap_err();
    assert!(matches!(err, ChatError::Configuration(_)));
}

#[tokio::test]
async fn empty_and_duplicate_teams_are_rejected() {
    let err = RoundRobinChat::new(vec![], TerminationCondition::new("TERMINATE", 10)).unwrap_err();
    assert!(matches!(err, ChatError::Configuration(_)));

    let client = ScriptedClient::from_texts(&[]);
    let err = RoundRobinChat::new(
        team(&["a", "a"], client),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ChatError::Configuration("duplicate participant name 'a'".to_string())
    );
}

#[tokio::test]
async fn cancellation_before_the_first_turn() {
    let mut chat = RoundRobinChat::new(
        team(&["a"], Arc::new(PendingClient)),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();

    chat.cancel_handle().cancel();
    let summary = chat.run("task").await.unwrap();

    assert_eq!(summary.reason, TerminationReason::Cancelled);
    assert_eq!(summary.turns_taken, 0);
    assert_eq!(
        chat.state(),
        &ChatState::Terminated(TerminationReason::Cancelled)
    );
}

#[tokio::test]
async fn cancellation_abandons_the_in_flight_call() {
    let mut chat = RoundRobinChat::new(
        team(&["a"], Arc::new(PendingClient)),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap();
    let cancel = chat.cancel_handle();

    let run = tokio::spawn(async move {
        let summary = chat.run("task").await.unwrap();
        (summary, chat)
    });

    // Let the run reach the pending model call, then interrupt it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let (summary, chat) = run.await.unwrap();
    assert_eq!(summary.reason, TerminationReason::Cancelled);
    assert_eq!(summary.turns_taken, 0);
    // The in-flight call's output is discarded: only the seed remains.
    assert_eq!(chat.transcript().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn a_stalled_call_times_out_as_a_transport_error() {
    let mut chat = RoundRobinChat::new(
        team(&["a"], Arc::new(SlowClient)),
        TerminationCondition::new("TERMINATE", 10),
    )
    .unwrap()
    .with_call_timeout(Duration::from_secs(120));

    let err = chat.run("task").await.unwrap_err();

    match err {
        ChatError::Transport(message) => assert!(message.contains("timed out")),
        other => panic!("expected a transport error, got {:?}", other),
    }
    assert!(matches!(
        chat.state(),
        ChatState::Terminated(TerminationReason::Error(_))
    ));
    assert_eq!(chat.transcript().len(), 1);
}
