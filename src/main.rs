//! tripchat binary: a round-robin team of four trip-planning agents.
//!
//! Builds an OpenRouter-backed client, wires the planner, local-guide,
//! language-advisor, and summarizer participants into a round-robin chat, and
//! streams the conversation to the terminal until the summarizer says
//! TERMINATE or ten turns have passed.
//!
//! Run as:
//! OPENROUTER_API_KEY=your-key cargo run -- --task "Plan a 3 day trip to Nepal."

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use tripchat::{
    console, ClientWrapper, Participant, Provider, RoundRobinChat, TerminationCondition,
};

const DEFAULT_TASK: &str = "Plan a 3 day trip to Nepal.";
const TERMINATION_MARKER: &str = "TERMINATE";
const MAX_TURNS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "tripchat")]
#[command(about = "Plan a trip with a round-robin team of LLM agents")]
struct Args {
    /// Initial task handed to the team.
    #[arg(long, default_value = DEFAULT_TASK)]
    task: String,
}

/// The four prompt-configured participants, in turn order.
fn build_trip_team(client: Arc<dyn ClientWrapper>) -> Vec<Participant> {
    vec![
        Participant::new(
            "planner_agent",
            "A helpful assistant that can plan trips.",
            "You are a helpful assistant that can suggest a travel plan for a user based on \
             their request.",
            Arc::clone(&client),
        ),
        Participant::new(
            "local_agent",
            "A local assistant that can suggest authentic local activities and places to visit.",
            "You are a helpful assistant that can suggest authentic and interesting local \
             activities or places to visit for a user, making use of any context information \
             provided.",
            Arc::clone(&client),
        ),
        Participant::new(
            "language_agent",
            "A helpful assistant that can provide language tips for a given destination.",
            "You are a helpful assistant that can review travel plans and give important \
             feedback on the official language of the destination and how best to address \
             communication challenges there. If the plan already includes language tips, you \
             can state that the plan is satisfactory, with reasons.",
            Arc::clone(&client),
        ),
        Participant::new(
            "travel_summary_agent",
            "A helpful assistant that can summarize the travel plan.",
            "You are a helpful assistant that can take in all of the suggestions and advice \
             from the other agents and provide a detailed final travel plan. You must ensure \
             that the final plan is integrated and complete. Your final response must be the \
             complete plan. When the plan is complete and all perspectives have been \
             integrated, you can respond with TERMINATE.",
            client,
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tripchat::init_logger();
    let args = Args::parse();

    let provider = Provider::from_name("openrouter")?;
    let client = provider.build_client()?;

    let (event_tx, event_rx) = mpsc::channel(64);
    let mut chat = RoundRobinChat::new(
        build_trip_team(client),
        TerminationCondition::new(TERMINATION_MARKER, MAX_TURNS),
    )?
    .with_event_sink(event_tx);

    let cancel = chat.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupt received, cancelling the conversation");
            cancel.cancel();
        }
    });

    let renderer = tokio::spawn(console::render(event_rx));

    let outcome = chat.run(&args.task).await;

    // Dropping the chat closes the event channel so the renderer drains the
    // terminal event before the process exits, on success and failure alike.
    drop(chat);
    let _ = renderer.await;

    let summary = outcome?;
    log::info!(
        "run finished: {:?}, {} turn(s), {} token(s)",
        summary.reason,
        summary.turns_taken,
        summary.total_tokens_used
    );

    Ok(())
}
