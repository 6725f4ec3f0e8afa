//! # tripchat
//!
//! tripchat runs a fixed-order conversation between several prompt-configured
//! LLM "participants" until one of them mentions a termination marker or a
//! turn budget runs out. The crate provides the pieces that conversation is
//! assembled from:
//!
//! * **Provider Clients**: a [`ClientWrapper`] trait with an OpenAI-compatible
//!   implementation ([`clients::openai::OpenAIClient`]) and an OpenRouter
//!   wrapper ([`clients::openrouter::OpenRouterClient`]) that carries
//!   per-model capability metadata ([`ModelInfo`])
//! * **Participants**: [`Participant`] pairs a name, a description, and a
//!   fixed system instruction with a shared client; its one capability is
//!   producing the next message from the transcript
//! * **Round-Robin Loop**: [`RoundRobinChat`] owns the ordered participant
//!   list and the append-only [`Transcript`], drives turns in strict cyclic
//!   order, and stops on a [`TerminationCondition`] (marker mention or turn
//!   budget), a client failure, or cancellation
//! * **Event Stream**: the loop publishes [`ChatEvent`]s, including
//!   incremental streaming chunks, through a bounded channel that the
//!   [`console`] sink renders while the model call is still in flight
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripchat::clients::openai::OpenAIClient;
//! use tripchat::{Participant, RoundRobinChat, TerminationCondition};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tripchat::init_logger();
//!
//!     let client = Arc::new(OpenAIClient::new_with_model_string(
//!         &std::env::var("OPENAI_API_KEY")?,
//!         "gpt-4o-mini",
//!     ));
//!
//!     let participants = vec![
//!         Participant::new("poet", "Writes verse.", "You answer in rhyme.", Arc::clone(&client)),
//!         Participant::new("critic", "Reviews verse.", "You critique the poem, then say DONE.", client),
//!     ];
//!
//!     let mut chat = RoundRobinChat::new(participants, TerminationCondition::new("DONE", 6))?;
//!     let summary = chat.run("Write a haiku about rain.").await?;
//!     println!("finished: {:?} after {} turn(s)", summary.reason, summary.turns_taken);
//!     Ok(())
//! }
//! ```
//!
//! The binary in `src/main.rs` wires the four trip-planning participants
//! (planner, local guide, language advisor, summarizer) against OpenRouter and
//! streams the conversation to the terminal.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Lightweight on purpose so applications embedding tripchat can opt in to
/// `RUST_LOG` driven diagnostics without choosing a logging backend upfront.
///
/// ```rust
/// tripchat::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `tripchat` module.
pub mod tripchat;

// Re-exporting key items for easier external access.
pub use crate::tripchat::client_wrapper;
pub use crate::tripchat::client_wrapper::{
    ClientWrapper, Message, MessageChunk, MessageChunkStream, ModelFamily, ModelInfo,
    RequestCapabilities, Role, SendError, TokenUsage,
};
pub use crate::tripchat::clients;
pub use crate::tripchat::console;
pub use crate::tripchat::error::ChatError;
pub use crate::tripchat::event::ChatEvent;
pub use crate::tripchat::group_chat::{CancelHandle, ChatState, RoundRobinChat, RunSummary};
pub use crate::tripchat::participant::Participant;
pub use crate::tripchat::provider::{OpenRouterConfig, Provider};
pub use crate::tripchat::termination::{TerminationCondition, TerminationReason};
pub use crate::tripchat::transcript::{Transcript, TranscriptEntry};
