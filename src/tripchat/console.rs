//! Console sink for the conversation event stream.
//!
//! Prints a banner per turn and streams chunks as they arrive, flushing
//! stdout so tokens show up with low latency.

use std::io::{self, Write};

use crate::tripchat::event::{ChatEvent, EventReceiver};
use crate::tripchat::termination::TerminationReason;

/// Consume events until the channel closes, rendering the conversation.
///
/// Runs as its own task so it can draw streamed chunks while the loop is
/// still awaiting the model call that produces them.
pub async fn render(mut events: EventReceiver) {
    // Whether the current turn already printed its content chunk by chunk.
    let mut streamed_this_turn = false;

    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::RunStarted { task, participants } => {
                log::debug!("rendering run with participants: {}", participants.join(", "));
                println!("---------- user ----------");
                println!("{}", task);
            }
            ChatEvent::TurnStarted { turn, participant } => {
                streamed_this_turn = false;
                println!();
                println!("---------- {} (turn {}) ----------", participant, turn);
            }
            ChatEvent::MessageChunk { content, .. } => {
                streamed_this_turn = true;
                print!("{}", content);
                let _ = io::stdout().flush();
            }
            ChatEvent::MessageCompleted { content, .. } => {
                if streamed_this_turn {
                    println!();
                } else {
                    println!("{}", content);
                }
            }
            ChatEvent::RunTerminated {
                reason,
                turns_taken,
            } => {
                println!();
                match reason {
                    TerminationReason::MarkerMentioned => println!(
                        "Conversation complete: termination marker mentioned after {} turn(s).",
                        turns_taken
                    ),
                    TerminationReason::MaxTurnsReached => println!(
                        "Conversation stopped: turn budget reached after {} turn(s).",
                        turns_taken
                    ),
                    TerminationReason::Cancelled => {
                        println!("Conversation cancelled after {} turn(s).", turns_taken)
                    }
                    TerminationReason::Error(message) => println!(
                        "Conversation aborted after {} turn(s): {}",
                        turns_taken, message
                    ),
                }
            }
        }
    }
}
