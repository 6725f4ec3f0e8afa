// src/tripchat/mod.rs

pub mod client_wrapper;
pub mod clients;
pub mod console;
pub mod error;
pub mod event;
pub mod group_chat;
pub mod participant;
pub mod provider;
pub mod termination;
pub mod transcript;

// Explicitly export the conversation loop and participant so callers can reach
// them as tripchat::RoundRobinChat instead of tripchat::group_chat::RoundRobinChat.
pub use group_chat::RoundRobinChat;
pub use participant::Participant;
