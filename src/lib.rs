// prompt2png - text-to-image generation client with multi-turn edit sessions

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod utils;
