//! Library crate for opsdeck exposing the console building blocks.
pub mod client;
pub mod dispatch;
pub mod forms;
pub mod markdown;
pub mod registry;
pub mod render;
pub mod server;
pub mod shell;
pub mod status;
pub mod types;
