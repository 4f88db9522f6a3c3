pub mod app;
pub mod client;
pub mod config;
pub mod handler;
pub mod session;
pub mod tui;
pub mod ui;

// Re-export commonly used types
pub use client::{AgentClient, ChatResult, UploadResult};
pub use session::{ChatSession, Message, Sender};
