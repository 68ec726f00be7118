//! Yaddoo core library: profile, chat flow and reply client shared by the CLI and desktop
//! front-ends.

pub mod avatar;
pub mod chat;
pub mod chat_log;
pub mod config;
pub mod gate;
pub mod init;
pub mod profile;
pub mod reply;
pub mod transcript;
pub mod widget;

pub use chat::{ChatController, ChatView, NoView};
pub use widget::ChatWidget;
