pub mod album;
pub mod client;
pub mod collab;
pub mod comment;
pub mod error;
pub mod feed;
pub mod graph;
pub mod like;
pub mod listener;
pub mod rest;
pub mod serialization;
pub mod state;
pub mod storage;
pub mod types;
pub mod user;

#[cfg(test)]
pub(crate) mod mock;

// 重新导出客户端和状态相关类型
pub use client::{ClientConfig, SocialClient};
pub use error::{is_not_found, is_setup_required, user_message, BackendError};
pub use listener::{EmptySocialListener, SocialListener};
pub use state::{AppSnapshot, Committed, StateStore};
