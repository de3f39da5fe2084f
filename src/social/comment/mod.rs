//! 评论模块

pub mod api;
pub mod models;

pub use api::CommentApi;
pub use models::{format_time_ago, Comment};
