//! 用户资料模块

pub mod api;
pub mod models;

pub use api::UserApi;
pub use models::{ProfileSummary, User};
