//! 关注关系模块
//!
//! 关注/粉丝边的拉取与增删，以及基于两张边表推导互关好友

pub mod api;
pub mod derive;
pub mod models;

pub use api::FollowerApi;
pub use derive::derive_friends;
pub use models::FollowEdge;
