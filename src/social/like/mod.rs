//! 点赞模块

pub mod api;
pub mod models;

pub use api::LikeApi;
pub use models::LikeEdge;
