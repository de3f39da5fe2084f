//! 视频流模块
//!
//! 拉取视频元数据、批量签发播放地址，并跟踪当前可见的条目

pub mod api;
pub mod composer;
pub mod models;
pub mod visibility;

pub use api::VideoApi;
pub use composer::FeedComposer;
pub use models::{FeedItem, Video};
pub use visibility::{ViewableItem, VisibilityTracker};
