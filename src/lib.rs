pub mod social;

// 重新导出常用类型，方便外部使用
pub use social::{
    album::{Album, AlbumType, NewAlbum},
    client::{ClientConfig, SocialClient},
    feed::{FeedItem, Video, ViewableItem, VisibilityTracker},
    graph::{derive_friends, FollowEdge},
    like::LikeEdge,
    listener::{EmptySocialListener, SocialListener},
    state::AppSnapshot,
    user::{ProfileSummary, User},
};
