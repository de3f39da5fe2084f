use crate::social::feed::models::FeedItem;
use crate::social::graph::models::FollowEdge;
use crate::social::serialization::{deserialize_id, deserialize_opt_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 用户资料（`User` 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// 个人主页汇总
#[derive(Debug, Clone)]
pub struct ProfileSummary {
    pub user: User,
    /// 该用户关注的人
    pub following: Vec<FollowEdge>,
    /// 关注该用户的人
    pub followers: Vec<FollowEdge>,
    /// 该用户发布的视频（已签名）
    pub videos: Vec<FeedItem>,
    /// 仅当前用户自己的主页有值：点赞账本中作者为该用户的点赞数
    pub likes_received: Option<usize>,
}

impl ProfileSummary {
    pub fn following_count(&self) -> usize {
        self.following.len()
    }

    pub fn followers_count(&self) -> usize {
        self.followers.len()
    }
}
